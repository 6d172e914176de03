//! Wave combat: monster derivation, player stats and progression.

pub mod engine;
pub mod monsters;

pub use engine::{
    next_position, player_stats, BattleOutcome, CombatProgress, PlayerCombatState, PlayerStats,
};
pub use monsters::{
    max_wave_count, monster_count, monster_for_wave, stage_index, wave_theme, xp_for_kill,
    Monster, WaveTheme, SUB_NAMES, WAVE_THEMES,
};
