//! Monster derivation and wave scaling.
//!
//! A monster is a pure function of its (wave, sub-wave) coordinates: the
//! linear stage index drives super-linear HP/damage growth, and the wave
//! theme supplies flavor plus per-theme multipliers. Nothing here is ever
//! persisted.

use crate::constants::{
    ATTACK_DELAY_PER_STAGE_MS, BASE_MONSTER_ATTACK_SPEED_MS, BASE_MONSTER_DMG, BASE_MONSTER_HP,
    DMG_STAGE_EXPONENT, HP_STAGE_EXPONENT, MONSTER_ATTACK_SPEED_FLOOR_MS, SUB_WAVE_COUNT,
    WAVES_PER_BREAKER_RANK, WAVE_COUNT, XP_PER_KILL_BASE, XP_PER_KILL_PER_STAGE,
};
use crate::tech::{ResearchState, TechId};

/// Flavor and scaling for one wave of monsters.
#[derive(Debug, Clone, Copy)]
pub struct WaveTheme {
    pub name: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub hp_mult: f64,
    pub dmg_mult: f64,
    /// Offset applied to the attack interval (ms); negative is faster.
    pub speed_modifier: i64,
}

/// Themes cycle by wave; multipliers are non-decreasing down the list so
/// monster power never dips when a new wave begins.
pub static WAVE_THEMES: [WaveTheme; 20] = [
    WaveTheme { name: "Rat", emoji: "🐀", color: "#8d6e63", hp_mult: 1.0, dmg_mult: 1.0, speed_modifier: 0 },
    WaveTheme { name: "Wolf", emoji: "🐺", color: "#78909c", hp_mult: 1.0, dmg_mult: 1.05, speed_modifier: -40 },
    WaveTheme { name: "Spider", emoji: "🕷️", color: "#6d4c41", hp_mult: 1.05, dmg_mult: 1.05, speed_modifier: -80 },
    WaveTheme { name: "Ogre", emoji: "👹", color: "#e65100", hp_mult: 1.1, dmg_mult: 1.1, speed_modifier: 120 },
    WaveTheme { name: "Skeleton", emoji: "💀", color: "#eceff1", hp_mult: 1.1, dmg_mult: 1.1, speed_modifier: 0 },
    WaveTheme { name: "Zombie", emoji: "🧟", color: "#558b2f", hp_mult: 1.15, dmg_mult: 1.1, speed_modifier: 160 },
    WaveTheme { name: "Wraith", emoji: "👻", color: "#7e57c2", hp_mult: 1.15, dmg_mult: 1.15, speed_modifier: -120 },
    WaveTheme { name: "Drake", emoji: "🐉", color: "#c62828", hp_mult: 1.2, dmg_mult: 1.2, speed_modifier: 40 },
    WaveTheme { name: "Demon", emoji: "😈", color: "#d50000", hp_mult: 1.25, dmg_mult: 1.2, speed_modifier: -60 },
    WaveTheme { name: "Infernal", emoji: "🔥", color: "#ff6f00", hp_mult: 1.25, dmg_mult: 1.25, speed_modifier: -100 },
    WaveTheme { name: "Golem", emoji: "🗿", color: "#795548", hp_mult: 1.3, dmg_mult: 1.25, speed_modifier: 200 },
    WaveTheme { name: "Basilisk", emoji: "🐍", color: "#33691e", hp_mult: 1.3, dmg_mult: 1.3, speed_modifier: -40 },
    WaveTheme { name: "Phantom", emoji: "🌫️", color: "#90a4ae", hp_mult: 1.35, dmg_mult: 1.3, speed_modifier: -140 },
    WaveTheme { name: "Hydra", emoji: "🐲", color: "#00695c", hp_mult: 1.35, dmg_mult: 1.35, speed_modifier: 60 },
    WaveTheme { name: "Lich", emoji: "🧙", color: "#4527a0", hp_mult: 1.4, dmg_mult: 1.35, speed_modifier: -20 },
    WaveTheme { name: "Chimera", emoji: "🦁", color: "#bf360c", hp_mult: 1.4, dmg_mult: 1.4, speed_modifier: -80 },
    WaveTheme { name: "Revenant", emoji: "⚰️", color: "#37474f", hp_mult: 1.45, dmg_mult: 1.4, speed_modifier: 80 },
    WaveTheme { name: "Titan", emoji: "🏔️", color: "#5d4037", hp_mult: 1.5, dmg_mult: 1.45, speed_modifier: 240 },
    WaveTheme { name: "Seraph", emoji: "👁️", color: "#c9a84c", hp_mult: 1.5, dmg_mult: 1.5, speed_modifier: -160 },
    WaveTheme { name: "Voidspawn", emoji: "🌑", color: "#1a1a2e", hp_mult: 1.55, dmg_mult: 1.55, speed_modifier: -200 },
];

/// Rank suffix per sub-wave position.
pub static SUB_NAMES: [&str; 10] = [
    "Scout", "Grunt", "Fighter", "Warrior", "Veteran", "Elite", "Champion", "Warlord", "Tyrant",
    "Boss",
];

/// A monster derived for one battle. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Monster {
    pub name: String,
    pub emoji: &'static str,
    pub color: &'static str,
    pub max_hp: u64,
    pub damage: u64,
    /// Attack interval in ms.
    pub attack_speed: i64,
    pub wave: u32,
    pub sub_wave: u32,
}

/// Linear stage index for (wave, sub-wave), 1-based.
pub fn stage_index(wave: u32, sub_wave: u32) -> u32 {
    (wave.max(1) - 1) * SUB_WAVE_COUNT + sub_wave.max(1)
}

/// Theme for a wave, cycling through the theme list.
pub fn wave_theme(wave: u32) -> &'static WaveTheme {
    let index = (wave.max(1) - 1) as usize % WAVE_THEMES.len();
    &WAVE_THEMES[index]
}

/// Derives the monster for a wave/sub-wave pair.
///
/// HP and damage grow super-linearly with the stage index and are scaled by
/// the wave theme. Attack interval shrinks with the stage but never drops
/// below the 800 ms floor. For all valid inputs: `max_hp > 0`, `damage > 0`.
pub fn monster_for_wave(wave: u32, sub_wave: u32) -> Monster {
    let theme = wave_theme(wave);
    let sub_index = (sub_wave.clamp(1, SUB_WAVE_COUNT) - 1) as usize;
    let stage = stage_index(wave, sub_wave) as f64;

    let max_hp = (BASE_MONSTER_HP * stage.powf(HP_STAGE_EXPONENT) * theme.hp_mult).floor() as u64;
    let damage = (BASE_MONSTER_DMG * stage.powf(DMG_STAGE_EXPONENT) * theme.dmg_mult).floor() as u64;

    let interval = BASE_MONSTER_ATTACK_SPEED_MS
        - (stage as i64 - 1) * ATTACK_DELAY_PER_STAGE_MS
        + theme.speed_modifier;
    let attack_speed = interval.max(MONSTER_ATTACK_SPEED_FLOOR_MS);

    Monster {
        name: format!("{} {}", theme.name, SUB_NAMES[sub_index]),
        emoji: theme.emoji,
        color: theme.color,
        max_hp: max_hp.max(1),
        damage: damage.max(1),
        attack_speed,
        wave,
        sub_wave,
    }
}

/// Monsters fought in a sub-wave: a fixed step table, not a formula.
pub fn monster_count(sub_wave: u32) -> u32 {
    match sub_wave {
        1..=3 => 1,
        4..=7 => 2,
        _ => 3,
    }
}

/// Highest reachable wave: the base 10 plus 2 per waveBreaker level.
pub fn max_wave_count(research: &ResearchState) -> u32 {
    WAVE_COUNT + WAVES_PER_BREAKER_RANK * research.tech_level(TechId::WaveBreaker)
}

/// XP awarded for defeating a monster at (wave, sub-wave), after the
/// battleXP tech.
pub fn xp_for_kill(wave: u32, sub_wave: u32, research: &ResearchState) -> u64 {
    let stage = stage_index(wave, sub_wave);
    let base = XP_PER_KILL_BASE + (stage as f64 * XP_PER_KILL_PER_STAGE).floor() as u64;
    let bonus = research.tech_effect(TechId::BattleXp) as u64;
    base * (100 + bonus) / 100
}
