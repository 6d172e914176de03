//! Shared balance constants.
//!
//! All core balance numbers live here. Change once, test everywhere.

// =============================================================================
// EQUIPMENT & ITEM STATS
// =============================================================================

/// Number of equipment slots.
pub const NUM_EQUIPMENT_SLOTS: usize = 8;

/// Base item level cap before mastery techs.
pub const MAX_LEVEL: u32 = 100;

/// HP granted per item level on health slots.
pub const HEALTH_PER_LEVEL: u32 = 10;

/// Damage granted per item level on damage slots.
pub const DAMAGE_PER_LEVEL: u32 = 2;

/// Player HP before any equipment.
pub const BASE_HEALTH: u32 = 100;

/// Player damage before any equipment.
pub const BASE_DAMAGE: u32 = 10;

// =============================================================================
// FORGE
// =============================================================================

/// Forged item level stays within this range of the currently equipped item.
pub const FORGE_LEVEL_RANGE: u32 = 10;

/// Level roll cap when the target slot is empty.
pub const INITIAL_LEVEL_MAX: u32 = 10;

/// Masterwork proc chance (fraction).
pub const MASTERWORK_PROC_CHANCE: f64 = 0.10;

/// Levels added by a masterwork proc.
pub const MASTERWORK_BONUS_LEVELS: u32 = 20;

// =============================================================================
// PLAYER COMBAT STATS
// =============================================================================

/// Player attack interval before attack-speed bonuses (ms).
pub const BASE_PLAYER_ATTACK_SPEED_MS: u32 = 1500;

/// Attack interval reduction per attack-speed bonus point (ms).
pub const ATTACK_SPEED_MS_PER_POINT: u32 = 15;

/// Player attack interval floor (ms).
pub const PLAYER_ATTACK_SPEED_FLOOR_MS: u32 = 400;

// =============================================================================
// MONSTER SCALING
// =============================================================================

/// Waves before waveBreaker extensions.
pub const WAVE_COUNT: u32 = 10;

/// Sub-waves per wave.
pub const SUB_WAVE_COUNT: u32 = 10;

/// Extra waves per waveBreaker tech level.
pub const WAVES_PER_BREAKER_RANK: u32 = 2;

/// Monster HP at stage 1 before theme multipliers.
pub const BASE_MONSTER_HP: f64 = 50.0;

/// Monster damage at stage 1 before theme multipliers.
pub const BASE_MONSTER_DMG: f64 = 5.0;

/// Stage exponent for monster HP (super-linear).
pub const HP_STAGE_EXPONENT: f64 = 1.35;

/// Stage exponent for monster damage (super-linear).
pub const DMG_STAGE_EXPONENT: f64 = 1.25;

/// Monster attack interval at stage 1 (ms).
pub const BASE_MONSTER_ATTACK_SPEED_MS: i64 = 2000;

/// Attack interval reduction per stage above 1 (ms).
pub const ATTACK_DELAY_PER_STAGE_MS: i64 = 12;

/// Monster attack interval floor (ms).
pub const MONSTER_ATTACK_SPEED_FLOOR_MS: i64 = 800;

// =============================================================================
// PLAYER XP & LEVELING
// =============================================================================

/// Player level cap.
pub const MAX_PLAYER_LEVEL: u32 = 100;

/// XP curve base: xp_required(n) = BASE_XP_PER_LEVEL * n^XP_GROWTH.
pub const BASE_XP_PER_LEVEL: f64 = 150.0;

/// XP curve exponent.
pub const XP_GROWTH: f64 = 1.3;

/// Combat XP at stage 1: XP_PER_KILL_BASE + floor(stage * XP_PER_KILL_PER_STAGE).
pub const XP_PER_KILL_BASE: u64 = 5;

/// Combat XP growth per stage.
pub const XP_PER_KILL_PER_STAGE: f64 = 2.5;

/// Gold reward on level-up: LEVEL_REWARD_BASE_GOLD + LEVEL_REWARD_GOLD_PER_LEVEL * level.
pub const LEVEL_REWARD_BASE_GOLD: u64 = 50;
pub const LEVEL_REWARD_GOLD_PER_LEVEL: u64 = 25;

/// Every LEVEL_MILESTONE_INTERVAL levels the reward is multiplied.
pub const LEVEL_MILESTONE_INTERVAL: u32 = 10;
pub const LEVEL_MILESTONE_MULTIPLIER: u64 = 10;

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Save file version magic.
pub const SAVE_VERSION_MAGIC: u64 = 0x464F_5247_454D_5354;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_speed_floors() {
        // Monster floor is exactly double the player floor
        assert_eq!(MONSTER_ATTACK_SPEED_FLOOR_MS, 800);
        assert_eq!(PLAYER_ATTACK_SPEED_FLOOR_MS, 400);
    }

    #[test]
    fn test_stage_exponents_are_super_linear() {
        assert!(HP_STAGE_EXPONENT > 1.0);
        assert!(DMG_STAGE_EXPONENT > 1.0);
    }
}
