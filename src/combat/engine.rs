//! Player stat aggregation and battle progression.
//!
//! The core never runs its own combat loop; callers resolve each battle and
//! report the outcome, and this module computes the resulting wave
//! transition and the player's derived stats.

use super::monsters::max_wave_count;
use crate::constants::{
    ATTACK_SPEED_MS_PER_POINT, BASE_DAMAGE, BASE_HEALTH, BASE_PLAYER_ATTACK_SPEED_MS,
    PLAYER_ATTACK_SPEED_FLOOR_MS, SUB_WAVE_COUNT,
};
use crate::items::{BonusStat, Equipment, StatKind};
use crate::tech::{ResearchState, TechId};
use serde::{Deserialize, Serialize};

/// Player combat stats derived from equipment and techs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub max_hp: u64,
    pub damage: u64,
    /// Attack interval in ms.
    pub attack_speed: u32,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub health_regen: f64,
    pub life_steal: f64,
}

/// Sums a bonus stat across all equipped items.
fn bonus_total(equipment: &Equipment, key: BonusStat) -> f64 {
    equipment
        .iter_equipped()
        .flat_map(|item| &item.bonuses)
        .filter(|bonus| bonus.key == key)
        .map(|bonus| bonus.value)
        .sum()
}

/// Aggregates the player's combat stats from equipment plus tech effects.
///
/// Health and damage each apply their multi bonus to the equipment total,
/// then the vitality/strength techs scale the whole pool. The attack
/// interval shrinks with attack-speed bonuses and the swiftStrikes tech, and
/// is floored at 400 ms.
pub fn player_stats(equipment: &Equipment, research: &ResearchState) -> PlayerStats {
    let mut total_health = 0u64;
    let mut total_damage = 0u64;
    for item in equipment.iter_equipped() {
        match item.stat_type {
            StatKind::Health => total_health += item.stats as u64,
            StatKind::Damage => total_damage += item.stats as u64,
        }
    }

    // Equipment multi bonuses are fractional; floor once, then apply the
    // integer tech percents exactly
    let health_multi = 1.0 + bonus_total(equipment, BonusStat::HealthMulti) / 100.0;
    let damage_multi = 1.0 + bonus_total(equipment, BonusStat::DamageMulti) / 100.0;
    let health_pool = BASE_HEALTH as u64 + (total_health as f64 * health_multi).floor() as u64;
    let damage_pool = BASE_DAMAGE as u64 + (total_damage as f64 * damage_multi).floor() as u64;

    let vitality = research.tech_effect(TechId::Vitality) as u64;
    let strength = research.tech_effect(TechId::Strength) as u64;
    let max_hp = health_pool * (100 + vitality) / 100;
    let damage = damage_pool * (100 + strength) / 100;

    let speed_points = bonus_total(equipment, BonusStat::AttackSpeed);
    let interval = (BASE_PLAYER_ATTACK_SPEED_MS as f64
        - speed_points * ATTACK_SPEED_MS_PER_POINT as f64)
        .floor() as i64;
    let swift = research.tech_effect(TechId::SwiftStrikes) as i64;
    let interval = interval * (100 - swift) / 100;
    let attack_speed = interval.max(PLAYER_ATTACK_SPEED_FLOOR_MS as i64) as u32;

    PlayerStats {
        max_hp,
        damage,
        attack_speed,
        crit_chance: bonus_total(equipment, BonusStat::CritChance),
        crit_multiplier: bonus_total(equipment, BonusStat::CritMultiplier),
        health_regen: bonus_total(equipment, BonusStat::HealthRegen),
        life_steal: bonus_total(equipment, BonusStat::LifeSteal),
    }
}

/// Runtime combat state for the player. Transient; rebuilt from equipment
/// and techs whenever combat starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCombatState {
    pub max_hp: u64,
    pub current_hp: u64,
    pub damage: u64,
    pub attack_speed: u32,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub health_regen: f64,
    pub life_steal: f64,
}

impl PlayerCombatState {
    /// Fresh state at full health.
    pub fn from_stats(stats: PlayerStats) -> Self {
        Self {
            max_hp: stats.max_hp,
            current_hp: stats.max_hp,
            damage: stats.damage,
            attack_speed: stats.attack_speed,
            crit_chance: stats.crit_chance,
            crit_multiplier: stats.crit_multiplier,
            health_regen: stats.health_regen,
            life_steal: stats.life_steal,
        }
    }

    /// Re-derives stats mid-battle, preserving the current HP *ratio*
    /// rather than resetting or keeping the absolute value.
    pub fn refresh(&mut self, stats: PlayerStats) {
        let ratio = if self.max_hp > 0 {
            self.current_hp as f64 / self.max_hp as f64
        } else {
            1.0
        };
        self.max_hp = stats.max_hp;
        self.current_hp = ((stats.max_hp as f64 * ratio).round() as u64).min(stats.max_hp);
        self.damage = stats.damage;
        self.attack_speed = stats.attack_speed;
        self.crit_chance = stats.crit_chance;
        self.crit_multiplier = stats.crit_multiplier;
        self.health_regen = stats.health_regen;
        self.life_steal = stats.life_steal;
    }
}

/// Outcome of a resolved battle, reported by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Win,
    Loss,
}

/// Current and high-water battle coordinates. All fields are >= 1;
/// (highest_wave, highest_sub_wave) never lags (current_wave,
/// current_sub_wave) lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatProgress {
    #[serde(rename = "currentWave")]
    pub current_wave: u32,
    #[serde(rename = "currentSubWave")]
    pub current_sub_wave: u32,
    #[serde(rename = "highestWave")]
    pub highest_wave: u32,
    #[serde(rename = "highestSubWave")]
    pub highest_sub_wave: u32,
}

impl Default for CombatProgress {
    fn default() -> Self {
        Self {
            current_wave: 1,
            current_sub_wave: 1,
            highest_wave: 1,
            highest_sub_wave: 1,
        }
    }
}

impl CombatProgress {
    /// Moves to (wave, sub_wave) and raises the high-water mark when the new
    /// position is lexicographically beyond it. Retreats never lower it.
    pub fn set_position(&mut self, wave: u32, sub_wave: u32) {
        self.current_wave = wave;
        self.current_sub_wave = sub_wave;
        if wave > self.highest_wave
            || (wave == self.highest_wave && sub_wave > self.highest_sub_wave)
        {
            self.highest_wave = wave;
            self.highest_sub_wave = sub_wave;
        }
    }
}

/// Wave transition for a battle outcome at (wave, sub_wave):
///
/// - win below the last sub-wave: next sub-wave;
/// - win at the last sub-wave: first sub-wave of the next wave, capped at
///   the highest unlocked wave;
/// - loss above sub-wave 1: previous sub-wave;
/// - loss at sub-wave 1: stay put — never retreats into an earlier wave.
pub fn next_position(
    wave: u32,
    sub_wave: u32,
    outcome: BattleOutcome,
    research: &ResearchState,
) -> (u32, u32) {
    match outcome {
        BattleOutcome::Win => {
            if sub_wave < SUB_WAVE_COUNT {
                (wave, sub_wave + 1)
            } else if wave < max_wave_count(research) {
                (wave + 1, 1)
            } else {
                // Final unlocked stage: re-arm it
                (wave, sub_wave)
            }
        }
        BattleOutcome::Loss => {
            if sub_wave > 1 {
                (wave, sub_wave - 1)
            } else {
                (wave, 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::generation::create_item_with_tier;
    use crate::items::types::{Bonus, EquipmentSlot, Item};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn research_with(pairs: &[(TechId, u32)]) -> ResearchState {
        let mut research = ResearchState::new();
        for &(tech, level) in pairs {
            research.completed.insert(tech, level);
        }
        research
    }

    fn plain_item(slot: EquipmentSlot, level: u32) -> Item {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        create_item_with_tier(slot, level, 1, &ResearchState::new(), &mut rng)
    }

    #[test]
    fn test_bare_player_stats() {
        let stats = player_stats(&Equipment::new(), &ResearchState::new());
        assert_eq!(stats.max_hp, 100);
        assert_eq!(stats.damage, 10);
        assert_eq!(stats.attack_speed, 1500);
        assert_eq!(stats.crit_chance, 0.0);
    }

    #[test]
    fn test_equipment_contributes_by_classification() {
        let mut equipment = Equipment::new();
        equipment.set(EquipmentSlot::Armor, Some(plain_item(EquipmentSlot::Armor, 10))); // +100 hp
        equipment.set(EquipmentSlot::Weapon, Some(plain_item(EquipmentSlot::Weapon, 10))); // +20 dmg

        let stats = player_stats(&equipment, &ResearchState::new());
        assert_eq!(stats.max_hp, 200);
        assert_eq!(stats.damage, 30);
    }

    #[test]
    fn test_vitality_scales_total_health() {
        // No equipment: floor(100 * 1.02) = 102
        let research = research_with(&[(TechId::Vitality, 1)]);
        let stats = player_stats(&Equipment::new(), &research);
        assert_eq!(stats.max_hp, 102);

        let research = research_with(&[(TechId::Vitality, 3)]);
        let stats = player_stats(&Equipment::new(), &research);
        assert_eq!(stats.max_hp, 106);
    }

    #[test]
    fn test_strength_scales_total_damage() {
        // floor(10 * 1.10) = 11
        let research = research_with(&[(TechId::Strength, 5)]);
        let stats = player_stats(&Equipment::new(), &research);
        assert_eq!(stats.damage, 11);
    }

    #[test]
    fn test_health_multi_bonus_applies_to_equipment_only() {
        let mut item = plain_item(EquipmentSlot::Armor, 10); // 100 hp
        item.bonuses = vec![Bonus { key: BonusStat::HealthMulti, value: 10.0 }];
        let mut equipment = Equipment::new();
        equipment.set(EquipmentSlot::Armor, Some(item));

        // 100 base + floor-less 100 * 1.10 = 210
        let stats = player_stats(&equipment, &ResearchState::new());
        assert_eq!(stats.max_hp, 210);
    }

    #[test]
    fn test_swift_strikes_speeds_up_attacks() {
        let base = player_stats(&Equipment::new(), &ResearchState::new());
        let research = research_with(&[(TechId::Strength, 3), (TechId::SwiftStrikes, 1)]);
        let swift = player_stats(&Equipment::new(), &research);
        assert!(swift.attack_speed < base.attack_speed);
        // floor(1500 * 0.97) = 1455
        assert_eq!(swift.attack_speed, 1455);
    }

    #[test]
    fn test_attack_speed_floor() {
        let mut item = plain_item(EquipmentSlot::Weapon, 1);
        // Far more speed than the curve can absorb
        item.bonuses = vec![Bonus { key: BonusStat::AttackSpeed, value: 500.0 }];
        let mut equipment = Equipment::new();
        equipment.set(EquipmentSlot::Weapon, Some(item));

        let research = research_with(&[(TechId::Strength, 3), (TechId::SwiftStrikes, 5)]);
        let stats = player_stats(&equipment, &research);
        assert_eq!(stats.attack_speed, 400);
    }

    #[test]
    fn test_refresh_preserves_hp_ratio() {
        let research = ResearchState::new();
        let mut state = PlayerCombatState::from_stats(player_stats(&Equipment::new(), &research));
        assert_eq!(state.current_hp, 100);

        // Drop to 50%, then gain vitality and refresh
        state.current_hp = 50;
        let boosted = research_with(&[(TechId::Vitality, 10)]); // +20% -> 120 max
        state.refresh(player_stats(&Equipment::new(), &boosted));

        assert_eq!(state.max_hp, 120);
        assert_eq!(state.current_hp, 60); // still 50%
    }

    #[test]
    fn test_refresh_never_exceeds_new_max() {
        // Start on a big pool at full health, then refresh down to bare stats
        let research = research_with(&[(TechId::Vitality, 10)]);
        let mut state = PlayerCombatState::from_stats(player_stats(&Equipment::new(), &research));
        assert_eq!(state.current_hp, 120);

        state.refresh(player_stats(&Equipment::new(), &ResearchState::new()));
        assert_eq!(state.max_hp, 100);
        assert!(state.current_hp <= state.max_hp);
    }

    #[test]
    fn test_win_advances_sub_wave() {
        let research = ResearchState::new();
        assert_eq!(next_position(5, 5, BattleOutcome::Win, &research), (5, 6));
    }

    #[test]
    fn test_win_at_last_sub_wave_advances_wave() {
        let research = ResearchState::new();
        assert_eq!(next_position(3, 10, BattleOutcome::Win, &research), (4, 1));
    }

    #[test]
    fn test_win_at_final_wave_stays() {
        let research = ResearchState::new();
        assert_eq!(next_position(10, 10, BattleOutcome::Win, &research), (10, 10));

        // waveBreaker unlocks further waves
        let extended = research_with(&[(TechId::WaveBreaker, 1)]);
        assert_eq!(next_position(10, 10, BattleOutcome::Win, &extended), (11, 1));
        assert_eq!(next_position(12, 10, BattleOutcome::Win, &extended), (12, 10));
    }

    #[test]
    fn test_loss_retreats_one_sub_wave() {
        let research = ResearchState::new();
        assert_eq!(next_position(5, 5, BattleOutcome::Loss, &research), (5, 4));
    }

    #[test]
    fn test_loss_at_first_sub_wave_stays() {
        let research = ResearchState::new();
        assert_eq!(next_position(5, 1, BattleOutcome::Loss, &research), (5, 1));
        assert_eq!(next_position(1, 1, BattleOutcome::Loss, &research), (1, 1));
    }

    #[test]
    fn test_high_water_mark_survives_retreat() {
        let mut progress = CombatProgress::default();
        progress.set_position(3, 7);
        assert_eq!((progress.highest_wave, progress.highest_sub_wave), (3, 7));

        progress.set_position(3, 6);
        assert_eq!((progress.current_wave, progress.current_sub_wave), (3, 6));
        assert_eq!((progress.highest_wave, progress.highest_sub_wave), (3, 7));
    }

    #[test]
    fn test_high_water_mark_is_lexicographic() {
        let mut progress = CombatProgress::default();
        progress.set_position(2, 9);
        // Wave 3 sub 1 beats wave 2 sub 9
        progress.set_position(3, 1);
        assert_eq!((progress.highest_wave, progress.highest_sub_wave), (3, 1));
    }
}
