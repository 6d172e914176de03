//! Item generation: tier rolling, bonus rolling and the forge action.

use super::equipment::Equipment;
use super::types::{tier_info, Bonus, BonusStat, EquipmentSlot, Item, MAX_TIER};
use crate::constants::{
    FORGE_LEVEL_RANGE, INITIAL_LEVEL_MAX, MASTERWORK_BONUS_LEVELS, MASTERWORK_PROC_CHANCE,
    MAX_LEVEL,
};
use crate::tech::{TechId, ResearchState};
use rand::seq::SliceRandom;
use rand::Rng;

/// One forge level: upgrade cost/time and the tier distribution it unlocks.
#[derive(Debug, Clone)]
pub struct ForgeLevel {
    pub level: u32,
    /// Gold cost to upgrade *to* the next level.
    pub cost: u64,
    /// Upgrade duration in seconds.
    pub time: u64,
    /// Percent chance per tier (Common..Divine); rows sum to 100.
    pub chances: [f64; 7],
}

/// Tier distributions per forge level. Higher levels shift mass toward the
/// high tiers; level 1 is all Common.
pub static FORGE_LEVELS: [ForgeLevel; 30] = [
    ForgeLevel { level: 1, cost: 0, time: 0, chances: [100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 2, cost: 200, time: 60, chances: [97.5, 2.5, 0.0, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 3, cost: 500, time: 180, chances: [95.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 4, cost: 1000, time: 360, chances: [93.0, 6.5, 0.5, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 5, cost: 1800, time: 600, chances: [90.5, 8.0, 1.5, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 6, cost: 3000, time: 1200, chances: [87.5, 10.0, 2.5, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 7, cost: 5000, time: 1800, chances: [84.5, 12.0, 3.5, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 8, cost: 8000, time: 3600, chances: [81.0, 14.0, 5.0, 0.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 9, cost: 12000, time: 5400, chances: [77.5, 15.5, 6.5, 0.5, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 10, cost: 18000, time: 7200, chances: [74.0, 17.0, 8.0, 1.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 11, cost: 27000, time: 14400, chances: [70.0, 18.5, 9.5, 2.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 12, cost: 40000, time: 21600, chances: [66.0, 20.0, 11.0, 3.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 13, cost: 60000, time: 36000, chances: [62.0, 21.0, 12.5, 4.5, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 14, cost: 85000, time: 50400, chances: [58.0, 22.0, 14.0, 6.0, 0.0, 0.0, 0.0] },
    ForgeLevel { level: 15, cost: 120000, time: 72000, chances: [54.0, 22.5, 15.0, 8.0, 0.5, 0.0, 0.0] },
    ForgeLevel { level: 16, cost: 170000, time: 100800, chances: [50.0, 23.0, 16.0, 9.5, 1.5, 0.0, 0.0] },
    ForgeLevel { level: 17, cost: 250000, time: 144000, chances: [46.0, 23.0, 17.0, 11.5, 2.5, 0.0, 0.0] },
    ForgeLevel { level: 18, cost: 360000, time: 201600, chances: [42.0, 22.5, 18.0, 13.5, 4.0, 0.0, 0.0] },
    ForgeLevel { level: 19, cost: 500000, time: 259200, chances: [38.0, 22.0, 19.0, 15.0, 6.0, 0.0, 0.0] },
    ForgeLevel { level: 20, cost: 700000, time: 345600, chances: [34.0, 21.0, 19.5, 17.0, 8.5, 0.0, 0.0] },
    ForgeLevel { level: 21, cost: 1000000, time: 432000, chances: [30.0, 20.0, 20.0, 18.5, 11.0, 0.5, 0.0] },
    ForgeLevel { level: 22, cost: 1400000, time: 518400, chances: [26.0, 19.0, 20.0, 20.0, 14.0, 1.0, 0.0] },
    ForgeLevel { level: 23, cost: 2000000, time: 604800, chances: [22.0, 17.5, 19.5, 21.5, 17.5, 2.0, 0.0] },
    ForgeLevel { level: 24, cost: 2800000, time: 604800, chances: [18.0, 16.0, 19.0, 23.0, 21.0, 3.0, 0.0] },
    ForgeLevel { level: 25, cost: 4000000, time: 604800, chances: [14.5, 14.5, 18.0, 24.0, 24.5, 4.0, 0.5] },
    ForgeLevel { level: 26, cost: 5500000, time: 604800, chances: [11.0, 13.0, 17.0, 24.5, 28.5, 5.5, 0.5] },
    ForgeLevel { level: 27, cost: 7500000, time: 604800, chances: [8.0, 11.0, 15.5, 24.5, 33.0, 7.0, 1.0] },
    ForgeLevel { level: 28, cost: 10000000, time: 604800, chances: [5.0, 9.0, 14.0, 24.0, 38.0, 8.5, 1.5] },
    ForgeLevel { level: 29, cost: 14000000, time: 604800, chances: [2.5, 6.5, 12.0, 22.5, 44.0, 10.5, 2.0] },
    ForgeLevel { level: 30, cost: 20000000, time: 604800, chances: [0.0, 4.0, 10.0, 21.0, 49.0, 13.0, 3.0] },
];

/// Highest forge level.
pub const MAX_FORGE_LEVEL: u32 = 30;

/// Forge level descriptor, clamped into the valid range.
pub fn forge_level_info(forge_level: u32) -> &'static ForgeLevel {
    let index = forge_level.clamp(1, MAX_FORGE_LEVEL) - 1;
    &FORGE_LEVELS[index as usize]
}

/// Rolls an item tier from the forge-level distribution.
///
/// The tierAffinity tech shifts up to 2% per level out of the lowest tier
/// that still has probability mass into the tier above it; total mass is
/// preserved. The result is always in `1..=MAX_TIER`.
pub fn roll_tier(
    forge_level: u32,
    research: &ResearchState,
    rng: &mut impl Rng,
) -> u32 {
    let mut chances = forge_level_info(forge_level).chances;

    let shift = research.tech_effect(TechId::TierAffinity);
    if shift > 0.0 {
        if let Some(lowest) = chances.iter().position(|&c| c > 0.0) {
            if lowest + 1 < chances.len() {
                let moved = shift.min(chances[lowest]);
                chances[lowest] -= moved;
                chances[lowest + 1] += moved;
            }
        }
    }

    let roll: f64 = rng.gen_range(0.0..100.0);
    let mut cumulative = 0.0;
    for (index, chance) in chances.iter().enumerate() {
        cumulative += chance;
        if roll < cumulative {
            return (index + 1) as u32;
        }
    }

    // Float drift on the last band; land on the highest tier with mass
    chances
        .iter()
        .rposition(|&c| c > 0.0)
        .map(|i| (i + 1) as u32)
        .unwrap_or(1)
}

/// Number of bonus slots an item of `tier` rolls, after the extraBonus tech,
/// capped at the number of distinct bonus stats.
fn bonus_slot_count(tier: u32, research: &ResearchState) -> usize {
    let base = tier_info(tier).map_or(0, |t| t.bonus_count);
    let extra = research.tech_level(TechId::ExtraBonus) as usize;
    (base + extra).min(BonusStat::all().len())
}

/// Rolls an item's bonuses: distinct keys, magnitudes scaled by the
/// bonusEnhance tech.
fn roll_bonuses(tier: u32, research: &ResearchState, rng: &mut impl Rng) -> Vec<Bonus> {
    let count = bonus_slot_count(tier, research);
    let enhance = 1.0 + research.tech_effect(TechId::BonusEnhance) / 100.0;

    let keys = BonusStat::all();
    keys.choose_multiple(rng, count)
        .map(|&key| {
            let base = rng.gen_range(1.0..=key.roll_max());
            let value = (base * enhance * 10.0).round() / 10.0;
            Bonus { key, value }
        })
        .collect()
}

/// Creates an item with an explicit tier. Stats are derived from the level
/// and the slot's classification; out-of-range levels are the loader's
/// problem, not ours.
pub fn create_item_with_tier(
    slot: EquipmentSlot,
    level: u32,
    tier: u32,
    research: &ResearchState,
    rng: &mut impl Rng,
) -> Item {
    let tier = tier.clamp(1, MAX_TIER);
    Item {
        slot,
        level,
        tier,
        stats: Item::stats_for_level(slot, level),
        stat_type: slot.stat_kind(),
        bonuses: roll_bonuses(tier, research, rng),
    }
}

/// Creates an item, rolling the tier from the forge-level distribution.
pub fn create_item(
    slot: EquipmentSlot,
    level: u32,
    forge_level: u32,
    research: &ResearchState,
    rng: &mut impl Rng,
) -> Item {
    let tier = roll_tier(forge_level, research, rng);
    create_item_with_tier(slot, level, tier, research, rng)
}

/// Max item level for a slot: the base cap plus the slot's own mastery tech.
/// Masteries never cross-affect other slots.
pub fn effective_max_level(slot: EquipmentSlot, research: &ResearchState) -> u32 {
    MAX_LEVEL + research.tech_effect(TechId::mastery_for_slot(slot)) as u32
}

/// One forge action: a random slot, a level near the currently equipped item
/// (or a starter level for an empty slot), a rolled tier, and a masterwork
/// proc when that tech is researched.
pub fn forge_item(
    equipment: &Equipment,
    forge_level: u32,
    research: &ResearchState,
    rng: &mut impl Rng,
) -> Item {
    let slots = EquipmentSlot::all();
    let slot = slots[rng.gen_range(0..slots.len())];
    let max_level = effective_max_level(slot, research);

    let mut level = match equipment.get(slot) {
        Some(current) => {
            let min = current.level.saturating_sub(FORGE_LEVEL_RANGE).max(1);
            let max = (current.level + FORGE_LEVEL_RANGE).min(max_level).max(min);
            rng.gen_range(min..=max)
        }
        None => rng.gen_range(1..=INITIAL_LEVEL_MAX),
    };

    if research.tech_level(TechId::Masterwork) >= 1 && rng.gen_bool(MASTERWORK_PROC_CHANCE) {
        level = (level + MASTERWORK_BONUS_LEVELS).min(max_level);
    }

    create_item(slot, level, forge_level, research, rng)
}
