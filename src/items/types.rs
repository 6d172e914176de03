use crate::constants::{DAMAGE_PER_LEVEL, HEALTH_PER_LEVEL};
use serde::{Deserialize, Serialize};

/// The eight fixed equipment slots. The first four grant health, the rest
/// grant damage; an item's stat classification follows from its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentSlot {
    Hat,
    Armor,
    Belt,
    Boots,
    Gloves,
    Necklace,
    Ring,
    Weapon,
}

impl EquipmentSlot {
    /// All slots, in display order.
    pub fn all() -> [EquipmentSlot; 8] {
        [
            EquipmentSlot::Hat,
            EquipmentSlot::Armor,
            EquipmentSlot::Belt,
            EquipmentSlot::Boots,
            EquipmentSlot::Gloves,
            EquipmentSlot::Necklace,
            EquipmentSlot::Ring,
            EquipmentSlot::Weapon,
        ]
    }

    /// The stat classification this slot grants.
    pub fn stat_kind(&self) -> StatKind {
        match self {
            EquipmentSlot::Hat
            | EquipmentSlot::Armor
            | EquipmentSlot::Belt
            | EquipmentSlot::Boots => StatKind::Health,
            EquipmentSlot::Gloves
            | EquipmentSlot::Necklace
            | EquipmentSlot::Ring
            | EquipmentSlot::Weapon => StatKind::Damage,
        }
    }

    /// Stat points granted per item level on this slot.
    pub fn stats_per_level(&self) -> u32 {
        match self.stat_kind() {
            StatKind::Health => HEALTH_PER_LEVEL,
            StatKind::Damage => DAMAGE_PER_LEVEL,
        }
    }

    /// Wire key used in the persisted equipment map.
    pub fn key(&self) -> &'static str {
        match self {
            EquipmentSlot::Hat => "hat",
            EquipmentSlot::Armor => "armor",
            EquipmentSlot::Belt => "belt",
            EquipmentSlot::Boots => "boots",
            EquipmentSlot::Gloves => "gloves",
            EquipmentSlot::Necklace => "necklace",
            EquipmentSlot::Ring => "ring",
            EquipmentSlot::Weapon => "weapon",
        }
    }

    /// Parses a wire key back into a slot.
    pub fn from_key(key: &str) -> Option<EquipmentSlot> {
        EquipmentSlot::all().into_iter().find(|s| s.key() == key)
    }
}

/// Whether an item contributes to the player's health pool or damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Health,
    Damage,
}

/// Tier descriptor: display data plus the number of bonus slots the tier
/// grants before techs.
#[derive(Debug, Clone, Copy)]
pub struct TierInfo {
    pub id: u32,
    pub name: &'static str,
    pub color: &'static str,
    pub bonus_count: usize,
}

/// The seven item tiers, lowest to highest.
pub static TIERS: [TierInfo; 7] = [
    TierInfo { id: 1, name: "Common", color: "#9d9d9d", bonus_count: 0 },
    TierInfo { id: 2, name: "Uncommon", color: "#4F772D", bonus_count: 1 },
    TierInfo { id: 3, name: "Rare", color: "#4A7FB5", bonus_count: 1 },
    TierInfo { id: 4, name: "Epic", color: "#7B5EA7", bonus_count: 1 },
    TierInfo { id: 5, name: "Legendary", color: "#C4822B", bonus_count: 2 },
    TierInfo { id: 6, name: "Mythic", color: "#A63D3D", bonus_count: 2 },
    TierInfo { id: 7, name: "Divine", color: "#C9A84C", bonus_count: 3 },
];

/// Highest tier id.
pub const MAX_TIER: u32 = 7;

/// Looks up a tier descriptor by 1-based id.
pub fn tier_info(tier: u32) -> Option<&'static TierInfo> {
    TIERS.get(tier.checked_sub(1)? as usize)
}

/// Secondary stats an item bonus can roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusStat {
    AttackSpeed,
    CritChance,
    CritMultiplier,
    HealthMulti,
    DamageMulti,
    HealthRegen,
    LifeSteal,
}

impl BonusStat {
    /// All bonus stats; an item never rolls the same key twice.
    pub fn all() -> [BonusStat; 7] {
        [
            BonusStat::AttackSpeed,
            BonusStat::CritChance,
            BonusStat::CritMultiplier,
            BonusStat::HealthMulti,
            BonusStat::DamageMulti,
            BonusStat::HealthRegen,
            BonusStat::LifeSteal,
        ]
    }

    /// Highest value a single roll of this bonus can reach before techs
    /// (percent units).
    pub fn roll_max(&self) -> f64 {
        match self {
            BonusStat::AttackSpeed => 15.0,
            BonusStat::CritChance => 10.0,
            BonusStat::CritMultiplier => 20.0,
            BonusStat::HealthMulti => 12.0,
            BonusStat::DamageMulti => 12.0,
            BonusStat::HealthRegen => 5.0,
            BonusStat::LifeSteal => 8.0,
        }
    }

    /// Wire key used in persisted bonus entries.
    pub fn key(&self) -> &'static str {
        match self {
            BonusStat::AttackSpeed => "attackSpeed",
            BonusStat::CritChance => "critChance",
            BonusStat::CritMultiplier => "critMultiplier",
            BonusStat::HealthMulti => "healthMulti",
            BonusStat::DamageMulti => "damageMulti",
            BonusStat::HealthRegen => "healthRegen",
            BonusStat::LifeSteal => "lifeSteal",
        }
    }

    /// Parses a wire key back into a bonus stat.
    pub fn from_key(key: &str) -> Option<BonusStat> {
        BonusStat::all().into_iter().find(|s| s.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BonusStat::AttackSpeed => "Attack Speed",
            BonusStat::CritChance => "Crit Chance",
            BonusStat::CritMultiplier => "Crit Multiplier",
            BonusStat::HealthMulti => "Health Multi",
            BonusStat::DamageMulti => "Damage Multi",
            BonusStat::HealthRegen => "Health Regen",
            BonusStat::LifeSteal => "Life Steal",
        }
    }
}

/// A rolled secondary stat on an item (percent units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    pub key: BonusStat,
    pub value: f64,
}

/// A piece of equipment. Created by the forge, ephemeral until equipped.
///
/// `stats` is derived from `level` and the slot classification and is
/// recomputed on load, never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub slot: EquipmentSlot,
    pub level: u32,
    pub tier: u32,
    pub stats: u32,
    #[serde(rename = "statType")]
    pub stat_type: StatKind,
    pub bonuses: Vec<Bonus>,
}

impl Item {
    /// Derived stat value for a level on a given slot.
    pub fn stats_for_level(slot: EquipmentSlot, level: u32) -> u32 {
        level * slot.stats_per_level()
    }

    /// Recomputes the derived `stats` field from `level` and slot.
    pub fn recalculate_stats(&mut self) {
        self.stats = Item::stats_for_level(self.slot, self.level);
    }
}
