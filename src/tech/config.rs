//! Static tech tree definitions.
//!
//! Each node carries its branch, level cap, exponential cost/time formulas
//! and prerequisites. `requires` entries must all be met; when
//! `alt_requires` is non-empty, meeting any single one of those unlocks the
//! node as well.

use crate::items::types::EquipmentSlot;
use serde::{Deserialize, Serialize};

/// Identifier for a researchable technology. Serialized as its camelCase
/// wire key in the persisted research map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TechId {
    // Forge
    ForgeMultiple,
    QuickForge,
    TierAffinity,
    SelectiveForge,
    MasterSmith,
    // Equipment (one mastery per slot)
    HatMastery,
    ArmorMastery,
    BeltMastery,
    BootsMastery,
    GlovesMastery,
    NecklaceMastery,
    RingMastery,
    WeaponMastery,
    BonusEnhance,
    ExtraBonus,
    Masterwork,
    // Combat
    Vitality,
    Strength,
    SwiftStrikes,
    WaveBreaker,
    #[serde(rename = "battleXP")]
    BattleXp,
    // Economy
    GoldRush,
    EssenceStudy,
    TreasureHunter,
    EssenceResonance,
    // Automation
    SmartFilter,
    AutoEquip,
    AutoStudy,
    ResearchQueue,
}

/// Tech tree branch, for grouping in the research view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechBranch {
    Forge,
    Equipment,
    Combat,
    Economy,
    Automation,
}

/// A prerequisite on another tech reaching a minimum level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechRequirement {
    pub tech: TechId,
    pub level: u32,
}

/// Static definition of one researchable technology.
#[derive(Debug, Clone)]
pub struct TechNode {
    pub id: TechId,
    pub name: &'static str,
    pub icon: &'static str,
    pub branch: TechBranch,
    pub max_level: u32,
    /// Essence cost for level 1; scales as base_cost * cost_scale^(level-1).
    pub base_cost: u64,
    pub cost_scale: f64,
    /// Research duration in seconds for level 1; scales like cost.
    pub base_time: u64,
    pub time_scale: f64,
    /// All of these must be met.
    pub requires: &'static [TechRequirement],
    /// Meeting any single one of these also unlocks the node.
    pub alt_requires: &'static [TechRequirement],
    /// Effect magnitude gained per researched level.
    pub effect_per_level: f64,
}

const fn req(tech: TechId, level: u32) -> TechRequirement {
    TechRequirement { tech, level }
}

macro_rules! mastery_node {
    ($id:expr, $name:expr, $icon:expr) => {
        TechNode {
            id: $id,
            name: $name,
            icon: $icon,
            branch: TechBranch::Equipment,
            max_level: 25,
            base_cost: 15,
            cost_scale: 1.18,
            base_time: 30,
            time_scale: 1.12,
            requires: &[],
            alt_requires: &[],
            effect_per_level: 2.0,
        }
    };
}

/// Every researchable technology in the game.
pub static TECHS: [TechNode; 29] = [
    // ── Forge ───────────────────────────────────────────────
    TechNode {
        id: TechId::ForgeMultiple,
        name: "Multi-Forge",
        icon: "🔨",
        branch: TechBranch::Forge,
        max_level: 5,
        base_cost: 500,
        cost_scale: 3.0,
        base_time: 300,
        time_scale: 3.0,
        requires: &[],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    TechNode {
        id: TechId::QuickForge,
        name: "Quick Forge",
        icon: "⚡",
        branch: TechBranch::Forge,
        max_level: 3,
        base_cost: 250,
        cost_scale: 3.0,
        base_time: 360,
        time_scale: 3.0,
        requires: &[req(TechId::ForgeMultiple, 1)],
        alt_requires: &[],
        effect_per_level: 10.0,
    },
    TechNode {
        id: TechId::TierAffinity,
        name: "Tier Affinity",
        icon: "✨",
        branch: TechBranch::Forge,
        max_level: 3,
        base_cost: 400,
        cost_scale: 3.0,
        base_time: 600,
        time_scale: 3.0,
        requires: &[req(TechId::ForgeMultiple, 2)],
        alt_requires: &[],
        effect_per_level: 2.0,
    },
    TechNode {
        id: TechId::SelectiveForge,
        name: "Selective Forge",
        icon: "🎯",
        branch: TechBranch::Forge,
        max_level: 2,
        base_cost: 800,
        cost_scale: 4.0,
        base_time: 900,
        time_scale: 4.0,
        requires: &[req(TechId::ForgeMultiple, 3)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    TechNode {
        id: TechId::MasterSmith,
        name: "Master Smith",
        icon: "👑",
        branch: TechBranch::Forge,
        max_level: 1,
        base_cost: 8000,
        cost_scale: 1.0,
        base_time: 7200,
        time_scale: 1.0,
        requires: &[req(TechId::TierAffinity, 3)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    // ── Equipment ───────────────────────────────────────────
    mastery_node!(TechId::HatMastery, "Mastery: Hat", "🎩"),
    mastery_node!(TechId::ArmorMastery, "Mastery: Armor", "🛡️"),
    mastery_node!(TechId::BeltMastery, "Mastery: Belt", "📿"),
    mastery_node!(TechId::BootsMastery, "Mastery: Boots", "👢"),
    mastery_node!(TechId::GlovesMastery, "Mastery: Gloves", "🧤"),
    mastery_node!(TechId::NecklaceMastery, "Mastery: Necklace", "📿"),
    mastery_node!(TechId::RingMastery, "Mastery: Ring", "💍"),
    mastery_node!(TechId::WeaponMastery, "Mastery: Weapon", "⚔️"),
    TechNode {
        id: TechId::BonusEnhance,
        name: "Enhanced Bonuses",
        icon: "💎",
        branch: TechBranch::Equipment,
        max_level: 5,
        base_cost: 300,
        cost_scale: 2.5,
        base_time: 480,
        time_scale: 2.5,
        requires: &[req(TechId::HatMastery, 5)],
        alt_requires: &[
            req(TechId::ArmorMastery, 5),
            req(TechId::BeltMastery, 5),
            req(TechId::BootsMastery, 5),
            req(TechId::GlovesMastery, 5),
            req(TechId::NecklaceMastery, 5),
            req(TechId::RingMastery, 5),
            req(TechId::WeaponMastery, 5),
        ],
        effect_per_level: 8.0,
    },
    TechNode {
        id: TechId::ExtraBonus,
        name: "Extra Bonus",
        icon: "🌟",
        branch: TechBranch::Equipment,
        max_level: 3,
        base_cost: 12000,
        cost_scale: 1.0,
        base_time: 14400,
        time_scale: 1.0,
        requires: &[req(TechId::BonusEnhance, 5), req(TechId::Masterwork, 1)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    TechNode {
        id: TechId::Masterwork,
        name: "Masterwork",
        icon: "🏆",
        branch: TechBranch::Equipment,
        max_level: 1,
        base_cost: 6000,
        cost_scale: 1.0,
        base_time: 7200,
        time_scale: 1.0,
        requires: &[req(TechId::HatMastery, 10), req(TechId::WeaponMastery, 10)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    // ── Combat ──────────────────────────────────────────────
    TechNode {
        id: TechId::Vitality,
        name: "Vitality",
        icon: "❤️",
        branch: TechBranch::Combat,
        max_level: 10,
        base_cost: 20,
        cost_scale: 1.4,
        base_time: 60,
        time_scale: 1.3,
        requires: &[],
        alt_requires: &[],
        effect_per_level: 2.0,
    },
    TechNode {
        id: TechId::Strength,
        name: "Strength",
        icon: "💪",
        branch: TechBranch::Combat,
        max_level: 10,
        base_cost: 20,
        cost_scale: 1.4,
        base_time: 60,
        time_scale: 1.3,
        requires: &[],
        alt_requires: &[],
        effect_per_level: 2.0,
    },
    TechNode {
        id: TechId::SwiftStrikes,
        name: "Swift Strikes",
        icon: "⚡",
        branch: TechBranch::Combat,
        max_level: 5,
        base_cost: 200,
        cost_scale: 2.5,
        base_time: 600,
        time_scale: 2.5,
        requires: &[req(TechId::Strength, 3)],
        alt_requires: &[],
        effect_per_level: 3.0,
    },
    TechNode {
        id: TechId::WaveBreaker,
        name: "Wave Breaker",
        icon: "🌊",
        branch: TechBranch::Combat,
        max_level: 5,
        base_cost: 400,
        cost_scale: 2.0,
        base_time: 1200,
        time_scale: 2.0,
        requires: &[req(TechId::Vitality, 3), req(TechId::Strength, 3)],
        alt_requires: &[],
        effect_per_level: 2.0,
    },
    TechNode {
        id: TechId::BattleXp,
        name: "Battle Experience",
        icon: "📖",
        branch: TechBranch::Combat,
        max_level: 5,
        base_cost: 150,
        cost_scale: 2.0,
        base_time: 300,
        time_scale: 2.0,
        requires: &[req(TechId::WaveBreaker, 1)],
        alt_requires: &[],
        effect_per_level: 10.0,
    },
    // ── Economy ─────────────────────────────────────────────
    TechNode {
        id: TechId::GoldRush,
        name: "Gold Rush",
        icon: "💰",
        branch: TechBranch::Economy,
        max_level: 25,
        base_cost: 10,
        cost_scale: 1.15,
        base_time: 30,
        time_scale: 1.1,
        requires: &[],
        alt_requires: &[],
        effect_per_level: 20.0,
    },
    TechNode {
        id: TechId::EssenceStudy,
        name: "Forge Essence",
        icon: "🔮",
        branch: TechBranch::Economy,
        max_level: 25,
        base_cost: 15,
        cost_scale: 1.15,
        base_time: 45,
        time_scale: 1.1,
        requires: &[req(TechId::GoldRush, 5)],
        alt_requires: &[],
        effect_per_level: 2.0,
    },
    TechNode {
        id: TechId::TreasureHunter,
        name: "Treasure Hunter",
        icon: "🗝️",
        branch: TechBranch::Economy,
        max_level: 3,
        base_cost: 500,
        cost_scale: 3.0,
        base_time: 900,
        time_scale: 3.0,
        requires: &[req(TechId::GoldRush, 10)],
        alt_requires: &[],
        effect_per_level: 5.0,
    },
    TechNode {
        id: TechId::EssenceResonance,
        name: "Essence Resonance",
        icon: "💠",
        branch: TechBranch::Economy,
        max_level: 3,
        base_cost: 600,
        cost_scale: 3.0,
        base_time: 1200,
        time_scale: 3.0,
        requires: &[req(TechId::EssenceStudy, 5)],
        alt_requires: &[],
        effect_per_level: 15.0,
    },
    // ── Automation ──────────────────────────────────────────
    TechNode {
        id: TechId::SmartFilter,
        name: "Smart Filter",
        icon: "🧠",
        branch: TechBranch::Automation,
        max_level: 3,
        base_cost: 1500,
        cost_scale: 4.0,
        base_time: 1800,
        time_scale: 4.0,
        requires: &[req(TechId::ForgeMultiple, 2), req(TechId::GoldRush, 5)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    TechNode {
        id: TechId::AutoEquip,
        name: "Auto-Equip",
        icon: "🔄",
        branch: TechBranch::Automation,
        max_level: 1,
        base_cost: 8000,
        cost_scale: 1.0,
        base_time: 7200,
        time_scale: 1.0,
        requires: &[req(TechId::SmartFilter, 3), req(TechId::ForgeMultiple, 3)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    TechNode {
        id: TechId::AutoStudy,
        name: "Auto-Study",
        icon: "📚",
        branch: TechBranch::Automation,
        max_level: 1,
        base_cost: 5000,
        cost_scale: 1.0,
        base_time: 5400,
        time_scale: 1.0,
        requires: &[req(TechId::SmartFilter, 1)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
    TechNode {
        id: TechId::ResearchQueue,
        name: "Research Queue",
        icon: "📋",
        branch: TechBranch::Automation,
        max_level: 3,
        base_cost: 2000,
        cost_scale: 4.0,
        base_time: 2400,
        time_scale: 4.0,
        requires: &[req(TechId::SmartFilter, 1), req(TechId::EssenceStudy, 3)],
        alt_requires: &[],
        effect_per_level: 1.0,
    },
];

impl TechId {
    /// Looks up this tech's static definition.
    pub fn node(&self) -> &'static TechNode {
        // TECHS contains every TechId variant exactly once
        TECHS
            .iter()
            .find(|n| n.id == *self)
            .unwrap_or_else(|| unreachable!())
    }

    /// Wire key used in the persisted research map.
    pub fn key(&self) -> &'static str {
        match self {
            TechId::ForgeMultiple => "forgeMultiple",
            TechId::QuickForge => "quickForge",
            TechId::TierAffinity => "tierAffinity",
            TechId::SelectiveForge => "selectiveForge",
            TechId::MasterSmith => "masterSmith",
            TechId::HatMastery => "hatMastery",
            TechId::ArmorMastery => "armorMastery",
            TechId::BeltMastery => "beltMastery",
            TechId::BootsMastery => "bootsMastery",
            TechId::GlovesMastery => "glovesMastery",
            TechId::NecklaceMastery => "necklaceMastery",
            TechId::RingMastery => "ringMastery",
            TechId::WeaponMastery => "weaponMastery",
            TechId::BonusEnhance => "bonusEnhance",
            TechId::ExtraBonus => "extraBonus",
            TechId::Masterwork => "masterwork",
            TechId::Vitality => "vitality",
            TechId::Strength => "strength",
            TechId::SwiftStrikes => "swiftStrikes",
            TechId::WaveBreaker => "waveBreaker",
            TechId::BattleXp => "battleXP",
            TechId::GoldRush => "goldRush",
            TechId::EssenceStudy => "essenceStudy",
            TechId::TreasureHunter => "treasureHunter",
            TechId::EssenceResonance => "essenceResonance",
            TechId::SmartFilter => "smartFilter",
            TechId::AutoEquip => "autoEquip",
            TechId::AutoStudy => "autoStudy",
            TechId::ResearchQueue => "researchQueue",
        }
    }

    /// Parses a wire key; `None` for ids unknown to this build.
    pub fn from_key(key: &str) -> Option<TechId> {
        TECHS.iter().map(|n| n.id).find(|id| id.key() == key)
    }

    /// The mastery tech governing a slot's max item level.
    pub fn mastery_for_slot(slot: EquipmentSlot) -> TechId {
        match slot {
            EquipmentSlot::Hat => TechId::HatMastery,
            EquipmentSlot::Armor => TechId::ArmorMastery,
            EquipmentSlot::Belt => TechId::BeltMastery,
            EquipmentSlot::Boots => TechId::BootsMastery,
            EquipmentSlot::Gloves => TechId::GlovesMastery,
            EquipmentSlot::Necklace => TechId::NecklaceMastery,
            EquipmentSlot::Ring => TechId::RingMastery,
            EquipmentSlot::Weapon => TechId::WeaponMastery,
        }
    }
}

/// Essence cost for researching `tech` to `level` (1-based, before
/// discounts).
pub fn research_cost(tech: TechId, level: u32) -> u64 {
    let node = tech.node();
    (node.base_cost as f64 * node.cost_scale.powi(level.saturating_sub(1) as i32)).floor() as u64
}

/// Research duration in seconds for `tech` at `level` (1-based).
pub fn research_time(tech: TechId, level: u32) -> u64 {
    let node = tech.node();
    (node.base_time as f64 * node.time_scale.powi(level.saturating_sub(1) as i32)).floor() as u64
}
