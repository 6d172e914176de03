//! Items, equipment and the forge.

pub mod equipment;
pub mod generation;
pub mod types;

pub use equipment::Equipment;
pub use generation::{
    create_item, create_item_with_tier, effective_max_level, forge_item, forge_level_info,
    roll_tier, ForgeLevel, FORGE_LEVELS, MAX_FORGE_LEVEL,
};
pub use types::{tier_info, Bonus, BonusStat, EquipmentSlot, Item, StatKind, TierInfo, MAX_TIER, TIERS};
