use super::types::{EquipmentSlot, Item};
use serde::{Deserialize, Serialize};

/// The player's worn equipment: at most one item per slot, and each slot
/// only ever holds an item forged for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub hat: Option<Item>,
    pub armor: Option<Item>,
    pub belt: Option<Item>,
    pub boots: Option<Item>,
    pub gloves: Option<Item>,
    pub necklace: Option<Item>,
    pub ring: Option<Item>,
    pub weapon: Option<Item>,
}

impl Equipment {
    pub fn new() -> Self {
        Self {
            hat: None,
            armor: None,
            belt: None,
            boots: None,
            gloves: None,
            necklace: None,
            ring: None,
            weapon: None,
        }
    }

    pub fn get(&self, slot: EquipmentSlot) -> &Option<Item> {
        match slot {
            EquipmentSlot::Hat => &self.hat,
            EquipmentSlot::Armor => &self.armor,
            EquipmentSlot::Belt => &self.belt,
            EquipmentSlot::Boots => &self.boots,
            EquipmentSlot::Gloves => &self.gloves,
            EquipmentSlot::Necklace => &self.necklace,
            EquipmentSlot::Ring => &self.ring,
            EquipmentSlot::Weapon => &self.weapon,
        }
    }

    pub fn set(&mut self, slot: EquipmentSlot, item: Option<Item>) {
        match slot {
            EquipmentSlot::Hat => self.hat = item,
            EquipmentSlot::Armor => self.armor = item,
            EquipmentSlot::Belt => self.belt = item,
            EquipmentSlot::Boots => self.boots = item,
            EquipmentSlot::Gloves => self.gloves = item,
            EquipmentSlot::Necklace => self.necklace = item,
            EquipmentSlot::Ring => self.ring = item,
            EquipmentSlot::Weapon => self.weapon = item,
        }
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = &Item> {
        [
            &self.hat,
            &self.armor,
            &self.belt,
            &self.boots,
            &self.gloves,
            &self.necklace,
            &self.ring,
            &self.weapon,
        ]
        .into_iter()
        .filter_map(|item| item.as_ref())
    }
}

impl Default for Equipment {
    fn default() -> Self {
        Self::new()
    }
}
