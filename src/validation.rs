//! Defensive validation of persisted state.
//!
//! One consolidated pass turns a raw JSON value into a `GameState`: every
//! field is checked before assignment, anything malformed is dropped with a
//! recorded reason and replaced by its default, and the pass itself never
//! fails. Tech levels beyond a node's cap are discarded entirely, never
//! clamped; negative currency balances clamp to zero.

use crate::combat::{max_wave_count, CombatProgress};
use crate::constants::SUB_WAVE_COUNT;
use crate::game_state::{ForgeUpgrade, GameState, PlayerProgress};
use crate::items::generation::MAX_FORGE_LEVEL;
use crate::items::{
    effective_max_level, Bonus, BonusStat, Equipment, EquipmentSlot, Item, MAX_TIER,
};
use crate::tech::{ActiveResearch, PendingResearch, ResearchState, TechId};
use serde_json::Value;

/// Why a persisted field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Wrong type, missing required sub-field, or unparsable structure.
    Malformed,
    /// A numeric field outside its legal range.
    OutOfRange,
    /// Negative balance clamped to zero.
    NegativeClamped,
    /// A tech id this build does not know.
    UnknownTech,
    /// A completed tech level above the node's max.
    OverMaxLevel,
    /// Item data inconsistent with its slot.
    SlotMismatch,
}

/// One dropped field and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub field: String,
    pub reason: RejectReason,
}

/// The accepted state plus everything that was dropped on the way.
#[derive(Debug)]
pub struct LoadOutcome {
    pub state: GameState,
    pub rejections: Vec<Rejection>,
}

impl LoadOutcome {
    fn reject(&mut self, field: impl Into<String>, reason: RejectReason) {
        let field = field.into();
        tracing::warn!(field = %field, ?reason, "dropping invalid persisted field");
        self.rejections.push(Rejection { field, reason });
    }
}

/// Validates a parsed save payload into a `GameState`.
///
/// Field order matters: research is validated first so the equipment pass
/// can check item levels against mastery-extended caps, and the combat pass
/// can bound waves by waveBreaker.
pub fn validate_loaded(value: &Value) -> LoadOutcome {
    let mut outcome = LoadOutcome {
        state: GameState::new(),
        rejections: Vec::new(),
    };

    let Some(root) = value.as_object() else {
        outcome.reject("$", RejectReason::Malformed);
        return outcome;
    };

    // ── Research ────────────────────────────────────────────
    if let Some(research) = root.get("research") {
        outcome.state.research = validate_research(research, &mut outcome);
    }

    // ── Currencies ──────────────────────────────────────────
    outcome.state.gold = validate_balance(root.get("gold"), "gold", &mut outcome);
    outcome.state.essence = validate_balance(root.get("essence"), "essence", &mut outcome);

    // ── Forge level & upgrade ───────────────────────────────
    if let Some(value) = root.get("forgeLevel") {
        match value.as_u64() {
            Some(level) if (1..=MAX_FORGE_LEVEL as u64).contains(&level) => {
                outcome.state.forge_level = level as u32;
            }
            _ => outcome.reject("forgeLevel", RejectReason::OutOfRange),
        }
    }
    if let Some(value) = root.get("forgeUpgrade") {
        if !value.is_null() {
            match validate_forge_upgrade(value) {
                Some(upgrade) => outcome.state.forge_upgrade = Some(upgrade),
                None => outcome.reject("forgeUpgrade", RejectReason::Malformed),
            }
        }
    }

    // ── Player progress ─────────────────────────────────────
    if let Some(player) = root.get("player") {
        outcome.state.player = validate_player(player, &mut outcome);
    }

    // ── Equipment ───────────────────────────────────────────
    let research = outcome.state.research.clone();
    if let Some(equipment) = root.get("equipment").and_then(Value::as_object) {
        let mut loaded = Equipment::new();
        for slot in EquipmentSlot::all() {
            let Some(raw) = equipment.get(slot.key()) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }
            match validate_item(raw, slot, &research) {
                Ok(item) => loaded.set(slot, Some(item)),
                Err(reason) => outcome.reject(format!("equipment.{}", slot.key()), reason),
            }
        }
        outcome.state.equipment = loaded;
    } else if root.contains_key("equipment") {
        outcome.reject("equipment", RejectReason::Malformed);
    }

    // ── Combat progress ─────────────────────────────────────
    if let Some(combat) = root.get("combat") {
        outcome.state.combat = validate_combat(combat, &research, &mut outcome);
    }

    outcome
}

fn validate_balance(value: Option<&Value>, field: &str, outcome: &mut LoadOutcome) -> u64 {
    match value {
        None => 0,
        Some(value) => match value.as_f64() {
            Some(amount) if amount >= 0.0 => amount.floor() as u64,
            Some(_) => {
                outcome.reject(field, RejectReason::NegativeClamped);
                0
            }
            None => {
                outcome.reject(field, RejectReason::Malformed);
                0
            }
        },
    }
}

fn validate_forge_upgrade(value: &Value) -> Option<ForgeUpgrade> {
    let object = value.as_object()?;
    let target_level = object.get("targetLevel")?.as_u64()?;
    let started_at = object.get("startedAt")?.as_i64()?;
    let duration = object.get("duration")?.as_u64()?;
    if !(2..=MAX_FORGE_LEVEL as u64).contains(&target_level) {
        return None;
    }
    Some(ForgeUpgrade {
        target_level: target_level as u32,
        started_at,
        duration,
    })
}

fn validate_player(value: &Value, outcome: &mut LoadOutcome) -> PlayerProgress {
    let mut player = PlayerProgress::default();
    let Some(object) = value.as_object() else {
        outcome.reject("player", RejectReason::Malformed);
        return player;
    };
    if let Some(level) = object.get("level") {
        match level.as_u64() {
            Some(level) if (1..=crate::constants::MAX_PLAYER_LEVEL as u64).contains(&level) => {
                player.level = level as u32;
            }
            _ => outcome.reject("player.level", RejectReason::OutOfRange),
        }
    }
    if let Some(xp) = object.get("xp") {
        match xp.as_u64() {
            Some(xp) => player.xp = xp,
            None => outcome.reject("player.xp", RejectReason::OutOfRange),
        }
    }
    player
}

/// Validates one persisted item for `slot`. The item's declared slot and
/// stat type must both agree with the slot it is stored under; `stats` is
/// rederived rather than trusted. A missing tier means a legacy item and
/// defaults to 1.
fn validate_item(
    value: &Value,
    slot: EquipmentSlot,
    research: &ResearchState,
) -> Result<Item, RejectReason> {
    let object = value.as_object().ok_or(RejectReason::Malformed)?;

    let declared = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(EquipmentSlot::from_key)
        .ok_or(RejectReason::Malformed)?;
    if declared != slot {
        return Err(RejectReason::SlotMismatch);
    }

    let stat_type = object
        .get("statType")
        .and_then(Value::as_str)
        .ok_or(RejectReason::Malformed)?;
    let expected = match slot.stat_kind() {
        crate::items::StatKind::Health => "health",
        crate::items::StatKind::Damage => "damage",
    };
    if stat_type != expected {
        return Err(RejectReason::SlotMismatch);
    }

    let level = object
        .get("level")
        .and_then(Value::as_u64)
        .ok_or(RejectReason::Malformed)?;
    if level < 1 || level > effective_max_level(slot, research) as u64 {
        return Err(RejectReason::OutOfRange);
    }

    let tier = match object.get("tier") {
        None => 1,
        Some(tier) => {
            let tier = tier.as_u64().ok_or(RejectReason::Malformed)?;
            if !(1..=MAX_TIER as u64).contains(&tier) {
                return Err(RejectReason::OutOfRange);
            }
            tier as u32
        }
    };

    let mut bonuses = Vec::new();
    if let Some(raw_bonuses) = object.get("bonuses") {
        let list = raw_bonuses.as_array().ok_or(RejectReason::Malformed)?;
        for raw in list {
            let bonus = raw.as_object().ok_or(RejectReason::Malformed)?;
            let key = bonus
                .get("key")
                .and_then(Value::as_str)
                .and_then(BonusStat::from_key)
                .ok_or(RejectReason::Malformed)?;
            let value = bonus
                .get("value")
                .and_then(Value::as_f64)
                .ok_or(RejectReason::Malformed)?;
            if value < 0.0 {
                return Err(RejectReason::OutOfRange);
            }
            bonuses.push(Bonus { key, value });
        }
    }

    let mut item = Item {
        slot,
        level: level as u32,
        tier,
        stats: 0,
        stat_type: slot.stat_kind(),
        bonuses,
    };
    item.recalculate_stats();
    Ok(item)
}

fn validate_research(value: &Value, outcome: &mut LoadOutcome) -> ResearchState {
    let mut research = ResearchState::new();
    let Some(object) = value.as_object() else {
        outcome.reject("research", RejectReason::Malformed);
        return research;
    };

    if let Some(completed) = object.get("completed").and_then(Value::as_object) {
        for (key, level) in completed {
            let Some(tech) = TechId::from_key(key) else {
                outcome.reject(format!("research.completed.{key}"), RejectReason::UnknownTech);
                continue;
            };
            let Some(level) = level.as_u64() else {
                outcome.reject(format!("research.completed.{key}"), RejectReason::Malformed);
                continue;
            };
            if level == 0 {
                continue;
            }
            // Over-cap levels are dropped entirely, never clamped
            if level > tech.node().max_level as u64 {
                outcome.reject(format!("research.completed.{key}"), RejectReason::OverMaxLevel);
                continue;
            }
            research.completed.insert(tech, level as u32);
        }
    }

    if let Some(active) = object.get("active") {
        if !active.is_null() {
            match validate_active(active, &research) {
                Some(entry) => research.active = Some(entry),
                None => outcome.reject("research.active", RejectReason::Malformed),
            }
        }
    }

    if let Some(queue) = object.get("queue").and_then(Value::as_array) {
        for (index, raw) in queue.iter().enumerate() {
            match validate_pending(raw, &research) {
                Some(entry) => research.queue.push_back(entry),
                None => outcome.reject(format!("research.queue[{index}]"), RejectReason::Malformed),
            }
        }
    }

    research
}

fn validate_active(value: &Value, research: &ResearchState) -> Option<ActiveResearch> {
    let object = value.as_object()?;
    let tech = object
        .get("techId")
        .and_then(Value::as_str)
        .and_then(TechId::from_key)?;
    let level = object.get("level")?.as_u64()?;
    let started_at = object.get("startedAt")?.as_i64()?;
    let duration = object.get("duration")?.as_u64()?;
    if level < 1 || level > tech.node().max_level as u64 || level <= research.tech_level(tech) as u64
    {
        return None;
    }
    Some(ActiveResearch {
        tech,
        level: level as u32,
        started_at,
        duration,
    })
}

fn validate_pending(value: &Value, research: &ResearchState) -> Option<PendingResearch> {
    let object = value.as_object()?;
    let tech = object
        .get("techId")
        .and_then(Value::as_str)
        .and_then(TechId::from_key)?;
    let level = object.get("level")?.as_u64()?;
    let duration = object.get("duration")?.as_u64()?;
    if level < 1 || level > tech.node().max_level as u64 || level <= research.tech_level(tech) as u64
    {
        return None;
    }
    Some(PendingResearch {
        tech,
        level: level as u32,
        duration,
    })
}

fn validate_combat(
    value: &Value,
    research: &ResearchState,
    outcome: &mut LoadOutcome,
) -> CombatProgress {
    let mut combat = CombatProgress::default();
    let Some(object) = value.as_object() else {
        outcome.reject("combat", RejectReason::Malformed);
        return combat;
    };

    let max_wave = max_wave_count(research) as u64;
    let mut read = |field: &str, max: u64, outcome: &mut LoadOutcome| -> Option<u32> {
        let value = object.get(field)?;
        match value.as_u64() {
            Some(n) if (1..=max).contains(&n) => Some(n as u32),
            _ => {
                outcome.reject(format!("combat.{field}"), RejectReason::OutOfRange);
                None
            }
        }
    };

    if let Some(wave) = read("currentWave", max_wave, outcome) {
        combat.current_wave = wave;
    }
    if let Some(sub) = read("currentSubWave", SUB_WAVE_COUNT as u64, outcome) {
        combat.current_sub_wave = sub;
    }
    if let Some(wave) = read("highestWave", max_wave, outcome) {
        combat.highest_wave = wave;
    }
    if let Some(sub) = read("highestSubWave", SUB_WAVE_COUNT as u64, outcome) {
        combat.highest_sub_wave = sub;
    }

    // Re-establish the high-water invariant after partial rejections
    if combat.highest_wave < combat.current_wave
        || (combat.highest_wave == combat.current_wave
            && combat.highest_sub_wave < combat.current_sub_wave)
    {
        combat.highest_wave = combat.current_wave;
        combat.highest_sub_wave = combat.current_sub_wave;
    }

    combat
}
