//! Integration test: Persistence and Defensive Validation
//!
//! Saves real states, mangles payloads, and checks that loads always land in
//! the best available consistent state without ever failing hard.

use forgemaster::items::generation::create_item_with_tier;
use forgemaster::items::EquipmentSlot;
use forgemaster::save_manager::SaveManager;
use forgemaster::tech::TechId;
use forgemaster::validation::{validate_loaded, RejectReason};
use forgemaster::GameState;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

fn save_manager() -> (SaveManager, std::path::PathBuf) {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("forgemaster-save-test-{id}"));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("save.dat");
    (SaveManager::with_path(path.clone()), path)
}

// =========================================================================
// Full-state round trips
// =========================================================================

#[test]
fn test_rich_state_round_trips_exactly() {
    let (manager, _path) = save_manager();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let mut state = GameState::new();
    state.add_gold(123_456);
    state.add_essence(7_890);
    state.forge_level = 17;
    state.player.level = 42;
    state.player.xp = 999;
    state.research.complete_research(TechId::GoldRush, 10);
    state.research.complete_research(TechId::TreasureHunter, 2);
    state.combat.set_position(8, 9);
    state.combat.set_position(6, 2); // retreat below the high-water mark
    for slot in EquipmentSlot::all() {
        let item = create_item_with_tier(slot, 60, 3, &state.research, &mut rng);
        state.equip_item(item);
    }

    manager.save(&state).unwrap();
    let outcome = manager.load(0).unwrap();

    assert!(outcome.rejections.is_empty(), "{:?}", outcome.rejections);
    // Equip salvages nothing here (slots were empty), so gold must match too
    assert_eq!(outcome.state, state);
    assert_eq!(outcome.state.combat.highest_wave, 8);
}

#[test]
fn test_pending_forged_item_is_not_persisted() {
    let (manager, _path) = save_manager();
    let mut rng = ChaCha8Rng::seed_from_u64(12);

    let mut state = GameState::new();
    state.forge(&mut rng);
    assert!(state.forged_item.is_some());

    manager.save(&state).unwrap();
    let outcome = manager.load(0).unwrap();
    assert!(outcome.state.forged_item.is_none());
}

// =========================================================================
// Field-level damage stays field-level
// =========================================================================

#[test]
fn test_partial_corruption_keeps_the_good_parts() {
    let outcome = validate_loaded(&json!({
        "gold": 500,
        "essence": -10,
        "forgeLevel": 4,
        "equipment": {
            "hat": { "type": "hat", "level": 20, "tier": 2, "statType": "health",
                     "bonuses": [{ "key": "healthMulti", "value": 6.0 }] },
            "weapon": { "type": "weapon", "level": 20, "tier": 1, "statType": "mana" }
        },
        "research": {
            "completed": { "goldRush": 3, "notATech": 9, "vitality": 99 },
            "active": null,
            "queue": []
        },
        "combat": { "currentWave": 3, "currentSubWave": 4,
                    "highestWave": 3, "highestSubWave": 9 }
    }));

    let state = &outcome.state;
    assert_eq!(state.gold, 500);
    assert_eq!(state.essence, 0); // negative clamped
    assert_eq!(state.forge_level, 4);
    assert!(state.equipment.hat.is_some());
    assert!(state.equipment.weapon.is_none()); // bad statType dropped
    assert_eq!(state.research.tech_level(TechId::GoldRush), 3);
    assert_eq!(state.research.tech_level(TechId::Vitality), 0); // over max dropped
    assert_eq!(state.combat.current_wave, 3);

    let reasons: Vec<_> = outcome.rejections.iter().map(|r| r.reason).collect();
    assert!(reasons.contains(&RejectReason::NegativeClamped));
    assert!(reasons.contains(&RejectReason::SlotMismatch));
    assert!(reasons.contains(&RejectReason::UnknownTech));
    assert!(reasons.contains(&RejectReason::OverMaxLevel));
}

#[test]
fn test_rejected_levels_never_clamp() {
    // A vitality of 99 (max 10) must drop to 0, not become 10
    let outcome = validate_loaded(&json!({
        "research": { "completed": { "vitality": 99 }, "active": null, "queue": [] }
    }));
    assert_eq!(outcome.state.research.tech_level(TechId::Vitality), 0);
}

#[test]
fn test_unknown_top_level_fields_are_ignored() {
    let outcome = validate_loaded(&json!({
        "gold": 10,
        "diamonds": 5000,
        "serverToken": "abc"
    }));
    assert_eq!(outcome.state.gold, 10);
    assert!(outcome.rejections.is_empty());
}

// =========================================================================
// Whole-blob corruption aborts gracefully
// =========================================================================

#[test]
fn test_truncated_save_leaves_default_state() {
    let (manager, path) = save_manager();

    let mut state = GameState::new();
    state.add_gold(100);
    manager.save(&state).unwrap();

    // Chop the file in half
    let data = std::fs::read(&path).unwrap();
    std::fs::write(&path, &data[..data.len() / 2]).unwrap();

    assert!(manager.load(0).is_err());
    assert_eq!(manager.load_or_default(0), GameState::new());
}

// =========================================================================
// Equipment validated against researched masteries
// =========================================================================

#[test]
fn test_mastery_extended_items_survive_the_round_trip() {
    let (manager, _path) = save_manager();
    let mut rng = ChaCha8Rng::seed_from_u64(13);

    let mut state = GameState::new();
    state.research.complete_research(TechId::WeaponMastery, 25);
    let research = state.research.clone();
    state.equip_item(create_item_with_tier(
        EquipmentSlot::Weapon,
        150,
        2,
        &research,
        &mut rng,
    ));

    manager.save(&state).unwrap();
    let outcome = manager.load(0).unwrap();
    assert!(outcome.rejections.is_empty());
    assert_eq!(
        outcome
            .state
            .equipment
            .get(EquipmentSlot::Weapon)
            .as_ref()
            .map(|i| i.level),
        Some(150)
    );
}

#[test]
fn test_item_stats_rederived_on_load() {
    // A save edited to inflate stats gets silently corrected
    let outcome = validate_loaded(&json!({
        "equipment": {
            "weapon": { "type": "weapon", "level": 10, "tier": 1,
                        "stats": 1_000_000, "statType": "damage", "bonuses": [] }
        }
    }));
    let weapon = outcome.state.equipment.weapon.unwrap();
    assert_eq!(weapon.stats, 20);
}

#[test]
fn test_legacy_item_without_tier_or_bonuses_loads() {
    let outcome = validate_loaded(&json!({
        "equipment": {
            "belt": { "type": "belt", "level": 33, "stats": 330, "statType": "health" }
        }
    }));
    let belt = outcome.state.equipment.belt.unwrap();
    assert_eq!(belt.tier, 1);
    assert!(belt.bonuses.is_empty());

    // Legacy items sell at tier 1
    let state = GameState::new();
    assert_eq!(state.sell_value(&belt), 33);
}
