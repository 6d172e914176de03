//! Integration test: Research Lifecycle
//!
//! Walks a tech from affordable start through timed completion, queueing,
//! discounts, prerequisite gates and the offline catch-up path through a
//! real save/load cycle.

use forgemaster::save_manager::SaveManager;
use forgemaster::tech::{research_cost, ResearchError, ResearchSlot, TechId};
use forgemaster::GameState;
use std::sync::atomic::{AtomicU64, Ordering};

/// One SaveManager per test, each in its own temp directory.
fn save_manager() -> SaveManager {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("forgemaster-research-test-{id}"));
    std::fs::create_dir_all(&dir).unwrap();
    SaveManager::with_path(dir.join("save.dat"))
}

// =========================================================================
// Start -> complete by wall clock
// =========================================================================

#[test]
fn test_full_research_cycle() {
    let mut state = GameState::new();
    state.add_essence(100);

    // vitality level 1: 20 essence, 60 seconds
    assert_eq!(
        state.start_research(TechId::Vitality, 10_000),
        Ok(ResearchSlot::Started)
    );
    assert_eq!(state.essence, 80);

    // Polling early changes nothing
    assert_eq!(state.check_research(10_059), None);
    assert_eq!(state.research.tech_level(TechId::Vitality), 0);

    // At the 60s mark it completes
    assert_eq!(state.check_research(10_060), Some(TechId::Vitality));
    assert_eq!(state.research.tech_level(TechId::Vitality), 1);
    assert!(state.research.active.is_none());
}

#[test]
fn test_costs_rise_with_level_and_fall_with_resonance() {
    let mut state = GameState::new();
    state.add_essence(1_000_000);

    // Level 2 of a tech costs more than level 1
    assert!(research_cost(TechId::Vitality, 2) > research_cost(TechId::Vitality, 1));

    // essenceResonance level 3: 45% off, floored, never below 1
    state.research.complete_research(TechId::EssenceResonance, 3);
    let base = research_cost(TechId::Vitality, 1);
    let discounted = state.research.effective_research_cost(TechId::Vitality, 1);
    assert_eq!(discounted, (base as f64 * 0.55).floor() as u64);
    assert!(discounted >= 1);
}

// =========================================================================
// Prerequisites and gating
// =========================================================================

#[test]
fn test_prerequisite_chain_unlocks_in_order() {
    let mut state = GameState::new();
    state.add_essence(1_000_000);

    // waveBreaker is gated behind vitality 3 + strength 3
    assert!(matches!(
        state.start_research(TechId::WaveBreaker, 0),
        Err(ResearchError::PrerequisiteNotMet { .. })
    ));

    for level in 1..=3 {
        state.research.complete_research(TechId::Vitality, level);
        state.research.complete_research(TechId::Strength, level);
    }
    assert_eq!(
        state.start_research(TechId::WaveBreaker, 0),
        Ok(ResearchSlot::Started)
    );
}

#[test]
fn test_maxed_tech_refuses_further_research() {
    let mut state = GameState::new();
    state.add_essence(1_000_000);
    state.research.complete_research(TechId::TierAffinity, 3);

    assert_eq!(
        state.start_research(TechId::TierAffinity, 0),
        Err(ResearchError::MaxLevelReached)
    );
}

// =========================================================================
// Queue behavior
// =========================================================================

#[test]
fn test_queue_drains_in_order_as_time_passes() {
    let mut state = GameState::new();
    state.add_essence(10_000);
    state.research.complete_research(TechId::ResearchQueue, 2);

    state.start_research(TechId::Vitality, 0).unwrap(); // runs 0..60
    assert_eq!(
        state.start_research(TechId::Strength, 5),
        Ok(ResearchSlot::Queued)
    );
    assert_eq!(
        state.start_research(TechId::GoldRush, 10),
        Ok(ResearchSlot::Queued)
    );

    // First completion promotes strength, re-based to the poll time
    assert_eq!(state.check_research(60), Some(TechId::Vitality));
    let active = state.research.active.as_ref().unwrap();
    assert_eq!(active.tech, TechId::Strength);
    assert_eq!(active.started_at, 60);
    assert_eq!(state.research.queue.len(), 1);

    // strength (60s) completes at 120, promoting goldRush
    assert_eq!(state.check_research(120), Some(TechId::Strength));
    assert_eq!(
        state.research.active.as_ref().map(|a| a.tech),
        Some(TechId::GoldRush)
    );
    assert!(state.research.queue.is_empty());
}

// =========================================================================
// Offline catch-up through a real save/load cycle
// =========================================================================

#[test]
fn test_research_finishing_offline_completes_on_load() {
    let manager = save_manager();

    let mut state = GameState::new();
    state.add_essence(100);
    state.start_research(TechId::Vitality, 1_000).unwrap();
    manager.save(&state).unwrap();

    // Ten minutes later the 60s research has long finished
    let outcome = manager.load(1_600).unwrap();
    assert_eq!(outcome.state.research.tech_level(TechId::Vitality), 1);
    assert!(outcome.state.research.active.is_none());
}

#[test]
fn test_research_still_running_survives_load_unchanged() {
    let manager = save_manager();

    let mut state = GameState::new();
    state.add_essence(100);
    state.start_research(TechId::Vitality, 1_000).unwrap();
    manager.save(&state).unwrap();

    // Ten seconds in: still running, original start time preserved
    let outcome = manager.load(1_010).unwrap();
    let active = outcome.state.research.active.as_ref().unwrap();
    assert_eq!(active.started_at, 1_000);
    assert_eq!(outcome.state.research.tech_level(TechId::Vitality), 0);
}

#[test]
fn test_offline_completion_promotes_queue_without_chaining() {
    let manager = save_manager();

    let mut state = GameState::new();
    state.add_essence(10_000);
    state.research.complete_research(TechId::ResearchQueue, 1);
    state.start_research(TechId::Vitality, 0).unwrap();
    state.start_research(TechId::Strength, 0).unwrap(); // queued
    manager.save(&state).unwrap();

    // A week later: the active research completed, the queued one was
    // promoted at load time rather than silently finishing too
    let now = 7 * 24 * 3600;
    let outcome = manager.load(now).unwrap();
    assert_eq!(outcome.state.research.tech_level(TechId::Vitality), 1);
    assert_eq!(outcome.state.research.tech_level(TechId::Strength), 0);
    let active = outcome.state.research.active.unwrap();
    assert_eq!(active.tech, TechId::Strength);
    assert_eq!(active.started_at, now);
}
