//! Research state and progression.
//!
//! Tracks completed tech levels, the single in-progress research slot, and
//! the pending queue. Research completion is evaluated lazily against
//! wall-clock timestamps; no timer runs inside the core. `reconcile` applies
//! the same rule at load time so research that finished while the process
//! was down completes as if it finished at load.

use super::config::{research_cost, research_time, TechId, TechRequirement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

/// Why a research start was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResearchError {
    #[error("tech is already at max level")]
    MaxLevelReached,
    #[error("prerequisite not met: {tech:?} level {level}")]
    PrerequisiteNotMet { tech: TechId, level: u32 },
    #[error("not enough essence: need {cost}, have {have}")]
    InsufficientEssence { cost: u64, have: u64 },
    #[error("research queue is full (capacity {capacity})")]
    QueueFull { capacity: u32 },
}

/// The research currently in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveResearch {
    #[serde(rename = "techId")]
    pub tech: TechId,
    pub level: u32,
    /// Unix seconds at which the research began.
    #[serde(rename = "startedAt")]
    pub started_at: i64,
    /// Total duration in seconds.
    pub duration: u64,
}

impl ActiveResearch {
    /// Seconds left at `now`, zero once finished.
    pub fn remaining(&self, now: i64) -> u64 {
        let elapsed = now.saturating_sub(self.started_at);
        self.duration.saturating_sub(elapsed.max(0) as u64)
    }

    pub fn is_finished(&self, now: i64) -> bool {
        self.remaining(now) == 0
    }
}

/// A queued research waiting for the active slot to free up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingResearch {
    #[serde(rename = "techId")]
    pub tech: TechId,
    pub level: u32,
    pub duration: u64,
}

/// Whether a started research went live immediately or into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchSlot {
    Started,
    Queued,
}

/// Completed tech levels, the active research and the pending queue.
///
/// Invariants: at most one active research; completed levels never decrease
/// and never exceed a tech's max level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    pub completed: BTreeMap<TechId, u32>,
    pub active: Option<ActiveResearch>,
    pub queue: VecDeque<PendingResearch>,
}

impl ResearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed level of a tech, 0 if never researched.
    pub fn tech_level(&self, tech: TechId) -> u32 {
        self.completed.get(&tech).copied().unwrap_or(0)
    }

    /// Cumulative effect of a tech: per-level magnitude times completed
    /// level. Each tech id is independent; effects never aggregate across
    /// ids.
    pub fn tech_effect(&self, tech: TechId) -> f64 {
        tech.node().effect_per_level * self.tech_level(tech) as f64
    }

    /// Essence cost for `tech` at `level` after the essenceResonance
    /// discount. Never below 1.
    ///
    /// Integer percent math keeps the floor exact.
    pub fn effective_research_cost(&self, tech: TechId, level: u32) -> u64 {
        let base = research_cost(tech, level);
        let discount = self.tech_effect(TechId::EssenceResonance) as u64;
        (base * (100u64.saturating_sub(discount)) / 100).max(1)
    }

    /// Queue slots unlocked by the researchQueue tech.
    pub fn queue_capacity(&self) -> u32 {
        self.tech_level(TechId::ResearchQueue)
    }

    fn requirement_met(&self, r: &TechRequirement) -> bool {
        self.tech_level(r.tech) >= r.level
    }

    /// Pure prerequisite gate for starting the next level of `tech`.
    ///
    /// All `requires` must be met; when the node lists `alt_requires`,
    /// meeting any single one of those unlocks it as well.
    pub fn can_research(&self, tech: TechId) -> Result<(), ResearchError> {
        let node = tech.node();
        if self.tech_level(tech) >= node.max_level {
            return Err(ResearchError::MaxLevelReached);
        }

        let main_met = node.requires.iter().all(|r| self.requirement_met(r));
        let alt_met = node.alt_requires.iter().any(|r| self.requirement_met(r));
        if main_met || (!node.alt_requires.is_empty() && alt_met) {
            return Ok(());
        }

        // Report the first unmet requirement
        let unmet = node
            .requires
            .iter()
            .find(|r| !self.requirement_met(r))
            .or_else(|| node.alt_requires.first());
        match unmet {
            Some(r) => Err(ResearchError::PrerequisiteNotMet {
                tech: r.tech,
                level: r.level,
            }),
            None => Ok(()),
        }
    }

    /// Installs the active research. Callers must check `active.is_none()`
    /// first; installing over an existing entry replaces it.
    pub fn set_active(&mut self, entry: ActiveResearch) {
        self.active = Some(entry);
    }

    /// Appends to the pending queue (FIFO).
    pub fn push_queue(&mut self, entry: PendingResearch) {
        self.queue.push_back(entry);
    }

    /// Removes and returns the queue head.
    pub fn shift_queue(&mut self) -> Option<PendingResearch> {
        self.queue.pop_front()
    }

    /// Records a tech as completed at `level` and clears the active slot if
    /// it matches. The level is set absolutely; completing below the current
    /// level (or above the cap) is rejected and leaves state untouched.
    pub fn complete_research(&mut self, tech: TechId, level: u32) -> bool {
        if level < self.tech_level(tech) || level > tech.node().max_level {
            return false;
        }
        self.completed.insert(tech, level);
        if self
            .active
            .as_ref()
            .is_some_and(|a| a.tech == tech && a.level == level)
        {
            self.active = None;
        }
        true
    }

    /// Starts the next level of `tech` at `now`, or queues it when a
    /// research is already running. The caller has already paid the cost.
    pub fn install_or_queue(&mut self, tech: TechId, now: i64) -> Result<ResearchSlot, ResearchError> {
        let level = self.tech_level(tech) + 1;
        let duration = research_time(tech, level);

        if self.active.is_none() {
            self.set_active(ActiveResearch {
                tech,
                level,
                started_at: now,
                duration,
            });
            return Ok(ResearchSlot::Started);
        }

        let capacity = self.queue_capacity();
        if self.queue.len() as u32 >= capacity {
            return Err(ResearchError::QueueFull { capacity });
        }
        self.push_queue(PendingResearch {
            tech,
            level,
            duration,
        });
        Ok(ResearchSlot::Queued)
    }

    /// Completes the active research if its time is up at `now`, then
    /// promotes the queue head (re-based to `now`). Idempotent: with no
    /// active entry, or one still in progress, nothing changes.
    ///
    /// Returns the tech that completed, if any.
    pub fn reconcile(&mut self, now: i64) -> Option<TechId> {
        let finished = self.active.clone().filter(|a| a.is_finished(now))?;

        self.complete_research(finished.tech, finished.level);
        self.active = None;
        tracing::debug!(tech = finished.tech.key(), level = finished.level, "research completed");

        if let Some(next) = self.shift_queue() {
            self.set_active(ActiveResearch {
                tech: next.tech,
                level: next.level,
                started_at: now,
                duration: next.duration,
            });
        }

        Some(finished.tech)
    }
}
