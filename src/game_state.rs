//! The canonical mutable game state and its mutation entry points.
//!
//! One aggregate owns everything that persists: equipment, currencies,
//! forge progression, research and combat coordinates. The UI layer calls
//! the mutators here and polls derived getters afterwards; every mutator
//! leaves the state fully consistent before returning.

use crate::combat::{next_position, player_stats, BattleOutcome, CombatProgress, PlayerStats};
use crate::constants::{
    BASE_XP_PER_LEVEL, LEVEL_MILESTONE_INTERVAL, LEVEL_MILESTONE_MULTIPLIER,
    LEVEL_REWARD_BASE_GOLD, LEVEL_REWARD_GOLD_PER_LEVEL, MAX_PLAYER_LEVEL, XP_GROWTH,
};
use crate::items::generation::{forge_item, forge_level_info, MAX_FORGE_LEVEL};
use crate::items::{Equipment, Item};
use crate::tech::{ResearchError, ResearchSlot, ResearchState, TechId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// XP needed to go from `level` to `level + 1`.
pub fn xp_required_for_level(level: u32) -> u64 {
    (BASE_XP_PER_LEVEL * (level as f64).powf(XP_GROWTH)).floor() as u64
}

/// Player level and XP toward the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub level: u32,
    pub xp: u64,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

/// A forge upgrade in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForgeUpgrade {
    #[serde(rename = "targetLevel")]
    pub target_level: u32,
    /// Unix seconds at which the upgrade began.
    #[serde(rename = "startedAt")]
    pub started_at: i64,
    /// Total duration in seconds.
    pub duration: u64,
}

impl ForgeUpgrade {
    pub fn is_finished(&self, now: i64) -> bool {
        now.saturating_sub(self.started_at).max(0) as u64 >= self.duration
    }
}

/// Root game state. Only `reset`, `load` and `save` re-initialize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub equipment: Equipment,
    /// The most recently forged, not-yet-claimed item. Transient: sold,
    /// studied or equipped, never persisted.
    #[serde(skip)]
    pub forged_item: Option<Item>,
    pub gold: u64,
    pub essence: u64,
    #[serde(rename = "forgeLevel")]
    pub forge_level: u32,
    #[serde(rename = "forgeUpgrade")]
    pub forge_upgrade: Option<ForgeUpgrade>,
    pub player: PlayerProgress,
    pub research: ResearchState,
    pub combat: CombatProgress,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A fresh game: empty equipment, zero currencies, forge level 1,
    /// no research, combat at wave 1-1.
    pub fn new() -> Self {
        Self {
            equipment: Equipment::new(),
            forged_item: None,
            gold: 0,
            essence: 0,
            forge_level: 1,
            forge_upgrade: None,
            player: PlayerProgress::default(),
            research: ResearchState::new(),
            combat: CombatProgress::default(),
        }
    }

    /// Reinitializes everything to defaults.
    pub fn reset(&mut self) {
        *self = GameState::new();
    }

    // ── Currencies ──────────────────────────────────────────

    pub fn add_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn add_essence(&mut self, amount: u64) {
        self.essence = self.essence.saturating_add(amount);
    }

    /// Deducts gold, or returns `false` leaving the balance untouched.
    pub fn spend_gold(&mut self, amount: u64) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }

    /// Deducts essence, or returns `false` leaving the balance untouched.
    pub fn spend_essence(&mut self, amount: u64) -> bool {
        if self.essence < amount {
            return false;
        }
        self.essence -= amount;
        true
    }

    // ── Items ───────────────────────────────────────────────

    /// Gold value of an item: level × tier, scaled by the goldRush tech.
    /// Integer percent math keeps the floor exact.
    pub fn sell_value(&self, item: &Item) -> u64 {
        let base = (item.level as u64) * (item.tier.max(1) as u64);
        let bonus = self.research.tech_effect(TechId::GoldRush) as u64;
        base * (100 + bonus) / 100
    }

    /// Essence value of studying (disenchanting) an item: level × tier².
    /// Higher tiers pay off quadratically, unlike the linear sell track.
    pub fn study_value(&self, item: &Item) -> u64 {
        let tier = item.tier.max(1) as u64;
        (item.level as u64) * tier * tier
    }

    /// Forges a new pending item from a random slot. A treasureHunter proc
    /// pays out the item's sell value in bonus gold on top.
    pub fn forge(&mut self, rng: &mut impl Rng) -> Item {
        let item = forge_item(&self.equipment, self.forge_level, &self.research, rng);

        let treasure_chance = self.research.tech_effect(TechId::TreasureHunter) / 100.0;
        if treasure_chance > 0.0 && rng.gen_bool(treasure_chance.min(1.0)) {
            self.add_gold(self.sell_value(&item));
        }

        self.forged_item = Some(item.clone());
        item
    }

    /// Equips an item into its slot. A replaced item is salvaged for gold;
    /// the pending forged item is consumed.
    pub fn equip_item(&mut self, item: Item) {
        if let Some(old) = self.equipment.get(item.slot).clone() {
            let gold = self.sell_value(&old);
            self.add_gold(gold);
        }
        self.equipment.set(item.slot, Some(item));
        self.forged_item = None;
    }

    /// Sells the pending forged item for gold. Returns the gold earned,
    /// `0` when nothing is pending.
    pub fn sell_forged_item(&mut self) -> u64 {
        let Some(item) = self.forged_item.take() else {
            return 0;
        };
        let gold = self.sell_value(&item);
        self.add_gold(gold);
        gold
    }

    /// Studies the pending forged item for essence (scaled by the
    /// essenceStudy tech). Returns the essence earned, `0` when nothing is
    /// pending.
    pub fn study_forged_item(&mut self) -> u64 {
        let Some(item) = self.forged_item.take() else {
            return 0;
        };
        let bonus = self.research.tech_effect(TechId::EssenceStudy) as u64;
        let essence = self.study_value(&item) * (100 + bonus) / 100;
        self.add_essence(essence);
        essence
    }

    // ── Research ────────────────────────────────────────────

    /// Starts (or queues) the next level of `tech` at `now`, paying the
    /// discounted essence cost. Nothing is spent on refusal.
    pub fn start_research(&mut self, tech: TechId, now: i64) -> Result<ResearchSlot, ResearchError> {
        self.research.can_research(tech)?;

        // Refuse a full queue before touching the balance
        if self.research.active.is_some() {
            let capacity = self.research.queue_capacity();
            if self.research.queue.len() as u32 >= capacity {
                return Err(ResearchError::QueueFull { capacity });
            }
        }

        let level = self.research.tech_level(tech) + 1;
        let cost = self.research.effective_research_cost(tech, level);
        if !self.spend_essence(cost) {
            return Err(ResearchError::InsufficientEssence {
                cost,
                have: self.essence,
            });
        }

        self.research.install_or_queue(tech, now)
    }

    /// Completes overdue research at `now`; call sites poll this instead of
    /// the core running a timer.
    pub fn check_research(&mut self, now: i64) -> Option<TechId> {
        self.research.reconcile(now)
    }

    // ── Forge upgrades ──────────────────────────────────────

    /// Gold cost of upgrading to the next forge level, `None` at the cap.
    pub fn forge_upgrade_cost(&self) -> Option<u64> {
        if self.forge_level >= MAX_FORGE_LEVEL {
            return None;
        }
        Some(forge_level_info(self.forge_level + 1).cost)
    }

    /// Starts the next forge upgrade at `now`. Refused while one is running,
    /// at the level cap, or with too little gold.
    pub fn start_forge_upgrade(&mut self, now: i64) -> bool {
        if self.forge_upgrade.is_some() {
            return false;
        }
        let Some(cost) = self.forge_upgrade_cost() else {
            return false;
        };
        if !self.spend_gold(cost) {
            return false;
        }

        let target = self.forge_level + 1;
        self.forge_upgrade = Some(ForgeUpgrade {
            target_level: target,
            started_at: now,
            duration: forge_level_info(target).time,
        });
        true
    }

    /// Applies a finished forge upgrade at `now`. Idempotent.
    pub fn check_forge_upgrade(&mut self, now: i64) -> bool {
        let finished = self
            .forge_upgrade
            .as_ref()
            .is_some_and(|u| u.is_finished(now));
        if !finished {
            return false;
        }
        if let Some(upgrade) = self.forge_upgrade.take() {
            self.forge_level = upgrade.target_level.min(MAX_FORGE_LEVEL);
            tracing::debug!(level = self.forge_level, "forge upgrade completed");
        }
        true
    }

    // ── Combat ──────────────────────────────────────────────

    /// Applies a battle outcome: moves the current position per the
    /// win/loss rule and maintains the high-water mark.
    pub fn record_battle(&mut self, outcome: BattleOutcome) {
        let (wave, sub_wave) = next_position(
            self.combat.current_wave,
            self.combat.current_sub_wave,
            outcome,
            &self.research,
        );
        self.combat.set_position(wave, sub_wave);
    }

    /// Derived player combat stats for the current equipment and techs.
    pub fn player_stats(&self) -> PlayerStats {
        player_stats(&self.equipment, &self.research)
    }

    // ── Player XP ───────────────────────────────────────────

    /// Adds XP, resolving any level-ups and paying their gold rewards.
    /// Returns the number of levels gained.
    pub fn add_xp(&mut self, amount: u64) -> u32 {
        if self.player.level >= MAX_PLAYER_LEVEL {
            return 0;
        }
        self.player.xp = self.player.xp.saturating_add(amount);

        let mut level_ups = 0;
        while self.player.level < MAX_PLAYER_LEVEL {
            let needed = xp_required_for_level(self.player.level);
            if self.player.xp < needed {
                break;
            }
            self.player.xp -= needed;
            self.player.level += 1;
            level_ups += 1;

            let mut reward =
                LEVEL_REWARD_BASE_GOLD + LEVEL_REWARD_GOLD_PER_LEVEL * self.player.level as u64;
            if self.player.level % LEVEL_MILESTONE_INTERVAL == 0 {
                reward *= LEVEL_MILESTONE_MULTIPLIER;
            }
            self.add_gold(reward);
        }

        if self.player.level >= MAX_PLAYER_LEVEL {
            self.player.xp = 0;
        }
        level_ups
    }

    // ── Time reconciliation ─────────────────────────────────

    /// Catches up everything that finished while the process was down:
    /// overdue research and forge upgrades. Idempotent; called on load.
    pub fn reconcile(&mut self, now: i64) {
        self.check_research(now);
        self.check_forge_upgrade(now);
    }

    /// `reconcile` against the current wall clock.
    pub fn reconcile_now(&mut self) {
        self.reconcile(chrono::Utc::now().timestamp());
    }
}
