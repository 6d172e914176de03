//! Forgemaster - Idle Forging Game Simulation Core
//!
//! The simulation behind an incremental forging game: players forge
//! randomized equipment, research permanent tech upgrades, and send their
//! character through procedurally scaled waves of monsters. This crate owns
//! the balance model and the persistent state; rendering, input and any
//! network layer live with the caller.

pub mod combat;
pub mod constants;
pub mod game_state;
pub mod items;
pub mod save_manager;
pub mod tech;
pub mod validation;

pub use game_state::{xp_required_for_level, ForgeUpgrade, GameState, PlayerProgress};
pub use save_manager::{SaveError, SaveManager};
pub use validation::{validate_loaded, LoadOutcome, RejectReason, Rejection};
