//! The technology tree: static definitions and research progression.

pub mod config;
pub mod research;

pub use config::{research_cost, research_time, TechBranch, TechId, TechNode, TechRequirement, TECHS};
pub use research::{
    ActiveResearch, PendingResearch, ResearchError, ResearchSlot, ResearchState,
};
