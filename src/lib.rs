//! Lume Pairing - stable one-to-one pairing for the Lume dating app
//!
//! This library generalizes Gale-Shapley deferred acceptance to a population
//! where sides are drawn at random and compatibility depends on each
//! participant's declared gender identity and preference.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{run_matching, run_matching_seeded, LabelCatalog, MatchError, MatchOutcome, Matcher, RandomSampler, SidePartition};
pub use crate::models::{Match, ReceiverRanking, RunStats};
