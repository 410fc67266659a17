//! Support Match - tiered matching of government support programs
//!
//! Scores a catalog of support programs against a personal or small-business
//! profile and returns them in three relevance tiers. Constraints that were
//! never extracted from a program shrink its score instead of being guessed.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{FlatScore, MatchResult, Matcher, MatchingConfig, ScoredCandidate, Tier};
pub use models::{BusinessProfile, Candidate, PersonalProfile, UserProfile};
