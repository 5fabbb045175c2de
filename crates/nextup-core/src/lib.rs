//! # Nextup Core Library
//!
//! This library provides the core business logic for Nextup, a priority
//! calculation and recommendation explanation engine for personal task and
//! project management. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary over this library.
//!
//! ## Architecture
//!
//! - **Pipeline**: a pure, synchronous single pass
//!   Extract -> Decay -> Score -> Rank -> Confidence -> Explain; time is
//!   injected via [`Context`], so identical inputs produce identical output
//! - **Storage**: SQLite-based candidate/completion store and TOML-based
//!   configuration, used only by callers to assemble engine inputs
//! - **Strategies**: feature extraction is composed from
//!   [`FeatureContributor`] implementations, so alternative prioritization
//!   theories can be slotted in
//!
//! ## Key Components
//!
//! - [`RecommendationEngine`]: the single-pass pipeline
//! - [`FactorWeights`]: validated, read-only weight configuration
//! - [`Explanation`]: the structured, auditable justification artifact
//! - [`ResultCache`]: optional single-flight cache for repeated requests
//! - [`CandidateDb`] / [`Config`]: the storage boundary

pub mod cache;
pub mod candidate;
pub mod confidence;
pub mod decay;
pub mod engine;
pub mod error;
pub mod explain;
pub mod features;
pub mod ranker;
pub mod scoring;
pub mod storage;

pub use cache::ResultCache;
pub use candidate::{Candidate, CandidateIssue, CompletedItem, Context, EnergyDemand};
pub use confidence::{Confidence, ConfidenceBucket};
pub use decay::DecayConfig;
pub use engine::{EngineConfig, RecommendationEngine, RecommendationReport, SkippedCandidate};
pub use error::{ConfigError, EngineError, StorageError};
pub use explain::{
    Alternative, Explanation, Recommendation, ReasoningStep, SubjectRef, WARN_EFFORT_FIT,
    WARN_ENERGY_MISMATCH, WARN_NO_CANDIDATES,
};
pub use features::{Factor, FeatureContributor, FeatureExtractor, FeatureSet};
pub use ranker::RankedCandidate;
pub use scoring::{FactorScore, FactorWeights, ScoreBreakdown, ScoringEngine};
pub use storage::{CandidateDb, Config};
