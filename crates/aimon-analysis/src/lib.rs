//! Staged analysis pipeline with degrading fallback strategies.
//!
//! A telemetry [`Snapshot`](aimon_common::types::Snapshot) flows through
//! local threshold detection, a cost gate, and a fixed ladder of analysis
//! tiers (structured chain, direct completion, rule-based), each bounded by
//! a hard deadline. The ladder always produces a
//! [`Diagnosis`](models::Diagnosis); which tier produced it is recorded as
//! provenance so downstream consumers can weigh their trust.

pub mod config;
pub mod detector;
pub mod error;
pub mod gating;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod rules;
pub mod synthesizer;

#[cfg(test)]
mod tests;

pub use config::{AnalysisConfig, Thresholds};
pub use error::AnalysisError;
pub use models::{AnalysisResult, AnalysisTier, Diagnosis, DiagnosisSeverity, SolutionSet};
pub use orchestrator::AnalysisOrchestrator;
pub use provider::ChatModel;
pub use providers::glm::GlmProvider;
pub use synthesizer::SolutionSynthesizer;
