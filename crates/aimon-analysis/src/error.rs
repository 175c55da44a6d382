/// Errors that can escape the analysis pipeline.
///
/// Tier failures (model timeouts, parse errors, transport errors) are
/// handled internally by the fallback ladder and never surface here; the
/// variants below are the only failures a caller sees.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The telemetry sample was structurally malformed. Fatal to the
    /// current cycle only; the consumer skips it and continues.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// The pipeline collapsed past all fallback tiers. The caller should
    /// substitute [`AnalysisResult::degraded`](crate::models::AnalysisResult::degraded)
    /// so the alert path still has something actionable.
    #[error("analysis pipeline failed: {0}")]
    Failed(String),
}
