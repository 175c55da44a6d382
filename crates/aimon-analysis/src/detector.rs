use crate::config::Thresholds;
use crate::error::AnalysisError;
use aimon_common::types::Snapshot;

/// Pure local issue detection against the tiered threshold table.
///
/// No I/O, no state: the same snapshot always yields the same ordered
/// label list. The labels are the exact strings the downstream keyword
/// rules classify on, so changing the wording here is a behavior change.
pub struct ThresholdDetector {
    thresholds: Thresholds,
}

impl ThresholdDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Returns the ordered issue labels for one snapshot, empty when the
    /// host looks healthy.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidSnapshot`] when the sample fails
    /// [`Snapshot::validate`].
    pub fn detect(&self, snapshot: &Snapshot) -> Result<Vec<String>, AnalysisError> {
        snapshot.validate().map_err(AnalysisError::InvalidSnapshot)?;

        let t = &self.thresholds;
        let mut issues = Vec::new();

        if snapshot.cpu_usage > t.cpu_severe {
            issues.push("CPU severely overloaded".to_string());
        } else if snapshot.cpu_usage > t.cpu_elevated {
            issues.push("CPU usage elevated".to_string());
        }

        let mem_ratio = snapshot.mem_used_ratio();
        if mem_ratio > t.memory_severe_ratio {
            issues.push("Memory critically low".to_string());
        } else if mem_ratio > t.memory_elevated_ratio {
            issues.push("Memory usage elevated".to_string());
        }

        if snapshot.load_1min > t.load_severe {
            issues.push("System load severely high".to_string());
        } else if snapshot.load_1min > t.load_elevated {
            issues.push("System load elevated".to_string());
        }

        // Compound signature: lots of queued work without CPU pressure
        if snapshot.load_1min > t.io_bound_load && snapshot.cpu_usage < t.io_bound_cpu_ceiling {
            issues.push("High load with low CPU, likely I/O bottleneck".to_string());
        }

        Ok(issues)
    }
}
