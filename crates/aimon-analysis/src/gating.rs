/// Cost gate in front of the model-backed analysis tiers.
///
/// Simple, already-actionable issues are answered by the rule tier alone;
/// only issues matching the configured complex-keyword set justify a model
/// call. This is a latency/cost control, not a correctness gate.
pub struct GatingPolicy {
    keywords: Vec<String>,
}

impl GatingPolicy {
    pub fn new(keywords: Vec<String>) -> Self {
        let keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        Self { keywords }
    }

    pub fn warrants_deep_analysis(&self, issues: &[String]) -> bool {
        issues.iter().any(|issue| {
            let issue = issue.to_lowercase();
            self.keywords.iter().any(|kw| issue.contains(kw))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> GatingPolicy {
        GatingPolicy::new(vec![
            "severely".into(),
            "critically".into(),
            "bottleneck".into(),
        ])
    }

    #[test]
    fn severe_issue_warrants_deep_analysis() {
        assert!(policy().warrants_deep_analysis(&["CPU severely overloaded".into()]));
        assert!(policy().warrants_deep_analysis(&["Memory critically low".into()]));
        assert!(policy().warrants_deep_analysis(&[
            "CPU usage elevated".into(),
            "High load with low CPU, likely I/O bottleneck".into(),
        ]));
    }

    #[test]
    fn simple_issues_do_not() {
        assert!(!policy().warrants_deep_analysis(&[
            "CPU usage elevated".into(),
            "System load elevated".into(),
        ]));
    }

    #[test]
    fn empty_issue_list_does_not() {
        assert!(!policy().warrants_deep_analysis(&[]));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let policy = GatingPolicy::new(vec!["SEVERELY".into()]);
        assert!(policy.warrants_deep_analysis(&["cpu Severely overloaded".into()]));
    }
}
