use std::collections::HashSet;
use std::time::Duration;

/// Reasons a pod is deleted for when none are configured.
/// Only consulted for containers in a terminated or waiting state.
pub const DEFAULT_REASONS: [&str; 2] = ["CrashLoopBackOff", "Error"];

/// Pods created less than this long ago are left alone.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(60 * 60);

/// Container state reasons that make a pod eligible for deletion.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedReasons(HashSet<String>);

impl AcceptedReasons {
    pub fn new<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(reasons.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, reason: &str) -> bool {
        self.0.contains(reason)
    }

    /// Reasons in sorted order, for display.
    pub fn sorted(&self) -> Vec<&str> {
        let mut reasons: Vec<&str> = self.0.iter().map(String::as_str).collect();
        reasons.sort_unstable();
        reasons
    }
}

impl Default for AcceptedReasons {
    fn default() -> Self {
        Self::new(DEFAULT_REASONS)
    }
}

/// Everything that decides which pods are looked at and which get deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Empty means all namespaces.
    pub namespace: String,
    /// Label selector, empty means all pods.
    pub selector: String,
    pub grace: Duration,
    pub reasons: AcceptedReasons,
    pub dry_run: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            selector: String::new(),
            grace: DEFAULT_GRACE,
            reasons: AcceptedReasons::default(),
            dry_run: false,
        }
    }
}
