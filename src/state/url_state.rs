/// URL state definitions for tracking batch download progress
///
/// This module defines all possible states a URL can be in during a run.
use std::fmt;

/// Represents the current state of a URL in the download process
///
/// Valid transitions: `Pending -> Skipped` (tracker hit), or
/// `Pending -> Fetching -> Succeeded | Failed`. No URL revisits a prior
/// state within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    // ===== Active States =====
    /// URL has been extracted but not yet examined
    Pending,

    /// URL is currently being fetched (including retry waits)
    Fetching,

    // ===== Terminal States =====
    /// URL was already present in the shard's tracking records
    Skipped,

    /// URL was downloaded and recorded
    Succeeded,

    /// URL exhausted its retry attempts
    Failed,
}

impl UrlState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching)
    }

    /// Returns true if this represents a successful download
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if this represents a failed download
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns a stable string representation, used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Skipped => "skipped",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns true if `next` is a legal successor of `self`
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Skipped)
                | (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Succeeded)
                | (Self::Fetching, Self::Failed)
        )
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
