use std::str::FromStr;
use std::time::Duration;

/// Review verdict reported by the status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    /// Fixed human-readable verdict shown to the chat.
    pub fn verdict(self) -> &'static str {
        match self {
            ReviewStatus::Approved => "Review checked: reviewer liked everything. Hooray!",
            ReviewStatus::Reviewing => "Review taken into work by the reviewer.",
            ReviewStatus::Rejected => "Review checked: reviewer has remarks.",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ReviewStatus::Approved),
            "reviewing" => Ok(ReviewStatus::Reviewing),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::Reviewing => write!(f, "reviewing"),
            ReviewStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// One reviewed assignment, validated out of a raw API record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    pub status: ReviewStatus,
}

impl TaskRecord {
    /// The chat message announcing this record's status.
    ///
    /// Two records produce the same message exactly when name and status
    /// match, which is what the poller deduplicates on.
    pub fn message(&self) -> String {
        format!(
            "Changed status of review \"{}\". {}",
            self.name,
            self.status.verdict()
        )
    }
}

/// A status API payload whose shape has been checked.
///
/// Individual records stay raw; they are only validated when formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Reviews changed since the requested `from_date`, newest first
    pub homeworks: Vec<serde_json::Value>,
    /// Server time to use as the next `from_date`
    pub current_date: Option<i64>,
}

/// Mutable state carried from one poll iteration to the next.
///
/// Lives only in memory: a restart resets it to `now - lookback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    /// Last message successfully delivered to the chat
    pub last_message: Option<String>,
    /// Unix timestamp sent as `from_date` on the next poll
    pub cursor: i64,
}

impl PollState {
    pub fn new(cursor: i64) -> Self {
        Self {
            last_message: None,
            cursor,
        }
    }

    /// Initial state for a process starting at unix time `now`.
    pub fn starting_at(now: i64, lookback: Duration) -> Self {
        let lookback = i64::try_from(lookback.as_secs()).unwrap_or(i64::MAX);
        Self::new(now.saturating_sub(lookback))
    }
}
