use chrono::{DateTime, Duration, Utc};

/// Decides whether the gap since the last recorded activity is long enough
/// to end the session.
pub struct LivenessEvaluator {
    threshold: Duration,
}

impl LivenessEvaluator {
    pub fn from_days(days: i64) -> Self {
        Self {
            threshold: Duration::days(days),
        }
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            threshold: Duration::seconds(seconds),
        }
    }

    pub fn is_expired(&self, last_active: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - last_active > self.threshold
    }
}
