//! Client-side session liveness. A session is a flag plus a "last active"
//! timestamp persisted in the application directory. Every command refreshes
//! the timestamp while the user keeps showing up; once the idle gap grows
//! past the configured threshold the session is cleared and the user has to
//! log in again.
//!
//! This is an advisory signal only. Nothing here verifies credentials.

pub mod liveness;
pub mod store;
pub mod tracker;

/// Number of days a session survives without any recorded activity.
pub const DEFAULT_IDLE_THRESHOLD_DAYS: i64 = 3;
