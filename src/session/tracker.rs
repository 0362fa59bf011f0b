use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{
    liveness::LivenessEvaluator,
    store::{SessionState, SessionStore},
};

/// Outcome of a liveness check.
#[derive(Debug, PartialEq, Eq)]
pub enum Liveness {
    /// The session is live; `last_active_at` has been refreshed.
    Live(SessionState),
    /// No session was ever established, or it was explicitly ended.
    LoggedOut,
    /// The idle gap exceeded the threshold. The stored session has been
    /// cleared as part of the check.
    Expired,
}

/// Keeps the liveness clock advancing while the user keeps showing up, and
/// decides on each check whether a previously established session is still
/// valid. Owns nothing global; the store is injected.
pub struct SessionTracker<S> {
    store: S,
    evaluator: LivenessEvaluator,
}

impl<S: SessionStore> SessionTracker<S> {
    pub fn new(store: S, evaluator: LivenessEvaluator) -> Self {
        Self { store, evaluator }
    }

    pub async fn login(&self, display_name: Arc<str>, now: DateTime<Utc>) -> Result<()> {
        self.store
            .save(&SessionState::logged_in(display_name, now))
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Stamps `last_active_at = now`. Called on any evidence of a live
    /// user; a no-op when no session is established.
    pub async fn record_activity(&self, now: DateTime<Utc>) -> Result<()> {
        let Some(mut state) = self.store.load().await? else {
            return Ok(());
        };
        if !state.authenticated {
            return Ok(());
        }
        state.last_active_at = Some(now);
        self.store.save(&state).await
    }

    /// Decides whether the session is still live.
    ///
    /// A missing timestamp on an authenticated session means it was never
    /// recorded; it is repaired by stamping `now` instead of forcing a
    /// logout. An unreadable store counts as no session at all.
    pub async fn check_liveness(&self, now: DateTime<Utc>) -> Result<Liveness> {
        let state = match self.store.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Session state is unreadable, treating the session as ended: {e:?}");
                let _ = self.store.clear().await;
                return Ok(Liveness::LoggedOut);
            }
        };
        let Some(mut state) = state else {
            return Ok(Liveness::LoggedOut);
        };
        if !state.authenticated {
            return Ok(Liveness::LoggedOut);
        }

        match state.last_active_at {
            Some(last_active) if self.evaluator.is_expired(last_active, now) => {
                debug!("Session idle since {last_active}, ending it");
                self.store.clear().await?;
                Ok(Liveness::Expired)
            }
            _ => {
                // Sliding expiration: a passing check is itself activity.
                state.last_active_at = Some(now);
                self.store.save(&state).await?;
                Ok(Liveness::Live(state))
            }
        }
    }
}
