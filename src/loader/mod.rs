//! Fetch/normalize layer.
//!
//! Runs once per transition into the authenticated state: one authenticated
//! request for the full dataset list, then the normalization pass. There is
//! no retry and no partial result; a load either yields every record or
//! none.

use crate::api::{AnalyticsApi, FetchOutcome};
use crate::events::{Event, EventKind, EventLog};
use crate::records::{self, DatasetRecord};
use crate::session::SessionGate;
use crate::storage::KeyValueStore;

/// Result of [`load`]. No variant represents "still loading".
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loaded(Vec<DatasetRecord>),
    /// Session missing, expired, or rejected by the backend.
    Unauthenticated,
    /// Request, decode, or normalization failure.
    Failed(String),
}

impl LoadState {
    /// Records to display; empty unless loaded.
    pub fn records(&self) -> &[DatasetRecord] {
        match self {
            Self::Loaded(records) => records,
            _ => &[],
        }
    }
}

/// Fetch and normalize every dataset visible to the current session.
///
/// A 401 logs the gate out (removing the persisted session) before
/// returning [`LoadState::Unauthenticated`].
pub fn load<S: KeyValueStore>(gate: &mut SessionGate<S>, api: &impl AnalyticsApi) -> LoadState {
    if !gate.is_authenticated() {
        return LoadState::Unauthenticated;
    }
    let Some(token) = gate.token() else {
        gate.demote();
        return LoadState::Unauthenticated;
    };

    let events = gate.events().clone();

    let envelope = match api.fetch_analytics(&token) {
        Ok(FetchOutcome::Unauthorized) => {
            events.record(Event::new(EventKind::FetchUnauthorized).status(401));
            gate.logout();
            return LoadState::Unauthenticated;
        }
        Ok(FetchOutcome::Envelope(envelope)) => envelope,
        Err(err) => {
            let message = format!("failed to fetch analytics data: {err:#}");
            return fail(&events, message);
        }
    };

    if !envelope.success {
        let message = format!(
            "API error: {}",
            envelope.error.as_deref().unwrap_or("unknown error")
        );
        return fail(&events, message);
    }

    let raw = envelope.data.unwrap_or_default();
    events.debug(&format!("received {} raw records", raw.len()));

    match records::normalize_all(&raw) {
        Ok(records) => {
            events.record(Event::new(EventKind::FetchSucceeded).records(records.len()));
            LoadState::Loaded(records)
        }
        Err(err) => fail(&events, format!("failed to normalize analytics data: {err:#}")),
    }
}

fn fail(events: &EventLog, message: String) -> LoadState {
    events.debug(&message);
    events.record(Event::new(EventKind::FetchFailed).message(message.clone()));
    LoadState::Failed(message)
}
