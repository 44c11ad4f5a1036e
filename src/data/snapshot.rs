//! Immutable candidate-pool snapshots
//!
//! A refresh builds a whole new [`PropSnapshot`] and publishes it through a
//! [`SnapshotHandle`]. Builds hold an `Arc` to whichever snapshot was current
//! when they started, so they never observe a pool mid-refresh.

use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::models::{ScoredProp, Sport};

/// Scored prop pool for one sport at one point in time
#[derive(Debug, Clone)]
pub struct PropSnapshot {
    sport: Sport,
    taken_at: DateTime<Utc>,
    props: Arc<[ScoredProp]>,
}

impl PropSnapshot {
    pub fn new(sport: Sport, props: Vec<ScoredProp>) -> Self {
        Self::with_timestamp(sport, props, Utc::now())
    }

    pub fn with_timestamp(
        sport: Sport,
        props: Vec<ScoredProp>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sport,
            taken_at,
            props: props.into(),
        }
    }

    /// Snapshot with no props, e.g. before the first refresh
    pub fn empty(sport: Sport) -> Self {
        Self::new(sport, Vec::new())
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn props(&self) -> &[ScoredProp] {
        &self.props
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// Shared pointer to the current snapshot
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<PropSnapshot>>,
}

impl SnapshotHandle {
    pub fn new(initial: PropSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Snapshot current at the time of the call
    pub fn current(&self) -> Arc<PropSnapshot> {
        // a poisoned lock still holds a whole snapshot
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Make `snapshot` current and return the one it replaced
    pub fn publish(&self, snapshot: PropSnapshot) -> Arc<PropSnapshot> {
        let next = Arc::new(snapshot);
        info!(
            "Publishing {} snapshot with {} props (taken {})",
            next.sport(),
            next.len(),
            next.taken_at().to_rfc3339()
        );

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
