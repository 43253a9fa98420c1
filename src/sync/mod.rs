//! Full-snapshot synchronisation between the server of record and offline
//! clients.
//!
//! The server only ever hands out complete owner-scoped dumps; diffing against
//! the local cache happens on the client (see [`reconcile`]).

pub mod reconcile;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ItemView, LoanDetail};

pub use reconcile::{reconcile, CachedItem, LocalCache, Reconciliation};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub items: Vec<ItemView>,
    pub loans: Vec<LoanDetail>,
    /// Server time at which the snapshot was read.
    pub as_of: DateTime<Utc>,
}
