//! Newtype identifiers.
//!
//! Every dispatched request is tagged with a [`RequestId`] so tracing spans,
//! log events and the resulting [`crate::ResponseEnvelope`] can be correlated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one dispatched request (one round trip).
///
/// Generated fresh by the dispatcher for every call, even when the same
/// descriptor is dispatched twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RequestId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
