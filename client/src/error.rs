//! Client error taxonomy.

use alcove_model::{PlacementError, UnknownOverwriteKind};
use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by channel mutation and planning.
///
/// Everything except `RemoteRejected` is detected locally, before any
/// transport call is issued, so a failed request never leaves a partial
/// mutation on the server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Caller misuse. Never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request referenced something the cached state does not contain.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    /// The server rejected the call. Surfaced unchanged; the local cache is
    /// left untouched until the caller re-synchronizes.
    #[error(transparent)]
    RemoteRejected(#[from] TransportError),
}

impl From<PlacementError> for ClientError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::UnresolvedAnchor(_) => Self::UnresolvedReference(err.to_string()),
            PlacementError::NegativePosition
            | PlacementError::ConflictingAnchors
            | PlacementError::MissingAnchor => Self::InvalidRequest(err.to_string()),
        }
    }
}

impl From<UnknownOverwriteKind> for ClientError {
    fn from(err: UnknownOverwriteKind) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}
