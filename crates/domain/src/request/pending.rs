//! A logical call in flight through the gateway

use super::RequestSpec;

/// The original call plus its replay marker.
///
/// A pending request lives for one logical call: the first dispatch and
/// at most one replay after a token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    /// The call as it will be (re)sent
    pub spec: RequestSpec,
    retried: bool,
}

impl PendingRequest {
    /// Wraps a request that has not been sent yet.
    #[must_use]
    pub const fn new(spec: RequestSpec) -> Self {
        Self {
            spec,
            retried: false,
        }
    }

    /// Returns true once the call has been resubmitted after a refresh.
    #[must_use]
    pub const fn retried(&self) -> bool {
        self.retried
    }

    /// Marks the call as replayed.
    ///
    /// Returns false if it was already marked; a call is replayed at most once.
    pub const fn mark_retried(&mut self) -> bool {
        if self.retried {
            return false;
        }
        self.retried = true;
        true
    }
}
