//! Context implementation for request-scoped data
//!
//! Every RPC builds one Context and passes it to the provider, resource or
//! data source handling it. It identifies the call for logging.

use std::sync::Arc;
use uuid::Uuid;

/// Context carries request-scoped values like the RPC identity
/// Pass this as first parameter to ALL async trait methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    request_id: Uuid,
    rpc: &'static str,
}

impl Context {
    pub fn new() -> Self {
        Self::for_rpc("internal")
    }

    /// Context for one incoming RPC, with a fresh request id
    pub fn for_rpc(rpc: &'static str) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                request_id: Uuid::new_v4(),
                rpc,
            }),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    pub fn rpc(&self) -> &'static str {
        self.inner.rpc
    }

    /// Span to instrument work done on behalf of this request
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "tf_rpc",
            rpc = self.inner.rpc,
            tf_req_id = %self.inner.request_id
        )
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_request_identity() {
        let ctx = Context::for_rpc("ReadResource");
        let clone = ctx.clone();

        assert_eq!(clone.request_id(), ctx.request_id());
        assert_eq!(clone.rpc(), "ReadResource");
    }

    #[test]
    fn every_rpc_gets_a_fresh_request_id() {
        let first = Context::for_rpc("ApplyResourceChange");
        let second = Context::for_rpc("ApplyResourceChange");

        assert_ne!(first.request_id(), second.request_id());
        assert_eq!(Context::new().rpc(), "internal");
    }
}
