//! Ordered guard runner.
//!
//! Stage order is fixed: classifier, credential, op, ACL, then admin on
//! mutating endpoints. The first rejecting guard terminates the request;
//! later guards are never invoked.

use keygate_core::error::KeygateResult;
use tracing::debug;

use crate::context::{Endpoint, RequestContext};
use crate::guards::{AclCheck, AdminCheck, Classifier, CredentialCheck, Guard, OpCheck};

pub struct Pipeline {
    guards: Vec<Box<dyn Guard>>,
}

impl Pipeline {
    /// A pipeline over an explicit guard list, run in the given order.
    pub fn new(guards: Vec<Box<dyn Guard>>) -> Self {
        Self { guards }
    }

    /// The standard chain for `endpoint`.
    pub fn for_endpoint(endpoint: Endpoint) -> Self {
        let mut guards: Vec<Box<dyn Guard>> = vec![
            Box::new(Classifier),
            Box::new(CredentialCheck),
            Box::new(OpCheck),
            Box::new(AclCheck),
        ];
        if endpoint.requires_admin() {
            guards.push(Box::new(AdminCheck));
        }
        Self::new(guards)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    pub fn run(&self, ctx: &mut RequestContext) -> KeygateResult<()> {
        for guard in &self.guards {
            if let Err(e) = guard.authorize(ctx) {
                debug!(
                    stage = guard.name(),
                    endpoint = %ctx.endpoint,
                    request_id = ?ctx.request_id(),
                    error = %e,
                    "request rejected"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}
