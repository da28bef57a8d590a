//! The five request guards, in pipeline order.
//!
//! Guards only read request-local state and never touch the store.

use keygate_core::error::{KeygateError, KeygateResult};
use keygate_core::models::principal::Principal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::{RequestClass, RequestContext};
use crate::error::AuthError;

/// One stage of the validation pipeline.
///
/// `Ok(())` hands the request to the next stage; `Err` terminates it.
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;
    fn authorize(&self, ctx: &mut RequestContext) -> KeygateResult<()>;
}

fn class(ctx: &RequestContext) -> KeygateResult<&RequestClass> {
    ctx.class
        .as_ref()
        .ok_or_else(|| KeygateError::Internal("request reached a guard unclassified".into()))
}

fn principal(ctx: &RequestContext) -> KeygateResult<&Principal> {
    ctx.principal
        .as_ref()
        .ok_or_else(|| AuthError::MissingCredentials.into())
}

/// Tags the request with its endpoint requirements. Never rejects.
#[derive(Debug, Default)]
pub struct Classifier;

impl Guard for Classifier {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn authorize(&self, ctx: &mut RequestContext) -> KeygateResult<()> {
        let class = RequestClass {
            request_id: Uuid::new_v4(),
            endpoint: ctx.endpoint,
            op: ctx.endpoint.required_op(),
            acl: ctx.endpoint.required_acl(),
        };
        info!(
            request_id = %class.request_id,
            endpoint = %class.endpoint,
            op = %class.op,
            acl = %class.acl,
            "classified request"
        );
        ctx.class = Some(class);
        Ok(())
    }
}

/// Requires a resolved, unexpired principal.
#[derive(Debug, Default)]
pub struct CredentialCheck;

impl Guard for CredentialCheck {
    fn name(&self) -> &'static str {
        "credential"
    }

    fn authorize(&self, ctx: &mut RequestContext) -> KeygateResult<()> {
        let principal = principal(ctx)?;
        if principal.is_expired(ctx.received_at) {
            debug!(username = %principal.username, "rejecting expired credential");
            return Err(AuthError::CredentialExpired.into());
        }
        Ok(())
    }
}

/// Requires the endpoint's operation category.
#[derive(Debug, Default)]
pub struct OpCheck;

impl Guard for OpCheck {
    fn name(&self) -> &'static str {
        "op"
    }

    fn authorize(&self, ctx: &mut RequestContext) -> KeygateResult<()> {
        let op = class(ctx)?.op;
        if !principal(ctx)?.has_op(op) {
            return Err(AuthError::OpDenied(op.to_string()).into());
        }
        Ok(())
    }
}

/// Requires the endpoint's ACL category.
#[derive(Debug, Default)]
pub struct AclCheck;

impl Guard for AclCheck {
    fn name(&self) -> &'static str {
        "acl"
    }

    fn authorize(&self, ctx: &mut RequestContext) -> KeygateResult<()> {
        let acl = class(ctx)?.acl;
        if !principal(ctx)?.has_acl(acl) {
            return Err(AuthError::AclDenied(acl.to_string()).into());
        }
        Ok(())
    }
}

/// Requires an admin principal. Only mounted on mutating endpoints.
#[derive(Debug, Default)]
pub struct AdminCheck;

impl Guard for AdminCheck {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn authorize(&self, ctx: &mut RequestContext) -> KeygateResult<()> {
        if !principal(ctx)?.is_admin {
            return Err(AuthError::AdminRequired.into());
        }
        Ok(())
    }
}
