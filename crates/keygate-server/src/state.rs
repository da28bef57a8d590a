//! Shared application state.

use std::sync::Arc;

use keygate_auth::{AuthConfig, PermissionService, StoreAuthenticator};
use keygate_core::repository::PermissionRepository;

pub struct AppState<R: PermissionRepository> {
    pub service: PermissionService<R>,
    pub authenticator: StoreAuthenticator<R>,
}

impl<R: PermissionRepository + Clone> AppState<R> {
    pub fn new(repo: R, config: &AuthConfig) -> Arc<Self> {
        Arc::new(Self {
            service: PermissionService::new(repo.clone(), config),
            authenticator: StoreAuthenticator::new(repo, config),
        })
    }
}
