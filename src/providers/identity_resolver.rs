use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::repositories::user_repository::UserRepository;
use crate::types::errors::{DomainError, DomainResult};

/// Typed view of an already-authenticated external principal. The
/// identity layer hands us this struct, never a raw claims map.
#[derive(Debug, Clone)]
pub struct ExternalPrincipal {
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub name: String,
}

impl ExternalPrincipal {
    pub fn identity_key(&self) -> String {
        format!("{}:{}", self.provider, self.subject)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.provider.trim().is_empty() || self.subject.trim().is_empty() {
            return Err(DomainError::Validation(
                "External principal is missing provider or subject".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Maps an external principal to the internal user id, `None` when no
    /// user record exists for it.
    async fn resolve(&self, principal: &ExternalPrincipal) -> DomainResult<Option<ObjectId>>;
}

pub struct UserDirectoryResolver {
    user_repository: Arc<dyn UserRepository>,
}

impl UserDirectoryResolver {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }
}

#[async_trait]
impl IdentityResolver for UserDirectoryResolver {
    async fn resolve(&self, principal: &ExternalPrincipal) -> DomainResult<Option<ObjectId>> {
        principal.validate()?;
        let user = self
            .user_repository
            .find_by_external_identity_id(&principal.identity_key())
            .await?;
        Ok(user.and_then(|u| u._id))
    }
}
