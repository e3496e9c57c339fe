use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::Actor;
use crate::error::{AppError, Result};
use crate::models::{Role, UserProfile};
use crate::store::{ProfileUpsert, UserStore};

/// Identity asserted by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Caller with their effective role: the stored profile role when a profile exists,
    /// otherwise the role carried by the token.
    pub async fn resolve_actor(&self, identity: &Identity) -> Result<Actor> {
        let profile = self.users.get_profile(identity.id).await?;

        let (role, display_name) = match profile {
            Some(profile) => (profile.role, Some(profile.display_name)),
            None => (identity.role, identity.name.clone()),
        };

        Ok(Actor {
            id: identity.id,
            role,
            display_name: display_name.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Own profile, created from the token on first access.
    pub async fn profile(&self, identity: &Identity) -> Result<UserProfile> {
        if let Some(profile) = self.users.get_profile(identity.id).await? {
            return Ok(profile);
        }

        let display_name = identity
            .name
            .clone()
            .or_else(|| {
                identity
                    .email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let profile = self
            .users
            .upsert_profile(ProfileUpsert {
                id: identity.id,
                display_name,
                email: identity.email.clone(),
                initial_role: identity.role,
            })
            .await?;

        info!(user_id = %profile.id, role = %profile.role, "Profile created");
        Ok(profile)
    }

    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<UserProfile>> {
        require_admin(actor)?;
        self.users.list_profiles().await
    }

    pub async fn update_role(&self, actor: &Actor, user_id: Uuid, role: Role) -> Result<UserProfile> {
        require_admin(actor)?;

        let profile = self
            .users
            .update_role(user_id, role)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        info!(user_id = %user_id, role = %role, admin_id = %actor.id, "Role updated");
        Ok(profile)
    }
}

fn require_admin(actor: &Actor) -> Result<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
