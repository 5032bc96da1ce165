//! In-memory repository implementations with the same compare-and-swap
//! semantics as the MongoDB ones. They back the service unit tests and are
//! handy for running the binary without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::models::{
    notification_model::{Notification, NotificationStatus, NotificationType},
    project_model::Project,
    user_model::User,
    workspace_model::Workspace,
};
use crate::repositories::{
    notification_repository::NotificationRepository, project_repository::ProjectRepository,
    user_repository::UserRepository, workspace_repository::WorkspaceRepository,
};
use crate::types::errors::DomainResult;

#[derive(Default)]
pub struct InMemoryWorkspaceRepository {
    workspaces: Mutex<HashMap<ObjectId, Workspace>>,
}

#[async_trait]
impl WorkspaceRepository for InMemoryWorkspaceRepository {
    async fn insert(&self, mut workspace: Workspace) -> DomainResult<Workspace> {
        let id = *workspace._id.get_or_insert_with(ObjectId::new);
        self.workspaces
            .lock()
            .unwrap()
            .insert(id, workspace.clone());
        Ok(workspace)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Workspace>> {
        Ok(self.workspaces.lock().unwrap().get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Workspace>> {
        Ok(self
            .workspaces
            .lock()
            .unwrap()
            .values()
            .find(|w| w.slug == slug)
            .cloned())
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> DomainResult<Vec<Workspace>> {
        Ok(self
            .workspaces
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.owner_id == *user_id || w.members.iter().any(|m| m.user_id == *user_id))
            .cloned()
            .collect())
    }

    async fn update_versioned(&self, workspace: &Workspace) -> DomainResult<bool> {
        let mut guard = self.workspaces.lock().unwrap();
        let Some(id) = workspace._id else {
            return Ok(false);
        };
        match guard.get_mut(&id) {
            Some(stored) if stored.version == workspace.version => {
                let mut updated = workspace.clone();
                updated.version = workspace.version + 1;
                updated.updated_at = Utc::now();
                *stored = updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
        self.workspaces.lock().unwrap().remove(id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProjectRepository {
    projects: Mutex<HashMap<ObjectId, Project>>,
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn insert(&self, mut project: Project) -> DomainResult<Project> {
        let id = *project._id.get_or_insert_with(ObjectId::new);
        self.projects.lock().unwrap().insert(id, project.clone());
        Ok(project)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Project>> {
        Ok(self.projects.lock().unwrap().get(id).cloned())
    }

    async fn find_by_workspace(&self, workspace_id: &ObjectId) -> DomainResult<Vec<Project>> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.workspace_id == *workspace_id)
            .cloned()
            .collect())
    }

    async fn find_by_workspace_and_slug(
        &self,
        workspace_id: &ObjectId,
        slug: &str,
    ) -> DomainResult<Option<Project>> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .values()
            .find(|p| p.workspace_id == *workspace_id && p.slug == slug)
            .cloned())
    }

    async fn update_versioned(&self, project: &Project) -> DomainResult<bool> {
        let mut guard = self.projects.lock().unwrap();
        let Some(id) = project._id else {
            return Ok(false);
        };
        match guard.get_mut(&id) {
            Some(stored) if stored.version == project.version => {
                let mut updated = project.clone();
                updated.version = project.version + 1;
                updated.updated_at = Utc::now();
                *stored = updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
        self.projects.lock().unwrap().remove(id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: Mutex<HashMap<ObjectId, Notification>>,
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, mut notification: Notification) -> DomainResult<Notification> {
        let id = *notification._id.get_or_insert_with(ObjectId::new);
        self.notifications
            .lock()
            .unwrap()
            .insert(id, notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Notification>> {
        Ok(self.notifications.lock().unwrap().get(id).cloned())
    }

    async fn update_versioned(&self, notification: &Notification) -> DomainResult<bool> {
        let mut guard = self.notifications.lock().unwrap();
        let Some(id) = notification._id else {
            return Ok(false);
        };
        match guard.get_mut(&id) {
            Some(stored) if stored.version == notification.version => {
                let mut updated = notification.clone();
                updated.version = notification.version + 1;
                *stored = updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_retryable(&self, limit: i64) -> DomainResult<Vec<Notification>> {
        let mut matches: Vec<Notification> = self
            .notifications
            .lock()
            .unwrap()
            .values()
            .filter(|n| {
                n.status == NotificationStatus::Failed
                    && n.notification_type == NotificationType::Email
                    && !n.retries_exhausted()
            })
            .cloned()
            .collect();
        matches.sort_by_key(|n| n.failed_at);
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn find_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> DomainResult<Vec<Notification>> {
        let mut matches: Vec<Notification> = self
            .notifications
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.is_due(now))
            .cloned()
            .collect();
        matches.sort_by_key(|n| n.created_at);
        matches.truncate(limit as usize);
        Ok(matches)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<ObjectId, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> DomainResult<User> {
        let id = *user._id.get_or_insert_with(ObjectId::new);
        self.users.lock().unwrap().insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_external_identity_id(
        &self,
        external_identity_id: &str,
    ) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.external_identity_id == external_identity_id)
            .cloned())
    }
}
