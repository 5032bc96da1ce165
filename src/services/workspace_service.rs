use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use log::warn;
use mongodb::bson::oid::ObjectId;

use crate::constants::INVITE_TTL_DAYS;
use crate::models::notification_model::NotificationType;
use crate::models::workspace_model::{
    Workspace, WorkspaceInvite, WorkspaceMember, WorkspaceSettings,
};
use crate::repositories::{
    user_repository::UserRepository, workspace_repository::WorkspaceRepository,
};
use crate::services::notification_service::NotificationService;
use crate::types::errors::{DomainError, DomainResult};
use crate::types::models::role::Role;
use crate::types::requests::notification::send_notification_request::SendNotificationRequest;
use crate::types::requests::workspace::{
    create_workspace_request::CreateWorkspaceRequest,
    invite_requests::{AcceptInviteRequest, CreateInviteRequest},
};
use crate::types::responses::invite_view::InviteView;
use crate::utils::locale_utils::{Messages, Namespace};
use crate::utils::slug_utils::slugify;
use crate::utils::token_utils::generate_invite_token;

/// Attempts per mutation before conceding the optimistic-concurrency race.
/// Each attempt re-reads the workspace and re-runs the domain checks, so a
/// losing accept-invite racer surfaces "already accepted" instead of a raw
/// write conflict.
const CAS_ATTEMPTS: usize = 3;

pub struct WorkspaceService {
    workspace_repository: Arc<dyn WorkspaceRepository>,
    user_repository: Arc<dyn UserRepository>,
    notification_service: Arc<NotificationService>,
}

impl WorkspaceService {
    pub fn new(
        workspace_repository: Arc<dyn WorkspaceRepository>,
        user_repository: Arc<dyn UserRepository>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            workspace_repository,
            user_repository,
            notification_service,
        }
    }

    /// Read-check-mutate-write loop over one workspace document. The
    /// closure returns `false` to signal a deliberate no-op (nothing is
    /// written); domain errors from the checks pass straight through.
    async fn mutate_workspace<F>(
        &self,
        workspace_id: &ObjectId,
        messages: &Messages,
        mut apply: F,
    ) -> DomainResult<Workspace>
    where
        F: FnMut(&mut Workspace) -> DomainResult<bool>,
    {
        for _ in 0..CAS_ATTEMPTS {
            let mut workspace = self.get_workspace(workspace_id, messages).await?;

            if !apply(&mut workspace)? {
                return Ok(workspace);
            }

            if self.workspace_repository.update_versioned(&workspace).await? {
                workspace.version += 1;
                return Ok(workspace);
            }
        }

        Err(DomainError::Conflict(messages.get_str(
            Namespace::Workspace,
            "update.concurrent",
            "Workspace was modified concurrently, please retry",
        )))
    }

    pub async fn get_workspace(
        &self,
        workspace_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Workspace> {
        self.workspace_repository
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(messages.get_str(
                    Namespace::Workspace,
                    "fetch.not_found",
                    "Workspace not found",
                ))
            })
    }

    /// Workspaces the user owns or belongs to.
    pub async fn list_for_user(&self, user_id: &ObjectId) -> DomainResult<Vec<Workspace>> {
        self.workspace_repository.find_by_user(user_id).await
    }

    pub async fn delete_workspace(
        &self,
        workspace_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<()> {
        self.get_workspace(workspace_id, messages).await?;
        self.workspace_repository.delete(workspace_id).await
    }

    pub async fn create_workspace(
        &self,
        data: CreateWorkspaceRequest,
        messages: &Messages,
    ) -> DomainResult<Workspace> {
        if data.name.trim().is_empty() {
            return Err(DomainError::Validation(messages.get_str(
                Namespace::Workspace,
                "create.empty_name",
                "Workspace name must not be empty",
            )));
        }

        let slug = match &data.slug {
            Some(slug) => slug.clone(),
            None => slugify(&data.name),
        };
        if slug.is_empty() {
            return Err(DomainError::Validation(messages.get_str(
                Namespace::Workspace,
                "create.invalid_slug",
                "Workspace name does not yield a usable slug",
            )));
        }

        if self.workspace_repository.find_by_slug(&slug).await?.is_some() {
            return Err(DomainError::Conflict(messages.get_str(
                Namespace::Workspace,
                "create.slug_taken",
                "A workspace with this slug already exists",
            )));
        }

        let now = Utc::now();
        let workspace = Workspace {
            _id: Some(ObjectId::new()),
            name: data.name,
            slug,
            owner_id: data.owner_id,
            // The owner is implicit; no explicit OWNER member row is written.
            members: Vec::new(),
            invites: Vec::new(),
            settings: WorkspaceSettings::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.workspace_repository.insert(workspace).await
    }

    /// Roster including the synthesized implicit owner entry.
    pub async fn list_members(
        &self,
        workspace_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Vec<WorkspaceMember>> {
        let workspace = self.get_workspace(workspace_id, messages).await?;

        let mut roster = Vec::with_capacity(workspace.members.len() + 1);
        roster.push(WorkspaceMember {
            user_id: workspace.owner_id,
            role: Role::Owner,
            invited_by: None,
            invited_at: None,
            joined_at: workspace.created_at,
        });
        roster.extend(
            workspace
                .members
                .iter()
                .filter(|m| m.user_id != workspace.owner_id)
                .cloned(),
        );
        Ok(roster)
    }

    pub async fn add_member(
        &self,
        workspace_id: &ObjectId,
        user_id: ObjectId,
        role: Role,
        invited_by: Option<ObjectId>,
        messages: &Messages,
    ) -> DomainResult<Workspace> {
        if role == Role::Owner {
            return Err(DomainError::Validation(messages.get_str(
                Namespace::Workspace,
                "member.owner_role_reserved",
                "The OWNER role cannot be assigned",
            )));
        }

        self.mutate_workspace(workspace_id, messages, |workspace| {
            if workspace.is_member(&user_id) {
                return Err(DomainError::Conflict(messages.get_str(
                    Namespace::Workspace,
                    "member.duplicate",
                    "User is already a member of this workspace",
                )));
            }
            workspace.members.push(WorkspaceMember {
                user_id,
                role,
                invited_by,
                invited_at: None,
                joined_at: Utc::now(),
            });
            Ok(true)
        })
        .await
    }

    /// Removing a non-member is a deliberate no-op success; removing the
    /// owner is structurally impossible.
    pub async fn remove_member(
        &self,
        workspace_id: &ObjectId,
        user_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Workspace> {
        self.mutate_workspace(workspace_id, messages, |workspace| {
            if *user_id == workspace.owner_id {
                return Err(DomainError::Forbidden(messages.get_str(
                    Namespace::Workspace,
                    "member.owner_unremovable",
                    "The workspace owner cannot be removed",
                )));
            }
            let before = workspace.members.len();
            workspace.members.retain(|m| m.user_id != *user_id);
            Ok(workspace.members.len() != before)
        })
        .await
    }

    pub async fn change_member_role(
        &self,
        workspace_id: &ObjectId,
        user_id: &ObjectId,
        new_role: Role,
        messages: &Messages,
    ) -> DomainResult<Workspace> {
        if new_role == Role::Owner {
            return Err(DomainError::Validation(messages.get_str(
                Namespace::Workspace,
                "member.owner_role_reserved",
                "The OWNER role cannot be assigned",
            )));
        }

        self.mutate_workspace(workspace_id, messages, |workspace| {
            if *user_id == workspace.owner_id {
                return Err(DomainError::Forbidden(messages.get_str(
                    Namespace::Workspace,
                    "member.owner_immutable",
                    "The workspace owner's role cannot be changed",
                )));
            }
            let member = workspace
                .members
                .iter_mut()
                .find(|m| m.user_id == *user_id)
                .ok_or_else(|| {
                    DomainError::NotFound(messages.get_str(
                        Namespace::Workspace,
                        "member.not_found",
                        "User is not a member of this workspace",
                    ))
                })?;
            member.role = new_role;
            Ok(true)
        })
        .await
    }

    pub async fn create_invite(
        &self,
        workspace_id: &ObjectId,
        data: CreateInviteRequest,
        messages: &Messages,
    ) -> DomainResult<WorkspaceInvite> {
        // Membership by email is resolved once up front; the per-workspace
        // checks re-run inside the CAS loop.
        let invited_user = self.user_repository.find_by_email(&data.email).await?;

        let invite = WorkspaceInvite {
            id: ObjectId::new(),
            email: data.email.clone(),
            role: data.role,
            invited_by: data.invited_by,
            token: generate_invite_token(),
            expires_at: Utc::now() + Duration::days(INVITE_TTL_DAYS),
            created_at: Utc::now(),
            accepted: false,
            accepted_at: None,
            accepted_by: None,
        };

        let workspace = self
            .mutate_workspace(workspace_id, messages, |workspace| {
                let actor_role = workspace.effective_role(&data.invited_by);
                if !actor_role.map(Role::can_invite_members).unwrap_or(false) {
                    return Err(DomainError::Forbidden(messages.get_str(
                        Namespace::Workspace,
                        "invite.forbidden",
                        "Only admins and the owner can invite members",
                    )));
                }

                if let Some(user) = &invited_user {
                    let already_member = user
                        ._id
                        .map(|id| workspace.is_member(&id))
                        .unwrap_or(false);
                    if already_member {
                        return Err(DomainError::Conflict(messages.get_str(
                            Namespace::Workspace,
                            "invite.member_exists",
                            "This email already belongs to a workspace member",
                        )));
                    }
                }

                if workspace.live_invite_for_email(&data.email).is_some() {
                    return Err(DomainError::Conflict(messages.get_str(
                        Namespace::Workspace,
                        "invite.duplicate",
                        "A live invite already exists for this email",
                    )));
                }

                workspace.invites.push(invite.clone());
                Ok(true)
            })
            .await?;

        self.send_invite_email(&workspace, &invite, messages).await;

        Ok(invite)
    }

    /// Invitation email through the delivery engine. Delivery problems are
    /// recorded on the notification, not surfaced here; the invite stands
    /// either way.
    async fn send_invite_email(
        &self,
        workspace: &Workspace,
        invite: &WorkspaceInvite,
        messages: &Messages,
    ) {
        let mut template_data = BTreeMap::new();
        template_data.insert("workspace_name".to_string(), workspace.name.clone());
        template_data.insert("role".to_string(), invite.role.to_string());
        template_data.insert("token".to_string(), invite.token.clone());

        let subject = messages.get_str(
            Namespace::Notification,
            "invite.subject",
            "You have been invited to a workspace",
        );
        let content = format!(
            "You have been invited to join the \"{}\" workspace as {}. Use invite token {} to accept.",
            workspace.name, invite.role, invite.token
        );

        let result = self
            .notification_service
            .send(
                SendNotificationRequest {
                    notification_type: NotificationType::Email,
                    recipient: invite.email.clone(),
                    subject,
                    content,
                    template_id: Some("workspace-invite".to_string()),
                    template_data,
                },
                messages,
            )
            .await;

        match result {
            Ok(outcome) if !outcome.success => {
                warn!(
                    "invite email to {} was not delivered: {:?}",
                    invite.email, outcome.notification.failure_reason
                );
            }
            Err(err) => warn!("invite email to {} could not be recorded: {}", invite.email, err),
            Ok(_) => {}
        }
    }

    /// Read-only invite resolution; never mutates state.
    pub async fn validate_invite(
        &self,
        workspace_id: &ObjectId,
        token: &str,
        messages: &Messages,
    ) -> DomainResult<InviteView> {
        let workspace = self.get_workspace(workspace_id, messages).await?;
        let invite = workspace.invite_by_token(token).ok_or_else(|| {
            DomainError::NotFound(messages.get_str(
                Namespace::Workspace,
                "invite.not_found",
                "Invite not found",
            ))
        })?;
        Ok(InviteView::from_invite(invite, Utc::now()))
    }

    /// The accept protocol. All checks and both mutations (member added,
    /// invite consumed) commit in one versioned write; of two concurrent
    /// acceptors exactly one wins and the other observes "already
    /// accepted" on its re-read.
    pub async fn accept_invite(
        &self,
        workspace_id: &ObjectId,
        data: AcceptInviteRequest,
        messages: &Messages,
    ) -> DomainResult<Workspace> {
        self.mutate_workspace(workspace_id, messages, |workspace| {
            let now = Utc::now();
            let position = workspace
                .invites
                .iter()
                .position(|i| i.token == data.token)
                .ok_or_else(|| {
                    DomainError::NotFound(messages.get_str(
                        Namespace::Workspace,
                        "invite.not_found",
                        "Invite not found",
                    ))
                })?;

            let invite = &workspace.invites[position];
            if invite.accepted {
                return Err(DomainError::Conflict(messages.get_str(
                    Namespace::Workspace,
                    "invite.already_accepted",
                    "Invite already accepted",
                )));
            }
            if invite.is_expired(now) {
                return Err(DomainError::Expired(messages.get_str(
                    Namespace::Workspace,
                    "invite.expired",
                    "Invite has expired",
                )));
            }
            if !invite.email.eq_ignore_ascii_case(&data.email) {
                return Err(DomainError::Validation(messages.get_str(
                    Namespace::Workspace,
                    "invite.email_mismatch",
                    "Invite was issued to a different email address",
                )));
            }
            if workspace.is_member(&data.user_id) {
                return Err(DomainError::Conflict(messages.get_str(
                    Namespace::Workspace,
                    "member.duplicate",
                    "User is already a member of this workspace",
                )));
            }

            let (role, invited_by, invited_at) =
                (invite.role, invite.invited_by, invite.created_at);

            let invite = &mut workspace.invites[position];
            invite.accepted = true;
            invite.accepted_at = Some(now);
            invite.accepted_by = Some(data.user_id);

            workspace.members.push(WorkspaceMember {
                user_id: data.user_id,
                role,
                invited_by: Some(invited_by),
                invited_at: Some(invited_at),
                joined_at: now,
            });

            Ok(true)
        })
        .await
    }

    pub async fn revoke_invite(
        &self,
        workspace_id: &ObjectId,
        invite_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<bool> {
        self.mutate_workspace(workspace_id, messages, |workspace| {
            let invite = workspace
                .invites
                .iter()
                .find(|i| i.id == *invite_id)
                .ok_or_else(|| {
                    DomainError::NotFound(messages.get_str(
                        Namespace::Workspace,
                        "invite.not_found",
                        "Invite not found",
                    ))
                })?;
            if invite.accepted {
                return Err(DomainError::Conflict(messages.get_str(
                    Namespace::Workspace,
                    "invite.already_accepted",
                    "Invite already accepted",
                )));
            }
            workspace.invites.retain(|i| i.id != *invite_id);
            Ok(true)
        })
        .await?;

        Ok(true)
    }

    pub async fn list_invites(
        &self,
        workspace_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Vec<InviteView>> {
        let workspace = self.get_workspace(workspace_id, messages).await?;
        let now = Utc::now();
        Ok(workspace
            .invites
            .iter()
            .map(|invite| InviteView::from_invite(invite, now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user_model::User;
    use crate::providers::delivery_provider::MockDeliveryProvider;
    use crate::repositories::memory::{
        InMemoryNotificationRepository, InMemoryUserRepository, InMemoryWorkspaceRepository,
    };
    use crate::utils::locale_utils::Lang;
    use std::time::Duration as StdDuration;

    struct Fixture {
        service: WorkspaceService,
        workspaces: Arc<InMemoryWorkspaceRepository>,
        users: Arc<InMemoryUserRepository>,
        provider: Arc<MockDeliveryProvider>,
        messages: Messages,
    }

    fn fixture() -> Fixture {
        let workspaces = Arc::new(InMemoryWorkspaceRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let provider = Arc::new(MockDeliveryProvider::new());
        let notifications = Arc::new(NotificationService::new(
            Arc::new(InMemoryNotificationRepository::default()),
            provider.clone(),
            StdDuration::from_millis(200),
        ));
        Fixture {
            service: WorkspaceService::new(workspaces.clone(), users.clone(), notifications),
            workspaces,
            users,
            provider,
            messages: Messages::new(Lang::En),
        }
    }

    async fn create_workspace(fx: &Fixture, owner_id: ObjectId) -> Workspace {
        fx.service
            .create_workspace(
                CreateWorkspaceRequest {
                    name: "Design Team".to_string(),
                    slug: None,
                    owner_id,
                },
                &fx.messages,
            )
            .await
            .unwrap()
    }

    async fn invite(fx: &Fixture, workspace: &Workspace, email: &str, role: Role) -> WorkspaceInvite {
        fx.service
            .create_invite(
                &workspace._id.unwrap(),
                CreateInviteRequest {
                    email: email.to_string(),
                    role,
                    invited_by: workspace.owner_id,
                },
                &fx.messages,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_workspace_derives_slug_and_keeps_roster_empty() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;

        assert_eq!(workspace.slug, "design-team");
        assert!(workspace.members.is_empty());
        assert_eq!(workspace.version, 0);
    }

    #[tokio::test]
    async fn create_workspace_rejects_empty_name() {
        let fx = fixture();
        let result = fx
            .service
            .create_workspace(
                CreateWorkspaceRequest {
                    name: "   ".to_string(),
                    slug: None,
                    owner_id: ObjectId::new(),
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn create_workspace_rejects_slug_collision() {
        let fx = fixture();
        create_workspace(&fx, ObjectId::new()).await;

        let result = fx
            .service
            .create_workspace(
                CreateWorkspaceRequest {
                    name: "Design  Team".to_string(),
                    slug: Some("design-team".to_string()),
                    owner_id: ObjectId::new(),
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn owner_cannot_be_added_again_as_member() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let workspace = create_workspace(&fx, owner_id).await;

        let result = fx
            .service
            .add_member(
                &workspace._id.unwrap(),
                owner_id,
                Role::Editor,
                None,
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn owner_removal_always_fails() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let workspace = create_workspace(&fx, owner_id).await;

        let result = fx
            .service
            .remove_member(&workspace._id.unwrap(), &owner_id, &fx.messages)
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn removing_a_non_member_is_idempotent() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();
        let stranger = ObjectId::new();

        let first = fx
            .service
            .remove_member(&workspace_id, &stranger, &fx.messages)
            .await
            .unwrap();
        let second = fx
            .service
            .remove_member(&workspace_id, &stranger, &fx.messages)
            .await
            .unwrap();

        // No write happened either time.
        assert_eq!(first.version, 0);
        assert_eq!(second.version, 0);
    }

    #[tokio::test]
    async fn change_role_requires_an_existing_member() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let workspace = create_workspace(&fx, owner_id).await;
        let workspace_id = workspace._id.unwrap();

        let absent = fx
            .service
            .change_member_role(&workspace_id, &ObjectId::new(), Role::Admin, &fx.messages)
            .await;
        assert!(matches!(absent, Err(DomainError::NotFound(_))));

        let owner = fx
            .service
            .change_member_role(&workspace_id, &owner_id, Role::Viewer, &fx.messages)
            .await;
        assert!(matches!(owner, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn invite_accept_round_trip_adds_member() {
        // Scenario A: owner invites a@x.com as EDITOR, U2 accepts.
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let view = fx
            .service
            .validate_invite(&workspace_id, &created.token, &fx.messages)
            .await
            .unwrap();
        assert!(!view.accepted);
        assert!(!view.expired);

        let accepting_user = ObjectId::new();
        let updated = fx
            .service
            .accept_invite(
                &workspace_id,
                AcceptInviteRequest {
                    token: created.token.clone(),
                    user_id: accepting_user,
                    email: "a@x.com".to_string(),
                },
                &fx.messages,
            )
            .await
            .unwrap();

        let member = updated
            .members
            .iter()
            .find(|m| m.user_id == accepting_user)
            .expect("accepted user joins the roster");
        assert_eq!(member.role, Role::Editor);
        assert_eq!(member.invited_by, Some(workspace.owner_id));

        let view = fx
            .service
            .validate_invite(&workspace_id, &created.token, &fx.messages)
            .await
            .unwrap();
        assert!(view.accepted);
        assert!(view.accepted_at.is_some());
    }

    #[tokio::test]
    async fn second_accept_of_the_same_token_conflicts() {
        // Scenario B.
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let request = AcceptInviteRequest {
            token: created.token.clone(),
            user_id: ObjectId::new(),
            email: "a@x.com".to_string(),
        };
        fx.service
            .accept_invite(&workspace_id, request, &fx.messages)
            .await
            .unwrap();

        let second = fx
            .service
            .accept_invite(
                &workspace_id,
                AcceptInviteRequest {
                    token: created.token,
                    user_id: ObjectId::new(),
                    email: "a@x.com".to_string(),
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(second, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn expired_invite_cannot_be_accepted() {
        // Scenario C: force the invite past its TTL, then accept.
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let mut stored = fx
            .workspaces
            .find_by_id(&workspace_id)
            .await
            .unwrap()
            .unwrap();
        stored.invites[0].expires_at = Utc::now() - Duration::seconds(1);
        assert!(fx.workspaces.update_versioned(&stored).await.unwrap());

        let result = fx
            .service
            .accept_invite(
                &workspace_id,
                AcceptInviteRequest {
                    token: created.token.clone(),
                    user_id: ObjectId::new(),
                    email: "a@x.com".to_string(),
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Expired(_))));

        // validate_invite reports expiry without consuming anything.
        let view = fx
            .service
            .validate_invite(&workspace_id, &created.token, &fx.messages)
            .await
            .unwrap();
        assert!(view.expired);
        assert!(!view.accepted);
    }

    #[tokio::test]
    async fn accept_rejects_a_different_email() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let result = fx
            .service
            .accept_invite(
                &workspace._id.unwrap(),
                AcceptInviteRequest {
                    token: created.token,
                    user_id: ObjectId::new(),
                    email: "someone-else@x.com".to_string(),
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_live_invite_is_rejected() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let result = fx
            .service
            .create_invite(
                &workspace._id.unwrap(),
                CreateInviteRequest {
                    email: "a@x.com".to_string(),
                    role: Role::Viewer,
                    invited_by: workspace.owner_id,
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn inviting_an_existing_members_email_conflicts() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();

        let user = fx
            .users
            .insert(User {
                _id: None,
                external_identity_id: "oidc:member".to_string(),
                email: "member@x.com".to_string(),
                name: "Member".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        fx.service
            .add_member(
                &workspace_id,
                user._id.unwrap(),
                Role::Viewer,
                None,
                &fx.messages,
            )
            .await
            .unwrap();

        let result = fx
            .service
            .create_invite(
                &workspace_id,
                CreateInviteRequest {
                    email: "member@x.com".to_string(),
                    role: Role::Editor,
                    invited_by: workspace.owner_id,
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn low_privilege_actors_cannot_invite() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();
        let editor = ObjectId::new();
        fx.service
            .add_member(&workspace_id, editor, Role::Editor, None, &fx.messages)
            .await
            .unwrap();

        let result = fx
            .service
            .create_invite(
                &workspace_id,
                CreateInviteRequest {
                    email: "new@x.com".to_string(),
                    role: Role::Viewer,
                    invited_by: editor,
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn creating_an_invite_sends_one_email() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let calls = fx.provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].recipient, "a@x.com");
        assert!(calls[0].content.contains(&created.token));
        assert_eq!(calls[0].template_id.as_deref(), Some("workspace-invite"));
    }

    #[tokio::test]
    async fn invite_survives_a_failed_email_delivery() {
        let fx = fixture();
        fx.provider.queue_failure("smtp down");
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let view = fx
            .service
            .validate_invite(&workspace._id.unwrap(), &created.token, &fx.messages)
            .await
            .unwrap();
        assert!(!view.accepted);
    }

    #[tokio::test]
    async fn revoke_removes_unaccepted_invites_only() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        assert!(
            fx.service
                .revoke_invite(&workspace_id, &created.id, &fx.messages)
                .await
                .unwrap()
        );
        let gone = fx
            .service
            .validate_invite(&workspace_id, &created.token, &fx.messages)
            .await;
        assert!(matches!(gone, Err(DomainError::NotFound(_))));

        let accepted = invite(&fx, &workspace, "b@x.com", Role::Editor).await;
        fx.service
            .accept_invite(
                &workspace_id,
                AcceptInviteRequest {
                    token: accepted.token,
                    user_id: ObjectId::new(),
                    email: "b@x.com".to_string(),
                },
                &fx.messages,
            )
            .await
            .unwrap();
        let result = fx
            .service
            .revoke_invite(&workspace_id, &accepted.id, &fx.messages)
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn stale_acceptor_observes_already_accepted() {
        // Two acceptors race on one token: the loser's re-read must
        // surface the consumed invite, not a partial write.
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();
        let created = invite(&fx, &workspace, "a@x.com", Role::Editor).await;

        let (first, second) = tokio::join!(
            fx.service.accept_invite(
                &workspace_id,
                AcceptInviteRequest {
                    token: created.token.clone(),
                    user_id: ObjectId::new(),
                    email: "a@x.com".to_string(),
                },
                &fx.messages,
            ),
            fx.service.accept_invite(
                &workspace_id,
                AcceptInviteRequest {
                    token: created.token.clone(),
                    user_id: ObjectId::new(),
                    email: "a@x.com".to_string(),
                },
                &fx.messages,
            )
        );

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);

        let roster = fx
            .workspaces
            .find_by_id(&workspace_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(roster.members.len(), 1);
        assert!(roster.invites[0].accepted);
    }

    #[tokio::test]
    async fn list_for_user_sees_owned_and_joined_workspaces() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let workspace = create_workspace(&fx, owner_id).await;
        let member = ObjectId::new();
        fx.service
            .add_member(&workspace._id.unwrap(), member, Role::Viewer, None, &fx.messages)
            .await
            .unwrap();

        assert_eq!(fx.service.list_for_user(&owner_id).await.unwrap().len(), 1);
        assert_eq!(fx.service.list_for_user(&member).await.unwrap().len(), 1);
        assert!(fx.service.list_for_user(&ObjectId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_workspace_requires_an_existing_one() {
        let fx = fixture();
        let workspace = create_workspace(&fx, ObjectId::new()).await;
        let workspace_id = workspace._id.unwrap();

        fx.service
            .delete_workspace(&workspace_id, &fx.messages)
            .await
            .unwrap();
        let gone = fx
            .service
            .delete_workspace(&workspace_id, &fx.messages)
            .await;
        assert!(matches!(gone, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_members_synthesizes_the_owner_entry() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let workspace = create_workspace(&fx, owner_id).await;
        let workspace_id = workspace._id.unwrap();
        fx.service
            .add_member(&workspace_id, ObjectId::new(), Role::Viewer, None, &fx.messages)
            .await
            .unwrap();

        let roster = fx.service.list_members(&workspace_id, &fx.messages).await.unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].user_id, owner_id);
        assert_eq!(roster[0].role, Role::Owner);
    }
}
