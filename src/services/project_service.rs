use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::models::project_model::{
    EffectiveMember, Project, ProjectAccess, ProjectMember, ProjectVisibility,
};
use crate::models::workspace_model::Workspace;
use crate::repositories::{
    project_repository::ProjectRepository, workspace_repository::WorkspaceRepository,
};
use crate::types::errors::{DomainError, DomainResult};
use crate::types::models::role::Role;
use crate::types::requests::project::project_requests::CreateProjectRequest;
use crate::utils::locale_utils::{Messages, Namespace};
use crate::utils::slug_utils::slugify;

const CAS_ATTEMPTS: usize = 3;

pub struct ProjectService {
    project_repository: Arc<dyn ProjectRepository>,
    workspace_repository: Arc<dyn WorkspaceRepository>,
}

impl ProjectService {
    pub fn new(
        project_repository: Arc<dyn ProjectRepository>,
        workspace_repository: Arc<dyn WorkspaceRepository>,
    ) -> Self {
        Self {
            project_repository,
            workspace_repository,
        }
    }

    async fn get_workspace(
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

    pub async fn get_project(
        &self,
        project_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Project> {
        self.project_repository
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(messages.get_str(
                    Namespace::Project,
                    "fetch.not_found",
                    "Project not found",
                ))
            })
    }

    /// Read-check-mutate-write loop mirroring the workspace side.
    async fn mutate_project<F>(
        &self,
        project_id: &ObjectId,
        messages: &Messages,
        mut apply: F,
    ) -> DomainResult<Project>
    where
        F: FnMut(&mut Project) -> DomainResult<bool>,
    {
        for _ in 0..CAS_ATTEMPTS {
            let mut project = self.get_project(project_id, messages).await?;

            if !apply(&mut project)? {
                return Ok(project);
            }

            if self.project_repository.update_versioned(&project).await? {
                project.version += 1;
                return Ok(project);
            }
        }

        Err(DomainError::Conflict(messages.get_str(
            Namespace::Project,
            "update.concurrent",
            "Project was modified concurrently, please retry",
        )))
    }

    pub async fn create_project(
        &self,
        workspace_id: &ObjectId,
        data: CreateProjectRequest,
        messages: &Messages,
    ) -> DomainResult<Project> {
        if data.name.trim().is_empty() {
            return Err(DomainError::Validation(messages.get_str(
                Namespace::Project,
                "create.empty_name",
                "Project name must not be empty",
            )));
        }

        // Trips NotFound before any uniqueness check runs.
        self.get_workspace(workspace_id, messages).await?;

        let slug = match &data.slug {
            Some(slug) => slug.clone(),
            None => slugify(&data.name),
        };
        if slug.is_empty() {
            return Err(DomainError::Validation(messages.get_str(
                Namespace::Project,
                "create.invalid_slug",
                "Project name does not yield a usable slug",
            )));
        }

        if self
            .project_repository
            .find_by_workspace_and_slug(workspace_id, &slug)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(messages.get_str(
                Namespace::Project,
                "create.slug_taken",
                "A project with this slug already exists in the workspace",
            )));
        }

        let now = Utc::now();
        let project = Project {
            _id: Some(ObjectId::new()),
            workspace_id: *workspace_id,
            name: data.name,
            slug,
            access: match data.visibility {
                ProjectVisibility::Public => ProjectAccess::Public,
                ProjectVisibility::Private => ProjectAccess::Private(Vec::new()),
            },
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.project_repository.insert(project).await
    }

    /// Resolved authorized-member set. A private roster is returned
    /// verbatim; a public project's set is derived from the workspace at
    /// read time, so whatever roster a formerly-private document once
    /// held never leaks through.
    pub async fn get_effective_members(
        &self,
        project_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Vec<EffectiveMember>> {
        let project = self.get_project(project_id, messages).await?;

        match &project.access {
            ProjectAccess::Private(members) => Ok(members
                .iter()
                .map(|m| EffectiveMember {
                    user_id: m.user_id,
                    role: m.role,
                    added_at: m.added_at,
                    added_by: Some(m.added_by),
                })
                .collect()),
            ProjectAccess::Public => {
                let workspace = self.get_workspace(&project.workspace_id, messages).await?;

                let mut effective = Vec::with_capacity(workspace.members.len() + 1);
                effective.push(EffectiveMember {
                    user_id: workspace.owner_id,
                    role: Role::Owner,
                    added_at: workspace.created_at,
                    added_by: None,
                });
                // The owner entry wins over any stray roster row.
                effective.extend(
                    workspace
                        .members
                        .iter()
                        .filter(|m| m.user_id != workspace.owner_id)
                        .map(|m| EffectiveMember {
                            user_id: m.user_id,
                            role: m.role,
                            added_at: m.joined_at,
                            added_by: m.invited_by,
                        }),
                );
                Ok(effective)
            }
        }
    }

    /// A user's resolved role on a project, if any.
    pub async fn effective_role(
        &self,
        project_id: &ObjectId,
        user_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Option<Role>> {
        Ok(self
            .get_effective_members(project_id, messages)
            .await?
            .into_iter()
            .find(|m| m.user_id == *user_id)
            .map(|m| m.role))
    }

    pub async fn add_member(
        &self,
        project_id: &ObjectId,
        user_id: ObjectId,
        role: Role,
        added_by: ObjectId,
        messages: &Messages,
    ) -> DomainResult<Project> {
        self.mutate_project(project_id, messages, |project| {
            let members = Self::private_roster_mut(project, messages)?;
            if members.iter().any(|m| m.user_id == user_id) {
                return Err(DomainError::Conflict(messages.get_str(
                    Namespace::Project,
                    "member.duplicate",
                    "User is already a member of this project",
                )));
            }
            members.push(ProjectMember {
                user_id,
                role,
                added_at: Utc::now(),
                added_by,
            });
            Ok(true)
        })
        .await
    }

    pub async fn remove_member(
        &self,
        project_id: &ObjectId,
        user_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Project> {
        self.mutate_project(project_id, messages, |project| {
            let members = Self::private_roster_mut(project, messages)?;
            let before = members.len();
            members.retain(|m| m.user_id != *user_id);
            if members.len() == before {
                return Err(DomainError::NotFound(messages.get_str(
                    Namespace::Project,
                    "member.not_found",
                    "User is not a member of this project",
                )));
            }
            Ok(true)
        })
        .await
    }

    pub async fn update_member_role(
        &self,
        project_id: &ObjectId,
        user_id: &ObjectId,
        new_role: Role,
        messages: &Messages,
    ) -> DomainResult<Project> {
        self.mutate_project(project_id, messages, |project| {
            let members = Self::private_roster_mut(project, messages)?;
            let member = members
                .iter_mut()
                .find(|m| m.user_id == *user_id)
                .ok_or_else(|| {
                    DomainError::NotFound(messages.get_str(
                        Namespace::Project,
                        "member.not_found",
                        "User is not a member of this project",
                    ))
                })?;
            member.role = new_role;
            Ok(true)
        })
        .await
    }

    /// PRIVATE -> PUBLIC discards the stored roster for good;
    /// PUBLIC -> PRIVATE starts with an empty one. A same-visibility call
    /// is a no-op that writes nothing.
    pub async fn set_visibility(
        &self,
        project_id: &ObjectId,
        visibility: ProjectVisibility,
        messages: &Messages,
    ) -> DomainResult<Project> {
        self.mutate_project(project_id, messages, |project| {
            if project.visibility() == visibility {
                return Ok(false);
            }
            project.access = match visibility {
                ProjectVisibility::Public => ProjectAccess::Public,
                ProjectVisibility::Private => ProjectAccess::Private(Vec::new()),
            };
            Ok(true)
        })
        .await
    }

    pub async fn list_projects(&self, workspace_id: &ObjectId) -> DomainResult<Vec<Project>> {
        self.project_repository.find_by_workspace(workspace_id).await
    }

    pub async fn delete_project(
        &self,
        project_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<()> {
        self.get_project(project_id, messages).await?;
        self.project_repository.delete(project_id).await
    }

    fn private_roster_mut<'a>(
        project: &'a mut Project,
        messages: &Messages,
    ) -> DomainResult<&'a mut Vec<ProjectMember>> {
        match &mut project.access {
            ProjectAccess::Private(members) => Ok(members),
            ProjectAccess::Public => Err(DomainError::Validation(messages.get_str(
                Namespace::Project,
                "member.public_project",
                "Public projects inherit membership automatically",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workspace_model::{WorkspaceMember, WorkspaceSettings};
    use crate::repositories::memory::{InMemoryProjectRepository, InMemoryWorkspaceRepository};
    use crate::utils::locale_utils::Lang;

    struct Fixture {
        service: ProjectService,
        workspaces: Arc<InMemoryWorkspaceRepository>,
        messages: Messages,
    }

    fn fixture() -> Fixture {
        let workspaces = Arc::new(InMemoryWorkspaceRepository::default());
        let projects = Arc::new(InMemoryProjectRepository::default());
        Fixture {
            service: ProjectService::new(projects, workspaces.clone()),
            workspaces,
            messages: Messages::new(Lang::En),
        }
    }

    async fn seed_workspace(fx: &Fixture, owner_id: ObjectId, members: Vec<WorkspaceMember>) -> Workspace {
        let now = Utc::now();
        fx.workspaces
            .insert(Workspace {
                _id: None,
                name: "Design Team".to_string(),
                slug: "design-team".to_string(),
                owner_id,
                members,
                invites: Vec::new(),
                settings: WorkspaceSettings::default(),
                version: 0,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    fn workspace_member(user_id: ObjectId, role: Role) -> WorkspaceMember {
        WorkspaceMember {
            user_id,
            role,
            invited_by: None,
            invited_at: None,
            joined_at: Utc::now(),
        }
    }

    async fn create(
        fx: &Fixture,
        workspace: &Workspace,
        name: &str,
        visibility: ProjectVisibility,
    ) -> Project {
        fx.service
            .create_project(
                &workspace._id.unwrap(),
                CreateProjectRequest {
                    name: name.to_string(),
                    slug: None,
                    visibility,
                },
                &fx.messages,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn public_project_mirrors_the_workspace_roster() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let editor_id = ObjectId::new();
        let workspace = seed_workspace(
            &fx,
            owner_id,
            vec![workspace_member(editor_id, Role::Editor)],
        )
        .await;
        let project = create(&fx, &workspace, "Docs", ProjectVisibility::Public).await;

        let members = fx
            .service
            .get_effective_members(&project._id.unwrap(), &fx.messages)
            .await
            .unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].user_id, owner_id);
        assert_eq!(members[0].role, Role::Owner);
        assert_eq!(members[0].added_at, workspace.created_at);
        assert!(members[0].added_by.is_none());
        assert_eq!(members[1].user_id, editor_id);
        assert_eq!(members[1].role, Role::Editor);
    }

    #[tokio::test]
    async fn public_membership_tracks_workspace_changes_without_touching_the_project() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let mut workspace = seed_workspace(
            &fx,
            owner_id,
            vec![
                workspace_member(ObjectId::new(), Role::Editor),
                workspace_member(ObjectId::new(), Role::Viewer),
            ],
        )
        .await;
        let project = create(&fx, &workspace, "Docs", ProjectVisibility::Public).await;
        let project_id = project._id.unwrap();

        let before = fx
            .service
            .get_effective_members(&project_id, &fx.messages)
            .await
            .unwrap();
        assert_eq!(before.len(), 3);

        workspace
            .members
            .push(workspace_member(ObjectId::new(), Role::Viewer));
        assert!(fx.workspaces.update_versioned(&workspace).await.unwrap());

        let after = fx
            .service
            .get_effective_members(&project_id, &fx.messages)
            .await
            .unwrap();
        assert_eq!(after.len(), 4);

        let stored = fx
            .service
            .get_project(&project_id, &fx.messages)
            .await
            .unwrap();
        assert_eq!(stored.version, 0);
    }

    #[tokio::test]
    async fn private_project_exposes_only_its_own_roster() {
        let fx = fixture();
        let owner_id = ObjectId::new();
        let workspace_editor = ObjectId::new();
        let workspace = seed_workspace(
            &fx,
            owner_id,
            vec![workspace_member(workspace_editor, Role::Editor)],
        )
        .await;
        let project = create(&fx, &workspace, "Secret", ProjectVisibility::Private).await;
        let project_id = project._id.unwrap();

        let invited = ObjectId::new();
        fx.service
            .add_member(&project_id, invited, Role::Viewer, owner_id, &fx.messages)
            .await
            .unwrap();

        let members = fx
            .service
            .get_effective_members(&project_id, &fx.messages)
            .await
            .unwrap();

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, invited);
        assert_eq!(members[0].added_by, Some(owner_id));
        // Workspace membership alone grants nothing on a private project.
        let role = fx
            .service
            .effective_role(&project_id, &workspace_editor, &fx.messages)
            .await
            .unwrap();
        assert!(role.is_none());

        // Growing the workspace roster leaves the private roster alone.
        let mut stored_workspace = fx
            .workspaces
            .find_by_id(&workspace._id.unwrap())
            .await
            .unwrap()
            .unwrap();
        stored_workspace
            .members
            .push(workspace_member(ObjectId::new(), Role::Admin));
        assert!(fx.workspaces.update_versioned(&stored_workspace).await.unwrap());

        let unchanged = fx
            .service
            .get_effective_members(&project_id, &fx.messages)
            .await
            .unwrap();
        assert_eq!(unchanged.len(), 1);
    }

    #[tokio::test]
    async fn roster_operations_reject_public_projects() {
        let fx = fixture();
        let workspace = seed_workspace(&fx, ObjectId::new(), Vec::new()).await;
        let project = create(&fx, &workspace, "Docs", ProjectVisibility::Public).await;
        let project_id = project._id.unwrap();

        let add = fx
            .service
            .add_member(
                &project_id,
                ObjectId::new(),
                Role::Viewer,
                workspace.owner_id,
                &fx.messages,
            )
            .await;
        assert!(matches!(add, Err(DomainError::Validation(_))));

        let remove = fx
            .service
            .remove_member(&project_id, &ObjectId::new(), &fx.messages)
            .await;
        assert!(matches!(remove, Err(DomainError::Validation(_))));

        let update = fx
            .service
            .update_member_role(&project_id, &ObjectId::new(), Role::Admin, &fx.messages)
            .await;
        assert!(matches!(update, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_and_absent_roster_entries_are_rejected() {
        let fx = fixture();
        let workspace = seed_workspace(&fx, ObjectId::new(), Vec::new()).await;
        let project = create(&fx, &workspace, "Secret", ProjectVisibility::Private).await;
        let project_id = project._id.unwrap();
        let user_id = ObjectId::new();

        fx.service
            .add_member(&project_id, user_id, Role::Viewer, workspace.owner_id, &fx.messages)
            .await
            .unwrap();
        let again = fx
            .service
            .add_member(&project_id, user_id, Role::Editor, workspace.owner_id, &fx.messages)
            .await;
        assert!(matches!(again, Err(DomainError::Conflict(_))));

        let absent = ObjectId::new();
        let remove = fx
            .service
            .remove_member(&project_id, &absent, &fx.messages)
            .await;
        assert!(matches!(remove, Err(DomainError::NotFound(_))));
        let update = fx
            .service
            .update_member_role(&project_id, &absent, Role::Admin, &fx.messages)
            .await;
        assert!(matches!(update, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_member_role_changes_the_stored_roster() {
        let fx = fixture();
        let workspace = seed_workspace(&fx, ObjectId::new(), Vec::new()).await;
        let project = create(&fx, &workspace, "Secret", ProjectVisibility::Private).await;
        let project_id = project._id.unwrap();
        let user_id = ObjectId::new();

        fx.service
            .add_member(&project_id, user_id, Role::Viewer, workspace.owner_id, &fx.messages)
            .await
            .unwrap();
        fx.service
            .update_member_role(&project_id, &user_id, Role::Admin, &fx.messages)
            .await
            .unwrap();

        let role = fx
            .service
            .effective_role(&project_id, &user_id, &fx.messages)
            .await
            .unwrap();
        assert_eq!(role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn making_a_project_public_discards_its_roster_for_good() {
        // Scenario D: PRIVATE with U3, flip to PUBLIC, flip back.
        let fx = fixture();
        let owner_id = ObjectId::new();
        let u3 = ObjectId::new();
        let workspace = seed_workspace(&fx, owner_id, Vec::new()).await;
        let project = create(&fx, &workspace, "Secret", ProjectVisibility::Private).await;
        let project_id = project._id.unwrap();

        fx.service
            .add_member(&project_id, u3, Role::Editor, owner_id, &fx.messages)
            .await
            .unwrap();

        let public = fx
            .service
            .set_visibility(&project_id, ProjectVisibility::Public, &fx.messages)
            .await
            .unwrap();
        assert!(matches!(public.access, ProjectAccess::Public));

        let members = fx
            .service
            .get_effective_members(&project_id, &fx.messages)
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, owner_id);

        let private = fx
            .service
            .set_visibility(&project_id, ProjectVisibility::Private, &fx.messages)
            .await
            .unwrap();
        match &private.access {
            ProjectAccess::Private(members) => assert!(members.is_empty()),
            ProjectAccess::Public => panic!("expected a private project"),
        }
        let role = fx
            .service
            .effective_role(&project_id, &u3, &fx.messages)
            .await
            .unwrap();
        assert!(role.is_none());
    }

    #[tokio::test]
    async fn setting_the_current_visibility_writes_nothing() {
        let fx = fixture();
        let workspace = seed_workspace(&fx, ObjectId::new(), Vec::new()).await;
        let project = create(&fx, &workspace, "Docs", ProjectVisibility::Public).await;

        let unchanged = fx
            .service
            .set_visibility(&project._id.unwrap(), ProjectVisibility::Public, &fx.messages)
            .await
            .unwrap();
        assert_eq!(unchanged.version, 0);
    }

    #[tokio::test]
    async fn project_slugs_are_unique_per_workspace() {
        let fx = fixture();
        let first = seed_workspace(&fx, ObjectId::new(), Vec::new()).await;
        create(&fx, &first, "Docs", ProjectVisibility::Public).await;

        let duplicate = fx
            .service
            .create_project(
                &first._id.unwrap(),
                CreateProjectRequest {
                    name: "Docs".to_string(),
                    slug: None,
                    visibility: ProjectVisibility::Private,
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(duplicate, Err(DomainError::Conflict(_))));

        // The same slug is fine in a different workspace.
        let now = Utc::now();
        let second = fx
            .workspaces
            .insert(Workspace {
                _id: None,
                name: "Marketing".to_string(),
                slug: "marketing".to_string(),
                owner_id: ObjectId::new(),
                members: Vec::new(),
                invites: Vec::new(),
                settings: WorkspaceSettings::default(),
                version: 0,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        create(&fx, &second, "Docs", ProjectVisibility::Public).await;
    }

    #[tokio::test]
    async fn delete_project_frees_its_slug() {
        let fx = fixture();
        let workspace = seed_workspace(&fx, ObjectId::new(), Vec::new()).await;
        let project = create(&fx, &workspace, "Docs", ProjectVisibility::Public).await;
        let project_id = project._id.unwrap();

        fx.service
            .delete_project(&project_id, &fx.messages)
            .await
            .unwrap();
        let gone = fx.service.get_project(&project_id, &fx.messages).await;
        assert!(matches!(gone, Err(DomainError::NotFound(_))));

        create(&fx, &workspace, "Docs", ProjectVisibility::Private).await;
    }

    #[tokio::test]
    async fn creating_a_project_requires_the_workspace() {
        let fx = fixture();
        let result = fx
            .service
            .create_project(
                &ObjectId::new(),
                CreateProjectRequest {
                    name: "Docs".to_string(),
                    slug: None,
                    visibility: ProjectVisibility::Public,
                },
                &fx.messages,
            )
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }
}
