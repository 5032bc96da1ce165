use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::{
    services::workspace_service::WorkspaceService,
    types::{
        requests::workspace::{
            create_workspace_request::CreateWorkspaceRequest,
            invite_requests::{AcceptInviteRequest, CreateInviteRequest},
            member_requests::{AddMemberRequest, ChangeMemberRoleRequest},
        },
        responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Messages, Namespace, get_lang},
        validation_utils::{
            handle_validation_error, parse_object_id, validate_create_invite_data,
            validate_create_workspace_data,
        },
    },
};

pub async fn create_workspace_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    payload: web::Json<CreateWorkspaceRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let data = payload.into_inner();

    if let Err(errs) = validate_create_workspace_data(&data, &messages) {
        let msg = messages.get_validation_message("workspace", "Invalid workspace data");
        return handle_validation_error(errs, &msg);
    }

    match workspace_service.create_workspace(data, &messages).await {
        Ok(workspace) => HttpResponse::Created().json(ApiResponse::success(
            messages.get_str(
                Namespace::Workspace,
                "create.success",
                "Workspace created successfully",
            ),
            workspace,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn get_workspace_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    workspace_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service.get_workspace(&workspace_id, &messages).await {
        Ok(workspace) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "fetch.success", "Workspace found"),
            workspace,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn list_user_workspaces_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    user_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let user_id = match parse_object_id(&user_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service.list_for_user(&user_id).await {
        Ok(workspaces) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "list.success", "Workspaces found"),
            workspaces,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn delete_workspace_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    workspace_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .delete_workspace(&workspace_id, &messages)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "delete.success", "Workspace deleted"),
            None::<()>,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn list_members_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    workspace_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service.list_members(&workspace_id, &messages).await {
        Ok(members) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "member.list_success", "Members found"),
            members,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn add_member_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    workspace_id: web::Path<String>,
    payload: web::Json<AddMemberRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let data = payload.into_inner();

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .add_member(&workspace_id, data.user_id, data.role, data.invited_by, &messages)
        .await
    {
        Ok(workspace) => HttpResponse::Created().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "member.add_success", "Member added"),
            workspace,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn remove_member_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let (workspace_id, user_id) = path.into_inner();

    let parsed = parse_object_id(&workspace_id, &messages)
        .and_then(|w| parse_object_id(&user_id, &messages).map(|u| (w, u)));
    let (workspace_id, user_id) = match parsed {
        Ok(ids) => ids,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .remove_member(&workspace_id, &user_id, &messages)
        .await
    {
        Ok(workspace) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "member.remove_success", "Member removed"),
            workspace,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn change_member_role_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    path: web::Path<(String, String)>,
    payload: web::Json<ChangeMemberRoleRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let (workspace_id, user_id) = path.into_inner();

    let parsed = parse_object_id(&workspace_id, &messages)
        .and_then(|w| parse_object_id(&user_id, &messages).map(|u| (w, u)));
    let (workspace_id, user_id) = match parsed {
        Ok(ids) => ids,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .change_member_role(&workspace_id, &user_id, payload.role, &messages)
        .await
    {
        Ok(workspace) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "member.role_success", "Member role updated"),
            workspace,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn create_invite_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    workspace_id: web::Path<String>,
    payload: web::Json<CreateInviteRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let data = payload.into_inner();

    if let Err(errs) = validate_create_invite_data(&data, &messages) {
        let msg = messages.get_validation_message("invite", "Invalid invite data");
        return handle_validation_error(errs, &msg);
    }

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .create_invite(&workspace_id, data, &messages)
        .await
    {
        Ok(invite) => HttpResponse::Created().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "invite.create_success", "Invite created"),
            invite,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn list_invites_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    workspace_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service.list_invites(&workspace_id, &messages).await {
        Ok(invites) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "invite.list_success", "Invites found"),
            invites,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn validate_invite_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let (workspace_id, token) = path.into_inner();

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .validate_invite(&workspace_id, &token, &messages)
        .await
    {
        Ok(view) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "invite.validate_success", "Invite found"),
            view,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn accept_invite_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    workspace_id: web::Path<String>,
    payload: web::Json<AcceptInviteRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .accept_invite(&workspace_id, payload.into_inner(), &messages)
        .await
    {
        Ok(workspace) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "invite.accept_success", "Invite accepted"),
            workspace,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn revoke_invite_handler(
    req: HttpRequest,
    workspace_service: web::Data<Arc<WorkspaceService>>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let (workspace_id, invite_id) = path.into_inner();

    let parsed = parse_object_id(&workspace_id, &messages)
        .and_then(|w| parse_object_id(&invite_id, &messages).map(|i| (w, i)));
    let (workspace_id, invite_id) = match parsed {
        Ok(ids) => ids,
        Err(err) => return err.to_response(),
    };

    match workspace_service
        .revoke_invite(&workspace_id, &invite_id, &messages)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Workspace, "invite.revoke_success", "Invite revoked"),
            None::<()>,
        )),
        Err(err) => err.to_response(),
    }
}
