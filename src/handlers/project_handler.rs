use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::{
    services::project_service::ProjectService,
    types::{
        requests::project::project_requests::{
            AddProjectMemberRequest, CreateProjectRequest, SetVisibilityRequest,
            UpdateProjectMemberRequest,
        },
        responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Messages, Namespace, get_lang},
        validation_utils::{
            handle_validation_error, parse_object_id, validate_create_project_data,
        },
    },
};

pub async fn create_project_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    workspace_id: web::Path<String>,
    payload: web::Json<CreateProjectRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let data = payload.into_inner();

    if let Err(errs) = validate_create_project_data(&data, &messages) {
        let msg = messages.get_validation_message("project", "Invalid project data");
        return handle_validation_error(errs, &msg);
    }

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match project_service
        .create_project(&workspace_id, data, &messages)
        .await
    {
        Ok(project) => HttpResponse::Created().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "create.success", "Project created"),
            project,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn list_projects_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    workspace_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let workspace_id = match parse_object_id(&workspace_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match project_service.list_projects(&workspace_id).await {
        Ok(projects) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "list.success", "Projects found"),
            projects,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn get_project_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    project_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let project_id = match parse_object_id(&project_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match project_service.get_project(&project_id, &messages).await {
        Ok(project) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "fetch.success", "Project found"),
            project,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn delete_project_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    project_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let project_id = match parse_object_id(&project_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match project_service.delete_project(&project_id, &messages).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "delete.success", "Project deleted"),
            None::<()>,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn get_effective_members_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    project_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let project_id = match parse_object_id(&project_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match project_service
        .get_effective_members(&project_id, &messages)
        .await
    {
        Ok(members) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "member.list_success", "Members found"),
            members,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn add_project_member_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    project_id: web::Path<String>,
    payload: web::Json<AddProjectMemberRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let data = payload.into_inner();

    let project_id = match parse_object_id(&project_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match project_service
        .add_member(&project_id, data.user_id, data.role, data.added_by, &messages)
        .await
    {
        Ok(project) => HttpResponse::Created().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "member.add_success", "Member added"),
            project,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn remove_project_member_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let (project_id, user_id) = path.into_inner();

    let parsed = parse_object_id(&project_id, &messages)
        .and_then(|p| parse_object_id(&user_id, &messages).map(|u| (p, u)));
    let (project_id, user_id) = match parsed {
        Ok(ids) => ids,
        Err(err) => return err.to_response(),
    };

    match project_service
        .remove_member(&project_id, &user_id, &messages)
        .await
    {
        Ok(project) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "member.remove_success", "Member removed"),
            project,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn update_project_member_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateProjectMemberRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let (project_id, user_id) = path.into_inner();

    let parsed = parse_object_id(&project_id, &messages)
        .and_then(|p| parse_object_id(&user_id, &messages).map(|u| (p, u)));
    let (project_id, user_id) = match parsed {
        Ok(ids) => ids,
        Err(err) => return err.to_response(),
    };

    match project_service
        .update_member_role(&project_id, &user_id, payload.role, &messages)
        .await
    {
        Ok(project) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Project, "member.role_success", "Member role updated"),
            project,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn set_visibility_handler(
    req: HttpRequest,
    project_service: web::Data<Arc<ProjectService>>,
    project_id: web::Path<String>,
    payload: web::Json<SetVisibilityRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let project_id = match parse_object_id(&project_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match project_service
        .set_visibility(&project_id, payload.visibility, &messages)
        .await
    {
        Ok(project) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(
                Namespace::Project,
                "visibility.success",
                "Project visibility updated",
            ),
            project,
        )),
        Err(err) => err.to_response(),
    }
}
