use actix_web::web;
use std::sync::Arc;

use crate::{
    config::cors::configure_cors,
    handlers::project_handler::{
        add_project_member_handler, create_project_handler, delete_project_handler,
        get_effective_members_handler, get_project_handler, list_projects_handler,
        remove_project_member_handler, set_visibility_handler, update_project_member_handler,
    },
    services::project_service::ProjectService,
};

pub fn configure_project_routes(
    cfg: &mut web::ServiceConfig,
    project_service_data: web::Data<Arc<ProjectService>>,
) {
    cfg.service(
        web::scope("/projects")
            .wrap(configure_cors())
            .app_data(project_service_data)
            .route(
                "/workspace/{workspace_id}",
                web::post().to(create_project_handler),
            )
            .route(
                "/workspace/{workspace_id}",
                web::get().to(list_projects_handler),
            )
            .route("/{project_id}", web::get().to(get_project_handler))
            .route("/{project_id}", web::delete().to(delete_project_handler))
            .route(
                "/{project_id}/members",
                web::get().to(get_effective_members_handler),
            )
            .route(
                "/{project_id}/members",
                web::post().to(add_project_member_handler),
            )
            .route(
                "/{project_id}/members/{user_id}",
                web::delete().to(remove_project_member_handler),
            )
            .route(
                "/{project_id}/members/{user_id}",
                web::patch().to(update_project_member_handler),
            )
            .route(
                "/{project_id}/visibility",
                web::put().to(set_visibility_handler),
            ),
    );
}
