use actix_web::web;
use std::sync::Arc;

use crate::{
    config::cors::configure_cors,
    handlers::workspace_handler::{
        accept_invite_handler, add_member_handler, change_member_role_handler,
        create_invite_handler, create_workspace_handler, delete_workspace_handler,
        get_workspace_handler, list_invites_handler, list_members_handler,
        list_user_workspaces_handler, remove_member_handler, revoke_invite_handler,
        validate_invite_handler,
    },
    services::workspace_service::WorkspaceService,
};

pub fn configure_workspace_routes(
    cfg: &mut web::ServiceConfig,
    workspace_service_data: web::Data<Arc<WorkspaceService>>,
) {
    cfg.service(
        web::scope("/workspaces")
            .wrap(configure_cors())
            .app_data(workspace_service_data)
            .route("", web::post().to(create_workspace_handler))
            .route("/user/{user_id}", web::get().to(list_user_workspaces_handler))
            .route("/{workspace_id}", web::get().to(get_workspace_handler))
            .route("/{workspace_id}", web::delete().to(delete_workspace_handler))
            .route("/{workspace_id}/members", web::get().to(list_members_handler))
            .route("/{workspace_id}/members", web::post().to(add_member_handler))
            .route(
                "/{workspace_id}/members/{user_id}",
                web::delete().to(remove_member_handler),
            )
            .route(
                "/{workspace_id}/members/{user_id}",
                web::patch().to(change_member_role_handler),
            )
            .route("/{workspace_id}/invites", web::get().to(list_invites_handler))
            .route("/{workspace_id}/invites", web::post().to(create_invite_handler))
            .route(
                "/{workspace_id}/invites/accept",
                web::post().to(accept_invite_handler),
            )
            .route(
                "/{workspace_id}/invites/token/{token}",
                web::get().to(validate_invite_handler),
            )
            .route(
                "/{workspace_id}/invites/{invite_id}",
                web::delete().to(revoke_invite_handler),
            ),
    );
}
