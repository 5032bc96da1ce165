use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use teamspace_backend::{
    config::database::{connect_to_database, create_unique_indexes},
    constants::PROVIDER_TIMEOUT_SECS,
    providers::delivery_provider::HttpEmailProvider,
    repositories::{
        notification_repository::MongoNotificationRepository,
        project_repository::MongoProjectRepository, user_repository::MongoUserRepository,
        workspace_repository::MongoWorkspaceRepository,
    },
    routes::{
        notification_routes::configure_notification_routes,
        project_routes::configure_project_routes, workspace_routes::configure_workspace_routes,
    },
    services::{
        notification_service::NotificationService, project_service::ProjectService,
        workspace_service::WorkspaceService,
    },
    utils::locale_utils::{Lang, Messages},
};

const SWEEP_INTERVAL_SECS: u64 = 30;
const SWEEP_BATCH_SIZE: i64 = 50;

/// Periodic background pass over scheduled and retryable notifications.
async fn run_notification_sweeper(
    notification_service: Arc<NotificationService>,
    cancel: CancellationToken,
) {
    let messages = Messages::new(Lang::En);
    let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        match notification_service
            .process_pending(SWEEP_BATCH_SIZE, &cancel, &messages)
            .await
        {
            Ok(report) if report.processed > 0 => {
                info!(
                    "dispatched {} scheduled notifications ({} failed)",
                    report.processed, report.failed
                );
            }
            Ok(_) => {}
            Err(err) => warn!("scheduled sweep failed: {}", err),
        }

        match notification_service
            .process_retries(SWEEP_BATCH_SIZE, &cancel, &messages)
            .await
        {
            Ok(report) if report.processed > 0 => {
                info!(
                    "retried {} failed notifications ({} recovered)",
                    report.processed, report.successful
                );
            }
            Ok(_) => {}
            Err(err) => warn!("retry sweep failed: {}", err),
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let client = match connect_to_database().await {
        Ok(client) => client,
        Err(err) => {
            error!("could not connect to MongoDB: {}", err);
            return Err(std::io::Error::other(err));
        }
    };
    if let Err(err) = create_unique_indexes(&client).await {
        error!("could not create indexes: {}", err);
        return Err(std::io::Error::other(err));
    }

    let workspace_repository = Arc::new(MongoWorkspaceRepository::new(&client).await.map_err(std::io::Error::other)?);
    let project_repository = Arc::new(MongoProjectRepository::new(&client).await.map_err(std::io::Error::other)?);
    let notification_repository = Arc::new(MongoNotificationRepository::new(&client).await.map_err(std::io::Error::other)?);
    let user_repository = Arc::new(MongoUserRepository::new(&client).await.map_err(std::io::Error::other)?);

    let notification_service = Arc::new(NotificationService::new(
        notification_repository,
        Arc::new(HttpEmailProvider::new()),
        Duration::from_secs(PROVIDER_TIMEOUT_SECS),
    ));
    let workspace_service = Arc::new(WorkspaceService::new(
        workspace_repository.clone(),
        user_repository,
        notification_service.clone(),
    ));
    let project_service = Arc::new(ProjectService::new(
        project_repository,
        workspace_repository,
    ));

    let sweeper_cancel = CancellationToken::new();
    let sweeper = tokio::spawn(run_notification_sweeper(
        notification_service.clone(),
        sweeper_cancel.clone(),
    ));

    let workspace_service_data = web::Data::new(workspace_service);
    let project_service_data = web::Data::new(project_service);
    let notification_service_data = web::Data::new(notification_service);

    info!("starting server on 0.0.0.0:8080");
    let server = HttpServer::new(move || {
        App::new()
            .configure(|cfg| configure_workspace_routes(cfg, workspace_service_data.clone()))
            .configure(|cfg| configure_project_routes(cfg, project_service_data.clone()))
            .configure(|cfg| configure_notification_routes(cfg, notification_service_data.clone()))
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await;

    sweeper_cancel.cancel();
    let _ = sweeper.await;

    server
}
