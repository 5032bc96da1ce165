use std::borrow::Cow;
use std::collections::HashMap;

use actix_web::HttpResponse;
use mongodb::bson::oid::ObjectId;
use validator::{ValidationError, ValidationErrors};

use crate::types::errors::{DomainError, DomainResult};

use crate::models::notification_model::NotificationType;
use crate::types::requests::{
    notification::send_notification_request::SendNotificationRequest,
    project::project_requests::CreateProjectRequest,
    workspace::{
        create_workspace_request::CreateWorkspaceRequest, invite_requests::CreateInviteRequest,
    },
};
use crate::types::responses::api_response::{ApiResponse, ErrorDetails};
use crate::utils::locale_utils::Messages;
use crate::validations::{email::validate_email, name::validate_name, slug::validate_slug};

pub fn parse_object_id(value: &str, messages: &Messages) -> DomainResult<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| {
        DomainError::Validation(
            messages.get_validation_message("object_id.invalid", "Invalid identifier"),
        )
    })
}

pub fn add_error(code: &'static str, messages: String, field_value: &str) -> ValidationError {
    ValidationError {
        code: code.into(),
        message: Some(Cow::Owned(messages)),
        params: {
            let mut params = HashMap::new();
            params.insert("value".into(), serde_json::json!(field_value));
            params
        },
    }
}

pub fn handle_validation_error(errs: ValidationErrors, message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()>::error(
        message,
        Some(ErrorDetails {
            details: serde_json::to_value(&errs).ok(),
        }),
    ))
}

pub fn validate_create_workspace_data(
    data: &CreateWorkspaceRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(err) = validate_name(&data.name, messages) {
        errors.add("name", err);
    }
    if let Some(slug) = &data.slug {
        if let Err(err) = validate_slug(slug, messages) {
            errors.add("slug", err);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_create_invite_data(
    data: &CreateInviteRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(err) = validate_email(&data.email, messages) {
        errors.add("email", err);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_create_project_data(
    data: &CreateProjectRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(err) = validate_name(&data.name, messages) {
        errors.add("name", err);
    }
    if let Some(slug) = &data.slug {
        if let Err(err) = validate_slug(slug, messages) {
            errors.add("slug", err);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_send_notification_data(
    data: &SendNotificationRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if data.notification_type == NotificationType::Email {
        if let Err(err) = validate_email(&data.recipient, messages) {
            errors.add("recipient", err);
        }
    } else if data.recipient.trim().is_empty() {
        errors.add(
            "recipient",
            add_error(
                "recipient.empty",
                messages.get_validation_message("recipient.empty", "Recipient must not be empty"),
                &data.recipient,
            ),
        );
    }

    if data.subject.trim().is_empty() {
        errors.add(
            "subject",
            add_error(
                "subject.empty",
                messages.get_validation_message("subject.empty", "Subject must not be empty"),
                &data.subject,
            ),
        );
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
