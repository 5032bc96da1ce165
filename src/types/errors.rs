use actix_web::HttpResponse;
use log::error;
use thiserror::Error;

use crate::types::responses::api_response::ApiResponse;

pub type DomainResult<T> = Result<T, DomainError>;

/// Domain failure taxonomy. Every rule violation in the core surfaces as one
/// of the first five variants; storage and provider transport failures are
/// wrapped so their raw error text never reaches a response body.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Expired(String),

    #[error("storage unavailable")]
    Storage(#[source] anyhow::Error),

    #[error("delivery provider unavailable")]
    Provider(#[source] anyhow::Error),
}

impl DomainError {
    pub fn is_transport(&self) -> bool {
        matches!(self, DomainError::Storage(_) | DomainError::Provider(_))
    }

    pub fn to_response(&self) -> HttpResponse {
        if let DomainError::Storage(source) | DomainError::Provider(source) = self {
            error!("transport failure: {:#}", source);
        }

        let body = ApiResponse::<()>::error(self.to_string(), None);

        match self {
            DomainError::Validation(_) => HttpResponse::BadRequest().json(body),
            DomainError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            DomainError::NotFound(_) => HttpResponse::NotFound().json(body),
            DomainError::Conflict(_) => HttpResponse::Conflict().json(body),
            DomainError::Expired(_) => HttpResponse::Gone().json(body),
            DomainError::Storage(_) | DomainError::Provider(_) => {
                HttpResponse::InternalServerError().json(body)
            }
        }
    }
}

impl From<mongodb::error::Error> for DomainError {
    fn from(err: mongodb::error::Error) -> Self {
        DomainError::Storage(err.into())
    }
}

impl From<bson::ser::Error> for DomainError {
    fn from(err: bson::ser::Error) -> Self {
        DomainError::Storage(err.into())
    }
}
