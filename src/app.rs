use std::sync::Arc;

use axum::response::IntoResponse;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use thiserror::Error;

use crate::{
    account::{AccountService, AccountServiceImpl},
    contact_request::{ContactRequestService, ContactRequestServiceImpl},
    email::{EmailService, SmtpEmailService},
    favorite::{FavoriteService, FavoriteServiceImpl},
    payment::{PaymentService, StripePaymentService},
    persistence::{
        accounts::{AccountRepository, AccountRepositoryImpl},
        contact_requests::{ContactRequestRepository, ContactRequestRepositoryImpl},
        favorites::{FavoriteRepository, FavoriteRepositoryImpl},
        profiles::{ProfileRepository, ProfileRepositoryImpl},
        stories::{StoryRepository, StoryRepositoryImpl},
    },
    profile::{ProfileService, ProfileServiceImpl},
    story::{StoryService, StoryServiceImpl},
};

pub type ArcProfileService = Arc<Box<dyn ProfileService + Send + Sync + 'static>>;
pub type ArcAccountService = Arc<Box<dyn AccountService + Send + Sync + 'static>>;
pub type ArcContactRequestService = Arc<Box<dyn ContactRequestService + Send + Sync + 'static>>;
pub type ArcFavoriteService = Arc<Box<dyn FavoriteService + Send + Sync + 'static>>;
pub type ArcStoryService = Arc<Box<dyn StoryService + Send + Sync + 'static>>;
pub type ArcPaymentService = Arc<Box<dyn PaymentService + Send + Sync + 'static>>;
pub type ArcEmailService = Arc<Box<dyn EmailService + Send + Sync + 'static>>;

pub type ArcProfileRepository = Arc<Box<dyn ProfileRepository + Send + Sync + 'static>>;
pub type ArcAccountRepository = Arc<Box<dyn AccountRepository + Send + Sync + 'static>>;
pub type ArcContactRequestRepository =
    Arc<Box<dyn ContactRequestRepository + Send + Sync + 'static>>;
pub type ArcFavoriteRepository = Arc<Box<dyn FavoriteRepository + Send + Sync + 'static>>;
pub type ArcStoryRepository = Arc<Box<dyn StoryRepository + Send + Sync + 'static>>;

#[derive(Clone)]
pub struct AppState {
    pub profile_service: ArcProfileService,
    pub account_service: ArcAccountService,
    pub contact_request_service: ArcContactRequestService,
    pub favorite_service: ArcFavoriteService,
    pub story_service: ArcStoryService,
    pub payment_service: ArcPaymentService,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    ConnectionError(r2d2::Error),
    #[error("query error: {0}")]
    QueryError(rusqlite::Error),
}

impl ServiceError {
    pub fn bad_request<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::BadRequest(msg.into()))
    }

    pub fn not_found<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::NotFound(msg.into()))
    }

    pub fn forbidden<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Forbidden(msg.into()))
    }

    pub fn internal<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Internal(msg.into()))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::http::Response<axum::body::Body> {
        let (status, msg) = match self {
            ServiceError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            ServiceError::BadRequest(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::Forbidden(msg) => (axum::http::StatusCode::FORBIDDEN, msg),
            ServiceError::Database(_) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            ServiceError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of an idempotent insert keyed by email. Duplicates are reported
/// as `AlreadyExists`, which the HTTP layer renders as `{"insertedId": null}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Inserted(i64),
    AlreadyExists,
}

impl SubmitOutcome {
    pub fn inserted_id(&self) -> Option<i64> {
        match self {
            SubmitOutcome::Inserted(id) => Some(*id),
            SubmitOutcome::AlreadyExists => None,
        }
    }
}

pub fn construct_app() -> AppState {
    let db_path = std::env::var("MATRI_DB").expect("MATRI_DB env var not set");
    let manager = SqliteConnectionManager::file(db_path);
    let pool = Pool::builder()
        .max_size(5)
        .build(manager)
        .expect("Failed to create DB pool");

    let profile_repository: ArcProfileRepository =
        Arc::new(Box::new(ProfileRepositoryImpl::new(pool.clone())));
    let account_repository: ArcAccountRepository =
        Arc::new(Box::new(AccountRepositoryImpl::new(pool.clone())));
    let contact_request_repository: ArcContactRequestRepository =
        Arc::new(Box::new(ContactRequestRepositoryImpl::new(pool.clone())));
    let favorite_repository: ArcFavoriteRepository =
        Arc::new(Box::new(FavoriteRepositoryImpl::new(pool.clone())));
    let story_repository: ArcStoryRepository = Arc::new(Box::new(StoryRepositoryImpl::new(pool)));

    let email_service: ArcEmailService = Arc::new(Box::new(SmtpEmailService));
    let payment_service: ArcPaymentService = Arc::new(Box::new(StripePaymentService));

    let profile_service: ArcProfileService = Arc::new(Box::new(ProfileServiceImpl::new(
        profile_repository.clone(),
        account_repository.clone(),
    )));

    let account_service: ArcAccountService =
        Arc::new(Box::new(AccountServiceImpl::new(account_repository)));

    let contact_request_service: ArcContactRequestService =
        Arc::new(Box::new(ContactRequestServiceImpl::new(
            contact_request_repository,
            profile_repository.clone(),
            email_service,
        )));

    let favorite_service: ArcFavoriteService = Arc::new(Box::new(FavoriteServiceImpl::new(
        favorite_repository,
        profile_repository,
    )));

    let story_service: ArcStoryService = Arc::new(Box::new(StoryServiceImpl::new(story_repository)));

    AppState {
        profile_service,
        account_service,
        contact_request_service,
        favorite_service,
        story_service,
        payment_service,
    }
}
