use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Flash, Redirect, Responder};

/// Flash text shown whenever a request lacks a session or the session user
/// does not own the resource.
pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    #[error("Access unauthorized.")]
    Unauthorized,
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(e.to_string())
    }
}

impl AppError {
    /// Validation and uniqueness failures are shown back to the user inline.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::Invalid(_) | AppError::Conflict(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self {
            AppError::Unauthorized => {
                tracing::warn!(uri = %req.uri(), "rejected unauthorized request");
                Flash::error(Redirect::to("/"), ACCESS_UNAUTHORIZED).respond_to(req)
            }
            AppError::NotFound => Err(Status::NotFound),
            AppError::Invalid(msg) | AppError::Conflict(msg) => {
                Flash::error(Redirect::to("/"), msg).respond_to(req)
            }
            other => {
                tracing::error!(uri = %req.uri(), error = %other, "request failed");
                Err(Status::InternalServerError)
            }
        }
    }
}
