use thiserror::Error;

pub mod page;
pub mod player;

pub const DUPLICATE_CODENAME_MESSAGE: &str = "Codinome já cadastrado";

pub const MISSING_PLAYER_ID_MESSAGE: &str = "O ID do jogador não pode ser nulo.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Codinome já cadastrado")]
    DuplicateCodename,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::NotFound(msg.into()))
    }

    pub fn bad_request<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::BadRequest(msg.into()))
    }

    pub fn invalid_argument<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::InvalidArgument(msg.into()))
    }

    pub fn internal<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Internal(msg.into()))
    }

    /// Messages reported back to the caller, one entry per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::Validation(errors) => errors.clone(),
            ServiceError::DuplicateCodename => vec![DUPLICATE_CODENAME_MESSAGE.to_string()],
            ServiceError::NotFound(msg)
            | ServiceError::BadRequest(msg)
            | ServiceError::InvalidArgument(msg)
            | ServiceError::Internal(msg) => vec![msg.clone()],
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
