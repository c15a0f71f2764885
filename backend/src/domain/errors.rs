use thiserror::Error;

/// Failures surfaced by the membership and dashboard services.
///
/// Unparseable stored dates are not errors; they degrade to fallback
/// dates instead of failing a request.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("Membership with this number already exists")]
    DuplicateKey { phone: String },

    #[error("Member with this number not found")]
    NotFound { phone: String },

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl MembershipError {
    pub fn validation(message: impl Into<String>) -> Self {
        MembershipError::Validation(message.into())
    }
}

pub type MembershipResult<T> = Result<T, MembershipError>;
