use axum::http::StatusCode;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivityError {
    #[error("invalid range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("year {0} is outside the supported calendar")]
    InvalidYear(i32),

    #[error("unknown season: {0}")]
    UnknownSeason(u32),

    #[error("range covers {days} days, at most {max} are allowed")]
    RangeTooLong { days: i64, max: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("season catalog is empty")]
    Empty,

    #[error("duplicate season id {0}")]
    DuplicateId(u32),

    #[error("season {id} ends on {end} before it starts on {start}")]
    InvertedWindow {
        id: u32,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("seasons {0} and {1} are both marked active")]
    MultipleActive(u32, u32),

    #[error("invalid date in season {0}")]
    InvalidDate(u32),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<ActivityError> for AppError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::UnknownSeason(_) => Self::not_found(err.to_string()),
            ActivityError::InvalidRange { .. }
            | ActivityError::InvalidYear(_)
            | ActivityError::RangeTooLong { .. } => {
                Self::bad_request(err.to_string())
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
