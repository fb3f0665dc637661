use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::DatabaseErrorKind;
use diesel_async::pooled_connection::PoolError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed, expired or orphaned bearer token. The response
    /// never says which check failed.
    #[error("Could not validate credentials")]
    Unauthenticated,
    #[error("Incorrect email or password")]
    WrongCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Database unavailable, try again later")]
    StoreUnavailable,
    #[error("Token creation error")]
    TokenCreation,
    #[error("Database error")]
    Database(#[from] diesel::result::Error),
}

impl From<bb8::RunError<PoolError>> for ApiError {
    fn from(e: bb8::RunError<PoolError>) -> Self {
        tracing::warn!("connection pool: {}", e);
        ApiError::StoreUnavailable
    }
}

impl ApiError {
    /// An insert pointing at a missing student or employee is a 400, not a 500.
    pub fn from_insert(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                ApiError::Validation(format!(
                    "unknown reference: {}",
                    info.details().unwrap_or_else(|| info.message())
                ))
            }
            other => ApiError::Database(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::WrongCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::TokenCreation | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(e) = &self {
            tracing::error!("query failed: {}", e);
        }
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
        }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::WrongCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("Student").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Validation("date: bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::StoreUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Database(diesel::result::Error::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_responses_advertise_bearer() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let response = ApiError::NotFound("Room").into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn dangling_reference_is_a_validation_failure() {
        let err = ApiError::from_insert(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("violates foreign key constraint".to_string()),
        ));
        assert!(matches!(err, ApiError::Validation(ref msg) if msg.contains("foreign key")));

        let err = ApiError::from_insert(diesel::result::Error::NotFound);
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn database_details_stay_server_side() {
        let err = ApiError::Database(diesel::result::Error::RollbackTransaction);
        assert_eq!(err.to_string(), "Database error");
    }
}
