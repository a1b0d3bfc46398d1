//! Unit tests for error handling
//!
//! Tests error types, conversions, and HTTP status mapping.

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use crate::errors::AppError;
    use crate::errors::CONTEXT_WINDOW_REMEDIATION;

    // ====== Status Mapping Tests ======

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), 400);
        assert_eq!(
            AppError::ContextWindowExceeded {
                length: 6000,
                limit: 5000
            }
            .status_code(),
            400
        );
        assert_eq!(AppError::AuthRequired.status_code(), 401);
        assert_eq!(AppError::NotFound("resume".into()).status_code(), 404);
        assert_eq!(AppError::Embedding("x".into()).status_code(), 500);
        assert_eq!(AppError::StoreUnavailable("x".into()).status_code(), 500);
        assert_eq!(AppError::ModelGeneration("x".into()).status_code(), 500);
        assert_eq!(AppError::Timeout("x".into()).status_code(), 500);
    }

    #[test]
    fn test_context_window_message() {
        let error = AppError::ContextWindowExceeded {
            length: 6123,
            limit: 5000,
        };
        let display = error.to_string();
        assert!(display.contains("5000"));
        assert!(display.contains("6123"));
        assert!(display.ends_with(CONTEXT_WINDOW_REMEDIATION));
        assert!(error.is_user_facing());
    }

    #[test]
    fn test_user_facing_and_retryable() {
        assert!(AppError::Validation("x".into()).is_user_facing());
        assert!(!AppError::Embedding("x".into()).is_user_facing());
        assert!(!AppError::StoreUnavailable("x".into()).is_user_facing());

        assert!(AppError::Timeout("x".into()).is_retryable());
        assert!(AppError::StoreUnavailable("x".into()).is_retryable());
        assert!(!AppError::Validation("x".into()).is_retryable());
        assert!(!AppError::ModelGeneration("x".into()).is_retryable());
    }

    // ====== Conversion Tests ======

    #[test]
    fn test_io_error_conversion() {
        let error: AppError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, AppError::Io(_)));
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error: AppError = json_err.into();
        assert!(matches!(error, AppError::Serialization(_)));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));

        let timeout = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(timeout, AppError::Timeout(_)));
        assert!(timeout.is_retryable());

        let closed = AppError::from(sqlx::Error::PoolClosed);
        assert!(matches!(closed, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_elapsed_conversion() {
        let elapsed = tokio::time::timeout(Duration::from_millis(1), std::future::pending::<()>())
            .await
            .unwrap_err();
        let error: AppError = elapsed.into();
        assert!(matches!(error, AppError::Timeout(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn parse(input: &str) -> crate::Result<serde_json::Value> {
            Ok(serde_json::from_str(input)?)
        }
        assert!(parse("{\"a\": 1}").is_ok());
        assert!(parse("nope").is_err());
    }
}
