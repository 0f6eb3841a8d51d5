pub mod analytics;
pub mod auth;
pub mod board;
pub mod classify;
pub mod domain;
pub mod draft;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod report;
pub mod session;
pub mod sort;

#[cfg(test)]
mod tests {
    use super::error::AppError;

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("API_UNREACHABLE", "backend down").with_retryable(true);
        assert_eq!(err.code, "API_UNREACHABLE");
        assert_eq!(err.message, "backend down");
        assert_eq!(err.retryable, true);
        assert_eq!(err.to_string(), "[API_UNREACHABLE] backend down");
    }

    #[test]
    fn not_found_is_recognizable() {
        let err = AppError::incident_not_found(42);
        assert!(err.is_not_found());
        assert!(err.message.contains("42"));
    }
}
