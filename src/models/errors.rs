//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so degraded analyses can be
//! traced in logs without parsing free text.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - PROVIDER_xxx: adapter (explorer, honeypot, social, DEX) failures
//! - AI_xxx: AI provider failures
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Provider Errors
    // ============================================
    /// Adapter returned an error or no data
    ProviderUnavailable,
    /// Adapter did not answer in time
    ProviderTimeout,

    // ============================================
    // AI Provider Errors
    // ============================================
    /// AI provider not configured or call failed
    AiUnavailable,
    /// AI text did not contain a usable JSON assessment
    AiMalformedResponse,

    // ============================================
    // Pipeline Errors
    // ============================================
    /// Feature extraction produced an unusable vector
    FeatureExtractionFailed,
    /// Whole analysis task failed
    PipelineFailed,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration / Input Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Invalid token address
    TokenInvalidAddress,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",

            Self::AiUnavailable => "AI_UNAVAILABLE",
            Self::AiMalformedResponse => "AI_MALFORMED_RESPONSE",

            Self::FeatureExtractionFailed => "FEATURE_EXTRACTION_FAILED",
            Self::PipelineFailed => "PIPELINE_FAILED",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::TokenInvalidAddress => "TOKEN_INVALID_ADDRESS",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::TokenInvalidAddress | Self::ConfigInvalidValue => 400,
            Self::ApiRateLimited => 429,
            Self::ProviderTimeout => 504,
            _ => 500,
        }
    }

    /// Errors that only degrade an analysis instead of failing it
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable
                | Self::ProviderTimeout
                | Self::AiUnavailable
                | Self::AiMalformedResponse
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Adapter failed or returned nothing
    pub fn provider_unavailable(provider: &str, msg: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ProviderUnavailable,
            format!("{}: {}", provider, msg.into()),
        )
    }

    /// Adapter timed out
    pub fn provider_timeout(provider: &str, timeout_ms: u64) -> Self {
        Self::new(
            ErrorCode::ProviderTimeout,
            format!("{} did not respond within {}ms", provider, timeout_ms),
        )
    }

    /// AI provider unavailable
    pub fn ai_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AiUnavailable, msg)
    }

    /// AI response could not be parsed
    pub fn ai_malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AiMalformedResponse, msg)
    }

    /// Feature vector unusable (non-finite values)
    pub fn feature_extraction_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FeatureExtractionFailed, msg)
    }

    /// Whole pipeline failed
    pub fn pipeline_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::PipelineFailed, msg)
    }

    /// Invalid token address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenInvalidAddress, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::AiMalformedResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::provider_timeout("honeypot", 10_000);
        assert_eq!(err.code, ErrorCode::ProviderTimeout);
        assert_eq!(err.code_str(), "PROVIDER_TIMEOUT");
        assert!(err.to_string().contains("10000ms"));
    }

    #[test]
    fn test_degradable() {
        assert!(ErrorCode::ProviderUnavailable.is_degradable());
        assert!(ErrorCode::AiMalformedResponse.is_degradable());
        assert!(!ErrorCode::PipelineFailed.is_degradable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::PipelineFailed.http_status(), 500);
    }

    #[test]
    fn test_json_error_maps_to_malformed_ai() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::AiMalformedResponse);
        assert!(std::error::Error::source(&err).is_some());
    }
}
