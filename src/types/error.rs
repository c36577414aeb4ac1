//! Unified Error Type System
//!
//! Centralized error types for the orchestration layer.
//!
//! ## Error Kinds
//!
//! - **ConfigurationMissing / ConfigurationInvalid**: raised while building a
//!   snapshot; fatal at startup, logged and ignored on hot reload
//! - **NoProviderAvailable**: the requested pool has no enabled, usable entry
//! - **DispatchTimeout**: vendor call exceeded the configured budget
//! - **DispatchFailure**: vendor error, non-success status or malformed payload
//! - **TtsFailure**: speech synthesis vendor error or malformed payload
//!
//! Every per-request error is recoverable by the caller. Vendor failures carry an
//! [`ErrorCategory`] derived from the HTTP status or transport error.

use std::time::Duration;
use thiserror::Error;

use super::ComplexityClass;

// =============================================================================
// Error Categories
// =============================================================================

/// Vendor failure categories, used for logging and retry hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the vendor
    RateLimit,
    /// Authentication or authorization rejected
    Auth,
    /// Connectivity issue (DNS, connect, read timeout)
    Network,
    /// Vendor endpoint unavailable or unknown
    Unavailable,
    /// Request rejected as invalid
    BadRequest,
    /// Response body did not have the expected shape
    ParseError,
    /// Temporary server-side failure
    Transient,
    /// Call abandoned because the dispatcher cancelled it
    Cancelled,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Whether asking the same vendor again later is likely to succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::ParseError
        )
    }

    /// Map an HTTP status code to a category
    pub fn from_http_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimit,
            401 | 403 => Self::Auth,
            400 | 413 | 422 => Self::BadRequest,
            404 => Self::Unavailable,
            500 | 502 | 503 | 504 => Self::Transient,
            _ => Self::Unknown,
        }
    }
}

// =============================================================================
// Vendor Error
// =============================================================================

/// Failure reported by an AI or TTS vendor call
#[derive(Debug, Clone)]
pub struct VendorError {
    /// Error category
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Vendor or provider that produced the error
    pub provider: String,
    /// HTTP status, when the vendor answered at all
    pub status: Option<u16>,
}

impl std::fmt::Display for VendorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "[{}:{}] HTTP {}: {}",
                self.provider, self.category, status, self.message
            ),
            None => write!(f, "[{}:{}] {}", self.provider, self.category, self.message),
        }
    }
}

impl std::error::Error for VendorError {}

impl VendorError {
    pub fn new(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: provider.into(),
            status: None,
        }
    }

    /// Non-success HTTP answer
    pub fn from_status(status: u16, body: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::from_http_status(status),
            message: truncate_body(body.into()),
            provider: provider.into(),
            status: Some(status),
        }
    }

    /// Transport-level failure from reqwest
    pub fn from_transport(err: &reqwest::Error, provider: impl Into<String>) -> Self {
        let category = if err.is_timeout() || err.is_connect() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else if err.is_builder() {
            ErrorCategory::BadRequest
        } else {
            ErrorCategory::Unknown
        };
        Self {
            category,
            message: err.to_string(),
            provider: provider.into(),
            status: err.status().map(|s| s.as_u16()),
        }
    }

    /// Response arrived but lacked the expected field or shape
    pub fn malformed(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ParseError, message, provider)
    }

    /// Call abandoned on cancellation
    pub fn cancelled(provider: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Cancelled, "call cancelled", provider)
    }

    /// Missing credential, endpoint or other per-call prerequisite
    pub fn misconfigured(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::new(ErrorCategory::BadRequest, message, provider)
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

/// Vendors sometimes echo large HTML pages on errors
fn truncate_body(body: String) -> String {
    const MAX_BODY_CHARS: usize = 512;
    if body.chars().count() <= MAX_BODY_CHARS {
        return body;
    }
    let mut truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
    truncated.push_str("...");
    truncated
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum VoxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors (startup-fatal)
    // -------------------------------------------------------------------------
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Configuration invalid: {0}")]
    ConfigurationInvalid(String),

    // -------------------------------------------------------------------------
    // Per-request Errors
    // -------------------------------------------------------------------------
    #[error("No provider available for {class}: {reason}")]
    NoProviderAvailable {
        class: ComplexityClass,
        reason: String,
    },

    #[error("Provider '{provider}' timed out after {timeout:?}")]
    DispatchTimeout { provider: String, timeout: Duration },

    #[error("Dispatch failed: {0}")]
    DispatchFailure(VendorError),

    #[error("Speech synthesis failed: {0}")]
    TtsFailure(VendorError),
}

pub type Result<T> = std::result::Result<T, VoxError>;

impl VoxError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::ConfigurationMissing(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        Self::ConfigurationInvalid(what.into())
    }

    pub fn no_provider(class: ComplexityClass, reason: impl Into<String>) -> Self {
        Self::NoProviderAvailable {
            class,
            reason: reason.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, timeout: Duration) -> Self {
        Self::DispatchTimeout {
            provider: provider.into(),
            timeout,
        }
    }

    /// Configuration errors abort startup; everything else is per-request
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing(_) | Self::ConfigurationInvalid(_)
        )
    }

    /// Whether another provider from the same pool may be attempted
    pub fn allows_fallback(&self) -> bool {
        matches!(self, Self::DispatchFailure(_) | Self::DispatchTimeout { .. })
    }

    /// Provider name attached to dispatch errors
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::DispatchTimeout { provider, .. } => Some(provider),
            Self::DispatchFailure(err) | Self::TtsFailure(err) => Some(&err.provider),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
