//! Error types for rust-lwm2m-dm

use thiserror::Error;

/// Main error type for data-model and security-resolver operations
#[derive(Debug, Error)]
pub enum DmError {
    /// Unknown OID/IID/RID/RIID (maps to CoAP 4.04)
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation outside the Object's capability set, or a resource
    /// targeted with the wrong access mode (maps to CoAP 4.05)
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Allocation/snapshot failure or invariant violation (maps to CoAP 5.00)
    #[error("internal error: {0}")]
    Internal(String),

    /// Malformed URI, invalid security mode, transport/security mismatch,
    /// or missing required key material (maps to CoAP 4.00)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Type conversion error between resource value representations
    #[error("type conversion error: {0}")]
    TypeConversion(String),
}

impl DmError {
    /// NotFound error carrying the offending data-model path
    pub fn not_found(path: impl std::fmt::Display) -> Self {
        Self::NotFound(path.to_string())
    }
}

/// Result type alias for data-model operations
pub type Result<T> = std::result::Result<T, DmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DmError::NotFound("/0/1/2".into());
        assert_eq!(err.to_string(), "not found: /0/1/2");

        let err = DmError::MethodNotAllowed("instance reset".into());
        assert!(err.to_string().starts_with("method not allowed"));
    }
}
