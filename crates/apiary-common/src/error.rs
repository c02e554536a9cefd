//! Error taxonomy shared by every layer.
//!
//! Repository, bus and auth code return `anyhow::Result`; the *kind* of a
//! failure travels inside the chain as an [`ApiaryError`] so that the HTTP and
//! gRPC surfaces can map it to a status without string matching.

/// Application-specific error kinds
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiaryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiaryError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ApiaryError::NotFound(format!("{} {}", entity, id))
    }

    /// Short machine-readable kind name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiaryError::InvalidInput(_) => "invalid_input",
            ApiaryError::Unauthenticated(_) => "unauthenticated",
            ApiaryError::Forbidden(_) => "forbidden",
            ApiaryError::NotFound(_) => "not_found",
            ApiaryError::Conflict(_) => "conflict",
            ApiaryError::Internal(_) => "internal",
        }
    }
}

/// Locate the first [`ApiaryError`] anywhere in an anyhow chain.
pub fn find_apiary_error(err: &anyhow::Error) -> Option<&ApiaryError> {
    if let Some(e) = err.downcast_ref::<ApiaryError>() {
        return Some(e);
    }
    err.chain().find_map(|cause| cause.downcast_ref::<ApiaryError>())
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn test_apiary_error_display() {
        let err = ApiaryError::not_found("hive", 7);
        assert_eq!(format!("{}", err), "hive 7 not found");

        let err = ApiaryError::InvalidInput("bad id".to_string());
        assert_eq!(format!("{}", err), "invalid input: bad id");

        let err = ApiaryError::Conflict("duplicate username".to_string());
        assert_eq!(format!("{}", err), "conflict: duplicate username");
    }

    #[test]
    fn test_find_apiary_error_through_context() {
        let result: anyhow::Result<()> = Err(ApiaryError::not_found("sensor", 5).into());
        let err = result.context("Failed to get sensor").unwrap_err();

        assert_eq!(
            find_apiary_error(&err),
            Some(&ApiaryError::NotFound("sensor 5".to_string()))
        );
        assert_eq!(format!("{:#}", err), "Failed to get sensor: sensor 5 not found");
    }

    #[test]
    fn test_find_apiary_error_absent() {
        let err = anyhow::anyhow!("plain failure");
        assert!(find_apiary_error(&err).is_none());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ApiaryError::Forbidden(String::new()).kind(), "forbidden");
        assert_eq!(ApiaryError::Internal(String::new()).kind(), "internal");
    }
}
