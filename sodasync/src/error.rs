use std::error;
use std::fmt;

/// Convenient result type for sync operations using [`SyncError`] as the error type.
pub type SyncResult<T> = Result<T, SyncError>;

/// Main error type for sync operations.
///
/// [`SyncError`] can represent a single error, an error with additional dynamic
/// detail, or multiple aggregated errors, while exposing a unified interface
/// for classification via [`ErrorKind`].
#[derive(Debug, Clone)]
pub struct SyncError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
///
/// Users should not interact with this type directly but use [`SyncError`]
/// methods instead.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple aggregated errors
    Many(Vec<SyncError>),
}

/// Specific categories of errors that can occur during a sync run.
///
/// The kinds are grouped by the phase that produces them: credential
/// resolution failures prevent a run from starting, fetch failures abort
/// pagination at the current offset, and load failures abort the merge while
/// previously committed pages remain in place.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Credential errors: the run never starts.
    CredentialMissing,
    CredentialUnauthorized,

    // Fetch errors: pagination aborts at the current offset.
    SourceRequestFailed,
    SourceRejectedRequest,
    SourceResponseInvalid,

    // Load errors: the merge aborts, committed pages remain.
    DestinationConnectionFailed,
    DestinationQueryFailed,

    // Data errors.
    InvalidRecord,
    ConversionError,
    DeserializationError,
    SerializationError,

    // Configuration and state errors.
    ConfigError,
    InvalidState,

    // IO errors.
    IoError,

    // Unknown / uncategorized.
    Unknown,
}

impl ErrorKind {
    /// Whether an error of this kind is worth retrying with backoff.
    ///
    /// Only transient transport-level failures qualify: a rejected request or
    /// an unparsable body will fail identically on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::SourceRequestFailed | ErrorKind::DestinationConnectionFailed
        )
    }
}

impl SyncError {
    /// Creates a [`SyncError`] containing multiple aggregated errors.
    pub fn many(errors: Vec<SyncError>) -> SyncError {
        SyncError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or
    /// [`ErrorKind::Unknown`] if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => errors.iter().find_map(|e| e.detail()),
            _ => None,
        }
    }

    /// Whether this error is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

impl PartialEq for SyncError {
    fn eq(&self, other: &SyncError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (ErrorRepr::Many(errors_a), ErrorRepr::Many(errors_b)) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
            ErrorRepr::Many(ref errors) => {
                if errors.is_empty() {
                    write!(f, "Multiple errors occurred (empty)")?;
                } else if errors.len() == 1 {
                    errors[0].fmt(f)?;
                } else {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl error::Error for SyncError {}

/// Creates a [`SyncError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for SyncError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> SyncError {
        SyncError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates a [`SyncError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for SyncError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> SyncError {
        SyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Creates a [`SyncError`] from a vector of errors for aggregation.
impl<E> From<Vec<E>> for SyncError
where
    E: Into<SyncError>,
{
    fn from(errors: Vec<E>) -> SyncError {
        SyncError {
            repr: ErrorRepr::Many(errors.into_iter().map(Into::into).collect()),
        }
    }
}

/// Converts [`std::io::Error`] to [`SyncError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> SyncError {
        SyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::IoError,
                "I/O error occurred",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`serde_json::Error`] to [`SyncError`] with appropriate error kind.
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> SyncError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        SyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`chrono::ParseError`] to [`SyncError`] with [`ErrorKind::ConversionError`].
impl From<chrono::ParseError> for SyncError {
    fn from(err: chrono::ParseError) -> SyncError {
        SyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::ConversionError,
                "Timestamp parsing failed",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`reqwest::Error`] to [`SyncError`] with appropriate error kind.
///
/// Transport failures and server errors (5xx) map to the retryable
/// [`ErrorKind::SourceRequestFailed`]; client errors (4xx) map to
/// [`ErrorKind::SourceRejectedRequest`] except authorization failures which map
/// to [`ErrorKind::CredentialUnauthorized`]; body decoding failures map to
/// [`ErrorKind::SourceResponseInvalid`].
impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> SyncError {
        let (kind, description) = match err.status() {
            Some(status) if status == reqwest::StatusCode::UNAUTHORIZED => (
                ErrorKind::CredentialUnauthorized,
                "Source API rejected the app token",
            ),
            Some(status) if status == reqwest::StatusCode::FORBIDDEN => (
                ErrorKind::CredentialUnauthorized,
                "Source API denied access",
            ),
            Some(status) if status.is_client_error() => (
                ErrorKind::SourceRejectedRequest,
                "Source API rejected the request",
            ),
            Some(_) => (
                ErrorKind::SourceRequestFailed,
                "Source API returned a server error",
            ),
            None if err.is_decode() => (
                ErrorKind::SourceResponseInvalid,
                "Source API response could not be decoded",
            ),
            None => (
                ErrorKind::SourceRequestFailed,
                "HTTP request to the source API failed",
            ),
        };

        SyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`sqlx::Error`] to [`SyncError`] with appropriate error kind.
///
/// Connection and pool errors map to the retryable
/// [`ErrorKind::DestinationConnectionFailed`], while query failures map to
/// [`ErrorKind::DestinationQueryFailed`].
impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> SyncError {
        let kind = match &err {
            sqlx::Error::Database(_)
            | sqlx::Error::RowNotFound
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => ErrorKind::DestinationQueryFailed,
            sqlx::Error::Io(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::Tls(_) => ErrorKind::DestinationConnectionFailed,
            _ => ErrorKind::DestinationQueryFailed,
        };

        SyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                kind,
                "Destination database operation failed",
                err.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bail, sync_error};

    #[test]
    fn simple_error_creation() {
        let err = SyncError::from((ErrorKind::CredentialMissing, "App token not found"));
        assert_eq!(err.kind(), ErrorKind::CredentialMissing);
        assert_eq!(err.detail(), None);
        assert_eq!(err.kinds(), vec![ErrorKind::CredentialMissing]);
    }

    #[test]
    fn error_with_detail() {
        let err = SyncError::from((
            ErrorKind::SourceRequestFailed,
            "Fetch failed",
            "offset 2000: connection reset".to_string(),
        ));
        assert_eq!(err.kind(), ErrorKind::SourceRequestFailed);
        assert_eq!(err.detail(), Some("offset 2000: connection reset"));
    }

    #[test]
    fn multiple_errors() {
        let errors = vec![
            SyncError::from((ErrorKind::InvalidRecord, "Missing id")),
            SyncError::from((ErrorKind::ConversionError, "Bad timestamp")),
        ];
        let multi_err = SyncError::many(errors);

        assert_eq!(multi_err.kind(), ErrorKind::InvalidRecord);
        assert_eq!(
            multi_err.kinds(),
            vec![ErrorKind::InvalidRecord, ErrorKind::ConversionError]
        );
        assert_eq!(multi_err.detail(), None);
    }

    #[test]
    fn empty_multiple_errors() {
        let multi_err = SyncError::many(vec![]);
        assert_eq!(multi_err.kind(), ErrorKind::Unknown);
        assert_eq!(multi_err.kinds(), vec![]);
    }

    #[test]
    fn transient_classification() {
        assert!(ErrorKind::SourceRequestFailed.is_transient());
        assert!(ErrorKind::DestinationConnectionFailed.is_transient());
        assert!(!ErrorKind::SourceRejectedRequest.is_transient());
        assert!(!ErrorKind::CredentialUnauthorized.is_transient());
        assert!(!ErrorKind::DestinationQueryFailed.is_transient());
    }

    #[test]
    fn error_display() {
        let err = SyncError::from((
            ErrorKind::SourceRequestFailed,
            "Fetch failed",
            "offset 1000".to_string(),
        ));
        let display_str = format!("{err}");
        assert!(display_str.contains("SourceRequestFailed"));
        assert!(display_str.contains("Fetch failed"));
        assert!(display_str.contains("offset 1000"));
    }

    #[test]
    fn macro_usage() {
        let err = sync_error!(ErrorKind::InvalidRecord, "Record is missing its id");
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
        assert_eq!(err.detail(), None);

        let err_with_detail = sync_error!(
            ErrorKind::ConversionError,
            "Timestamp conversion failed",
            "not a SODA floating timestamp: 'abc'"
        );
        assert_eq!(err_with_detail.kind(), ErrorKind::ConversionError);
        assert!(err_with_detail.detail().unwrap().contains("abc"));
    }

    #[test]
    fn bail_macro() {
        fn failing() -> SyncResult<i32> {
            bail!(ErrorKind::InvalidState, "Test error");
        }

        let err = failing().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn json_error_classification() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let sync_err = SyncError::from(json_err);
        assert_eq!(sync_err.kind(), ErrorKind::DeserializationError);
    }
}
