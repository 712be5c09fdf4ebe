use changetrail_core_types::RequestToken;
use thiserror::Error;

/// Result type alias using AuditError
pub type Result<T> = std::result::Result<T, AuditError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// The diff engine and the cascade tracker never fail; these kinds cover the
/// ambient surfaces around them (configuration, persistence sinks,
/// serialization). Each kind maps to a stable code for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus the audit context (collection,
/// document, request) the failure happened in.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    collection: Option<String>,
    document_id: Option<String>,
    request_token: Option<RequestToken>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            collection: None,
            document_id: None,
            request_token: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add collection context
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Add document ID context
    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    /// Add request token context
    pub fn with_request_token(mut self, token: RequestToken) -> Self {
        self.request_token = Some(token);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn request_token(&self) -> Option<&RequestToken> {
        self.request_token.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(collection) = &self.collection {
            write!(f, " (collection: {})", collection)?;
        }
        if let Some(document_id) = &self.document_id {
            write!(f, " (document_id: {})", document_id)?;
        }
        if let Some(token) = &self.request_token {
            write!(f, " (request_token: {})", token)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for the audit surfaces
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    /// Configuration text could not be parsed
    #[error("Failed to parse config: {message}")]
    ConfigParse { message: String },

    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {message}")]
    ConfigRead { path: String, message: String },

    /// Configuration parsed but holds an unusable value
    #[error("Invalid config value for {field}: {reason}")]
    InvalidConfigValue { field: String, reason: String },

    /// The audit sink refused or failed to store a record
    #[error("Failed to persist audit record for {collection}/{document_id}: {message}")]
    SinkFailure {
        collection: String,
        document_id: String,
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Internal error (should not happen)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<AuditError> for ExError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::ConfigParse { message } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("load_config")
                .with_message(message),

            AuditError::ConfigRead { path, message } => ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_message(format!("{}: {}", path, message)),

            AuditError::InvalidConfigValue { field, reason } => {
                ExError::new(ExErrorKind::InvalidConfig)
                    .with_op("load_config")
                    .with_message(format!("{}: {}", field, reason))
            }

            AuditError::SinkFailure {
                collection,
                document_id,
                message,
            } => ExError::new(ExErrorKind::Persistence)
                .with_op("persist_record")
                .with_collection(collection)
                .with_document_id(document_id)
                .with_message(message),

            AuditError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            AuditError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AuditError {
    fn from(err: toml::de::Error) -> Self {
        AuditError::ConfigParse {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::Io, "ERR_IO"),
            (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
            (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
            (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_sink_failure_maps_to_persistence_with_context() {
        let err: ExError = AuditError::SinkFailure {
            collection: "contracts".into(),
            document_id: "c1".into(),
            message: "disk full".into(),
        }
        .into();

        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.collection(), Some("contracts"));
        assert_eq!(err.document_id(), Some("c1"));
        assert_eq!(err.op(), Some("persist_record"));
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let err = ExError::new(ExErrorKind::InvalidConfig)
            .with_op("load_config")
            .with_message("max_depth must be positive");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_INVALID_CONFIG]"));
        assert!(text.contains("load_config"));
        assert!(text.contains("max_depth must be positive"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        use std::error::Error as _;
        let inner = ExError::new(ExErrorKind::Io).with_message("refused");
        let outer = ExError::new(ExErrorKind::Persistence).with_source(inner);
        assert_eq!(outer.source_error().map(|e| e.kind()), Some(ExErrorKind::Io));
        assert!(outer.source().is_some());
    }
}
