use smartcompare_core_types::ComparisonId;
use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Differences between the compared graphs are never errors: they are
/// reported as `Difference` entries. The kinds below cover configuration
/// mistakes, graph construction mistakes and broken introspection contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    InvalidPattern,
    InvalidInput,

    // Type registry
    DuplicateType,
    UnknownType,
    DuplicateMember,

    // Graph construction
    NotFound,
    UnknownMember,
    StaticMember,
    ShapeMismatch,

    // Comparison
    /// An introspector or field accessor violated its contract mid-scan (fatal)
    IntrospectionFailure,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::DuplicateType => "ERR_DUPLICATE_TYPE",
            ExErrorKind::UnknownType => "ERR_UNKNOWN_TYPE",
            ExErrorKind::DuplicateMember => "ERR_DUPLICATE_MEMBER",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::UnknownMember => "ERR_UNKNOWN_MEMBER",
            ExErrorKind::StaticMember => "ERR_STATIC_MEMBER",
            ExErrorKind::ShapeMismatch => "ERR_SHAPE_MISMATCH",
            ExErrorKind::IntrospectionFailure => "ERR_INTROSPECTION_FAILURE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a stable classification for programmatic handling plus the
/// comparison context (operation, field path, type) useful when debugging a
/// broken introspector.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    type_name: Option<String>,
    comparison_id: Option<ComparisonId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            type_name: None,
            comparison_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add field path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add type name context
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Add comparison ID context
    pub fn with_comparison_id(mut self, comparison_id: ComparisonId) -> Self {
        self.comparison_id = Some(comparison_id);
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

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the field path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the type name context, if any
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Get the comparison ID context, if any
    pub fn comparison_id(&self) -> Option<&ComparisonId> {
        self.comparison_id.as_ref()
    }

    /// Get the error message
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
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, " (type: {})", type_name)?;
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

/// Domain error taxonomy for SmartCompare operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SmartCompareError {
    // ===== Configuration Errors =====
    /// A path pattern failed to compile
    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ===== Type Registry Errors =====
    /// A type with this name is already registered
    #[error("Type already defined: {type_name}")]
    DuplicateType { type_name: String },

    /// A type id or name does not resolve to a registered type
    #[error("Unknown type: {type_name}")]
    UnknownType { type_name: String },

    /// A member name is declared twice on the same type
    #[error("Member {member} declared twice on type {type_name}")]
    DuplicateMember { type_name: String, member: String },

    // ===== Graph Errors =====
    /// Node id does not exist in the graph
    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: u32 },

    /// The member is not declared on the node's type or any ancestor
    #[error("Type {type_name} has no member {member}")]
    UnknownMember { type_name: String, member: String },

    /// Static members belong to the type and cannot be assigned on a node
    #[error("Member {member} of type {type_name} is static")]
    StaticMember { type_name: String, member: String },

    /// A node operation was applied to a node of the wrong shape
    #[error("Shape mismatch for type {type_name}: expected {expected}")]
    ShapeMismatch { type_name: String, expected: String },

    // ===== Comparison Errors =====
    /// A field could not be read although the introspector surfaced it
    #[error("Introspection failed at '{path}': {reason}")]
    IntrospectionFailure { path: String, reason: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File system error
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from SmartCompareError to ExError
impl From<SmartCompareError> for ExError {
    fn from(err: SmartCompareError) -> Self {
        let message = err.to_string();
        match err {
            SmartCompareError::InvalidPattern { pattern, .. } => {
                ExError::new(ExErrorKind::InvalidPattern)
                    .with_path(pattern)
                    .with_message(message)
            }

            SmartCompareError::DuplicateType { type_name } => {
                ExError::new(ExErrorKind::DuplicateType)
                    .with_type_name(type_name)
                    .with_message(message)
            }

            SmartCompareError::UnknownType { type_name } => ExError::new(ExErrorKind::UnknownType)
                .with_type_name(type_name)
                .with_message(message),

            SmartCompareError::DuplicateMember { type_name, .. } => {
                ExError::new(ExErrorKind::DuplicateMember)
                    .with_type_name(type_name)
                    .with_message(message)
            }

            SmartCompareError::NodeNotFound { .. } => {
                ExError::new(ExErrorKind::NotFound).with_message(message)
            }

            SmartCompareError::UnknownMember { type_name, .. } => {
                ExError::new(ExErrorKind::UnknownMember)
                    .with_type_name(type_name)
                    .with_message(message)
            }

            SmartCompareError::StaticMember { type_name, .. } => {
                ExError::new(ExErrorKind::StaticMember)
                    .with_type_name(type_name)
                    .with_message(message)
            }

            SmartCompareError::ShapeMismatch { type_name, .. } => {
                ExError::new(ExErrorKind::ShapeMismatch)
                    .with_type_name(type_name)
                    .with_message(message)
            }

            SmartCompareError::IntrospectionFailure { path, .. } => {
                ExError::new(ExErrorKind::IntrospectionFailure)
                    .with_path(path)
                    .with_message(message)
            }

            SmartCompareError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            SmartCompareError::Io { .. } => ExError::new(ExErrorKind::Io).with_message(message),

            SmartCompareError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for SmartCompareError {
    fn from(err: serde_json::Error) -> Self {
        SmartCompareError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        SmartCompareError::from(err).into()
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        SmartCompareError::Io {
            message: err.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_maps_to_kind() {
        let err = SmartCompareError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::InvalidPattern);
        assert_eq!(ex.code(), "ERR_INVALID_PATTERN");
        assert_eq!(ex.path(), Some("("));
        assert!(ex.message().contains("unclosed group"));
    }

    #[test]
    fn test_display_includes_context() {
        let ex = ExError::new(ExErrorKind::IntrospectionFailure)
            .with_op("compare")
            .with_path("beanField.stringField")
            .with_message("node 7 is not a record");
        let text = ex.to_string();
        assert!(text.starts_with("[ERR_INTROSPECTION_FAILURE]"));
        assert!(text.contains("in operation 'compare'"));
        assert!(text.contains("(path: beanField.stringField)"));
    }

    #[test]
    fn test_source_chain() {
        let inner = ExError::new(ExErrorKind::Io).with_message("disk gone");
        let outer = ExError::new(ExErrorKind::Serialization).with_source(inner);
        assert_eq!(outer.source_error().map(|e| e.kind()), Some(ExErrorKind::Io));
        assert!(std::error::Error::source(&outer).is_some());
    }
}
