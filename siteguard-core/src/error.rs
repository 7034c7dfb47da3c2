//! Error types for the authorization engine

/// Result alias used across the engine
pub type RbacResult<T> = Result<T, RbacError>;

/// Errors raised while resolving or configuring permissions
///
/// Lookup errors never reach guards or directives: the service catches them,
/// logs them and answers "no access".
#[derive(thiserror::Error, Debug)]
pub enum RbacError {
    /// A collaborator lookup returned an error
    #[error("{lookup} lookup failed: {source}")]
    LookupFailed {
        lookup: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A collaborator lookup did not answer in time
    #[error("{lookup} lookup timed out after {timeout_ms}ms")]
    LookupTimeout { lookup: &'static str, timeout_ms: u64 },

    /// Permission identifier not in the catalogue
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    /// Business role identifier not in the catalogue
    #[error("Unknown business role: {0}")]
    UnknownRole(String),

    /// A role table entry that grants nothing
    #[error("Business role {0} must grant at least one permission")]
    EmptyRole(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RbacError {
    /// Whether this error came from a collaborator lookup
    pub fn is_lookup(&self) -> bool {
        matches!(self, RbacError::LookupFailed { .. } | RbacError::LookupTimeout { .. })
    }
}
