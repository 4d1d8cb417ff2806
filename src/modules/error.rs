//! Error types for the module engine.

use thiserror::Error;

/// Errors raised by a module's behavior.
///
/// These never cross the dispatcher's failure boundary: the dispatcher
/// records them per invocation and carries on with the remaining modules.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The stored source of a custom module failed to parse. Surfaces at
    /// the first invocation attempt; there is no pre-validation.
    #[error("failed to compile module '{module}': {message}")]
    Compile { module: String, message: String },

    /// A module's behavior failed while running.
    #[error("module '{module}' failed: {message}")]
    Execution { module: String, message: String },

    /// A node-scoped lifecycle event was delivered without a node.
    #[error("lifecycle event delivered without a node argument")]
    MissingNode,
}

/// Result type for module execution.
pub type ModuleResult<T> = Result<T, ModuleError>;
