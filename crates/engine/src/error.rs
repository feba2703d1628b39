use thiserror::Error;

/// Shader compilation failed during gallery start-up.
///
/// This is fatal: a gallery with zero compiled programs cannot render, so the
/// caller is expected to abort initialisation rather than continue with a
/// partial registry.
#[derive(Debug, Clone, Error)]
#[error("shader compilation failed: {log}")]
pub struct CompileError {
    /// Compiler/linker log describing the failure.
    pub log: String,
}

impl CompileError {
    pub fn new(log: impl Into<String>) -> Self {
        Self { log: log.into() }
    }
}

/// A program name was looked up that the registry never registered.
///
/// Selection is always drawn from the registry's own name list, so seeing
/// this at runtime signals a consistency bug, not a user condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown program '{0}'")]
pub struct UnknownProgramError(pub String);

/// A parameter path was read or written that the tree never declared.
///
/// The default configuration makes every path known at startup; external
/// control surfaces and presets can still name paths that do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown parameter '{0}'")]
pub struct UnknownParameterError(pub String);

/// Failures the per-frame uniform composer can propagate.
#[derive(Debug, Clone, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Program(#[from] UnknownProgramError),
    #[error(transparent)]
    Parameter(#[from] UnknownParameterError),
    /// A vec3 gather binding read a leaf that holds no number (a toggle,
    /// color, or choice). Plans are static configuration, so this is a setup
    /// bug surfaced on the first frame.
    #[error("parameter '{path}' is not numeric; gather bindings require numbers")]
    NonNumericGather { path: String },
}
