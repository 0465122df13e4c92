pub mod dump;
pub mod translate;

/// Error surface for the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse IR module: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse IR module: {0}")]
    Postcard(#[from] postcard::Error),
    #[error(transparent)]
    Translate(#[from] corvid_compiler::TranslateError),
    #[error(transparent)]
    Module(#[from] corvid_bytecode::ModuleError),
}
