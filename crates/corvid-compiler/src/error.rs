//! Translation error taxonomy.
//!
//! Every variant attributes the failure to the symbol it occurred in; the
//! driver surfaces the first failure and stops. Translation is deterministic,
//! so nothing here is retryable.

use std::io;

use crate::encode::EncodeError;
use crate::regalloc::LivenessError;

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// A disallowed instruction survived to serialization.
    #[error("function '{function}': illegal instruction '{mnemonic}' must be removed before serialization")]
    IllegalConstruct {
        function: String,
        mnemonic: &'static str,
    },

    /// A canonicalization or optimization pass failed on a symbol.
    #[error("symbol '{symbol}': {reason}")]
    TransformFailure { symbol: String, reason: String },

    /// Malformed def-use chain in a function body.
    #[error("function '{function}': liveness analysis failed")]
    LivenessFailure {
        function: String,
        #[source]
        source: LivenessError,
    },

    /// An operand type has no wire kind-code mapping.
    #[error("symbol '{symbol}': type '{type_name}' has no kind-code mapping")]
    InvalidType { symbol: String, type_name: String },

    /// Bytecode or constant encoding rejected an operand.
    #[error("symbol '{symbol}': encoding failed")]
    EncodingFailure {
        symbol: String,
        #[source]
        source: EncodeError,
    },

    /// Container assembly detected an inconsistency and will not emit.
    #[error("module '{module}': container assembly failed: {reason}")]
    BuildFailure { module: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type TranslateResult<T> = Result<T, TranslateError>;
