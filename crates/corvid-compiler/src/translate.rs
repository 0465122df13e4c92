//! Translation driver.
//!
//! Runs the fixed pipeline and writes the selected output to the sink. The
//! container is fully assembled in memory before anything is written, so a
//! failing translation never leaves a partial artifact behind.

use std::collections::BTreeMap;
use std::io::Write;

use crate::annotate::{FunctionAnnotations, print_annotated};
use crate::build::build_module;
use crate::canonicalize::canonicalize;
use crate::error::{TranslateError, TranslateResult};
use crate::ir::Module;
use crate::regalloc::{allocate, compute_intervals};

/// Output format selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The binary container.
    #[default]
    Binary,
    /// Structural text dump of the binary container.
    TextDump,
    /// The textual IR annotated with liveness and register assignment; no
    /// container is built.
    SourceText,
}

/// Translation configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetOptions {
    /// Run the optimization fixpoint before ordinal assignment.
    pub optimize: bool,
    /// Treat debug instructions as illegal; they must already be gone.
    pub strip_debug_ops: bool,
    /// Omit the internal-function name/signature table.
    pub strip_symbols: bool,
    pub output_format: OutputFormat,
}

/// Canonicalize `module` and write the selected output to `out`.
pub fn translate_module(
    module: &mut Module,
    options: &TargetOptions,
    out: &mut dyn Write,
) -> TranslateResult<()> {
    canonicalize(module, options)?;

    if options.output_format == OutputFormat::SourceText {
        // Run the allocator purely to decorate the printout.
        let mut annotations = BTreeMap::new();
        for func in module.functions() {
            let intervals =
                compute_intervals(func).map_err(|source| TranslateError::LivenessFailure {
                    function: func.name.clone(),
                    source,
                })?;
            let allocation =
                allocate(func).map_err(|source| TranslateError::LivenessFailure {
                    function: func.name.clone(),
                    source,
                })?;
            annotations.insert(
                func.name.clone(),
                FunctionAnnotations {
                    intervals,
                    allocation,
                },
            );
        }
        out.write_all(print_annotated(module, &annotations).as_bytes())?;
        return Ok(());
    }

    let bytes = build_module(module, options)?;
    match options.output_format {
        OutputFormat::Binary => out.write_all(&bytes)?,
        OutputFormat::TextDump => {
            let loaded = corvid_bytecode::Module::from_bytes(bytes).map_err(|err| {
                TranslateError::BuildFailure {
                    module: module.name.clone(),
                    reason: format!("emitted container failed to load: {err}"),
                }
            })?;
            out.write_all(corvid_bytecode::dump(&loaded).as_bytes())?;
        }
        OutputFormat::SourceText => unreachable!("handled above"),
    }
    Ok(())
}
