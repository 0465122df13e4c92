//! The `translate` subcommand: IR in, container (or text) out.

use std::fs;
use std::io::Write as _;

use corvid_compiler::{OutputFormat, TargetOptions, translate_module};

use crate::cli::{IrFormat, TranslateParams};

use super::CliError;

pub fn run(params: TranslateParams) -> Result<(), CliError> {
    let bytes = fs::read(&params.input)?;
    let mut module: corvid_compiler::ir::Module = match params.ir_format {
        IrFormat::Json => serde_json::from_slice(&bytes)?,
        IrFormat::Postcard => postcard::from_bytes(&bytes)?,
    };

    let options = TargetOptions {
        optimize: params.optimize,
        strip_debug_ops: params.strip_debug_ops,
        strip_symbols: params.strip_symbols,
        output_format: params.format,
    };

    match params.format {
        OutputFormat::Binary => {
            let path = params
                .output
                .unwrap_or_else(|| params.input.with_extension("cvbm"));
            let mut file = fs::File::create(&path)?;
            translate_module(&mut module, &options, &mut file)?;
            println!("wrote {}", path.display());
        }
        OutputFormat::TextDump | OutputFormat::SourceText => match params.output {
            Some(path) => {
                let mut file = fs::File::create(&path)?;
                translate_module(&mut module, &options, &mut file)?;
            }
            None => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                translate_module(&mut module, &options, &mut lock)?;
                lock.flush()?;
            }
        },
    }
    Ok(())
}
