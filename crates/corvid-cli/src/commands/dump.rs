//! The `dump` subcommand: structural view of a compiled module.

use corvid_bytecode::Module;

use crate::cli::DumpParams;

use super::CliError;

pub fn run(params: DumpParams) -> Result<(), CliError> {
    let module = Module::from_path(&params.module)?;
    print!("{}", corvid_bytecode::dump(&module));
    Ok(())
}
