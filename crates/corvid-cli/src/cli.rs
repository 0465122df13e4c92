//! Command-line definition and argument extraction.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};
use corvid_compiler::OutputFormat;

/// On-disk encoding of the input IR module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrFormat {
    Json,
    Postcard,
}

pub fn build_cli() -> Command {
    Command::new("corvid")
        .about("Corvid VM bytecode module tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("translate")
                .about("Translate an IR module into a bytecode container")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .value_name("FILE")
                        .help("IR module to translate"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output path (defaults to the input with a .cvbm extension)"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["binary", "dump", "source"])
                        .default_value("binary")
                        .help("binary container, structural text dump, or annotated source text"),
                )
                .arg(
                    Arg::new("ir-format")
                        .long("ir-format")
                        .value_parser(["json", "postcard"])
                        .default_value("json")
                        .help("Encoding of the input IR module"),
                )
                .arg(
                    Arg::new("optimize")
                        .long("optimize")
                        .action(ArgAction::SetTrue)
                        .help("Run the optimization fixpoint before emission"),
                )
                .arg(
                    Arg::new("strip-debug-ops")
                        .long("strip-debug-ops")
                        .action(ArgAction::SetTrue)
                        .help("Reject trace/print/break instructions"),
                )
                .arg(
                    Arg::new("strip-symbols")
                        .long("strip-symbols")
                        .action(ArgAction::SetTrue)
                        .help("Omit the internal-function name table"),
                ),
        )
        .subcommand(
            Command::new("dump")
                .about("Print the structural dump of a compiled module")
                .arg(
                    Arg::new("module")
                        .required(true)
                        .value_name("FILE")
                        .help("Compiled .cvbm module"),
                ),
        )
}

pub struct TranslateParams {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub ir_format: IrFormat,
    pub optimize: bool,
    pub strip_debug_ops: bool,
    pub strip_symbols: bool,
}

impl TranslateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let format = match m.get_one::<String>("format").map(String::as_str) {
            Some("dump") => OutputFormat::TextDump,
            Some("source") => OutputFormat::SourceText,
            _ => OutputFormat::Binary,
        };
        let ir_format = match m.get_one::<String>("ir-format").map(String::as_str) {
            Some("postcard") => IrFormat::Postcard,
            _ => IrFormat::Json,
        };
        Self {
            input: PathBuf::from(m.get_one::<String>("input").expect("required arg")),
            output: m.get_one::<String>("output").map(PathBuf::from),
            format,
            ir_format,
            optimize: m.get_flag("optimize"),
            strip_debug_ops: m.get_flag("strip-debug-ops"),
            strip_symbols: m.get_flag("strip-symbols"),
        }
    }
}

pub struct DumpParams {
    pub module: PathBuf,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            module: PathBuf::from(m.get_one::<String>("module").expect("required arg")),
        }
    }
}
