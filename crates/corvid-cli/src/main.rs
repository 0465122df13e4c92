mod cli;
mod commands;

use cli::{DumpParams, TranslateParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("translate", m)) => commands::translate::run(TranslateParams::from_matches(m)),
        Some(("dump", m)) => commands::dump::run(DumpParams::from_matches(m)),
        _ => unreachable!("clap should have caught this"),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
