mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    // Library and CLI warnings on stderr unless --json; --verbose lowers to info; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::new()
            .filter_module("asfscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Header { path } => commands::header::run(path, &cli.global),
        Command::Deps { root, module } => commands::deps::run(root, module, &cli.global),
        Command::Pack {
            code,
            dependencies,
            output,
        } => commands::pack::run(code, dependencies, output, &cli.global),
        Command::Manifest { path } => commands::manifest::run(path, &cli.global),
    }
}
