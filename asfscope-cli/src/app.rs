use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// asfscope - ASF module container inspection
#[derive(Debug, Parser)]
#[command(name = "asfscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (info-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display the container header and dependency table.
    Header {
        /// Path to the container.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Walk the dependency tree of a module without loading it into an engine.
    Deps {
        /// Directory module names are resolved against.
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,

        /// Name of the root module, relative to --root.
        #[arg(value_name = "MODULE")]
        module: String,
    },

    /// Build a container from a code segment and dependency names.
    Pack {
        /// File holding the precompiled code segment.
        #[arg(long, value_name = "FILE")]
        code: PathBuf,

        /// Dependency name; repeat for several, order is kept.
        #[arg(short, long = "dependency", value_name = "NAME")]
        dependencies: Vec<String>,

        /// Where to write the container.
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Validate a host registration manifest.
    Manifest {
        /// Path to the JSON manifest.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_keeps_dependency_order() {
        let cli = Cli::try_parse_from([
            "asfscope", "pack", "--code", "a.bin", "-d", "z.asf", "-d", "a.asf", "-o", "out.asf",
        ])
        .unwrap();
        match cli.command {
            Command::Pack { dependencies, .. } => assert_eq!(dependencies, ["z.asf", "a.asf"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["asfscope", "header", "m.asf", "--json"]).unwrap();
        assert!(cli.global.json);
        assert!(!cli.global.verbose);
    }
}
