//! tybuild CLI — dependency queries and Visual Studio project generation for
//! C++ source trees.
//!
//! Provides `tybuild deps` for listing the compile units a file depends on,
//! `tybuild generate` for incremental project and solution generation,
//! `tybuild cmake` for exporting projects as CMake variables, and
//! `tybuild projects` for listing discovered projects.

#![warn(missing_docs)]

mod cmake;
mod deps;
mod generate;
mod pipeline;
mod projects;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// tybuild — incremental build-file generation for C++ projects.
#[derive(Parser, Debug)]
#[command(name = "tybuild", version, about = "Custom build system for C++ projects")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `tybuild.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List .cpp file dependencies of a source file.
    Deps(DepsArgs),
    /// Generate Visual Studio project and solution files.
    Generate(GenerateArgs),
    /// Export discovered projects as CMake variables.
    Cmake(CmakeArgs),
    /// List discovered projects.
    Projects,
}

/// Arguments for the `tybuild deps` subcommand.
#[derive(Parser, Debug)]
pub struct DepsArgs {
    /// Root directory containing the source tree.
    pub root: String,

    /// Starting .cpp or .h file (relative to root or absolute).
    pub start: String,

    /// Rebuild the dependency cache from scratch.
    #[arg(long)]
    pub refresh: bool,
}

/// Arguments for the `tybuild generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Regenerate every file regardless of the plan cache.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `tybuild cmake` subcommand.
#[derive(Parser, Debug)]
pub struct CmakeArgs {
    /// Output file (default: `generated_projects.cmake` in the build directory).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    pipeline::init_logging(&global);

    let result = match cli.command {
        Command::Deps(ref args) => deps::run(args, &global),
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Cmake(ref args) => cmake::run(args, &global),
        Command::Projects => projects::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            let code = pipeline::exit_code_for(e.as_ref());
            if code == pipeline::EXIT_INTERNAL {
                eprintln!("unexpected error: {e}");
            } else {
                eprintln!("error: {e}");
            }
            process::exit(code);
        }
    }
}
