mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sdkpack_lib::platform::Profile;

use crate::cmd::{BuildArgs, cmd_build, cmd_info, cmd_list};
use crate::output::{OutputFormat, print_error};

/// sdkpack - build and stage the third-party packages of an SDK bundle
#[derive(Parser)]
#[command(name = "sdkpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List registered packages
  List {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Fetch, patch, build and stage packages
  Build {
    /// Packages to build (default: all, in registration order)
    packages: Vec<String>,

    /// Target profile (darwin, linux, windows)
    #[arg(short, long)]
    profile: Option<Profile>,

    /// Build root holding cache, work and staged directories
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory patches and other local sources are resolved against
    #[arg(long)]
    packages_dir: Option<PathBuf>,

    /// Make parallelism
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Rebuild packages even if their staged prefix is complete
    #[arg(short, long)]
    force: bool,

    /// Continue with remaining packages after a failure
    #[arg(short, long)]
    keep_going: bool,

    /// Config file (default: ./sdkpack.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Display host information
  Info,
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli.command) {
    print_error(&format!("{e:#}"));
    std::process::exit(1);
  }
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::List { output } => cmd_list(output),
    Commands::Build {
      packages,
      profile,
      root,
      packages_dir,
      jobs,
      force,
      keep_going,
      config,
      output,
    } => cmd_build(BuildArgs {
      packages,
      profile,
      root,
      packages_dir,
      jobs,
      force,
      keep_going,
      config,
      output,
    }),
    Commands::Info => {
      cmd_info();
      Ok(())
    }
  }
}
