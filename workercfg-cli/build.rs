//! Build script for workercfg-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("workercfg")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate and inspect worker deployment configuration")
        .long_about(
            "Validates a multi-environment worker configuration document, resolves the \
             selected environment and reports every error, warning and deprecation found",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file (discovered from the working directory by default)")
                .value_name("PATH")
                .global(true)
                .env("WORKERCFG_CONFIG"),
        )
        .arg(
            Arg::new("env")
                .long("env")
                .help("Named environment to resolve")
                .value_name("NAME")
                .global(true)
                .env("WORKERCFG_ENV"),
        )
        .subcommands(vec![
            Command::new("validate")
                .about("Validate the configuration and report problems")
                .long_about("Print warnings and errors; exit 1 when any error was found"),
            Command::new("show")
                .about("Print the normalized configuration")
                .long_about("Print the resolved configuration as JSON, YAML or TOML"),
            Command::new("envs")
                .about("List the named environments")
                .long_about("List the environments declared under the env table"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").unwrap_or_default());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    fs::write(man_dir.join("workercfg.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
