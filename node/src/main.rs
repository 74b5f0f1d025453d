// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Encumbered Token Wrapper Node
//!
//! Entry point for the `etw-node` binary. Parses CLI arguments, initializes
//! logging, and dispatches to the selected subcommand:
//!
//! - `run`     — replay a JSON scenario against an in-memory deployment
//! - `domain`  — print a deployment's EIP-712 domain separator
//! - `address` — print the deterministic address of a named actor
//! - `version` — print build version information

mod cli;
mod logging;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;

use etw_protocol::config::DOMAIN_VERSION;
use etw_protocol::crypto::{DomainSeparator, EcdsaKeypair};

use cli::{Commands, EtwNodeCli};

fn main() -> Result<()> {
    let cli = EtwNodeCli::parse();
    logging::init_logging(&cli.log_settings())?;

    match cli.command {
        Commands::Run(args) => run_scenario(args),
        Commands::Domain(args) => print_domain(args),
        Commands::Address(args) => {
            print_address(&args.actor);
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Replays a scenario and prints the JSON report to stdout.
fn run_scenario(args: cli::RunArgs) -> Result<()> {
    let deployment = args.deployment.deployment();
    tracing::info!(
        scenario = %args.scenario.display(),
        chain_id = deployment.chain_id,
        address = ?deployment.address,
        "starting etw-node run"
    );

    let scenario = scenario::load(&args.scenario)?;
    let report = scenario::run(&scenario, deployment)
        .with_context(|| format!("scenario {} failed", args.scenario.display()))?;

    let rendered =
        serde_json::to_string_pretty(&report).context("failed to serialize scenario report")?;
    println!("{rendered}");
    Ok(())
}

/// Prints the domain separator a signer needs for this deployment.
fn print_domain(args: cli::DomainArgs) -> Result<()> {
    let deployment = args.deployment.deployment();
    let domain = DomainSeparator::for_deployment(&args.name, DOMAIN_VERSION, &deployment);
    let rendered = serde_json::to_string_pretty(&serde_json::json!({
        "name": args.name,
        "version": DOMAIN_VERSION,
        "chain_id": deployment.chain_id,
        "verifying_contract": deployment.address,
        "domain_separator": format!("0x{}", hex::encode(domain.digest())),
    }))
    .context("failed to serialize domain")?;
    println!("{rendered}");
    Ok(())
}

fn print_address(actor: &str) {
    let keypair = EcdsaKeypair::from_name(actor);
    println!("{:?}", keypair.address());
}

/// Prints version information to stdout.
fn print_version() {
    println!("etw-node {}", env!("CARGO_PKG_VERSION"));
    println!("domain    version {DOMAIN_VERSION}");
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
