//! # CLI Interface
//!
//! Defines the command-line argument structure for `etw-node` using
//! `clap` derive. Supports four subcommands: `run`, `domain`, `address`,
//! and `version`.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use etw_protocol::config::{DeploymentConfig, CHAIN_ID_DEVNET};
use etw_protocol::{parse_address, Address};

use crate::logging::{LogFormat, LogSettings};

/// Encumbered token wrapper tooling.
///
/// Replays scenario files against an in-memory wrapper deployment and
/// computes the values an off-chain signer needs (domain separators,
/// actor addresses).
#[derive(Parser, Debug)]
#[command(
    name = "etw-node",
    about = "Encumbered token wrapper scenario runner",
    version,
    propagate_version = true
)]
pub struct EtwNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log output format.
    #[arg(long, global = true, env = "ETW_LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,

    /// More log output; repeat for more.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl EtwNodeCli {
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            format: self.log_format,
            verbosity: self.verbose,
            quiet: self.quiet,
        }
    }
}

/// Top-level subcommands for the `etw-node` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a JSON scenario and print the final state report.
    Run(RunArgs),
    /// Print the EIP-712 domain separator of a wrapper deployment.
    Domain(DomainArgs),
    /// Print the deterministic address of a named actor.
    Address(AddressArgs),
    /// Print version information and exit.
    Version,
}

/// Where the wrapper is deployed.
#[derive(Args, Debug, Clone)]
pub struct DeploymentArgs {
    /// Chain id bound into the domain separator.
    #[arg(long, env = "ETW_CHAIN_ID", default_value_t = CHAIN_ID_DEVNET)]
    pub chain_id: u64,

    /// Wrapper contract address (hex, `0x`-prefixed). Defaults to the
    /// devnet deployment address.
    #[arg(long, env = "ETW_CONTRACT_ADDRESS", value_parser = parse_address)]
    pub contract_address: Option<Address>,
}

impl DeploymentArgs {
    pub fn deployment(&self) -> DeploymentConfig {
        let address = self
            .contract_address
            .unwrap_or_else(|| DeploymentConfig::devnet().address);
        DeploymentConfig::new(self.chain_id, address)
    }
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the scenario file (JSON).
    #[arg(long, short = 's')]
    pub scenario: PathBuf,

    #[command(flatten)]
    pub deployment: DeploymentArgs,
}

/// Arguments for the `domain` subcommand.
#[derive(Args, Debug)]
pub struct DomainArgs {
    /// Name of the wrapped token, e.g. `"Encumbered Dai Stablecoin"`.
    #[arg(long)]
    pub name: String,

    #[command(flatten)]
    pub deployment: DeploymentArgs,
}

/// Arguments for the `address` subcommand.
#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Actor name as used in scenario files.
    pub actor: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        EtwNodeCli::command().debug_assert();
    }

    #[test]
    fn logging_flags_are_global() {
        let cli = EtwNodeCli::try_parse_from([
            "etw-node",
            "address",
            "alice",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        let settings = cli.log_settings();
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.verbosity, 2);
        assert!(!settings.quiet);

        assert!(EtwNodeCli::try_parse_from(["etw-node", "version", "-q", "-v"]).is_err());
        let unknown_format = ["etw-node", "version", "--log-format", "yaml"];
        assert!(EtwNodeCli::try_parse_from(unknown_format).is_err());
    }

    #[test]
    fn contract_address_parses_as_hex() {
        let cli = EtwNodeCli::try_parse_from([
            "etw-node",
            "domain",
            "--name",
            "Encumbered Dai",
            "--chain-id",
            "1",
            "--contract-address",
            "0x00000000000000000000000000000000000000aa",
        ])
        .unwrap();
        let Commands::Domain(args) = cli.command else {
            panic!("expected domain subcommand");
        };
        let deployment = args.deployment.deployment();
        assert_eq!(deployment.chain_id, 1);
        assert_eq!(deployment.address, Address::from_low_u64_be(0xaa));
    }
}
