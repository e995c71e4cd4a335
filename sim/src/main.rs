// Copyright (c) 2026 Tessera Contributors. MIT License.
// See LICENSE for details.

//! # Tessera Simulator
//!
//! Entry point for the `tessera-sim` binary. Parses CLI arguments, loads the
//! vault configuration, initializes logging, runs one scenario, and prints
//! its report as JSON on stdout.
//!
//! - `bootstrap`: bootstrap share issuance
//! - `attack`: first-depositor inflation attack
//! - `compound`: periodic versus terminal harvest
//! - `lifecycle`: deposits, harvests, exits
//! - `version`: print build version information

mod cli;
mod logging;
mod scenarios;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use tessera_protocol::config::{
    DEFAULT_HARVEST_COOLDOWN, DEFAULT_PERFORMANCE_FEE_BPS, MAX_PERFORMANCE_FEE_BPS,
};
use tessera_protocol::{AccountId, FeeConfig, InflationGuard, VaultConfig};

use cli::{Commands, GuardPolicy, TesseraSimCli};

/// Fee recipient used when no config file is given.
const DEFAULT_TREASURY: &str = "tessera:treasury";

fn main() -> Result<()> {
    let cli = TesseraSimCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    logging::init_logging(&cli.global.log_level, cli.global.log_format);
    let config = load_config(cli.global.config.as_deref())?;

    match cli.command {
        Commands::Bootstrap(args) => emit(&scenarios::bootstrap(config, args.first, args.second)?),
        Commands::Attack(args) => {
            let guard = match args.policy {
                GuardPolicy::VirtualOffset => InflationGuard::virtual_offset(args.decimals_offset),
                GuardPolicy::DeadShares => InflationGuard::dead_shares(args.decimals_offset),
            };
            let config = VaultConfig { guard, ..config };
            emit(&scenarios::attack(
                config,
                args.attacker_deposit,
                args.donation,
                args.victim_deposit,
            )?)
        }
        Commands::Compound(args) => emit(&scenarios::compound(
            config,
            args.principal,
            args.rate_bps,
            args.periods,
        )?),
        Commands::Lifecycle(args) => emit(&scenarios::lifecycle(
            config,
            args.depositors,
            args.deposit,
            args.rate_bps,
            args.harvests,
        )?),
        Commands::Version => Ok(()),
    }
}

/// Reads and validates a JSON [`VaultConfig`], or builds the default one.
fn load_config(path: Option<&Path>) -> Result<VaultConfig> {
    let Some(path) = path else {
        let fees = FeeConfig::new(
            DEFAULT_PERFORMANCE_FEE_BPS,
            AccountId::new(DEFAULT_TREASURY),
            DEFAULT_HARVEST_COOLDOWN,
        )?;
        return Ok(VaultConfig::new(fees));
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: VaultConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config in {}", path.display()))?;

    tracing::info!(path = %path.display(), guard = ?config.guard, "config loaded");
    Ok(config)
}

fn emit<T: Serialize>(report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn print_version() {
    println!("tessera-sim {}", env!("CARGO_PKG_VERSION"));
    println!("max fee     {MAX_PERFORMANCE_FEE_BPS} bps");
    println!("default fee {DEFAULT_PERFORMANCE_FEE_BPS} bps");
    println!("guard       {:?}", InflationGuard::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = load_config(None).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.guard, InflationGuard::default());
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = load_config(Some(Path::new("/nonexistent/tessera.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/tessera.json"));
    }
}
