//! Configuration store for kitty-escrow.
//!
//! Reads an optional TOML file and applies `KITTY_*` environment variable
//! overrides on every [`load`] call, following the precedence chain:
//!
//!   kitty.toml < KITTY_* env vars < CLI flags
//!
//! CLI-flag overrides are handled at the command layer, not here.

use std::fs;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::wallet;

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub contracts: ContractsConfig,
    pub wallet: WalletConfig,
}

/// Node endpoint and fee settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// `ws://`, `wss://`, `http(s)://` URL or IPC socket path.
    pub rpc_url: String,
    /// Fixed legacy gas price. When unset the provider estimates fees.
    pub gas_price_gwei: Option<u64>,
}

/// Where the marketplace contracts live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Default NFT contract for commands run without `--address`.
    #[serde(
        serialize_with = "checksummed",
        skip_serializing_if = "Option::is_none"
    )]
    pub nft_address: Option<Address>,
    /// Block the NFT contract was deployed in; escrow history starts here.
    pub from_block: u64,
    /// Directory holding `KittyNFT.json` and `Escrow.json`.
    pub abi_dir: PathBuf,
}

/// Location of the operator's private key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "ws://127.0.0.1:8545".to_string(),
            gas_price_gwei: None,
        }
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            nft_address: None,
            from_block: 0,
            abi_dir: PathBuf::from("contracts/abis"),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(wallet::DEFAULT_WALLET_FILE),
        }
    }
}

impl NetworkConfig {
    /// Configured gas price converted to wei.
    pub fn gas_price_wei(&self) -> Option<u128> {
        self.gas_price_gwei
            .map(|gwei| u128::from(gwei) * GWEI_IN_WEI)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "kitty.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "KITTY_CONFIG";

const GWEI_IN_WEI: u128 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve which config file to read, if any.
///
/// Resolution order:
/// 1. `explicit` (the `--config` flag).
/// 2. `KITTY_CONFIG` environment variable (if set and non-empty).
/// 3. `./kitty.toml`, only if it exists.
///
/// An explicitly named file must exist; the implicit one is optional.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "using config path from command line");
        return Some(path.to_path_buf());
    }

    match std::env::var(CONFIG_ENV) {
        Ok(val) if !val.is_empty() => {
            debug!(path = %val, "using KITTY_CONFIG for config path");
            Some(PathBuf::from(val))
        }
        _ => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        }
    }
}

/// The file a new config should be written to: the same file [`load`]
/// would read, or `./kitty.toml` when none exists yet.
pub fn target_path(explicit: Option<&Path>) -> PathBuf {
    resolve_path(explicit).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Loads the configuration.
///
/// Reads the file chosen by [`resolve_path`], falling back to defaults when
/// there is none, then applies environment overrides (when the variable is
/// set and non-empty):
///
/// | Env var                | Overrides                  |
/// |------------------------|----------------------------|
/// | `KITTY_RPC_URL`        | `network.rpc_url`          |
/// | `KITTY_GAS_PRICE_GWEI` | `network.gas_price_gwei`   |
/// | `KITTY_NFT_ADDRESS`    | `contracts.nft_address`    |
/// | `KITTY_FROM_BLOCK`     | `contracts.from_block`     |
/// | `KITTY_WALLET`         | `wallet.path`              |
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match resolve_path(explicit) {
        Some(path) => load_file(&path)?,
        None => {
            debug!("no config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;

    debug!(?config, "config loaded");
    Ok(config)
}

/// Parse a single TOML config file without env overrides.
pub fn load_file(path: &Path) -> Result<Config> {
    debug!(path = %path.display(), "loading config");

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Serialises `config` to TOML and writes it to `path`.
pub fn save(config: &Config, path: &Path) -> Result<()> {
    debug!(path = %path.display(), "saving config");

    let contents = toml::to_string_pretty(config).context("failed to serialise config to TOML")?;

    fs::write(path, contents)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Write addresses in their EIP-55 checksummed form, as operators paste them.
fn checksummed<S: serde::Serializer>(address: &Option<Address>, s: S) -> Result<S::Ok, S::Error> {
    address.map(|a| a.to_checksum(None)).serialize(s)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|val| !val.is_empty())
}

/// Applies `KITTY_*` environment variable overrides to the loaded
/// configuration. Only non-empty values are applied; malformed numeric or
/// address values are errors rather than silently ignored.
fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(val) = env_value("KITTY_RPC_URL") {
        debug!(rpc_url = %val, "overriding network.rpc_url from KITTY_RPC_URL");
        config.network.rpc_url = val;
    }

    if let Some(val) = env_value("KITTY_GAS_PRICE_GWEI") {
        let gwei = val
            .parse()
            .with_context(|| format!("KITTY_GAS_PRICE_GWEI is not a whole number: {val}"))?;
        debug!(gwei, "overriding network.gas_price_gwei from KITTY_GAS_PRICE_GWEI");
        config.network.gas_price_gwei = Some(gwei);
    }

    if let Some(val) = env_value("KITTY_NFT_ADDRESS") {
        let address = val
            .parse()
            .with_context(|| format!("KITTY_NFT_ADDRESS is not a valid address: {val}"))?;
        debug!(%address, "overriding contracts.nft_address from KITTY_NFT_ADDRESS");
        config.contracts.nft_address = Some(address);
    }

    if let Some(val) = env_value("KITTY_FROM_BLOCK") {
        let block = val
            .parse()
            .with_context(|| format!("KITTY_FROM_BLOCK is not a block number: {val}"))?;
        debug!(block, "overriding contracts.from_block from KITTY_FROM_BLOCK");
        config.contracts.from_block = block;
    }

    if let Some(val) = env_value("KITTY_WALLET") {
        debug!(path = %val, "overriding wallet.path from KITTY_WALLET");
        config.wallet.path = PathBuf::from(val);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
