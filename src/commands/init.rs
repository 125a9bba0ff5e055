//! The `init` command: write a starter `kitty.toml`.
//!
//! Works fully offline and does not need a wallet file.

use std::path::Path;

use alloy::primitives::Address;
use anyhow::Result;
use serde_json::json;
use tracing::debug;

use crate::config::store::{self, Config};
use crate::output::formatter;

/// Values to seed the new config with; anything unset keeps its default.
#[derive(Debug, Default)]
pub struct InitOptions {
    pub rpc_url: Option<String>,
    pub nft_address: Option<Address>,
    pub from_block: Option<u64>,
}

/// Write a config to `path` unless one already exists there.
pub fn run(path: &Path, opts: InitOptions) -> Result<()> {
    debug!(path = %path.display(), ?opts, "starting init command");

    if path.exists() {
        formatter::print_warning(&format!(
            "{} already exists. Edit it directly or delete it to start over.",
            path.display()
        ));
        return Ok(());
    }

    let cfg = build_config(opts);
    store::save(&cfg, path)?;

    if formatter::is_json_mode() {
        formatter::print_json(&json!({ "config": path, "settings": cfg }))?;
    } else {
        formatter::print_success(&format!("Wrote {}", path.display()));
    }

    Ok(())
}

fn build_config(opts: InitOptions) -> Config {
    let mut cfg = Config::default();
    if let Some(url) = opts.rpc_url {
        cfg.network.rpc_url = url;
    }
    cfg.contracts.nft_address = opts.nft_address;
    if let Some(block) = opts.from_block {
        cfg.contracts.from_block = block;
    }
    cfg
}
