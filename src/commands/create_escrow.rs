//! The `create-escrow` command: put a token up for sale at a fixed price.

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;

use crate::chain::node::ChainNode;
use crate::engine::marketplace::Marketplace;
use crate::output::formatter;

pub async fn run<N: ChainNode>(
    market: &Marketplace<N>,
    nft: Address,
    token_id: U256,
    price_wei: U256,
) -> Result<()> {
    debug!(%nft, %token_id, %price_wei, "starting create-escrow command");

    let escrow = market
        .create_escrow(nft, token_id, price_wei)
        .await
        .with_context(|| format!("failed to create escrow for token {token_id}"))?;

    if formatter::is_json_mode() {
        formatter::print_json(&json!({
            "contract": nft,
            "token_id": token_id.to_string(),
            "price_wei": price_wei.to_string(),
            "escrow_address": escrow,
        }))?;
    } else {
        formatter::print_success(&confirmation(escrow));
    }

    Ok(())
}

/// Line printed once the escrow exists.
pub fn confirmation(escrow: Address) -> String {
    format!("Newly created escrow on address: {escrow}")
}
