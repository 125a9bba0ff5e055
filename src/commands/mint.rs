//! The `mint` command: mint a token with the given metadata URI.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;

use crate::chain::node::ChainNode;
use crate::chain::types::TokenId;
use crate::engine::marketplace::Marketplace;
use crate::output::formatter;

pub async fn run<N: ChainNode>(market: &Marketplace<N>, nft: Address, uri: &str) -> Result<()> {
    debug!(%nft, uri, "starting mint command");

    let token_id = market
        .mint(nft, uri)
        .await
        .with_context(|| format!("failed to mint {uri}"))?;

    if formatter::is_json_mode() {
        formatter::print_json(&json!({ "contract": nft, "token_id": token_id }))?;
    } else {
        formatter::print_success(&confirmation(token_id));
    }

    Ok(())
}

/// Line printed once the token is minted.
pub fn confirmation(token_id: TokenId) -> String {
    format!("Newly minted item ID: {token_id}")
}
