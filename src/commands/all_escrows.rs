//! The `all-escrows` command: list every escrow an NFT contract has created.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::debug;

use crate::chain::node::ChainNode;
use crate::engine::marketplace::Marketplace;
use crate::output::formatter;

pub async fn run<N: ChainNode>(market: &Marketplace<N>, nft: Address) -> Result<()> {
    debug!(%nft, from_block = market.settings().from_block, "starting all-escrows command");

    if formatter::is_json_mode() {
        let records = market
            .escrow_events(nft)
            .await
            .context("failed to list escrows")?;
        formatter::print_json(&records)?;
    } else {
        let summary = market
            .escrow_summary(nft)
            .await
            .context("failed to list escrows")?;
        formatter::print_info(&summary);
    }

    Ok(())
}
