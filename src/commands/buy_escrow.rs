//! The `buy-escrow` command: pay an escrow and take its token.
//!
//! Without an explicit amount the escrow's asking price is paid.

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;

use crate::chain::node::ChainNode;
use crate::chain::types::ConfirmedTx;
use crate::engine::marketplace::Marketplace;
use crate::output::formatter;

pub async fn run<N: ChainNode>(
    market: &Marketplace<N>,
    escrow: Address,
    amount_wei: Option<U256>,
) -> Result<()> {
    debug!(%escrow, amount = ?amount_wei, "starting buy-escrow command");

    let receipt = market
        .buy_escrow(escrow, amount_wei)
        .await
        .with_context(|| format!("failed to buy escrow {escrow}"))?;

    if formatter::is_json_mode() {
        formatter::print_json(&json!({
            "escrow_address": escrow,
            "block_number": receipt.block_number,
            "transaction_hash": receipt.transaction_hash,
        }))?;
    } else {
        formatter::print_success(&confirmation(&receipt));
    }

    Ok(())
}

/// Line printed once the purchase is mined.
pub fn confirmation(receipt: &ConfirmedTx) -> String {
    let block = receipt
        .block_number
        .map_or_else(|| "pending".to_string(), |n| n.to_string());

    format!(
        "Transaction confirmed on block: {block}, transaction hash: {} congratulations \u{1F389}",
        receipt.transaction_hash
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    #[test]
    fn confirmation_shows_block_and_hash() {
        let receipt = ConfirmedTx {
            transaction_hash: B256::repeat_byte(0x11),
            block_number: Some(9_187_994),
            success: true,
            logs: Vec::new(),
        };

        let line = confirmation(&receipt);
        assert!(line.starts_with("Transaction confirmed on block: 9187994, transaction hash: 0x1111"));
        assert!(line.ends_with("congratulations \u{1F389}"));
    }
}
