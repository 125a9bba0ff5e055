//! Typed errors for marketplace operations.
//!
//! Commands work with `anyhow`, but the service layer needs callers (and
//! tests) to tell a contract anomaly apart from a node failure, so the
//! marketplace and the [`ChainNode`](crate::chain::node::ChainNode) seam
//! return [`MarketError`].

use alloy::primitives::B256;
use thiserror::Error;

/// Message used when a log query fails without saying why.
pub const UNKNOWN_QUERY_ERROR: &str = "Unknown error experienced";

#[derive(Debug, Error)]
pub enum MarketError {
    /// The transaction was mined but the contract did not emit the event the
    /// CLI reads its result from.
    #[error("Could not find {event} event in receipt")]
    MissingEvent {
        event: &'static str,
        transaction_hash: B256,
    },

    /// The transaction was mined with a failed status.
    #[error("Transaction {transaction_hash} reverted in block {}", block_label(.block_number))]
    Reverted {
        transaction_hash: B256,
        block_number: Option<u64>,
    },

    /// Gas estimation, submission, receipt retrieval or a read call failed.
    /// The node's message is kept verbatim.
    #[error("{0}")]
    Node(String),

    /// Historical log retrieval or decoding failed, possibly several times.
    #[error("{}", join_errors(.0))]
    LogQuery(Vec<String>),

    /// A read call returned data that does not match the contract ABI.
    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}

pub type MarketResult<T> = Result<T, MarketError>;

impl MarketError {
    pub fn node(err: impl std::fmt::Display) -> Self {
        Self::Node(err.to_string())
    }
}

fn join_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        UNKNOWN_QUERY_ERROR.to_string()
    } else {
        errors.join(", ")
    }
}

fn block_label(block: &Option<u64>) -> String {
    block.map_or_else(|| "unknown".to_string(), |n| n.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
