use std::fmt;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Log, B256, U256};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Core wrapper types
// ---------------------------------------------------------------------------

/// Wrapper around [`U256`] for type-safe NFT token identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TokenId(#[serde(serialize_with = "decimal")] pub U256);

impl From<U256> for TokenId {
    fn from(val: U256) -> Self {
        Self(val)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EscrowRecord
// ---------------------------------------------------------------------------

/// An escrow as observed through its `EscrowCreated` event.
///
/// Nothing here is stored locally; every field comes from a decoded log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EscrowRecord {
    pub token_id: TokenId,
    #[serde(serialize_with = "decimal")]
    pub price_wei: U256,
    pub escrow_address: Address,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
}

impl fmt::Display for EscrowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Escrow for Token ID: {}\nPrice: {} Wei\nBidding Address: {}",
            self.token_id, self.price_wei, self.escrow_address
        )
    }
}

// ---------------------------------------------------------------------------
// ConfirmedTx
// ---------------------------------------------------------------------------

/// A mined transaction, reduced to what the CLI reports and decodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmedTx {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// `false` when the transaction was included but reverted.
    pub success: bool,
    pub logs: Vec<Log>,
}

impl ConfirmedTx {
    /// Logs emitted by `address`, in receipt order.
    pub fn logs_from(&self, address: Address) -> impl Iterator<Item = &Log> {
        self.logs.iter().filter(move |log| log.address == address)
    }
}

// ---------------------------------------------------------------------------
// ObservedLog
// ---------------------------------------------------------------------------

/// A historical log together with where it was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservedLog {
    pub log: Log,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
}

// ---------------------------------------------------------------------------
// EventQuery
// ---------------------------------------------------------------------------

/// A historical log query for a single event emitted by a single contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventQuery {
    pub address: Address,
    /// `topic0`, i.e. the event signature hash.
    pub event_signature: B256,
    pub from_block: u64,
    pub to_block: BlockNumberOrTag,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serialize a [`U256`] as a decimal string rather than alloy's hex default.
fn decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256, Bytes, LogData};

    const NFT: Address = address!("00000000000000000000000000000000000000aa");

    fn record() -> EscrowRecord {
        EscrowRecord {
            token_id: TokenId(U256::from(12u64)),
            price_wei: U256::from(1_000_000_000_000_000_000u128),
            escrow_address: address!("00000000000000000000000000000000000000bb"),
            block_number: Some(9_187_993),
            transaction_hash: None,
        }
    }

    #[test]
    fn token_id_display() {
        assert_eq!(TokenId(U256::from(42u64)).to_string(), "42");
    }

    #[test]
    fn token_id_from_u256() {
        let id: TokenId = U256::from(5u64).into();
        assert_eq!(id.0, U256::from(5u64));
    }

    #[test]
    fn escrow_record_display_format() {
        let record = record();
        assert_eq!(
            record.to_string(),
            format!(
                "Escrow for Token ID: 12\nPrice: 1000000000000000000 Wei\nBidding Address: {}",
                record.escrow_address.to_checksum(None)
            )
        );
    }

    #[test]
    fn escrow_record_json_uses_decimal_amounts() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["token_id"], "12");
        assert_eq!(json["price_wei"], "1000000000000000000");
        assert_eq!(json["block_number"], 9_187_993);
    }

    #[test]
    fn logs_from_filters_by_emitter() {
        let topic = b256!("0000000000000000000000000000000000000000000000000000000000000001");
        let ours = Log {
            address: NFT,
            data: LogData::new_unchecked(vec![topic], Bytes::new()),
        };
        let theirs = Log {
            address: Address::ZERO,
            data: LogData::new_unchecked(vec![topic], Bytes::new()),
        };
        let tx = ConfirmedTx {
            transaction_hash: B256::ZERO,
            block_number: Some(1),
            success: true,
            logs: vec![theirs, ours.clone()],
        };

        let found: Vec<&Log> = tx.logs_from(NFT).collect();
        assert_eq!(found, vec![&ours]);
    }
}
