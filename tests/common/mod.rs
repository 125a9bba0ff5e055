//! Shared fixtures for integration tests: a scripted [`ChainNode`] that
//! records every request it receives.

#![allow(dead_code)]

use std::sync::Mutex;

use alloy::primitives::{address, b256, Address, Bytes, Log, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;

use kitty_escrow::chain::contracts::KittyNFT;
use kitty_escrow::chain::node::ChainNode;
use kitty_escrow::chain::types::{ConfirmedTx, EventQuery, ObservedLog};
use kitty_escrow::engine::marketplace::{MarketSettings, Marketplace};
use kitty_escrow::error::{MarketError, MarketResult};

pub const NFT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const ESCROW: Address = address!("a16E02E87b7454126E5E10d957A927A7F5B5d2be");
pub const OPERATOR: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const TX_HASH: B256 =
    b256!("c0ffee0000000000000000000000000000000000000000000000000000000001");
pub const RECEIPT_BLOCK: u64 = 9_188_100;
pub const ESTIMATED_GAS: u64 = 120_000;

/// A request the marketplace made against the node, in order.
#[derive(Clone, Debug)]
pub enum NodeRequest {
    EstimateGas(TransactionRequest),
    Send(TransactionRequest),
    Call(TransactionRequest),
    Logs(EventQuery),
}

/// Scripted node. Every field left at its default answers successfully.
pub struct MockNode {
    pub requests: Mutex<Vec<NodeRequest>>,
    pub gas_error: Option<String>,
    pub send_error: Option<String>,
    pub receipt_logs: Vec<Log>,
    pub receipt_success: bool,
    pub price: U256,
    pub price_error: Option<String>,
    pub history: Vec<ObservedLog>,
    pub history_errors: Option<Vec<String>>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            gas_error: None,
            send_error: None,
            receipt_logs: Vec::new(),
            receipt_success: true,
            price: U256::ZERO,
            price_error: None,
            history: Vec::new(),
            history_errors: None,
        }
    }
}

impl MockNode {
    pub fn requests(&self) -> Vec<NodeRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, NodeRequest::Call(_)))
            .count()
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                NodeRequest::Send(tx) => Some(tx),
                _ => None,
            })
            .collect()
    }

    fn record(&self, request: NodeRequest) {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request);
    }
}

#[async_trait]
impl ChainNode for MockNode {
    async fn estimate_gas(&self, tx: &TransactionRequest) -> MarketResult<u64> {
        self.record(NodeRequest::EstimateGas(tx.clone()));
        match &self.gas_error {
            Some(msg) => Err(MarketError::Node(msg.clone())),
            None => Ok(ESTIMATED_GAS),
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> MarketResult<ConfirmedTx> {
        self.record(NodeRequest::Send(tx));
        if let Some(msg) = &self.send_error {
            return Err(MarketError::Node(msg.clone()));
        }
        Ok(ConfirmedTx {
            transaction_hash: TX_HASH,
            block_number: Some(RECEIPT_BLOCK),
            success: self.receipt_success,
            logs: self.receipt_logs.clone(),
        })
    }

    async fn call(&self, tx: &TransactionRequest) -> MarketResult<Bytes> {
        self.record(NodeRequest::Call(tx.clone()));
        match &self.price_error {
            Some(msg) => Err(MarketError::Node(msg.clone())),
            None => Ok(Bytes::from(self.price.to_be_bytes::<32>().to_vec())),
        }
    }

    async fn logs(&self, query: &EventQuery) -> MarketResult<Vec<ObservedLog>> {
        self.record(NodeRequest::Logs(query.clone()));
        match &self.history_errors {
            Some(errors) => Err(MarketError::LogQuery(errors.clone())),
            None => Ok(self.history.clone()),
        }
    }
}

pub fn market(node: MockNode, from_block: u64) -> Marketplace<MockNode> {
    Marketplace::new(
        node,
        OPERATOR,
        MarketSettings {
            from_block,
            gas_price_wei: Some(30_000_000_000),
        },
    )
}

pub fn mint_transfer_log(token_id: u64) -> Log {
    let event = KittyNFT::Transfer {
        from: Address::ZERO,
        to: OPERATOR,
        tokenId: U256::from(token_id),
    };
    Log {
        address: NFT,
        data: event.encode_log_data(),
    }
}

pub fn escrow_created_log(token_id: u64, price: u64, escrow: Address) -> Log {
    let event = KittyNFT::EscrowCreated {
        tokenId: U256::from(token_id),
        price: U256::from(price),
        escrowAddress: escrow,
    };
    Log {
        address: NFT,
        data: event.encode_log_data(),
    }
}

pub fn observed(log: Log, block: u64) -> ObservedLog {
    ObservedLog {
        log,
        block_number: Some(block),
        transaction_hash: Some(TX_HASH),
    }
}
