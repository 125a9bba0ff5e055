//! The remote node the marketplace talks to.
//!
//! [`ChainNode`] is the seam between the marketplace logic and the network:
//! four request/response calls, nothing else. [`RpcNode`] implements it over
//! an alloy provider holding a persistent connection (WebSocket by default)
//! with the operator's key installed as its wallet, so submitted
//! transactions are signed locally and sent raw.

use alloy::network::EthereumWallet;
use alloy::primitives::Bytes;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, TransactionRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::chain::signer::TransactionSigner;
use crate::chain::types::{ConfirmedTx, EventQuery, ObservedLog};
use crate::error::{MarketError, MarketResult};

// ---------------------------------------------------------------------------
// ChainNode
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ChainNode: Send + Sync {
    /// Estimate the gas a transaction would consume.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> MarketResult<u64>;

    /// Submit a transaction and wait until its receipt is available.
    ///
    /// Resolves with the receipt once it arrives; any error signalled by the
    /// submission layer before that fails the call.
    async fn send_transaction(&self, tx: TransactionRequest) -> MarketResult<ConfirmedTx>;

    /// Execute a read-only call against the latest state.
    async fn call(&self, tx: &TransactionRequest) -> MarketResult<Bytes>;

    /// Fetch historical logs matching `query`.
    async fn logs(&self, query: &EventQuery) -> MarketResult<Vec<ObservedLog>>;
}

// ---------------------------------------------------------------------------
// RpcNode
// ---------------------------------------------------------------------------

/// [`ChainNode`] backed by an alloy provider.
pub struct RpcNode {
    provider: DynProvider,
    rpc_url: String,
}

impl RpcNode {
    /// Open a connection to `rpc_url` with `signer` as the sending wallet.
    ///
    /// The transport is picked from the URL scheme (`ws`/`wss`, `http`/`https`
    /// or an IPC path). For WebSocket URLs the connection is established
    /// here, so an unreachable node fails fast.
    pub async fn connect(rpc_url: &str, signer: &TransactionSigner) -> Result<Self> {
        debug!(rpc_url, "connecting to node");

        let wallet = EthereumWallet::from(signer.inner().clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(rpc_url)
            .await
            .with_context(|| format!("failed to connect to node at {rpc_url}"))?
            .erased();

        debug!(rpc_url, from = %signer.address(), "node connected");

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Returns the RPC URL this node is connected to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Close the connection. Dropping the last provider handle shuts the
    /// transport's background task down.
    pub fn disconnect(self) {
        debug!(rpc_url = %self.rpc_url, "disconnecting from node");
        drop(self.provider);
    }
}

#[async_trait]
impl ChainNode for RpcNode {
    async fn estimate_gas(&self, tx: &TransactionRequest) -> MarketResult<u64> {
        let gas = self
            .provider
            .estimate_gas(tx.clone())
            .await
            .map_err(MarketError::node)?;

        debug!(gas, "gas estimated");
        Ok(gas)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> MarketResult<ConfirmedTx> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(MarketError::node)?;

        debug!(tx_hash = %pending.tx_hash(), "transaction submitted, waiting for receipt");

        let receipt = pending.get_receipt().await.map_err(MarketError::node)?;

        info!(
            tx_hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            status = receipt.status(),
            "transaction mined"
        );

        Ok(ConfirmedTx {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        })
    }

    async fn call(&self, tx: &TransactionRequest) -> MarketResult<Bytes> {
        self.provider
            .call(tx.clone())
            .await
            .map_err(MarketError::node)
    }

    async fn logs(&self, query: &EventQuery) -> MarketResult<Vec<ObservedLog>> {
        let filter = Filter::new()
            .address(query.address)
            .event_signature(query.event_signature)
            .from_block(query.from_block)
            .to_block(query.to_block);

        debug!(?query, "fetching logs");

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|err| MarketError::LogQuery(vec![err.to_string()]))?;

        debug!(count = logs.len(), "logs retrieved");
        Ok(logs
            .into_iter()
            .map(|log| ObservedLog {
                block_number: log.block_number,
                transaction_hash: log.transaction_hash,
                log: log.inner,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
