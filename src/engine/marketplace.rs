//! Marketplace operations: mint, create escrow, buy escrow, list escrows.
//!
//! Each write operation follows the same sequence:
//!
//!   encode call → estimate gas → submit → wait for receipt → read event
//!
//! Results are always taken from events emitted by the target contract,
//! never computed client-side. A [`Marketplace`] is built once per CLI
//! invocation and owns the node connection for its lifetime.

use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolEvent};
use tracing::{debug, info};

use crate::chain::contracts::{Escrow, KittyNFT};
use crate::chain::node::ChainNode;
use crate::chain::types::{ConfirmedTx, EscrowRecord, EventQuery, TokenId};
use crate::config::store::Config;
use crate::error::{MarketError, MarketResult};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Deployment-specific values the operations need.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketSettings {
    /// First block scanned for `EscrowCreated` events.
    pub from_block: u64,
    /// Fixed legacy gas price; `None` lets the provider fill fees.
    pub gas_price_wei: Option<u128>,
}

impl MarketSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            from_block: cfg.contracts.from_block,
            gas_price_wei: cfg.network.gas_price_wei(),
        }
    }
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

/// One operator session against the marketplace contracts.
pub struct Marketplace<N> {
    node: N,
    account: Address,
    settings: MarketSettings,
}

impl<N: ChainNode> Marketplace<N> {
    /// `account` must be the address of the key the node signs with.
    pub fn new(node: N, account: Address, settings: MarketSettings) -> Self {
        Self {
            node,
            account,
            settings,
        }
    }

    /// The operating account.
    pub fn account(&self) -> Address {
        self.account
    }

    pub fn settings(&self) -> &MarketSettings {
        &self.settings
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    /// End the session, handing back the node so the caller can close it.
    pub fn into_node(self) -> N {
        self.node
    }

    /// Mint a token with `token_uri` and return its ID, read from the
    /// `Transfer` event the NFT contract emits.
    pub async fn mint(&self, nft: Address, token_uri: &str) -> MarketResult<TokenId> {
        debug!(%nft, token_uri, "minting token");

        let call = KittyNFT::mintNFTCall {
            tokenURI: token_uri.to_string(),
        };
        let receipt = self.submit(self.call_tx(nft, call.abi_encode())).await?;

        let transfers: Vec<KittyNFT::Transfer> = receipt
            .logs_from(nft)
            .filter_map(|log| KittyNFT::Transfer::decode_log_data(&log.data).ok())
            .collect();

        // Prefer the mint transfer (from the zero address) if the contract
        // emitted several.
        let transfer = transfers
            .iter()
            .find(|t| t.from == Address::ZERO)
            .or_else(|| transfers.first())
            .ok_or(MarketError::MissingEvent {
                event: "Transfer",
                transaction_hash: receipt.transaction_hash,
            })?;

        let token_id = TokenId(transfer.tokenId);
        info!(%nft, %token_id, "token minted");
        Ok(token_id)
    }

    /// Open an escrow selling `token_id` for `price_wei` and return the
    /// escrow contract address from the `EscrowCreated` event.
    pub async fn create_escrow(
        &self,
        nft: Address,
        token_id: U256,
        price_wei: U256,
    ) -> MarketResult<Address> {
        debug!(%nft, %token_id, %price_wei, "creating escrow");

        let call = KittyNFT::createEscrowCall {
            tokenId: token_id,
            price: price_wei,
        };
        let receipt = self.submit(self.call_tx(nft, call.abi_encode())).await?;

        let created = receipt
            .logs_from(nft)
            .find_map(|log| KittyNFT::EscrowCreated::decode_log_data(&log.data).ok())
            .ok_or(MarketError::MissingEvent {
                event: "EscrowCreated",
                transaction_hash: receipt.transaction_hash,
            })?;

        info!(%nft, %token_id, escrow = %created.escrowAddress, "escrow created");
        Ok(created.escrowAddress)
    }

    /// Buy an escrow by paying `amount_wei`, or its asking price when no
    /// amount is given.
    ///
    /// Steps run in order (price lookup, gas estimate, submission, receipt)
    /// and the first failure is the one reported.
    pub async fn buy_escrow(
        &self,
        escrow: Address,
        amount_wei: Option<U256>,
    ) -> MarketResult<ConfirmedTx> {
        let amount = match amount_wei {
            Some(amount) => amount,
            None => self.escrow_price(escrow).await?,
        };

        debug!(%escrow, %amount, "buying escrow");

        let tx = self.base_tx(escrow).with_value(amount);
        let receipt = self.submit(tx).await?;

        info!(%escrow, %amount, tx_hash = %receipt.transaction_hash, "escrow bought");
        Ok(receipt)
    }

    /// Read an escrow's asking price.
    pub async fn escrow_price(&self, escrow: Address) -> MarketResult<U256> {
        let tx = TransactionRequest::default()
            .with_to(escrow)
            .with_input(Escrow::priceCall {}.abi_encode());

        let output = self.node.call(&tx).await?;
        let price = Escrow::priceCall::abi_decode_returns(&output).map_err(|err| {
            MarketError::Decode {
                what: "escrow price",
                reason: err.to_string(),
            }
        })?;

        debug!(%escrow, %price, "escrow price read");
        Ok(price)
    }

    /// All escrows ever created by `nft`, from the configured deployment
    /// block up to the latest block.
    ///
    /// Logs that fail to decode are collected and reported together.
    pub async fn escrow_events(&self, nft: Address) -> MarketResult<Vec<EscrowRecord>> {
        let query = EventQuery {
            address: nft,
            event_signature: KittyNFT::EscrowCreated::SIGNATURE_HASH,
            from_block: self.settings.from_block,
            to_block: BlockNumberOrTag::Latest,
        };

        let logs = self.node.logs(&query).await?;

        let mut records = Vec::with_capacity(logs.len());
        let mut errors = Vec::new();

        for observed in logs {
            match KittyNFT::EscrowCreated::decode_log_data(&observed.log.data) {
                Ok(event) => records.push(EscrowRecord {
                    token_id: TokenId(event.tokenId),
                    price_wei: event.price,
                    escrow_address: event.escrowAddress,
                    block_number: observed.block_number,
                    transaction_hash: observed.transaction_hash,
                }),
                Err(err) => errors.push(format!(
                    "malformed EscrowCreated log in block {}: {err}",
                    observed
                        .block_number
                        .map_or_else(|| "unknown".to_string(), |n| n.to_string())
                )),
            }
        }

        if !errors.is_empty() {
            return Err(MarketError::LogQuery(errors));
        }

        debug!(%nft, count = records.len(), "escrow events decoded");
        Ok(records)
    }

    /// [`escrow_events`](Self::escrow_events) rendered for the terminal.
    pub async fn escrow_summary(&self, nft: Address) -> MarketResult<String> {
        let records = self.escrow_events(nft).await?;
        Ok(format_escrow_summary(&records))
    }

    // -- internals ------------------------------------------------------------

    fn base_tx(&self, to: Address) -> TransactionRequest {
        let tx = TransactionRequest::default()
            .with_from(self.account)
            .with_to(to);

        match self.settings.gas_price_wei {
            Some(price) => tx.with_gas_price(price),
            None => tx,
        }
    }

    fn call_tx(&self, to: Address, input: Vec<u8>) -> TransactionRequest {
        self.base_tx(to).with_input(input)
    }

    /// Estimate, submit, and wait. A reverted receipt is an error.
    async fn submit(&self, tx: TransactionRequest) -> MarketResult<ConfirmedTx> {
        let gas = self.node.estimate_gas(&tx).await?;
        let receipt = self.node.send_transaction(tx.with_gas_limit(gas)).await?;

        if !receipt.success {
            return Err(MarketError::Reverted {
                transaction_hash: receipt.transaction_hash,
                block_number: receipt.block_number,
            });
        }

        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render escrow records as the multi-record summary printed by
/// `all-escrows`.
pub fn format_escrow_summary(records: &[EscrowRecord]) -> String {
    if records.is_empty() {
        return "No escrows created.".to_string();
    }

    records
        .iter()
        .fold(String::from("Escrows created:\n\n"), |mut acc, record| {
            acc.push_str(&format!("{record}\n\n"));
            acc
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use alloy::primitives::{address, b256, Bytes, Log, B256};
    use async_trait::async_trait;

    use crate::chain::types::ObservedLog;

    const NFT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const OPERATOR: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const TX_HASH: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000aa");

    /// Records every request and answers with canned values.
    #[derive(Default)]
    struct StubNode {
        sent: Mutex<Vec<TransactionRequest>>,
        receipt_logs: Vec<Log>,
        receipt_success: bool,
    }

    #[async_trait]
    impl ChainNode for StubNode {
        async fn estimate_gas(&self, _tx: &TransactionRequest) -> MarketResult<u64> {
            Ok(21_000)
        }

        async fn send_transaction(&self, tx: TransactionRequest) -> MarketResult<ConfirmedTx> {
            self.sent.lock().unwrap().push(tx);
            Ok(ConfirmedTx {
                transaction_hash: TX_HASH,
                block_number: Some(100),
                success: self.receipt_success,
                logs: self.receipt_logs.clone(),
            })
        }

        async fn call(&self, _tx: &TransactionRequest) -> MarketResult<Bytes> {
            Ok(U256::from(5u64).to_be_bytes::<32>().to_vec().into())
        }

        async fn logs(&self, _query: &EventQuery) -> MarketResult<Vec<ObservedLog>> {
            Ok(Vec::new())
        }
    }

    fn market(node: StubNode, gas_price_wei: Option<u128>) -> Marketplace<StubNode> {
        Marketplace::new(
            node,
            OPERATOR,
            MarketSettings {
                from_block: 0,
                gas_price_wei,
            },
        )
    }

    fn transfer_log(emitter: Address, from: Address, token_id: u64) -> Log {
        let event = KittyNFT::Transfer {
            from,
            to: OPERATOR,
            tokenId: U256::from(token_id),
        };
        Log {
            address: emitter,
            data: event.encode_log_data(),
        }
    }

    #[tokio::test]
    async fn mint_sends_from_operator_with_estimated_gas_and_price() {
        let node = StubNode {
            receipt_logs: vec![transfer_log(NFT, Address::ZERO, 1)],
            receipt_success: true,
            ..Default::default()
        };
        let market = market(node, Some(30_000_000_000));

        market.mint(NFT, "ipfs://kitty").await.unwrap();

        let sent = market.node().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, Some(OPERATOR));
        assert_eq!(sent[0].gas, Some(21_000));
        assert_eq!(sent[0].gas_price, Some(30_000_000_000));
        assert_eq!(sent[0].value, None);
    }

    #[tokio::test]
    async fn mint_prefers_zero_address_transfer() {
        let node = StubNode {
            receipt_logs: vec![
                transfer_log(NFT, OPERATOR, 3),
                transfer_log(NFT, Address::ZERO, 9),
            ],
            receipt_success: true,
            ..Default::default()
        };

        let token_id = market(node, None).mint(NFT, "ipfs://kitty").await.unwrap();
        assert_eq!(token_id, TokenId(U256::from(9u64)));
    }

    #[tokio::test]
    async fn mint_ignores_transfers_from_other_contracts() {
        let stranger = address!("00000000000000000000000000000000000000ff");
        let node = StubNode {
            receipt_logs: vec![transfer_log(stranger, Address::ZERO, 1)],
            receipt_success: true,
            ..Default::default()
        };

        let err = market(node, None).mint(NFT, "ipfs://kitty").await.unwrap_err();
        assert!(matches!(err, MarketError::MissingEvent { event: "Transfer", .. }));
    }

    #[tokio::test]
    async fn reverted_receipt_is_an_error() {
        let node = StubNode {
            receipt_logs: vec![transfer_log(NFT, Address::ZERO, 1)],
            receipt_success: false,
            ..Default::default()
        };

        let err = market(node, None).mint(NFT, "ipfs://kitty").await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Reverted {
                block_number: Some(100),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn no_gas_price_when_unconfigured() {
        let node = StubNode {
            receipt_success: true,
            ..Default::default()
        };
        let market = market(node, None);

        market
            .buy_escrow(NFT, Some(U256::from(1u64)))
            .await
            .unwrap();

        let sent = market.node().sent.lock().unwrap();
        assert_eq!(sent[0].gas_price, None);
        assert_eq!(sent[0].value, Some(U256::from(1u64)));
    }

    #[tokio::test]
    async fn escrow_price_decodes_uint() {
        let market = market(StubNode::default(), None);
        assert_eq!(market.escrow_price(NFT).await.unwrap(), U256::from(5u64));
    }

    #[test]
    fn settings_from_config() {
        let mut cfg = Config::default();
        cfg.contracts.from_block = 9_187_993;
        cfg.network.gas_price_gwei = Some(30);

        assert_eq!(
            MarketSettings::from_config(&cfg),
            MarketSettings {
                from_block: 9_187_993,
                gas_price_wei: Some(30_000_000_000),
            }
        );
    }

    #[test]
    fn summary_lists_each_record() {
        let records = vec![
            EscrowRecord {
                token_id: TokenId(U256::from(1u64)),
                price_wei: U256::from(100u64),
                escrow_address: Address::ZERO,
                block_number: None,
                transaction_hash: None,
            },
            EscrowRecord {
                token_id: TokenId(U256::from(2u64)),
                price_wei: U256::from(200u64),
                escrow_address: Address::ZERO,
                block_number: None,
                transaction_hash: None,
            },
        ];

        let summary = format_escrow_summary(&records);
        assert!(summary.starts_with("Escrows created:\n\n"));
        assert!(summary.contains("Escrow for Token ID: 1\nPrice: 100 Wei\n"));
        assert!(summary.contains("Escrow for Token ID: 2\nPrice: 200 Wei\n"));
        assert_eq!(summary.matches("Bidding Address: ").count(), 2);
    }

    #[test]
    fn summary_for_no_records() {
        assert_eq!(format_escrow_summary(&[]), "No escrows created.");
    }
}
