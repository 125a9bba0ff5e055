use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::debug;

use crate::chain::abi::ContractAbis;
use crate::chain::node::RpcNode;
use crate::chain::signer::TransactionSigner;
use crate::config::store::Config;
use crate::engine::marketplace::{MarketSettings, Marketplace};

pub mod all_escrows;
pub mod buy_escrow;
pub mod create_escrow;
pub mod init;
pub mod mint;

/// Shared setup for every command.
///
/// Encapsulates the repeated pattern of verifying the contract ABIs,
/// deriving the operator account from the wallet key, and opening the node
/// connection. One context is built per invocation and torn down with
/// [`CommandContext::disconnect`] when the command finishes.
pub struct CommandContext {
    pub cfg: Config,
    pub market: Marketplace<RpcNode>,
}

impl CommandContext {
    /// Verify ABIs, build the signer from `private_key`, and connect.
    pub async fn connect(cfg: Config, private_key: &str) -> Result<Self> {
        ContractAbis::load(&cfg.contracts.abi_dir)?;

        let signer = TransactionSigner::from_private_key(private_key)
            .context("invalid private key in wallet file")?;

        debug!(account = %signer.address(), "operator account derived");

        let node = RpcNode::connect(&cfg.network.rpc_url, &signer).await?;
        let market = Marketplace::new(node, signer.address(), MarketSettings::from_config(&cfg));

        Ok(Self { cfg, market })
    }

    /// The NFT contract to act on: the `--address` flag if given, otherwise
    /// the configured default.
    pub fn nft_address(&self, flag: Option<Address>) -> Result<Address> {
        resolve_nft_address(flag, &self.cfg)
    }

    /// Close the node connection.
    pub fn disconnect(self) {
        self.market.into_node().disconnect();
    }
}

/// Pick the NFT contract address (CLI flag > config).
pub fn resolve_nft_address(flag: Option<Address>, cfg: &Config) -> Result<Address> {
    flag.or(cfg.contracts.nft_address).context(
        "no NFT contract address: pass --address or set contracts.nft_address in kitty.toml",
    )
}
