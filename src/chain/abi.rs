//! JSON ABI loading and verification.
//!
//! The CLI encodes calls and decodes events with the compile-time bindings in
//! [`crate::chain::contracts`]. The ABI documents shipped under
//! `contracts/abis/` describe what is actually deployed, so at startup both
//! files are read and every function and event the CLI relies on is checked
//! against the selector the bindings would produce. A mismatch means the
//! deployed contracts changed and nothing would decode correctly.

use std::fs;
use std::path::Path;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Selector, B256};
use alloy::sol_types::{SolCall, SolEvent};
use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::chain::contracts::{abi_files, Escrow, KittyNFT};

/// The two contract interfaces, as read from disk.
#[derive(Clone, Debug)]
pub struct ContractAbis {
    pub kitty_nft: JsonAbi,
    pub escrow: JsonAbi,
}

impl ContractAbis {
    /// Read `KittyNFT.json` and `Escrow.json` from `dir` and verify them.
    pub fn load(dir: &Path) -> Result<Self> {
        debug!(dir = %dir.display(), "loading contract ABIs");

        let kitty_nft = read_abi(&dir.join(abi_files::KITTY_NFT))?;
        let escrow = read_abi(&dir.join(abi_files::ESCROW))?;

        let abis = Self { kitty_nft, escrow };
        abis.verify()?;

        debug!("contract ABIs verified");
        Ok(abis)
    }

    /// Check that every item the CLI calls exists with the expected selector.
    pub fn verify(&self) -> Result<()> {
        require_function(
            &self.kitty_nft,
            abi_files::KITTY_NFT,
            "mintNFT",
            KittyNFT::mintNFTCall::SELECTOR.into(),
        )?;
        require_function(
            &self.kitty_nft,
            abi_files::KITTY_NFT,
            "createEscrow",
            KittyNFT::createEscrowCall::SELECTOR.into(),
        )?;
        require_event(
            &self.kitty_nft,
            abi_files::KITTY_NFT,
            "Transfer",
            KittyNFT::Transfer::SIGNATURE_HASH,
        )?;
        require_event(
            &self.kitty_nft,
            abi_files::KITTY_NFT,
            "EscrowCreated",
            KittyNFT::EscrowCreated::SIGNATURE_HASH,
        )?;
        require_function(
            &self.escrow,
            abi_files::ESCROW,
            "price",
            Escrow::priceCall::SELECTOR.into(),
        )?;

        if self.escrow.receive.is_none() && self.escrow.fallback.is_none() {
            bail!(
                "{} declares no receive or fallback function; escrows cannot be paid",
                abi_files::ESCROW
            );
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Parse an ABI file. Accepts either a bare ABI array or a build artifact
/// object carrying the array under `"abi"`.
fn read_abi(path: &Path) -> Result<JsonAbi> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read ABI file: {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse ABI file: {}", path.display()))?;

    let abi_value = match value {
        serde_json::Value::Object(mut artifact) => artifact
            .remove("abi")
            .with_context(|| format!("ABI artifact has no \"abi\" field: {}", path.display()))?,
        other => other,
    };

    serde_json::from_value(abi_value)
        .with_context(|| format!("invalid ABI definition in {}", path.display()))
}

fn require_function(abi: &JsonAbi, file: &str, name: &str, expected: Selector) -> Result<()> {
    let found = abi
        .function(name)
        .map(|overloads| overloads.iter().any(|f| f.selector() == expected))
        .unwrap_or(false);

    if !found {
        bail!("{file} is missing function `{name}` (selector {expected})");
    }
    Ok(())
}

fn require_event(abi: &JsonAbi, file: &str, name: &str, expected: B256) -> Result<()> {
    let found = abi
        .event(name)
        .map(|overloads| overloads.iter().any(|e| e.selector() == expected))
        .unwrap_or(false);

    if !found {
        bail!("{file} is missing event `{name}` (topic {expected})");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
