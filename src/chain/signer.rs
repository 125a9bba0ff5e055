//! Transaction signing.
//!
//! Wraps alloy's [`PrivateKeySigner`] built from the raw key read out of the
//! wallet file. Intermediate key material is zeroed as soon as the signer
//! has been constructed.

use std::str::FromStr;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use tracing::debug;
use zeroize::Zeroizing;

/// Hex prefix every private key carries once normalized.
const HEX_PREFIX: &str = "0x";

// ---------------------------------------------------------------------------
// Key normalization
// ---------------------------------------------------------------------------

/// Normalize a raw private key string so it always carries a `0x` prefix.
///
/// Wallet exports often omit the prefix (MetaMask does), and key files
/// usually end with a newline, so surrounding whitespace is trimmed too.
pub fn normalize_private_key(raw: &str) -> Zeroizing<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with(HEX_PREFIX) {
        Zeroizing::new(trimmed.to_string())
    } else {
        Zeroizing::new(format!("{HEX_PREFIX}{trimmed}"))
    }
}

// ---------------------------------------------------------------------------
// TransactionSigner
// ---------------------------------------------------------------------------

/// A transaction signer backed by a secp256k1 private key.
///
/// `Debug` shows the derived address only, never the key.
#[derive(Debug)]
pub struct TransactionSigner {
    signer: PrivateKeySigner,
}

impl TransactionSigner {
    /// Build a signer from a hex private key, with or without `0x`.
    pub fn from_private_key(raw: &str) -> Result<Self> {
        let normalized = normalize_private_key(raw);
        if normalized.len() == HEX_PREFIX.len() {
            bail!("private key is empty");
        }

        let key_bytes = Zeroizing::new(
            hex::decode(&normalized[HEX_PREFIX.len()..])
                .context("private key is not valid hex")?,
        );

        Self::from_bytes(&key_bytes)
    }

    /// Build from raw private key bytes (must be exactly 32 bytes).
    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self> {
        if key_bytes.len() != 32 {
            bail!(
                "private key must be exactly 32 bytes, got {}",
                key_bytes.len()
            );
        }

        let key_array = Zeroizing::new(<[u8; 32]>::try_from(key_bytes)?);

        let signer = PrivateKeySigner::from_bytes(&(*key_array).into())
            .context("failed to construct signer from private key bytes")?;

        debug!(address = %signer.address(), "transaction signer created");

        Ok(Self { signer })
    }

    /// Returns the account address derived from the signing key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Returns a reference to the inner alloy signer, for wiring into a
    /// provider's wallet filler.
    pub fn inner(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl FromStr for TransactionSigner {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_private_key(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
