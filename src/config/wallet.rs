//! Wallet file loading.
//!
//! The operator's private key lives in a plain file (`./.wallet` unless
//! configured otherwise), optionally `0x`-prefixed. It is read once at
//! startup, before any network connection is attempted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// Operator guidance printed when the default wallet file does not exist.
pub const MISSING_WALLET_MESSAGE: &str =
    "Wallet private key not found, add .wallet in root folder containing your private key";

/// Where the wallet is looked up when nothing is configured.
pub const DEFAULT_WALLET_FILE: &str = ".wallet";

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{}", missing_message(.path))]
    Missing { path: PathBuf },

    #[error("failed to read wallet file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("wallet file {} is empty", .path.display())]
    Empty { path: PathBuf },
}

/// Guidance for a missing wallet. The documented wording is kept for the
/// default location; any other path is named explicitly.
pub fn missing_message(path: &Path) -> String {
    if path == Path::new(DEFAULT_WALLET_FILE) {
        MISSING_WALLET_MESSAGE.to_string()
    } else {
        format!(
            "Wallet private key not found, add {} containing your private key",
            path.display()
        )
    }
}

/// Read the raw private key from `path`.
///
/// The returned string is zeroed when dropped. It is not normalized here;
/// see [`crate::chain::signer::normalize_private_key`].
pub fn read_private_key(path: &Path) -> Result<Zeroizing<String>, WalletError> {
    debug!(path = %path.display(), "reading wallet file");

    let contents = match fs::read_to_string(path) {
        Ok(contents) => Zeroizing::new(contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(WalletError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(WalletError::Unreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Err(WalletError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
