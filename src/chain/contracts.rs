//! ABI bindings for the marketplace contracts.
//!
//! Uses alloy's `sol!` macro to generate type-safe Rust bindings for the two
//! Solidity interfaces the CLI talks to:
//!
//! - **KittyNFT**: ERC-721 collection that mints tokens and deploys escrows.
//! - **Escrow**: per-token sale contract; paying its asking price buys the token.
//!
//! The JSON ABI files under `contracts/abis/` are checked against these
//! bindings at startup (see [`crate::chain::abi`]).

use alloy::sol;

// ---------------------------------------------------------------------------
// KittyNFT
// ---------------------------------------------------------------------------

sol! {
    /// NFT collection with a built-in escrow factory.
    #[derive(Debug)]
    contract KittyNFT {
        /// Mint a new token with the given metadata URI to `msg.sender`.
        function mintNFT(string memory tokenURI) external returns (uint256);

        /// Deploy an escrow that sells `tokenId` for `price` wei.
        function createEscrow(uint256 tokenId, uint256 price) external returns (address);

        /// Standard ERC-721 transfer event (emitted from the zero address on mint).
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        /// Emitted once per escrow deployed by `createEscrow`.
        event EscrowCreated(uint256 tokenId, uint256 price, address escrowAddress);
    }
}

// ---------------------------------------------------------------------------
// Escrow
// ---------------------------------------------------------------------------

sol! {
    /// Sale escrow deployed by [`KittyNFT::createEscrowCall`].
    ///
    /// Buying is a plain value transfer to the escrow address.
    #[derive(Debug)]
    contract Escrow {
        /// Asking price in wei.
        function price() external view returns (uint256);
    }
}

/// File names of the ABI documents expected inside the ABI directory.
pub mod abi_files {
    pub const KITTY_NFT: &str = "KittyNFT.json";
    pub const ESCROW: &str = "Escrow.json";
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
