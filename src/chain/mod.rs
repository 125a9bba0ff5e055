//! Everything that touches the chain: contract bindings, ABI checks, the
//! signer, and the node the transactions go through.

pub mod abi;
pub mod contracts;
pub mod node;
pub mod signer;
pub mod types;
