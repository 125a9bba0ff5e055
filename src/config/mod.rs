pub mod store;
pub mod wallet;
