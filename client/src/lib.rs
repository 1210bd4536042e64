//! Client-side protocol for the GIF portal program: chain client, wallet gateway, program proxy,
//! state store and view model, plus a local chain for exercising them in tests.

pub mod chain;
pub mod keypair_asset;
pub mod local_chain;
pub mod logs;
pub mod network;
pub mod portal;
pub mod proxy;
pub mod store;
pub mod test_accounts;
pub mod view;
pub mod wallet;

pub use logs::LogColor;
