//! Test infrastructure shared by unit tests, integration tests and paper runs.
//!
//! - Mock chain (node, signer, coin metadata)
//! - Mock pool adapters with controllable rates, failures and latency

pub mod mock_dex;

pub use mock_dex::{MockNetworkClient, MockPoolAdapter, MockSigner};
