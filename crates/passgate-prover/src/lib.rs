//! Passgate Prover: the boundary to the identity-wallet prover SDK.
//!
//! Provides:
//! - `SessionDescriptor`, the request a session asks the wallet to fulfil
//! - `ProverSdk`, the trait the orchestrator builds requests through
//! - `UniversalLinkProver`, which encodes descriptors as wallet deep links
//! - `MockProver` for tests

pub mod descriptor;
pub mod error;
pub mod mock;
pub mod traits;
pub mod universal_link;

pub use descriptor::SessionDescriptor;
pub use error::ProverError;
pub use mock::MockProver;
pub use traits::ProverSdk;
pub use universal_link::UniversalLinkProver;
