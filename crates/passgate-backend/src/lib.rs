//! Passgate Backend: client side of the remote verification service.
//!
//! - `VerificationBackend` trait: health probe + single-shot persistence
//! - `HttpBackend`: reqwest implementation (`GET /health`, `POST /verify`)
//! - `MockBackend`: scriptable in-memory backend for tests

pub mod error;
pub mod http;
pub mod mock;
pub mod traits;

pub use error::BackendError;
pub use http::{HttpBackend, HttpBackendConfig};
pub use mock::MockBackend;
pub use traits::{HealthReport, PersistRequest, VerificationBackend};
