//! Studio backend library modules.
//!
//! Hexagonal layout: `domain` holds entities, services and ports; `inbound`
//! adapts HTTP onto the driving ports; `outbound` implements the driven ports
//! for PostgreSQL, memory, local storage, password hashing, tokens, the mock
//! model and the remote API client used by the generation controller.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::{Trace, TraceId};
