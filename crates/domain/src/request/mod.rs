//! HTTP Request domain types

mod header;
mod method;
mod pending;
mod spec;

pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use pending::PendingRequest;
pub use spec::RequestSpec;
