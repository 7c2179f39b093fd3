pub mod error;
pub mod types;

pub use error::EndpointError;
pub use types::Endpoint;
