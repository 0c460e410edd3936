mod client_error;
mod transport_error;

pub use client_error::{ClientError, ErrorKind};
pub use transport_error::TransportError;
