pub mod logger;
pub mod privileges;
pub mod request_executor;
pub mod signer;
pub mod token_manager;
pub mod transport;
