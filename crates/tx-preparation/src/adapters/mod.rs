//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound ports.

mod http_chain;
mod rpc_interface;
pub mod rpc_types;

pub use http_chain::{HttpChainClient, UNKNOWN_BLOCK_CODE};
pub use rpc_interface::{RpcInterfaceProvider, DEFAULT_FETCH_CONCURRENCY};
