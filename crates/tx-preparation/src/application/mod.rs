//! # Application Module
//!
//! Preparation stages and the service that sequences them.

pub mod encoding;
pub mod interface_resolver;
pub mod service;
pub mod tapos_resolver;

pub use encoding::ActionEncoding;
pub use interface_resolver::InterfaceResolver;
pub use service::TransactionPreparer;
pub use tapos_resolver::ReferenceBlockResolver;
