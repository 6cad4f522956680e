// Application layer - the ledger use cases every front-end goes through.
// Stores are passed in explicitly; nothing here holds global state.

pub mod error;
pub mod integrity;
pub mod service;

pub use error::*;
pub use integrity::*;
pub use service::*;
