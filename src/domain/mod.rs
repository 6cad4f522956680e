mod error;
mod ledger;
mod money;
mod timestamp;
mod transaction;

pub use error::*;
pub use ledger::*;
pub use money::*;
pub use timestamp::*;
pub use transaction::*;
