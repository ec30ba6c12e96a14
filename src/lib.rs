pub mod catalog;
pub mod config;
pub mod decisions;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod services;

pub use driver::{CommitReceipt, SessionDriver};
pub use error::EngineError;
pub use kernel::reactor::Reactor;
