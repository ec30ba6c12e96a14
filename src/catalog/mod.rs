pub mod types;
pub mod source;

pub use types::*;
pub use source::*;
