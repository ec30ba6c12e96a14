pub mod event;
pub mod filter;
pub mod gesture;
pub mod reactor;
pub mod recorder;
pub mod stack;
pub mod state;
pub mod telemetry;
pub mod time;
