pub mod client;

pub use client::RestBackend;
