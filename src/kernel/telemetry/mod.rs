//! Swipe session telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side layer. Nothing in the filter pipeline,
//! gesture interpreter, stack or recorder may read it back.
//!
//! # PRIVACY INVARIANT
//! Events carry candidate ids, directions, counts and tick latencies only.
//! Never payload, free text or filter keywords.

pub mod event;
pub mod metrics;
pub mod recorder;
