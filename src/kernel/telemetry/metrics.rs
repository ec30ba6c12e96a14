use std::collections::VecDeque;

use super::event::TelemetryEvent;
use crate::decisions::Direction;
use crate::kernel::gesture::CommitTrigger;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub gesture_stats: GestureStats,
    pub decision_stats: DecisionStats,
    pub persistence_stats: PersistenceStats,
    pub filter_stats: FilterStats,
}

#[derive(Debug, Clone, Default)]
pub struct GestureStats {
    pub started: u64,
    pub cancelled: u64,
    pub rejected: u64,
    pub by_distance: u64,
    pub by_velocity: u64,
    pub by_button: u64,
    pub direct: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DecisionStats {
    pub accepted: u64,
    pub rejected: u64,
    pub duplicates_suppressed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PersistenceStats {
    pub confirmed: u64,
    pub rolled_back: u64,
    pub total_latency_ticks: u64,
    pub avg_latency_ticks: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FilterStats {
    pub applied: u64,
    pub deferred: u64,
    pub exhausted: u64,
    pub last_queue_len: Option<usize>,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::GestureStarted { .. } => snap.gesture_stats.started += 1,
            TelemetryEvent::GestureCancelled { .. } => snap.gesture_stats.cancelled += 1,
            TelemetryEvent::GestureRejected { .. } => snap.gesture_stats.rejected += 1,
            TelemetryEvent::Committed { direction, trigger, .. } => {
                match direction {
                    Direction::Accept => snap.decision_stats.accepted += 1,
                    Direction::Reject => snap.decision_stats.rejected += 1,
                }
                match trigger {
                    CommitTrigger::Distance => snap.gesture_stats.by_distance += 1,
                    CommitTrigger::Velocity => snap.gesture_stats.by_velocity += 1,
                    CommitTrigger::Button => snap.gesture_stats.by_button += 1,
                    CommitTrigger::Direct => snap.gesture_stats.direct += 1,
                }
            }
            TelemetryEvent::DuplicateSuppressed { .. } => {
                snap.decision_stats.duplicates_suppressed += 1
            }
            TelemetryEvent::PersistConfirmed { latency_ticks, .. } => {
                snap.persistence_stats.confirmed += 1;
                snap.persistence_stats.total_latency_ticks += latency_ticks;
            }
            TelemetryEvent::RolledBack { .. } => snap.persistence_stats.rolled_back += 1,
            TelemetryEvent::FilterApplied { queue_len } => {
                snap.filter_stats.applied += 1;
                snap.filter_stats.last_queue_len = Some(*queue_len);
            }
            TelemetryEvent::RecomputeDeferred => snap.filter_stats.deferred += 1,
            TelemetryEvent::Exhausted => snap.filter_stats.exhausted += 1,
        }
    }

    if snap.persistence_stats.confirmed > 0 {
        snap.persistence_stats.avg_latency_ticks = snap.persistence_stats.total_latency_ticks as f64
            / snap.persistence_stats.confirmed as f64;
    }

    snap
}
