use serde::{Deserialize, Serialize};

use super::filter::Queue;
use crate::catalog::{Candidate, CandidateId};
use crate::config::StackConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackStatus {
    /// Catalog or decision history not loaded yet.
    Loading,
    Ready,
    /// Loaded, and nothing left to swipe under the current criteria.
    Exhausted,
}

/// Rendering hint for a card at a given depth. Has no effect on which card
/// accepts gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardPresentation {
    pub scale: f32,
    pub opacity: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowItem {
    pub candidate: Candidate,
    pub depth: usize,
    pub presentation: CardPresentation,
}

impl WindowItem {
    pub fn is_interactive(&self) -> bool {
        self.depth == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportWindow {
    pub items: Vec<WindowItem>,
}

impl ViewportWindow {
    pub fn ids(&self) -> Vec<CandidateId> {
        self.items.iter().map(|i| i.candidate.id.clone()).collect()
    }
}

/// Owns the local queue snapshot and the visible window over it.
#[derive(Debug, Clone)]
pub struct StackController {
    config: StackConfig,
    queue: Queue,
    window: ViewportWindow,
    loaded: bool,
}

impl StackController {
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            queue: Queue::default(),
            window: ViewportWindow::default(),
            loaded: false,
        }
    }

    pub fn status(&self) -> StackStatus {
        if !self.loaded {
            StackStatus::Loading
        } else if self.queue.is_empty() {
            StackStatus::Exhausted
        } else {
            StackStatus::Ready
        }
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn window(&self) -> &ViewportWindow {
        &self.window
    }

    pub fn current_top(&self) -> Option<&Candidate> {
        self.queue.first()
    }

    /// Only the depth-0 card accepts gestures, and only once the inputs are
    /// complete.
    pub fn is_interactive(&self, id: &CandidateId) -> bool {
        self.loaded && self.current_top().is_some_and(|top| &top.id == id)
    }

    /// Installs a freshly computed queue. `loaded` says whether the inputs
    /// it was computed from are complete.
    pub fn replace(&mut self, queue: Queue, loaded: bool) {
        self.queue = queue;
        self.loaded = loaded;
        self.rebuild_window();
    }

    /// Drops the committed candidate from the snapshot. Returns false if it
    /// was not in the queue.
    pub fn advance(&mut self, committed: &CandidateId) -> bool {
        let removed = self.queue.remove(committed);
        if removed {
            self.rebuild_window();
        }
        removed
    }

    pub fn presentation_at(&self, depth: usize) -> CardPresentation {
        let d = depth as f32;
        CardPresentation {
            scale: (1.0 - self.config.scale_step * d).max(0.0),
            opacity: (1.0 - self.config.opacity_step * d).max(0.0),
            offset_y: self.config.offset_step * d,
        }
    }

    fn rebuild_window(&mut self) {
        let items = self
            .queue
            .iter()
            .take(self.config.window_size)
            .enumerate()
            .map(|(depth, candidate)| WindowItem {
                candidate: candidate.clone(),
                depth,
                presentation: self.presentation_at(depth),
            })
            .collect();
        self.window = ViewportWindow { items };
    }
}
