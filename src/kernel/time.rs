use serde::{Deserialize, Serialize};

/// Logical step counter of the reactor. One tick per processed event batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick {
    pub frame: u64,
}

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }

    pub fn since(&self, earlier: Tick) -> u64 {
        self.frame.saturating_sub(earlier.frame)
    }
}
