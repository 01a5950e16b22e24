//! Recovery limits and the shared per-invocation budget.

use crate::compression::DecompressLimits;

/// Default maximum recursion depth for one recovery pass.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Default number of node visits shared by a whole recovery call tree.
pub const DEFAULT_MAX_STEPS: u32 = 1000;

/// Static configuration for a recovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryLimits {
    /// Nodes deeper than this are returned unchanged.
    pub max_depth: u32,
    /// Total node visits allowed across the call tree.
    pub max_steps: u32,
    /// Cap applied to every decompression attempt.
    pub decompress: DecompressLimits,
}

impl Default for RecoveryLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_steps: DEFAULT_MAX_STEPS,
            decompress: DecompressLimits::default(),
        }
    }
}

/// Mutable work budget threaded by reference through one recovery call tree.
///
/// # Invariants
///
/// - `steps_remaining` never increases and is shared by every branch, so a
///   wide fan-out cannot multiply the work.
/// - `deepest` never decreases.
/// - Once exhausted, every further [`Self::try_consume`] fails.
///
/// Do not share one budget between concurrent decodes.
#[derive(Debug)]
pub struct RecoveryBudget {
    max_depth: u32,
    steps_remaining: u32,
    deepest: u32,
    exhausted: bool,
}

impl RecoveryBudget {
    #[must_use]
    pub fn new(limits: &RecoveryLimits) -> Self {
        Self {
            max_depth: limits.max_depth,
            steps_remaining: limits.max_steps,
            deepest: 0,
            exhausted: false,
        }
    }

    /// Whether a node at `depth` may still be worked on.
    #[must_use]
    pub fn admits_depth(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }

    /// Consume one step for a node visited at `depth`.
    ///
    /// Returns `false` (and marks the budget exhausted) when no steps remain.
    pub fn try_consume(&mut self, depth: u32) -> bool {
        if self.steps_remaining == 0 {
            self.exhausted = true;
            return false;
        }
        self.steps_remaining -= 1;
        self.deepest = self.deepest.max(depth);
        true
    }

    #[must_use]
    pub fn steps_remaining(&self) -> u32 {
        self.steps_remaining
    }

    /// Deepest depth at which a step was consumed.
    #[must_use]
    pub fn deepest(&self) -> u32 {
        self.deepest
    }

    /// True once a visit has been refused for lack of steps.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
