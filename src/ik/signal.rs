/// Interpretation of a bone's incoming signal pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    /// Rotate toward the target.
    Free,
    /// Hold the current orientation.
    Restricted,
    /// Rotate away from the target. Takes precedence over restriction.
    Retracting,
}

/// The `(restrict, retract)` pair a child writes into its parent every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParentSignal {
    pub restrict: bool,
    pub retract: bool,
}

impl ParentSignal {
    pub const FREE: Self = Self::new(false, false);
    pub const RESTRICT: Self = Self::new(true, false);
    pub const RETRACT: Self = Self::new(false, true);

    pub const fn new(restrict: bool, retract: bool) -> Self {
        Self { restrict, retract }
    }

    pub fn state(self) -> SignalState {
        match (self.restrict, self.retract) {
            (_, true) => SignalState::Retracting,
            (true, false) => SignalState::Restricted,
            (false, false) => SignalState::Free,
        }
    }
}
