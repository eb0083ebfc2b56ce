//! Pipeline step ordering.

use std::fmt;

/// Where the initialization sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Connecting,
    Configuring,
    AwaitingUnlock,
    Unlocking,
    Initializing,
    Ready,
    Failed,
}

impl PipelineState {
    /// Successor of a successful step, or `None` from a terminal state.
    ///
    /// `AwaitingUnlock` and `Unlocking` are only reachable when the
    /// application carries a credential reference.
    pub fn next(self, unlock_required: bool) -> Option<Self> {
        match self {
            Self::Connecting => Some(Self::Configuring),
            Self::Configuring if unlock_required => Some(Self::AwaitingUnlock),
            Self::Configuring => Some(Self::Initializing),
            Self::AwaitingUnlock => Some(Self::Unlocking),
            Self::Unlocking => Some(Self::Initializing),
            Self::Initializing => Some(Self::Ready),
            Self::Ready | Self::Failed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Configuring => "configuring",
            Self::AwaitingUnlock => "awaiting-unlock",
            Self::Unlocking => "unlocking",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full successful path from `Connecting` to `Ready`.
pub fn planned_path(unlock_required: bool) -> Vec<PipelineState> {
    let mut path = vec![PipelineState::Connecting];
    let mut state = PipelineState::Connecting;
    while let Some(next) = state.next(unlock_required) {
        path.push(next);
        state = next;
    }
    path
}
