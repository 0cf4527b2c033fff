use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Pipeline execution states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Initializing,
    Running {
        #[serde(skip)]
        start_time: Option<Instant>,
        ticks: u64,
    },
    Completed {
        #[serde(skip)]
        duration: Option<Duration>,
        total_ticks: u64,
    },
    Error {
        error_msg: String,
        recoverable: bool,
    },
}

impl PipelineState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, target),
            // From Idle
            (Idle, Initializing) |

            // From Initializing
            (Initializing, Running { .. }) |
            (Initializing, Error { .. }) |

            // From Running
            (Running { .. }, Completed { .. }) |
            (Running { .. }, Error { .. }) |

            // From Completed
            (Completed { .. }, Idle) |

            // From Error
            (Error { recoverable: true, .. }, Idle)
        )
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Initializing => "Initializing",
            Self::Running { .. } => "Running",
            Self::Completed { .. } => "Completed",
            Self::Error { .. } => "Error",
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Idle
    }
}
