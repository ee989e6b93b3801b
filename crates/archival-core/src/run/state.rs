use serde::{Deserialize, Serialize};

use crate::errors::OrchestratorError;

/// Máquina de estados de una ejecución.
///
/// ```text
/// Pending -> ArchivingPrimary -> ArchivingPrimaryFailed            [terminal]
///                             -> ArchivingIndexes -> ComputingStats -> Succeeded      [terminal]
///                                                                   -> PartialFailure [terminal]
///                                                                   -> StatsFailed    [terminal]
/// Pending -> ArchivingIndexes   (relanzamientos sin job primario)
/// ```
///
/// El subestado de cada índice se lleva por job y no ramifica esta máquina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Pending,
    ArchivingPrimary,
    ArchivingPrimaryFailed,
    ArchivingIndexes,
    ComputingStats,
    Succeeded,
    PartialFailure,
    StatsFailed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self,
                 RunState::ArchivingPrimaryFailed | RunState::Succeeded | RunState::PartialFailure | RunState::StatsFailed)
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        matches!((self, next),
                 (Pending, ArchivingPrimary)
                 | (Pending, ArchivingIndexes)
                 | (ArchivingPrimary, ArchivingPrimaryFailed)
                 | (ArchivingPrimary, ArchivingIndexes)
                 | (ArchivingIndexes, ComputingStats)
                 | (ComputingStats, Succeeded)
                 | (ComputingStats, PartialFailure)
                 | (ComputingStats, StatsFailed))
    }

    pub fn transition(self, next: RunState) -> Result<RunState, OrchestratorError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(OrchestratorError::InvalidTransition { from: self, to: next })
        }
    }
}
