// libdand/src/link/mod.rs

//! ISO 14443-3 link layer: tag states, anticollision and the state machine.

pub mod anticollision;
pub mod state_machine;

pub use anticollision::{Anticollision, SelectOutcome};
pub use state_machine::LinkStateMachine;

/// Protocol state of the tag. `*0` states are reached by REQA/WUPA from
/// Idle, `*1` states by WUPA from Halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum TagState {
    /// Powered, waiting for REQA or WUPA
    #[default]
    #[display(fmt = "IDLE")]
    Idle,
    /// Anticollision running after REQA/WUPA
    #[display(fmt = "READY")]
    Ready0,
    /// Selected
    #[display(fmt = "ACTIVE")]
    Active0,
    /// Halted; only WUPA wakes it
    #[display(fmt = "HALT")]
    Halt,
    /// Anticollision after WUPA from Halt
    #[display(fmt = "READY*")]
    Ready1,
    /// Selected after a wake from Halt
    #[display(fmt = "ACTIVE*")]
    Active1,
    /// Dandelion protocol entered via RATS_DAND
    #[display(fmt = "PROT_DAND")]
    ProtDand,
}

impl TagState {
    /// Either ready state
    pub fn is_ready(&self) -> bool {
        matches!(self, TagState::Ready0 | TagState::Ready1)
    }

    /// Either active state
    pub fn is_active(&self) -> bool {
        matches!(self, TagState::Active0 | TagState::Active1)
    }

    /// Whether this is a selected state (an HLTA applies)
    pub fn is_selected(&self) -> bool {
        self.is_active() || *self == TagState::ProtDand
    }

    /// Where a failed selection falls back to
    pub fn fallback(&self) -> TagState {
        match self {
            TagState::Ready1 | TagState::Active1 => TagState::Halt,
            _ => TagState::Idle,
        }
    }

    /// Active state matching this ready state
    pub fn promoted(&self) -> TagState {
        match self {
            TagState::Ready1 => TagState::Active1,
            _ => TagState::Active0,
        }
    }
}
