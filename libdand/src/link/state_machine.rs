// libdand/src/link/state_machine.rs

//! Tag state machine of the ISO 14443-3 link.

use super::anticollision::{Anticollision, SelectOutcome};
use super::TagState;
use crate::constants::*;
use crate::dispatch::{transport_error, Dispatcher};
use crate::protocol::{DandStatus, DandelionResponse, Frame, FrameType};
use crate::types::Uid;

/// Owns the tag's protocol state and routes classified frames to the
/// anticollision engine or the Dandelion dispatcher.
#[derive(Debug, Clone)]
pub struct LinkStateMachine {
    state: TagState,
    atqa: [u8; 2],
    anticollision: Anticollision,
}

fn is_sel(command: u8) -> bool {
    matches!(command, NFC_SEL_1 | NFC_SEL_2 | NFC_SEL_3)
}

/// Intact Dandelion request addressed to a tag that has not been selected
fn is_unselected_dand(frame: &Frame) -> bool {
    frame.frame_type() == FrameType::Standard
        && frame.command() == NFC_DAND_CMD
        && frame.parity_ok()
        && frame.crc_ok()
}

impl LinkStateMachine {
    /// Machine in `Idle` for the given identity
    pub fn new(uid: Uid, atqa: [u8; 2], sak: u8) -> Self {
        Self {
            state: TagState::Idle,
            atqa,
            anticollision: Anticollision::new(uid, sak),
        }
    }

    /// Current protocol state
    pub fn state(&self) -> TagState {
        self.state
    }

    /// Current cascade level (1-based)
    pub fn cascade_level(&self) -> u8 {
        self.anticollision.level()
    }

    fn transition(&mut self, next: TagState) {
        if next != self.state {
            log::debug!("state {} -> {}", self.state, next);
        }
        if !next.is_ready() {
            self.anticollision.reset();
        }
        self.state = next;
    }

    /// RF field lost: back to Idle from anywhere
    pub fn field_lost(&mut self) {
        log::debug!("field lost in state {}", self.state);
        self.transition(TagState::Idle);
        self.anticollision.reset();
    }

    /// Handle one classified frame and return the reply to transmit.
    pub fn handle(&mut self, frame: &Frame, dispatcher: &mut Dispatcher) -> DandelionResponse {
        if self.state.is_ready() {
            self.handle_ready(frame)
        } else if self.state.is_active() {
            self.handle_active(frame, dispatcher)
        } else if self.state.is_selected() {
            self.handle_prot_dand(frame, dispatcher)
        } else {
            self.handle_sleeping(frame)
        }
    }

    fn atqa(&self) -> DandelionResponse {
        DandelionResponse::with_bytes(&self.atqa, false).unwrap_or_default()
    }

    fn handle_sleeping(&mut self, frame: &Frame) -> DandelionResponse {
        if is_unselected_dand(frame) {
            log::warn!("dandelion request while {}", self.state);
            return DandelionResponse::status(DandStatus::ErrorUnknownCmd);
        }
        if frame.frame_type() != FrameType::Short {
            return DandelionResponse::none();
        }
        match (self.state, frame.command()) {
            (TagState::Idle, NFC_REQA) | (TagState::Idle, NFC_WUPA) => {
                self.transition(TagState::Ready0);
                self.atqa()
            }
            (TagState::Halt, NFC_WUPA) => {
                self.transition(TagState::Ready1);
                self.atqa()
            }
            _ => DandelionResponse::none(),
        }
    }

    fn handle_ready(&mut self, frame: &Frame) -> DandelionResponse {
        let transport_ok = match frame.frame_type() {
            FrameType::Standard => frame.parity_ok() && frame.crc_ok(),
            FrameType::Anticollision => frame.parity_ok(),
            _ => true,
        };
        if !transport_ok {
            log::trace!("dropping corrupted frame in {}", self.state);
            return DandelionResponse::none();
        }
        if is_unselected_dand(frame) {
            log::warn!("dandelion request while {}", self.state);
            return DandelionResponse::status(DandStatus::ErrorUnknownCmd);
        }
        if !is_sel(frame.command()) || frame.frame_type() == FrameType::Short {
            self.transition(self.state.fallback());
            return DandelionResponse::none();
        }
        match self.anticollision.handle(frame) {
            SelectOutcome::UidBits(reply) => reply,
            SelectOutcome::Selected { sak, complete } => {
                if complete {
                    self.transition(self.state.promoted());
                }
                sak
            }
            SelectOutcome::NotAddressed => {
                self.transition(self.state.fallback());
                DandelionResponse::none()
            }
        }
    }

    fn handle_active(&mut self, frame: &Frame, dispatcher: &mut Dispatcher) -> DandelionResponse {
        if frame.frame_type() == FrameType::Standard && !(frame.parity_ok() && frame.crc_ok()) {
            log::trace!("dropping corrupted frame in {}", self.state);
            return DandelionResponse::none();
        }
        if frame.frame_type() == FrameType::Error {
            return DandelionResponse::none();
        }
        if frame.frame_type() != FrameType::Standard {
            return DandelionResponse::status(DandStatus::ErrorUnknownCmd);
        }
        match frame.command() {
            NFC_HLTA => {
                self.transition(TagState::Halt);
                DandelionResponse::none()
            }
            NFC_RATS_DAND => {
                self.transition(TagState::ProtDand);
                DandelionResponse::with_bytes(&[NFC_ACK_RATS_DAND], true).unwrap_or_default()
            }
            NFC_T2T_READ if frame.data().len() == 4 => dispatcher.read_t2t(frame.data()[1]),
            other => {
                log::warn!("command {:#04x} not accepted in {}", other, self.state);
                DandelionResponse::status(DandStatus::ErrorUnknownCmd)
            }
        }
    }

    fn handle_prot_dand(&mut self, frame: &Frame, dispatcher: &mut Dispatcher) -> DandelionResponse {
        match frame.frame_type() {
            FrameType::Error => return DandelionResponse::none(),
            FrameType::Standard => {}
            _ => return DandelionResponse::status(DandStatus::ErrorUnknownCmd),
        }
        if !(frame.crc_ok() && frame.parity_ok()) {
            log::warn!(
                "transport error in {}: crc_ok={}, parity_ok={}",
                self.state,
                frame.crc_ok(),
                frame.parity_ok()
            );
            return transport_error(frame.crc_ok(), frame.parity_ok());
        }
        match frame.command() {
            NFC_DESELECT_DAND | NFC_HLTA => {
                self.transition(TagState::Halt);
                DandelionResponse::none()
            }
            NFC_DAND_CMD => match frame.dandelion() {
                Some(request) => dispatcher.dispatch(request),
                None => {
                    log::warn!("undecodable dandelion request");
                    DandelionResponse::status(DandStatus::ErrorUnknownCmd)
                }
            },
            other => {
                log::warn!("command {:#04x} not accepted in {}", other, self.state);
                DandelionResponse::status(DandStatus::ErrorUnknownCmd)
            }
        }
    }
}
