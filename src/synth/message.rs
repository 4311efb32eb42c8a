#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::{
    modulation::{GlobalLfoParameters, VoiceModulationParameters},
    patch::VoicePatch,
};

/// Requests from the UI context to the control thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PoolMessage {
    KeyDown {
        key: usize,
        frequency: f64,
        touch_x: f64,
    },
    TouchMoved {
        key: usize,
        touch_x: f64,
    },
    KeyUp {
        key: usize,
    },
    StopAll,
    SetTempo {
        bpm: f64,
    },
    SetGlobalLfo(GlobalLfoParameters),
    SetModulation(VoiceModulationParameters),
    ApplyPatch(VoicePatch),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<PoolMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<PoolMessage> {
    fn pop(&mut self) -> Option<PoolMessage> {
        Consumer::pop(self).ok()
    }
}
