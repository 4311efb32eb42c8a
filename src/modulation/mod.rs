//! Control-rate modulation: sources, fixed routing and runtime state.
//!
//! Sources are two envelopes (modulator and auxiliary), a per-voice LFO,
//! a global LFO, key tracking and touch (initial position plus aftertouch).
//! Destinations are fixed; see [`router`] for the formulas.

pub mod envelope;
pub mod lfo;
pub mod params;
pub mod router;
pub mod state;

pub use envelope::{envelope_value, Adsr};
pub use lfo::{LfoFrequencyMode, LfoResetMode, LfoSyncValue, LfoWaveform};
pub use params::{
    AuxiliaryEnvelopeParameters, GlobalLfoParameters, KeyTrackingParameters,
    ModulatorEnvelopeParameters, TouchAftertouchParameters, TouchInitialParameters,
    VoiceLfoParameters, VoiceModulationParameters,
};
pub use router::Source;
pub use state::{GlobalModulationState, ModulationState, DEFAULT_FILTER_SMOOTHING};
