//! Voice allocation and control-rate modulation for an 18-key pentatonic
//! touch keyboard.
//!
//! The crate produces no audio. It decides which voice plays which key, and
//! 200 times a second it computes every voice's pitch, level, FM and filter
//! settings from envelopes, LFOs, key tracking and touch, handing the
//! results to host-supplied outputs ([`synth::VoiceOutput`]).
//!
//! Layers, bottom up:
//!
//! - [`scale`]: scale rotation, transposition and the 18 key frequencies
//! - [`modulation`]: envelopes, LFOs, parameter templates and routing formulas
//! - [`synth`]: voices and the voice pool
//! - [`engine`]: a control-rate thread owning the pool, fed by a ring buffer

pub mod engine; // Control thread, scheduling and configuration
pub mod modulation; // Sources, routing and runtime state
pub mod patch; // Base voice parameters
pub mod scale; // Scales, keys and key frequencies
pub mod synth; // Voices and the voice pool

/// Default modulation update rate.
pub const CONTROL_RATE_HZ: f64 = 200.0;

pub use engine::{EngineConfig, EngineError};
#[cfg(feature = "rtrb")]
pub use engine::Engine;
pub use scale::{make_key_frequencies, rotate_ratios, Intonation, MusicalKey, Scale, KEY_COUNT};
pub use synth::{PoolStatus, VoicePool};
