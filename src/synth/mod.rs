// Purpose: voices, the voice pool and the interface to the audio primitives
// This layer sits above modulation and drives host-supplied outputs

pub mod backend;
pub mod factory;
pub mod message;
pub mod pool;
pub mod voice;

pub use backend::{EffectsOutput, NullOutput, VoiceOutput};
pub use factory::VoiceFactory;
pub use message::{MessageReceiver, PoolMessage};
pub use pool::{PoolStatus, VoicePool};
pub use voice::{Voice, VoiceState};
