use crate::synth::backend::VoiceOutput;

/// Creates the audio output for each voice slot.
///
/// This is the "instrument design" layer: the host builds its signal chain
/// once per slot and the pool drives it from then on.
pub trait VoiceFactory: Send {
    type Output: VoiceOutput;

    fn create_voice(&self, index: usize) -> Self::Output;
}

impl<F, T> VoiceFactory for F
where
    F: Fn(usize) -> T + Send,
    T: VoiceOutput,
{
    type Output = T;

    fn create_voice(&self, index: usize) -> Self::Output {
        self(index)
    }
}
