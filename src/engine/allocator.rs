use crate::synth::{
    backend::VoiceOutput,
    message::PoolMessage,
    pool::{PoolStatus, VoicePool},
};

/// What the control thread drives: messages in, time forward, status out.
pub trait VoiceAllocator {
    fn handle_message(&mut self, message: PoolMessage);
    fn advance(&mut self, delta_time: f64);
    fn status(&self) -> PoolStatus;
}

impl<O: VoiceOutput> VoiceAllocator for VoicePool<O> {
    fn handle_message(&mut self, message: PoolMessage) {
        match message {
            PoolMessage::KeyDown {
                key,
                frequency,
                touch_x,
            } => {
                self.allocate_voice(frequency, key, touch_x);
            }
            PoolMessage::TouchMoved { key, touch_x } => self.update_touch(key, touch_x),
            PoolMessage::KeyUp { key } => self.release_voice(key),
            PoolMessage::StopAll => self.stop_all(),
            PoolMessage::SetTempo { bpm } => self.set_tempo(bpm),
            PoolMessage::SetGlobalLfo(params) => self.set_global_lfo(params),
            PoolMessage::SetModulation(params) => self.set_modulation(params),
            PoolMessage::ApplyPatch(patch) => self.apply_patch(&patch),
        }
    }

    fn advance(&mut self, delta_time: f64) {
        self.tick(delta_time);
    }

    fn status(&self) -> PoolStatus {
        VoicePool::status(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::backend::NullOutput;

    #[test]
    fn messages_drive_the_pool() {
        let mut pool = VoicePool::new(&|_: usize| NullOutput::new(), 2);
        let allocator: &mut dyn VoiceAllocator = &mut pool;

        allocator.handle_message(PoolMessage::KeyDown {
            key: 4,
            frequency: 220.0,
            touch_x: 0.5,
        });
        assert_eq!(allocator.status().keys_held, 1);

        allocator.handle_message(PoolMessage::KeyUp { key: 4 });
        assert_eq!(allocator.status().keys_held, 0);
        assert_eq!(allocator.status().active_voices, 1);

        allocator.advance(1.0);
        assert_eq!(allocator.status().active_voices, 0);
    }
}
