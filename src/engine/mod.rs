//! The engine: a voice pool owned by a control-rate thread.
//!
//! ```ignore
//! use pentatone::{engine::{Engine, EngineConfig}, synth::NullOutput};
//!
//! let mut engine = Engine::start(EngineConfig::default(), |_: usize| NullOutput::new())?;
//! engine.allocate_voice(293.66, 0, 0.5)?;
//! engine.release_voice(0)?;
//! engine.shutdown();
//! ```
//!
//! Startup order: validate config, create the voice outputs through the
//! factory, build the pool, start the control thread, mark ready. The UI
//! side never touches the pool; it pushes [`PoolMessage`]s into a ring
//! buffer that the control thread drains before every tick.

pub mod allocator;
pub mod scheduler;

use std::{fmt, io, time::Duration};

use crate::synth::message::PoolMessage;

pub use self::{allocator::VoiceAllocator, scheduler::IdleScheduler};

#[cfg(feature = "rtrb")]
pub use self::runner::{Engine, SharedStatus};

/// Engine settings, checked by [`EngineConfig::validate`] before start.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub voice_count: usize,
    pub control_rate_hz: f64,
    pub tempo_bpm: f64,
    /// Capacity of the UI -> control thread message queue.
    pub message_capacity: usize,
    pub filter_smoothing: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voice_count: 5,
            control_rate_hz: crate::CONTROL_RATE_HZ,
            tempo_bpm: 120.0,
            message_capacity: 256,
            filter_smoothing: crate::modulation::DEFAULT_FILTER_SMOOTHING,
        }
    }
}

impl EngineConfig {
    /// Time between control ticks.
    pub fn tick_period(&self) -> Result<Duration, EngineError> {
        if !(self.control_rate_hz.is_finite() && self.control_rate_hz > 0.0) {
            return Err(EngineError::invalid(format!(
                "control_rate_hz must be positive, got {}",
                self.control_rate_hz
            )));
        }
        Duration::try_from_secs_f64(1.0 / self.control_rate_hz).map_err(|_| {
            EngineError::invalid(format!(
                "control_rate_hz {} gives an unrepresentable tick period",
                self.control_rate_hz
            ))
        })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.voice_count == 0 {
            return Err(EngineError::invalid("voice_count must be at least 1"));
        }
        self.tick_period()?;
        if !(self.tempo_bpm.is_finite() && self.tempo_bpm > 0.0) {
            return Err(EngineError::invalid(format!(
                "tempo_bpm must be positive, got {}",
                self.tempo_bpm
            )));
        }
        if self.message_capacity == 0 {
            return Err(EngineError::invalid("message_capacity must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.filter_smoothing) {
            return Err(EngineError::invalid(format!(
                "filter_smoothing must be in [0, 1), got {}",
                self.filter_smoothing
            )));
        }
        Ok(())
    }
}

/// Errors from starting or talking to the engine
#[derive(Debug)]
pub enum EngineError {
    /// Configuration rejected before anything was started
    InvalidConfig { reason: String },
    /// The control thread could not be spawned
    Spawn(io::Error),
    /// The message queue is full; the message was dropped
    QueueFull,
    /// The control thread is gone
    Stopped,
}

impl EngineError {
    fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfig { reason } => {
                write!(f, "Invalid engine configuration: {}", reason)
            }
            EngineError::Spawn(err) => write!(f, "Failed to start control thread: {}", err),
            EngineError::QueueFull => write!(f, "Message queue is full"),
            EngineError::Stopped => write!(f, "Engine is not running"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::Spawn(err)
    }
}

/// Parts handed to the control thread.
pub struct EngineComponents {
    pub allocator: Box<dyn VoiceAllocator + Send>,
}

impl fmt::Debug for EngineComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineComponents")
            .field("status", &self.allocator.status())
            .finish()
    }
}

impl EngineComponents {
    pub fn handle(&mut self, message: PoolMessage) {
        self.allocator.handle_message(message);
    }
}

#[cfg(feature = "rtrb")]
mod runner {
    use std::{
        sync::{
            atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
            Arc,
        },
        thread::{self, JoinHandle},
        time::{Duration, Instant},
    };

    use log::{debug, info, warn};
    use rtrb::{Producer, RingBuffer};

    use super::{EngineComponents, EngineConfig, EngineError};
    use crate::{
        modulation::{GlobalLfoParameters, VoiceModulationParameters},
        patch::VoicePatch,
        synth::{
            backend::VoiceOutput,
            factory::VoiceFactory,
            message::{MessageReceiver, PoolMessage},
            pool::{PoolStatus, VoicePool},
        },
    };

    /// Lock-free counters written by the control thread, read by the UI.
    #[derive(Debug, Default)]
    pub struct SharedStatus {
        voice_count: AtomicUsize,
        active_voices: AtomicUsize,
        keys_held: AtomicUsize,
        ticks: AtomicU64,
        running: AtomicBool,
    }

    impl SharedStatus {
        fn publish(&self, status: &PoolStatus) {
            self.voice_count.store(status.voice_count, Ordering::Relaxed);
            self.active_voices
                .store(status.active_voices, Ordering::Relaxed);
            self.keys_held.store(status.keys_held, Ordering::Relaxed);
            self.ticks.fetch_add(1, Ordering::Release);
        }

        pub fn snapshot(&self) -> PoolStatus {
            let voice_count = self.voice_count.load(Ordering::Relaxed);
            let active_voices = self.active_voices.load(Ordering::Relaxed);
            PoolStatus {
                voice_count,
                active_voices,
                available_voices: voice_count.saturating_sub(active_voices),
                keys_held: self.keys_held.load(Ordering::Relaxed),
            }
        }

        /// Control ticks completed so far.
        pub fn ticks(&self) -> u64 {
            self.ticks.load(Ordering::Acquire)
        }

        pub fn is_running(&self) -> bool {
            self.running.load(Ordering::Acquire)
        }
    }

    /// Handle owned by the UI context.
    pub struct Engine {
        tx: Producer<PoolMessage>,
        status: Arc<SharedStatus>,
        thread: Option<JoinHandle<()>>,
    }

    impl Engine {
        /// Create voices through `factory` and start the control thread.
        pub fn start<F>(config: EngineConfig, factory: F) -> Result<Self, EngineError>
        where
            F: VoiceFactory,
            F::Output: 'static,
        {
            config.validate()?;
            let pool = VoicePool::new(&factory, config.voice_count);
            Self::spawn(config, pool)
        }

        /// Start the control thread around an already built pool, for hosts
        /// that attach effects or a patch first.
        pub fn spawn<O>(config: EngineConfig, mut pool: VoicePool<O>) -> Result<Self, EngineError>
        where
            O: VoiceOutput + 'static,
        {
            config.validate()?;
            let period = config.tick_period()?;
            pool.set_tempo(config.tempo_bpm);
            pool.set_filter_smoothing(config.filter_smoothing);

            let (tx, rx) = RingBuffer::<PoolMessage>::new(config.message_capacity);
            let status = Arc::new(SharedStatus::default());
            status.publish(&pool.status());
            status.running.store(true, Ordering::Release);

            let voice_count = pool.voice_count();
            let components = EngineComponents {
                allocator: Box::new(pool),
            };
            let thread_status = Arc::clone(&status);

            let thread = thread::Builder::new()
                .name("pentatone-control".into())
                .spawn(move || run(components, rx, period, thread_status));

            let thread = match thread {
                Ok(handle) => handle,
                Err(err) => {
                    status.running.store(false, Ordering::Release);
                    return Err(EngineError::Spawn(err));
                }
            };

            info!(
                "engine started: {} voices at {} Hz",
                voice_count, config.control_rate_hz
            );

            Ok(Self {
                tx,
                status,
                thread: Some(thread),
            })
        }

        fn send(&mut self, message: PoolMessage) -> Result<(), EngineError> {
            if !self.status.is_running() || self.tx.is_abandoned() {
                return Err(EngineError::Stopped);
            }
            self.tx.push(message).map_err(|_| {
                warn!("message queue full, dropping {:?}", message);
                EngineError::QueueFull
            })
        }

        pub fn allocate_voice(
            &mut self,
            frequency: f64,
            key: usize,
            touch_x: f64,
        ) -> Result<(), EngineError> {
            self.send(PoolMessage::KeyDown {
                key,
                frequency,
                touch_x,
            })
        }

        pub fn update_touch(&mut self, key: usize, touch_x: f64) -> Result<(), EngineError> {
            self.send(PoolMessage::TouchMoved { key, touch_x })
        }

        pub fn release_voice(&mut self, key: usize) -> Result<(), EngineError> {
            self.send(PoolMessage::KeyUp { key })
        }

        pub fn stop_all(&mut self) -> Result<(), EngineError> {
            self.send(PoolMessage::StopAll)
        }

        pub fn set_tempo(&mut self, bpm: f64) -> Result<(), EngineError> {
            self.send(PoolMessage::SetTempo { bpm })
        }

        pub fn set_global_lfo(&mut self, params: GlobalLfoParameters) -> Result<(), EngineError> {
            self.send(PoolMessage::SetGlobalLfo(params))
        }

        pub fn set_modulation(
            &mut self,
            params: VoiceModulationParameters,
        ) -> Result<(), EngineError> {
            self.send(PoolMessage::SetModulation(params))
        }

        pub fn apply_patch(&mut self, patch: VoicePatch) -> Result<(), EngineError> {
            self.send(PoolMessage::ApplyPatch(patch))
        }

        /// Counters as of the last control tick.
        pub fn status(&self) -> PoolStatus {
            self.status.snapshot()
        }

        pub fn shared_status(&self) -> Arc<SharedStatus> {
            Arc::clone(&self.status)
        }

        pub fn is_running(&self) -> bool {
            self.status.is_running()
        }

        /// Stop the control thread, silencing every voice, and wait for it.
        pub fn shutdown(mut self) {
            self.stop_thread();
        }

        fn stop_thread(&mut self) {
            self.status.running.store(false, Ordering::Release);
            if let Some(handle) = self.thread.take() {
                handle.thread().unpark();
                if handle.join().is_err() {
                    warn!("control thread panicked");
                }
                info!("engine stopped");
            }
        }
    }

    impl Drop for Engine {
        fn drop(&mut self) {
            self.stop_thread();
        }
    }

    fn run<R: MessageReceiver>(
        mut components: EngineComponents,
        mut rx: R,
        period: Duration,
        status: Arc<SharedStatus>,
    ) {
        debug!("control thread running, period {:?}", period);
        let mut last = Instant::now();

        while status.is_running() {
            while let Some(message) = rx.pop() {
                components.handle(message);
            }

            let now = Instant::now();
            let delta_time = now.duration_since(last).as_secs_f64();
            last = now;

            components.allocator.advance(delta_time);
            status.publish(&components.allocator.status());

            // Woken early by shutdown.
            thread::park_timeout(period.saturating_sub(now.elapsed()));
        }

        components.handle(PoolMessage::StopAll);
        status.publish(&components.allocator.status());
        debug!("control thread exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cases = [
            EngineConfig {
                voice_count: 0,
                ..Default::default()
            },
            EngineConfig {
                control_rate_hz: 0.0,
                ..Default::default()
            },
            EngineConfig {
                control_rate_hz: 1e-30,
                ..Default::default()
            },
            EngineConfig {
                tempo_bpm: f64::NAN,
                ..Default::default()
            },
            EngineConfig {
                message_capacity: 0,
                ..Default::default()
            },
            EngineConfig {
                filter_smoothing: 1.0,
                ..Default::default()
            },
        ];

        for config in cases {
            match config.validate() {
                Err(EngineError::InvalidConfig { reason }) => assert!(!reason.is_empty()),
                other => panic!("expected InvalidConfig for {:?}, got {:?}", config, other),
            }
        }
    }

    #[test]
    fn tick_period_follows_the_control_rate() {
        let period = EngineConfig::default().tick_period().map(|p| p.as_secs_f64());
        assert!(matches!(period, Ok(p) if (p - 0.005).abs() < 1e-12));

        let slow = EngineConfig {
            control_rate_hz: 1e-30,
            ..Default::default()
        };
        assert!(matches!(
            slow.tick_period(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn error_messages() {
        assert_eq!(EngineError::QueueFull.to_string(), "Message queue is full");
        assert_eq!(
            EngineError::invalid("voice_count must be at least 1").to_string(),
            "Invalid engine configuration: voice_count must be at least 1"
        );
    }
}
