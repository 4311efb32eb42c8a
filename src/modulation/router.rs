//! Fixed-destination modulation formulas.

/*
Modulation Routing
==================

Every destination has a fixed set of sources. A source contributes
`value * amount`: values come from envelopes and initial touch (unipolar,
0..1) or from LFOs and aftertouch (bipolar, -1..1); amounts are signed.

Each formula combines its sources in the space that sounds right for the
destination, then clamps to the destination's legal range:

  Destination             Space         Sources                       Range
  ----------------------  ------------  ----------------------------  -------------
  oscillator pitch        semitones     aux env, voice LFO*           20..20000 Hz
  oscillator amplitude    linear        initial touch (x), global LFO 0..1
  modulation index        linear        mod env, voice LFO*, after.   0..10
  modulator multiplier    linear        global LFO                    0.1..20
  filter cutoff           octaves       (aux env + after.) x keytrk,  20..22050 Hz
                                        voice LFO*, global LFO
  delay time              linear        global LFO                    0..2 s
  vibrato depth (meta)    hybrid        aux env (x), aftertouch       -10..10
  voice LFO rate (meta)   octaves       key tracking                  0.01..20 Hz

  * voice LFO contributions are scaled by the delay ramp (0..1)

Initial touch also scales three amounts before they are used:

    scaled = amount * (1 + touch * touch_amount)

That applies to the modulator envelope amount and to the aux envelope's
pitch and cutoff amounts.
*/

pub use super::envelope::envelope_value;

pub const PITCH_RANGE: (f64, f64) = (20.0, 20_000.0);
pub const AMPLITUDE_RANGE: (f64, f64) = (0.0, 1.0);
pub const MODULATION_INDEX_RANGE: (f64, f64) = (0.0, 10.0);
pub const MODULATOR_MULTIPLIER_RANGE: (f64, f64) = (0.1, 20.0);
pub const FILTER_FREQUENCY_RANGE: (f64, f64) = (20.0, 22_050.0);
pub const DELAY_TIME_RANGE: (f64, f64) = (0.0, 2.0);
pub const VIBRATO_DEPTH_RANGE: (f64, f64) = (-10.0, 10.0);
pub const VOICE_LFO_FREQUENCY_RANGE: (f64, f64) = (0.01, 20.0);

/// Below this magnitude a vibrato depth counts as absent, and positive
/// aftertouch adds depth directly instead of scaling it.
pub const VIBRATO_CREATION_THRESHOLD: f64 = 0.01;

/// One modulation source feeding a destination.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Source {
    pub value: f64,
    pub amount: f64,
}

impl Source {
    pub const NONE: Source = Source {
        value: 0.0,
        amount: 0.0,
    };

    #[inline]
    pub fn new(value: f64, amount: f64) -> Self {
        Self { value, amount }
    }

    #[inline]
    pub fn offset(self) -> f64 {
        self.value * self.amount
    }

    /// Offset of a voice LFO source faded in by the delay ramp.
    #[inline]
    fn ramped(self, ramp: f64) -> f64 {
        self.value * ramp * self.amount
    }
}

#[inline]
fn clamp(value: f64, (min, max): (f64, f64)) -> f64 {
    value.max(min).min(max)
}

/// Oscillator frequency: aux envelope and voice LFO, in semitones.
pub fn oscillator_pitch(base_frequency: f64, aux_env: Source, voice_lfo: Source, ramp: f64) -> f64 {
    let semitones = aux_env.offset() + voice_lfo.ramped(ramp);
    clamp(base_frequency * 2.0_f64.powf(semitones / 12.0), PITCH_RANGE)
}

/// Oscillator level: initial touch scales the base, global LFO adds tremolo.
pub fn oscillator_amplitude(base_amplitude: f64, initial_touch: Source, global_lfo: Source) -> f64 {
    clamp(
        base_amplitude * initial_touch.offset() + global_lfo.offset(),
        AMPLITUDE_RANGE,
    )
}

pub fn modulation_index(
    base_index: f64,
    mod_env: Source,
    voice_lfo: Source,
    ramp: f64,
    aftertouch: Source,
) -> f64 {
    clamp(
        base_index + mod_env.offset() + aftertouch.offset() + voice_lfo.ramped(ramp),
        MODULATION_INDEX_RANGE,
    )
}

pub fn modulator_multiplier(base_multiplier: f64, global_lfo: Source) -> f64 {
    clamp(
        base_multiplier + global_lfo.offset(),
        MODULATOR_MULTIPLIER_RANGE,
    )
}

/// Filter cutoff in octave space.
///
/// Aux envelope and aftertouch offsets are scaled by key tracking
/// (`1 + track * amount`) before the LFO offsets are added.
pub fn filter_frequency(
    base_cutoff: f64,
    key_track: Source,
    aux_env: Source,
    aftertouch: Source,
    voice_lfo: Source,
    ramp: f64,
    global_lfo: Source,
) -> f64 {
    let key_track_factor = 1.0 + key_track.offset();
    let scaled = (aux_env.offset() + aftertouch.offset()) * key_track_factor;
    let octaves = scaled + voice_lfo.ramped(ramp) + global_lfo.offset();

    clamp(base_cutoff * 2.0_f64.powf(octaves), FILTER_FREQUENCY_RANGE)
}

pub fn delay_time(base_time: f64, global_lfo: Source) -> f64 {
    clamp(base_time + global_lfo.offset(), DELAY_TIME_RANGE)
}

/// Effective voice LFO to pitch amount (vibrato depth).
///
/// The aux envelope scales the depth by `1 + env * amount`. Aftertouch
/// scales it by `max(0, 1 + delta * amount)`, so moving away from the key
/// center can silence vibrato but never invert it. When the base depth is
/// below [`VIBRATO_CREATION_THRESHOLD`] and delta is positive, the aftertouch
/// offset is also added, creating vibrato from nothing.
pub fn voice_lfo_pitch_amount(base_amount: f64, aux_env: Source, aftertouch: Source) -> f64 {
    let aux_factor = 1.0 + aux_env.offset();
    let aftertouch_factor = (1.0 + aftertouch.offset()).max(0.0);
    let additive = if aftertouch.value > 0.0 && base_amount.abs() < VIBRATO_CREATION_THRESHOLD {
        aftertouch.offset()
    } else {
        0.0
    };

    clamp(
        base_amount * aux_factor * aftertouch_factor + additive,
        VIBRATO_DEPTH_RANGE,
    )
}

/// Voice LFO rate with key tracking: one octave of tracking doubles the rate.
pub fn voice_lfo_frequency(base_frequency: f64, key_track: Source) -> f64 {
    clamp(
        base_frequency * 2.0_f64.powf(key_track.offset()),
        VOICE_LFO_FREQUENCY_RANGE,
    )
}

/// Amount scaled by initial touch. Not clamped.
#[inline]
pub fn touch_scaled_amount(base_amount: f64, initial_touch: Source) -> f64 {
    base_amount * (1.0 + initial_touch.offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pitch_adds_in_semitone_space() {
        let up_octave = oscillator_pitch(220.0, Source::new(1.0, 12.0), Source::NONE, 1.0);
        assert!(close(up_octave, 440.0), "expected 440, got {}", up_octave);

        // Ramp of 0 mutes the LFO entirely.
        let muted = oscillator_pitch(220.0, Source::NONE, Source::new(1.0, 12.0), 0.0);
        assert!(close(muted, 220.0));

        let half_ramp = oscillator_pitch(220.0, Source::NONE, Source::new(-1.0, 24.0), 0.5);
        assert!(close(half_ramp, 110.0), "expected 110, got {}", half_ramp);
    }

    #[test]
    fn pitch_clamps_to_audible_range() {
        assert_eq!(
            oscillator_pitch(15_000.0, Source::new(1.0, 24.0), Source::NONE, 1.0),
            20_000.0
        );
        assert_eq!(
            oscillator_pitch(30.0, Source::new(1.0, -24.0), Source::NONE, 1.0),
            20.0
        );
    }

    #[test]
    fn amplitude_scales_by_touch_then_adds_tremolo() {
        let amp = oscillator_amplitude(0.8, Source::new(0.5, 1.0), Source::new(0.5, 0.2));
        assert!(close(amp, 0.5), "expected 0.5, got {}", amp);
        assert_eq!(
            oscillator_amplitude(1.0, Source::new(1.0, 1.0), Source::new(1.0, 1.0)),
            1.0
        );
        assert_eq!(
            oscillator_amplitude(0.1, Source::new(1.0, 1.0), Source::new(-1.0, 1.0)),
            0.0
        );
    }

    #[test]
    fn modulation_index_sums_every_source() {
        let index = modulation_index(
            1.0,
            Source::new(0.5, 2.0),
            Source::new(-1.0, 1.0),
            0.5,
            Source::new(0.25, 4.0),
        );
        assert!(close(index, 2.5), "expected 2.5, got {}", index);
        assert_eq!(
            modulation_index(9.0, Source::new(1.0, 5.0), Source::NONE, 1.0, Source::NONE),
            10.0
        );
        assert_eq!(
            modulation_index(0.5, Source::new(1.0, -5.0), Source::NONE, 1.0, Source::NONE),
            0.0
        );
    }

    #[test]
    fn multiplier_and_delay_clamp() {
        assert!(close(modulator_multiplier(2.0, Source::new(0.5, 1.0)), 2.5));
        assert_eq!(modulator_multiplier(0.2, Source::new(-1.0, 1.0)), 0.1);
        assert_eq!(modulator_multiplier(19.0, Source::new(1.0, 5.0)), 20.0);

        assert!(close(delay_time(0.5, Source::new(-0.5, 0.4)), 0.3));
        assert_eq!(delay_time(0.1, Source::new(-1.0, 1.0)), 0.0);
        assert_eq!(delay_time(1.9, Source::new(1.0, 1.0)), 2.0);
    }

    #[test]
    fn key_tracking_scales_envelope_and_aftertouch_but_not_lfos() {
        // (1 + 1) octaves of envelope, doubled by key tracking = 2 octaves.
        let tracked = filter_frequency(
            1000.0,
            Source::new(1.0, 1.0),
            Source::new(1.0, 1.0),
            Source::NONE,
            Source::NONE,
            1.0,
            Source::NONE,
        );
        assert!(close(tracked, 4000.0), "expected 4000, got {}", tracked);

        // The same key tracking leaves the LFO octave untouched.
        let lfo_only = filter_frequency(
            1000.0,
            Source::new(1.0, 1.0),
            Source::NONE,
            Source::NONE,
            Source::new(1.0, 1.0),
            1.0,
            Source::NONE,
        );
        assert!(close(lfo_only, 2000.0), "expected 2000, got {}", lfo_only);

        let with_global = filter_frequency(
            1000.0,
            Source::NONE,
            Source::NONE,
            Source::new(-0.5, 2.0),
            Source::NONE,
            1.0,
            Source::new(1.0, -1.0),
        );
        assert!(close(with_global, 250.0), "expected 250, got {}", with_global);
    }

    #[test]
    fn filter_clamps() {
        let high = filter_frequency(
            20_000.0,
            Source::NONE,
            Source::new(1.0, 3.0),
            Source::NONE,
            Source::NONE,
            1.0,
            Source::NONE,
        );
        assert_eq!(high, 22_050.0);

        let low = filter_frequency(
            40.0,
            Source::NONE,
            Source::NONE,
            Source::NONE,
            Source::NONE,
            1.0,
            Source::new(-1.0, 4.0),
        );
        assert_eq!(low, 20.0);
    }

    #[test]
    fn aux_envelope_scales_vibrato_depth() {
        let depth = voice_lfo_pitch_amount(0.5, Source::new(1.0, 1.0), Source::NONE);
        assert!(close(depth, 1.0));
    }

    #[test]
    fn aftertouch_attenuates_existing_vibrato_without_inverting() {
        let base = 2.0;
        let toward_edge = voice_lfo_pitch_amount(base, Source::NONE, Source::new(-1.0, 3.0));
        assert_eq!(toward_edge, 0.0);

        let halfway = voice_lfo_pitch_amount(base, Source::NONE, Source::new(-0.5, 1.0));
        assert!(close(halfway, 1.0));

        let toward_center = voice_lfo_pitch_amount(base, Source::NONE, Source::new(1.0, 1.0));
        assert!(close(toward_center, 4.0), "no additive term above threshold");
    }

    #[test]
    fn aftertouch_creates_vibrato_from_zero_only_toward_center() {
        let created = voice_lfo_pitch_amount(0.0, Source::NONE, Source::new(0.5, 2.0));
        assert!(close(created, 1.0));

        let away = voice_lfo_pitch_amount(0.0, Source::NONE, Source::new(-0.5, 2.0));
        assert_eq!(away, 0.0);
    }

    #[test]
    fn vibrato_threshold_boundary() {
        let aftertouch = Source::new(1.0, 1.0);

        // Just under the threshold: multiplicative plus additive.
        let under = voice_lfo_pitch_amount(0.009, Source::NONE, aftertouch);
        assert!(close(under, 0.009 * 2.0 + 1.0), "got {}", under);

        // At the threshold: multiplicative only, so depth jumps down.
        let at = voice_lfo_pitch_amount(0.01, Source::NONE, aftertouch);
        assert!(close(at, 0.02), "got {}", at);

        // Small negative bases count as absent too.
        let negative = voice_lfo_pitch_amount(-0.005, Source::NONE, aftertouch);
        assert!(close(negative, -0.01 + 1.0), "got {}", negative);
    }

    #[test]
    fn vibrato_depth_clamps() {
        assert_eq!(
            voice_lfo_pitch_amount(8.0, Source::new(1.0, 1.0), Source::NONE),
            10.0
        );
        assert_eq!(
            voice_lfo_pitch_amount(-8.0, Source::new(1.0, 1.0), Source::NONE),
            -10.0
        );
    }

    #[test]
    fn voice_lfo_rate_follows_key_tracking() {
        assert!(close(voice_lfo_frequency(4.0, Source::new(1.0, 1.0)), 8.0));
        assert!(close(voice_lfo_frequency(4.0, Source::new(-1.0, 1.0)), 2.0));
        assert_eq!(voice_lfo_frequency(15.0, Source::new(2.0, 1.0)), 20.0);
        assert_eq!(voice_lfo_frequency(0.02, Source::new(-4.0, 1.0)), 0.01);
    }

    #[test]
    fn touch_scaling() {
        assert_eq!(touch_scaled_amount(2.0, Source::NONE), 2.0);
        assert!(close(touch_scaled_amount(2.0, Source::new(0.5, 1.0)), 3.0));
        assert!(close(touch_scaled_amount(2.0, Source::new(1.0, -1.0)), 0.0));
    }
}
