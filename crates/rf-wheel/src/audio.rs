//! Procedural spin audio
//!
//! Clicks and the win chime are synthesized into small mono clips and handed
//! to an [`AudioOutput`]. Audio never fails a spin: a missing output, the mute
//! flag, or an output error all end in silence.

use std::f64::consts::TAU;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rf_core::{RfError, RfResult, SampleRate};
use serde::{Deserialize, Serialize};

use crate::config::{TickConfig, WheelConfig};
use crate::scheduler::{TickEvent, TickSink};

/// Click: pitch and gain ramp length (ms)
const CLICK_RAMP_MS: f64 = 80.0;
/// Click: total clip length (ms)
const CLICK_LENGTH_MS: f64 = 100.0;
/// Click: gain at the end of the ramp
const CLICK_FLOOR_GAIN: f64 = 0.01;

/// Win chime: C major arpeggio (Hz)
const CHIME_NOTES: [f64; 4] = [523.25, 659.25, 783.99, 1046.50];
const CHIME_NOTE_SPACING_MS: f64 = 80.0;
const CHIME_NOTE_LENGTH_MS: f64 = 800.0;
const CHIME_ATTACK_MS: f64 = 50.0;
const CHIME_PEAK_GAIN: f64 = 0.2;
const CHIME_FLOOR_GAIN: f64 = 0.001;

// ═══════════════════════════════════════════════════════════════════════════
// MUTE FLAG
// ═══════════════════════════════════════════════════════════════════════════

/// Shared mute toggle. Read on every click, never cached.
#[derive(Debug, Clone, Default)]
pub struct MuteFlag(Arc<AtomicBool>);

impl MuteFlag {
    pub fn new(muted: bool) -> Self {
        Self(Arc::new(AtomicBool::new(muted)))
    }

    pub fn is_muted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, muted: bool) {
        self.0.store(muted, Ordering::Relaxed);
    }

    /// Flip the flag, returning the new state
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::Relaxed)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CLIPS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipKind {
    Click,
    WinChime,
}

/// A rendered mono clip placed on the spin timeline
#[derive(Debug, Clone)]
pub struct ToneClip {
    pub kind: ClipKind,
    /// Timeline position (ms from spin start)
    pub start_ms: f64,
    pub sample_rate: SampleRate,
    pub samples: Vec<f32>,
}

impl ToneClip {
    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 * 1000.0 / self.sample_rate.as_f64()
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }
}

/// Value of an exponential ramp from `from` to `to` at `t` of `length`
#[inline]
fn exp_ramp(from: f64, to: f64, t: f64, length: f64) -> f64 {
    let from = from.max(1e-6);
    let to = to.max(1e-6);
    if t >= length {
        return to;
    }
    from * (to / from).powf(t / length)
}

/// Triangle wave at `phase` (cycles), range [-1, 1]
#[inline]
fn triangle(phase: f64) -> f64 {
    let frac = phase.fract();
    4.0 * (frac - 0.5).abs() - 1.0
}

/// Short percussive click: triangle oscillator with exponential pitch and
/// gain ramps.
pub fn synthesize_click(
    pitch_hz: f64,
    pitch_end_hz: f64,
    gain: f64,
    sample_rate: SampleRate,
) -> ToneClip {
    let sr = sample_rate.as_f64();
    let len = sample_rate.samples_for_ms(CLICK_LENGTH_MS);
    let ramp_s = CLICK_RAMP_MS / 1000.0;
    let mut samples = Vec::with_capacity(len);
    let mut phase = 0.0;

    for i in 0..len {
        let t = i as f64 / sr;
        let freq = exp_ramp(pitch_hz, pitch_end_hz, t, ramp_s);
        let amp = exp_ramp(gain, CLICK_FLOOR_GAIN, t, ramp_s);
        samples.push((triangle(phase) * amp) as f32);
        phase += freq / sr;
    }

    ToneClip {
        kind: ClipKind::Click,
        start_ms: 0.0,
        sample_rate,
        samples,
    }
}

/// Rising major arpeggio played when a winner is resolved
pub fn synthesize_win_chime(sample_rate: SampleRate) -> ToneClip {
    let sr = sample_rate.as_f64();
    let total_ms =
        CHIME_NOTE_SPACING_MS * (CHIME_NOTES.len() - 1) as f64 + CHIME_NOTE_LENGTH_MS;
    let mut samples = vec![0.0_f32; sample_rate.samples_for_ms(total_ms)];

    for (i, freq) in CHIME_NOTES.iter().enumerate() {
        let offset = sample_rate.samples_for_ms(CHIME_NOTE_SPACING_MS * i as f64);
        let note_len = sample_rate.samples_for_ms(CHIME_NOTE_LENGTH_MS);
        let attack_s = CHIME_ATTACK_MS / 1000.0;
        let decay_s = (CHIME_NOTE_LENGTH_MS - CHIME_ATTACK_MS) / 1000.0;

        for n in 0..note_len {
            let Some(slot) = samples.get_mut(offset + n) else {
                break;
            };
            let t = n as f64 / sr;
            let env = if t < attack_s {
                CHIME_PEAK_GAIN * t / attack_s
            } else {
                exp_ramp(CHIME_PEAK_GAIN, CHIME_FLOOR_GAIN, t - attack_s, decay_s)
            };
            *slot += ((TAU * freq * t).sin() * env) as f32;
        }
    }

    ToneClip {
        kind: ClipKind::WinChime,
        start_ms: 0.0,
        sample_rate,
        samples,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// OUTPUTS
// ═══════════════════════════════════════════════════════════════════════════

/// Destination for rendered clips
pub trait AudioOutput: Send + Sync {
    fn play(&self, clip: &ToneClip) -> RfResult<()>;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(&self, _clip: &ToneClip) -> RfResult<()> {
        Ok(())
    }
}

/// Keeps every clip so a spin can be inspected or bounced to WAV
#[derive(Debug)]
pub struct ClipRecorder {
    sample_rate: SampleRate,
    clips: Mutex<Vec<ToneClip>>,
}

impl ClipRecorder {
    pub fn new(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            clips: Mutex::new(Vec::new()),
        }
    }

    pub fn clips(&self) -> Vec<ToneClip> {
        self.clips.lock().clone()
    }

    pub fn count(&self, kind: ClipKind) -> usize {
        self.clips.lock().iter().filter(|c| c.kind == kind).count()
    }

    pub fn clear(&self) {
        self.clips.lock().clear();
    }

    /// Sum all clips at their timeline positions, clamped to [-1, 1]
    pub fn mixdown(&self) -> Vec<f32> {
        let clips = self.clips.lock();
        let end = clips
            .iter()
            .map(|c| self.sample_rate.samples_for_ms(c.start_ms) + c.samples.len())
            .max()
            .unwrap_or(0);

        let mut mix = vec![0.0_f32; end];
        for clip in clips.iter() {
            let offset = self.sample_rate.samples_for_ms(clip.start_ms);
            for (slot, sample) in mix[offset..].iter_mut().zip(&clip.samples) {
                *slot += *sample;
            }
        }
        for sample in &mut mix {
            *sample = sample.clamp(-1.0, 1.0);
        }
        mix
    }

    /// Write the mixdown as mono 32-bit float WAV
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> RfResult<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate.as_u32(),
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer =
            hound::WavWriter::create(path, spec).map_err(|e| RfError::Audio(e.to_string()))?;
        for sample in self.mixdown() {
            writer
                .write_sample(sample)
                .map_err(|e| RfError::Audio(e.to_string()))?;
        }
        writer.finalize().map_err(|e| RfError::Audio(e.to_string()))
    }
}

impl AudioOutput for ClipRecorder {
    fn play(&self, clip: &ToneClip) -> RfResult<()> {
        if clip.sample_rate != self.sample_rate {
            return Err(RfError::Audio(format!(
                "clip at {} Hz on a {} Hz recorder",
                clip.sample_rate.as_u32(),
                self.sample_rate.as_u32()
            )));
        }
        self.clips.lock().push(clip.clone());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SOUND BOARD
// ═══════════════════════════════════════════════════════════════════════════

/// Plays spin feedback through an optional output, gated by the mute flag
pub struct SoundBoard {
    mute: MuteFlag,
    output: Option<Arc<dyn AudioOutput>>,
    sample_rate: SampleRate,
    pitch_end_hz: f64,
    gain: f64,
}

impl SoundBoard {
    pub fn new(config: &WheelConfig, output: Option<Arc<dyn AudioOutput>>) -> Self {
        Self::with_mute(config, output, MuteFlag::new(config.audio.muted))
    }

    /// Share an existing mute flag (e.g. one bound to a UI toggle)
    pub fn with_mute(
        config: &WheelConfig,
        output: Option<Arc<dyn AudioOutput>>,
        mute: MuteFlag,
    ) -> Self {
        let TickConfig {
            pitch_end_hz, gain, ..
        } = config.ticks;
        if output.is_none() {
            log::info!("[SoundBoard] No audio output; spin feedback is silent");
        }
        Self {
            mute,
            output,
            sample_rate: config.audio.sample_rate,
            pitch_end_hz,
            gain,
        }
    }

    /// Board with no output at all
    pub fn silent(config: &WheelConfig) -> Self {
        Self::new(config, None)
    }

    pub fn mute_flag(&self) -> &MuteFlag {
        &self.mute
    }

    pub fn is_muted(&self) -> bool {
        self.mute.is_muted()
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&self) -> bool {
        self.mute.toggle()
    }

    /// Play one click at `at_ms` on the spin timeline
    pub fn play_click(&self, pitch_hz: f64, at_ms: f64) {
        if self.is_muted() {
            return;
        }
        let Some(output) = &self.output else {
            return;
        };
        let mut clip = synthesize_click(pitch_hz, self.pitch_end_hz, self.gain, self.sample_rate);
        clip.start_ms = at_ms;
        if let Err(e) = output.play(&clip) {
            log::warn!("[SoundBoard] Click dropped: {}", e);
        }
    }

    /// Play the win chime at `at_ms` on the spin timeline
    pub fn play_win(&self, at_ms: f64) {
        if self.is_muted() {
            return;
        }
        let Some(output) = &self.output else {
            return;
        };
        let mut clip = synthesize_win_chime(self.sample_rate);
        clip.start_ms = at_ms;
        if let Err(e) = output.play(&clip) {
            log::warn!("[SoundBoard] Win chime dropped: {}", e);
        }
    }
}

impl TickSink for SoundBoard {
    fn on_tick(&self, tick: &TickEvent) {
        self.play_click(tick.pitch_hz, tick.at_ms);
    }
}
