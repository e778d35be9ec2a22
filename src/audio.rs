//! Sound output. Every sound is synthesized once at startup and kept as a
//! mono sample buffer; playback is fire-and-forget on the output stream.

use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::buttons::{ALL, Button};
use crate::game::Cue;

pub const SAMPLE_RATE: u32 = 44_100;

const TONE_SECONDS: f64 = 0.4;
const MUSIC_VOLUME: f32 = 0.05;

pub struct Audio {
    inner: Option<Output>,
}

struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    music: Sink,
    tones: [Vec<f32>; 4],
    failure: Vec<f32>,
    jingle: Vec<f32>,
}

impl Audio {
    /// Silent stub for `--mute`; every play request becomes a no-op.
    pub fn muted() -> Self {
        Audio { inner: None }
    }

    /// Open the default output device and pre-render every effect. The
    /// background loop is queued on a paused sink; it starts on `Cue::Music`
    /// once the startup hold is over.
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().context("no audio output device")?;

        let music = Sink::try_new(&handle).context("creating background music sink")?;
        music.set_volume(MUSIC_VOLUME);
        music.pause();
        music.append(
            SamplesBuffer::new(1, SAMPLE_RATE, synth::music_loop()).repeat_infinite(),
        );

        let tones = ALL.map(|b| synth::tone(b.tone_hz(), TONE_SECONDS));

        Ok(Audio {
            inner: Some(Output {
                _stream: stream,
                handle,
                music,
                tones,
                failure: synth::failure(),
                jingle: synth::jingle(),
            }),
        })
    }

    /// Intro jingle, played once at launch.
    pub fn play_startup(&self) {
        if let Some(out) = &self.inner {
            out.one_shot(&out.jingle);
        }
    }

    pub fn play(&self, cue: Cue) {
        let Some(out) = &self.inner else { return };
        match cue {
            Cue::Tone(b) => out.one_shot(&out.tones[tone_slot(b)]),
            Cue::Failure => out.one_shot(&out.failure),
            Cue::Music => out.music.play(),
        }
    }
}

fn tone_slot(b: Button) -> usize {
    match b {
        Button::Yellow => 0,
        Button::Blue => 1,
        Button::Red => 2,
        Button::Green => 3,
    }
}

impl Output {
    fn one_shot(&self, samples: &[f32]) {
        let source = SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec());
        if let Err(err) = self.handle.play_raw(source) {
            tracing::warn!(%err, "sound dropped");
        }
    }
}

mod synth {
    use fundsp::hacker::*;

    const SAMPLE_RATE: f64 = super::SAMPLE_RATE as f64;

    fn render(seconds: f64, unit: &mut impl AudioUnit64) -> Vec<f32> {
        let wave = Wave64::render(SAMPLE_RATE, seconds, unit);
        wave.channel(0).iter().map(|s| *s as f32).collect()
    }

    /// Sine ping with a fast attack and a release that reaches zero exactly
    /// at the end of the buffer.
    pub fn tone(hz: f64, seconds: f64) -> Vec<f32> {
        let mut unit = sine_hz(hz)
            * envelope(move |t| {
                let attack = (t * 80.0).min(1.0);
                let release = (1.0 - t / seconds).max(0.0);
                attack * release * (-5.0 * t).exp() * 0.35
            });
        render(seconds, &mut unit)
    }

    /// Falling saw sweep for a miss.
    pub fn failure() -> Vec<f32> {
        let mut unit = (lfo(|t: f64| 360.0 - 290.0 * (t / 0.5).min(1.0)) >> saw())
            * envelope(|t| (1.0 - t / 0.6).max(0.0) * 0.25);
        render(0.7, &mut unit)
    }

    /// Short ascending arpeggio played over the startup hold.
    pub fn jingle() -> Vec<f32> {
        let mut out = Vec::new();
        for hz in [262.0, 330.0, 392.0] {
            out.extend(tone(hz, 0.16));
        }
        out.extend(tone(523.0, 0.5));
        out
    }

    /// Quiet pad for the background loop. Every component frequency and the
    /// tremolo are an integer number of cycles over the loop, so repeating
    /// the buffer is click-free.
    pub fn music_loop() -> Vec<f32> {
        let mut unit = (sine_hz(110.0) + sine_hz(165.0) + sine_hz(220.0))
            * envelope(|t| 0.18 + 0.06 * (std::f64::consts::TAU * 0.25 * t).sin());
        render(8.0, &mut unit)
    }
}
