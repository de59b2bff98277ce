//! Timeline-anchored audio clips and the stereo mix-down.
//!
//! Audio shares the clips' start/duration lifecycle but is composited into a
//! single interleaved buffer rather than a pixel canvas, independent of the
//! per-frame video loop.

use std::{path::Path, sync::Arc};

use crate::{
    assets::{AssetLibrary, AudioPcm},
    error::{ReelError, ReelResult},
};

/// All sources are resampled to this rate before mixing.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
pub const MIX_CHANNELS: u16 = 2;

/// A trimmed slice of an audio source placed on the scene timeline.
///
/// `duration = source_end − source_start`; `source_end` defaults to the
/// source's full duration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AudioClip {
    pub source: String,
    pub start_sec: f64,
    #[serde(default)]
    pub source_start_sec: f64,
    #[serde(default)]
    pub source_end_sec: Option<f64>,
}

impl AudioClip {
    pub fn new(source: impl Into<String>, start_sec: f64) -> Self {
        Self {
            source: source.into(),
            start_sec,
            source_start_sec: 0.0,
            source_end_sec: None,
        }
    }

    /// Restrict playback to `[source_start_sec, source_end_sec)` of the
    /// source.
    pub fn trimmed(mut self, source_start_sec: f64, source_end_sec: f64) -> Self {
        self.source_start_sec = source_start_sec;
        self.source_end_sec = Some(source_end_sec);
        self
    }

    pub fn duration_sec(&self, assets: &mut AssetLibrary) -> ReelResult<f64> {
        let end = match self.source_end_sec {
            Some(end) => end,
            None => assets.audio_duration_sec(&self.source)?,
        };
        Ok((end - self.source_start_sec).max(0.0))
    }

    pub fn end_sec(&self, assets: &mut AssetLibrary) -> ReelResult<f64> {
        Ok(self.start_sec + self.duration_sec(assets)?)
    }

    pub(crate) fn with_shifted_start(&self, offset_sec: f64) -> Self {
        let mut shifted = self.clone();
        shifted.start_sec += offset_sec;
        shifted
    }

    /// Resolve against decoded PCM into a mixable segment. The source range is
    /// clamped to the decoded length.
    pub fn resolve(&self, assets: &mut AssetLibrary) -> ReelResult<AudioSegment> {
        let pcm = assets.audio_pcm(&self.source)?;
        let src_frames = pcm.frames();

        let end_sec = match self.source_end_sec {
            Some(end) => end,
            None => frames_to_sec(src_frames, pcm.sample_rate),
        };
        let source_start_sample = sec_to_sample(self.source_start_sec, pcm.sample_rate).min(src_frames);
        let source_end_sample = sec_to_sample(end_sec, pcm.sample_rate).min(src_frames);
        if source_end_sample < source_start_sample {
            return Err(ReelError::validation(format!(
                "audio clip '{}' has source_end before source_start",
                self.source
            )));
        }

        Ok(AudioSegment {
            timeline_start_sample: sec_to_sample(self.start_sec, MIX_SAMPLE_RATE),
            source_start_sample,
            source_end_sample,
            pcm,
        })
    }
}

/// A resolved clip: decoded PCM plus sample-exact placement and trim.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    pub timeline_start_sample: u64,
    pub source_start_sample: u64,
    pub source_end_sample: u64,
    pub pcm: Arc<AudioPcm>,
}

impl AudioSegment {
    pub fn len_frames(&self) -> u64 {
        self.source_end_sample
            .saturating_sub(self.source_start_sample)
    }
}

pub fn sec_to_sample(sec: f64, sample_rate: u32) -> u64 {
    if !sec.is_finite() || sec <= 0.0 {
        0
    } else {
        (sec * f64::from(sample_rate)).round() as u64
    }
}

pub fn frames_to_sec(frames: u64, sample_rate: u32) -> f64 {
    frames as f64 / f64::from(sample_rate)
}

/// Sum all segments into one interleaved stereo buffer of `total_frames`
/// sample frames, clamped to [-1, 1]. Mono sources are duplicated to both
/// channels; anything past the buffer end is dropped.
pub fn mix_segments(segments: &[AudioSegment], total_frames: u64) -> Vec<f32> {
    let mut out = vec![0.0f32; total_frames as usize * usize::from(MIX_CHANNELS)];

    for seg in segments {
        let channels = usize::from(seg.pcm.channels.max(1));
        let src = &seg.pcm.interleaved_f32;
        let src_frames = (src.len() / channels) as u64;
        let start = seg.source_start_sample.min(src_frames);
        let end = seg.source_end_sample.min(src_frames);

        for (i, src_frame) in (start..end).enumerate() {
            let dst_frame = seg.timeline_start_sample + i as u64;
            if dst_frame >= total_frames {
                break;
            }
            let src_idx = src_frame as usize * channels;
            let (l, r) = if channels == 1 {
                let v = src[src_idx];
                (v, v)
            } else {
                (src[src_idx], src[src_idx + 1])
            };

            let dst_idx = dst_frame as usize * usize::from(MIX_CHANNELS);
            out[dst_idx] += l;
            out[dst_idx + 1] += r;
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Write interleaved samples as raw little-endian f32, the format handed to
/// the encoder as its audio input.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ReelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReelError::render(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        ReelError::render(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_pcm(samples: Vec<f32>) -> Arc<AudioPcm> {
        Arc::new(AudioPcm {
            sample_rate: MIX_SAMPLE_RATE,
            channels: 1,
            interleaved_f32: samples,
        })
    }

    #[test]
    fn sec_to_sample_rounds_to_nearest() {
        assert_eq!(sec_to_sample(0.0, 48_000), 0);
        assert_eq!(sec_to_sample(1.0, 48_000), 48_000);
        assert_eq!(sec_to_sample(0.5000001, 48_000), 24_000);
        assert_eq!(sec_to_sample(-3.0, 48_000), 0);
    }

    #[test]
    fn mix_places_segment_at_timeline_start() {
        let seg = AudioSegment {
            timeline_start_sample: 2,
            source_start_sample: 0,
            source_end_sample: 2,
            pcm: mono_pcm(vec![0.5, -0.25]),
        };
        let out = mix_segments(&[seg], 5);
        assert_eq!(out.len(), 10);
        assert_eq!(&out[..4], &[0.0, 0.0, 0.0, 0.0]);
        // Mono is duplicated to both channels.
        assert_eq!(&out[4..8], &[0.5, 0.5, -0.25, -0.25]);
        assert_eq!(&out[8..], &[0.0, 0.0]);
    }

    #[test]
    fn mix_applies_source_trim() {
        let seg = AudioSegment {
            timeline_start_sample: 0,
            source_start_sample: 1,
            source_end_sample: 3,
            pcm: mono_pcm(vec![0.1, 0.2, 0.3, 0.4]),
        };
        let out = mix_segments(&[seg], 2);
        assert_eq!(out, vec![0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn mix_sums_overlaps_and_clamps() {
        let a = AudioSegment {
            timeline_start_sample: 0,
            source_start_sample: 0,
            source_end_sample: 1,
            pcm: mono_pcm(vec![0.8]),
        };
        let out = mix_segments(&[a.clone(), a], 1);
        assert_eq!(out, vec![1.0, 1.0]);
    }

    #[test]
    fn mix_drops_samples_past_buffer_end() {
        let seg = AudioSegment {
            timeline_start_sample: 1,
            source_start_sample: 0,
            source_end_sample: 4,
            pcm: mono_pcm(vec![0.1, 0.2, 0.3, 0.4]),
        };
        let out = mix_segments(&[seg], 2);
        assert_eq!(out, vec![0.0, 0.0, 0.1, 0.1]);
    }

    #[test]
    fn shifted_copy_moves_only_timeline_start() {
        let clip = AudioClip::new("a.wav", 1.0).trimmed(0.5, 2.0);
        let shifted = clip.with_shifted_start(2.0);
        assert_eq!(shifted.start_sec, 3.0);
        assert_eq!(shifted.source_start_sec, 0.5);
        assert_eq!(clip.start_sec, 1.0);
    }
}
