//! Frame-stepping render driver.
//!
//! Flattens the scene tree once, then walks frame times in strictly
//! increasing order, compositing every visible clip in stored (layer) order
//! onto a fresh canvas and handing each finished frame to the sink. Purely
//! sequential: frame N+1 is never started before frame N has been submitted,
//! matching the input order sequential encoders require.

use std::path::PathBuf;

use crate::{
    assets::AssetLibrary,
    audio::{self, MIX_CHANNELS, MIX_SAMPLE_RATE},
    composite,
    encode_ffmpeg::{AudioInputConfig, EncodeConfig, FfmpegEncoder},
    error::{ReelError, ReelResult},
    scene::Scene,
};

/// One composited output frame, tightly packed row-major RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRgba {
    /// Canvas filled with a premultiplied background color.
    pub fn filled(width: u32, height: u32, premul_rgba: [u8; 4]) -> Self {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&premul_rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }
}

/// Destination for finished frames. Frames arrive in strictly increasing
/// time order; `finish` flushes and closes the container.
pub trait FrameSink {
    fn submit_frame(&mut self, frame: &FrameRgba) -> ReelResult<()>;
    fn finish(&mut self) -> ReelResult<()>;
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Straight-alpha background the canvas is cleared to each frame, and the
    /// color frames are flattened over at encode time.
    pub background_rgba8: [u8; 4],
}

impl RenderConfig {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            background_rgba8: [0, 0, 0, 255],
        }
    }

    pub fn background(mut self, rgba8: [u8; 4]) -> Self {
        self.background_rgba8 = rgba8;
        self
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation(
                "render width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(ReelError::validation("render fps must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
}

/// Drive the full frame loop against an arbitrary sink.
///
/// `total_frames = floor(total_duration * fps)`; frame `i` samples the scene
/// at `t = i / fps`.
#[tracing::instrument(skip_all, fields(fps = cfg.fps, width = cfg.width, height = cfg.height))]
pub fn render_scene(
    scene: &Scene,
    cfg: &RenderConfig,
    sink: &mut dyn FrameSink,
    assets: &mut AssetLibrary,
) -> ReelResult<RenderStats> {
    cfg.validate()?;

    let clips = scene.flatten();
    for clip in &clips {
        clip.validate()?;
    }

    let total_duration = scene.total_duration(assets)?;
    let total_frames = (total_duration * f64::from(cfg.fps)).floor() as u64;
    tracing::debug!(total_frames, total_duration, clips = clips.len(), "starting frame loop");

    let bg = composite::premul_rgba8(cfg.background_rgba8);
    for i in 0..total_frames {
        let t = i as f64 / f64::from(cfg.fps);
        let mut frame = FrameRgba::filled(cfg.width, cfg.height, bg);
        for clip in &clips {
            if clip.is_visible(t) {
                clip.render(&mut frame, t, assets)?;
            }
        }
        sink.submit_frame(&frame)?;
    }
    sink.finish()?;

    Ok(RenderStats {
        frames_total: total_frames,
    })
}

/// Composite a single frame at time `t` without driving a sink.
pub fn render_frame_at(
    scene: &Scene,
    cfg: &RenderConfig,
    t: f64,
    assets: &mut AssetLibrary,
) -> ReelResult<FrameRgba> {
    cfg.validate()?;

    let clips = scene.flatten();
    let mut frame = FrameRgba::filled(
        cfg.width,
        cfg.height,
        composite::premul_rgba8(cfg.background_rgba8),
    );
    for clip in &clips {
        clip.validate()?;
        if clip.is_visible(t) {
            clip.render(&mut frame, t, assets)?;
        }
    }
    Ok(frame)
}

/// Render a scene to an MP4 via the system `ffmpeg` binary.
///
/// Audio clips, if any, are decoded, trimmed, and mixed into one
/// timeline-length stereo buffer up front; the buffer is written to a
/// temporary f32le file that ffmpeg muxes alongside the piped video frames.
#[tracing::instrument(skip_all)]
pub fn render_to_mp4(
    scene: &Scene,
    cfg: &RenderConfig,
    out_path: impl Into<PathBuf>,
    assets: &mut AssetLibrary,
) -> ReelResult<RenderStats> {
    cfg.validate()?;
    let out_path = out_path.into();

    let total_duration = scene.total_duration(assets)?;
    let audio_clips = scene.flatten_audio();

    let mut audio_tmp = TempFileGuard(None);
    let audio_cfg = if audio_clips.is_empty() {
        None
    } else {
        let segments = audio_clips
            .iter()
            .map(|clip| clip.resolve(assets))
            .collect::<ReelResult<Vec<_>>>()?;
        let total_samples = audio::sec_to_sample(total_duration, MIX_SAMPLE_RATE);
        let mixed = audio::mix_segments(&segments, total_samples);

        let path = std::env::temp_dir().join(format!(
            "reelkit_audio_mix_{}_{}.f32le",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        audio::write_mix_to_f32le_file(&mixed, &path)?;
        audio_tmp.0 = Some(path.clone());
        Some(AudioInputConfig {
            path,
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
        })
    };

    let enc_cfg = EncodeConfig {
        width: cfg.width,
        height: cfg.height,
        fps: cfg.fps,
        out_path,
        overwrite: true,
        audio: audio_cfg,
    };
    let mut encoder = FfmpegEncoder::new(enc_cfg, cfg.background_rgba8)?;
    let stats = render_scene(scene, cfg, &mut encoder, assets)?;
    drop(audio_tmp);
    Ok(stats)
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_canvas_repeats_background_pixel() {
        let frame = FrameRgba::filled(2, 2, [10, 20, 30, 255]);
        assert_eq!(frame.data.len(), 16);
        assert!(frame.premultiplied);
        for px in frame.data.chunks_exact(4) {
            assert_eq!(px, [10, 20, 30, 255]);
        }
    }

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(RenderConfig::new(0, 10, 30).validate().is_err());
        assert!(RenderConfig::new(10, 0, 30).validate().is_err());
        assert!(RenderConfig::new(10, 10, 0).validate().is_err());
        assert!(RenderConfig::new(10, 10, 30).validate().is_ok());
    }
}
