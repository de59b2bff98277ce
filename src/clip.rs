//! A timed, positioned, fadeable drawable placed on a scene timeline.

use crate::{
    assets::AssetLibrary,
    composite,
    content::ClipContent,
    core::{AnchorPoint, Point},
    error::{ReelError, ReelResult},
    render::FrameRgba,
};

/// Visibility window is the half-open interval `[start_sec, end_sec)`.
///
/// A clip never draws pixels itself; it gates *when* its content is visible,
/// *where* it lands (anchor-relative placement), and *how opaque* it is (base
/// opacity times the fade envelope), then composites the content's scratch
/// raster onto the frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    pub start_sec: f64,
    pub duration_sec: f64,
    pub position: Point,
    #[serde(default)]
    pub anchor: AnchorPoint,
    #[serde(default)]
    pub fade_in_sec: f64,
    #[serde(default)]
    pub fade_out_sec: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub content: ClipContent,
}

fn default_opacity() -> f64 {
    1.0
}

impl Clip {
    pub fn new(
        content: impl Into<ClipContent>,
        start_sec: f64,
        duration_sec: f64,
        position: Point,
    ) -> Self {
        Self {
            start_sec,
            duration_sec,
            position,
            anchor: AnchorPoint::default(),
            fade_in_sec: 0.0,
            fade_out_sec: 0.0,
            opacity: 1.0,
            content: content.into(),
        }
    }

    pub fn anchor(mut self, anchor: AnchorPoint) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn fade_in(mut self, sec: f64) -> Self {
        self.fade_in_sec = sec;
        self
    }

    pub fn fade_out(mut self, sec: f64) -> Self {
        self.fade_out_sec = sec;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn validate(&self) -> ReelResult<()> {
        if !self.start_sec.is_finite() || self.start_sec < 0.0 {
            return Err(ReelError::validation("clip start_sec must be >= 0"));
        }
        if !self.duration_sec.is_finite() || self.duration_sec <= 0.0 {
            return Err(ReelError::validation("clip duration_sec must be > 0"));
        }
        if self.fade_in_sec < 0.0 || self.fade_out_sec < 0.0 {
            return Err(ReelError::validation("clip fades must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ReelError::validation("clip opacity must be within 0..=1"));
        }
        Ok(())
    }

    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration_sec
    }

    pub fn is_visible(&self, t: f64) -> bool {
        self.start_sec <= t && t < self.end_sec()
    }

    /// Sampled opacity at `t`: 0 outside the visibility window, otherwise the
    /// base opacity scaled by the fade-in and fade-out ramps (each clamped to
    /// the clip duration). When the ramps overlap both apply, so the envelope
    /// dips below either ramp alone.
    pub fn opacity_at(&self, t: f64) -> f64 {
        if !self.is_visible(t) {
            return 0.0;
        }

        let mut opacity = self.opacity;

        let fade_in = self.fade_in_sec.min(self.duration_sec);
        if fade_in > 0.0 && t < self.start_sec + fade_in {
            opacity *= (t - self.start_sec) / fade_in;
        }

        let fade_out = self.fade_out_sec.min(self.duration_sec);
        if fade_out > 0.0 && t >= self.end_sec() - fade_out {
            opacity *= (self.end_sec() - t) / fade_out;
        }

        opacity.clamp(0.0, 1.0)
    }

    /// Copy of this clip moved `offset_sec` later on the timeline. Flattening
    /// builds shifted copies so the stored tree is never mutated.
    pub(crate) fn with_shifted_start(&self, offset_sec: f64) -> Self {
        let mut shifted = self.clone();
        shifted.start_sec += offset_sec;
        shifted
    }

    /// Composite this clip onto `frame` at time `t`.
    ///
    /// A no-op when the sampled opacity is zero. Otherwise the content hook
    /// draws into a transparent scratch surface the size of the frame, and the
    /// scratch is alpha-over-composited with the clip opacity applied
    /// uniformly, so composite drawings (a stroked shape, a glyph run) fade as
    /// one unit.
    pub fn render(&self, frame: &mut FrameRgba, t: f64, assets: &mut AssetLibrary) -> ReelResult<()> {
        let opacity = self.opacity_at(t);
        if opacity <= 0.0 {
            return Ok(());
        }

        if frame.data.len() != frame.width as usize * frame.height as usize * 4 {
            return Err(ReelError::render("frame buffer size mismatch"));
        }
        let width: u16 = frame
            .width
            .try_into()
            .map_err(|_| ReelError::render("canvas width exceeds u16"))?;
        let height: u16 = frame
            .height
            .try_into()
            .map_err(|_| ReelError::render("canvas height exceeds u16"))?;

        let bbox = self.content.bounding_box(assets)?;
        let origin = self
            .anchor
            .resolve(self.position, f64::from(bbox.width), f64::from(bbox.height));

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        self.content.draw(&mut ctx, origin, assets)?;
        ctx.flush();

        let mut scratch = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut scratch);

        composite::over_in_place(&mut frame.data, scratch.data_as_u8_slice(), opacity as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::ShapeContent, core::Size};

    fn shape_clip(start: f64, duration: f64) -> Clip {
        Clip::new(
            ShapeContent::rect(Size::new(10, 10), [255, 0, 0, 255]),
            start,
            duration,
            Point::new(0, 0),
        )
    }

    #[test]
    fn visibility_window_is_half_open() {
        let clip = shape_clip(1.0, 2.0);
        assert!(!clip.is_visible(0.999));
        assert!(clip.is_visible(1.0));
        assert!(clip.is_visible(2.999));
        assert!(!clip.is_visible(3.0));
    }

    #[test]
    fn opacity_is_zero_outside_window() {
        let clip = shape_clip(1.0, 2.0).fade_in(0.5).fade_out(0.5);
        assert_eq!(clip.opacity_at(0.0), 0.0);
        assert_eq!(clip.opacity_at(3.0), 0.0);
        assert_eq!(clip.opacity_at(100.0), 0.0);
    }

    #[test]
    fn zero_fades_give_full_opacity_everywhere_visible() {
        let clip = shape_clip(0.0, 5.0);
        for t in [0.0, 0.001, 2.5, 4.999] {
            assert_eq!(clip.opacity_at(t), 1.0);
        }
    }

    #[test]
    fn fade_envelope_matches_ramp_math() {
        // duration 5, 1s ramps on both ends.
        let clip = shape_clip(0.0, 5.0).fade_in(1.0).fade_out(1.0);
        assert_eq!(clip.opacity_at(0.0), 0.0);
        assert!((clip.opacity_at(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(clip.opacity_at(1.0), 1.0);
        assert_eq!(clip.opacity_at(4.0), 1.0);
        assert!((clip.opacity_at(4.5) - 0.5).abs() < 1e-12);
        assert_eq!(clip.opacity_at(5.0), 0.0);
    }

    #[test]
    fn fade_in_is_monotonically_increasing() {
        let clip = shape_clip(2.0, 4.0).fade_in(1.5);
        let mut prev = -1.0;
        for i in 0..=30 {
            let t = 2.0 + 1.5 * f64::from(i) / 30.0 - 1e-9;
            let o = clip.opacity_at(t.max(2.0));
            assert!(o >= prev);
            prev = o;
        }
    }

    #[test]
    fn fade_out_is_monotonically_decreasing() {
        let clip = shape_clip(0.0, 4.0).fade_out(1.5);
        let mut prev = 2.0;
        for i in 0..30 {
            let t = 2.5 + 1.5 * f64::from(i) / 30.0;
            let o = clip.opacity_at(t);
            assert!(o <= prev);
            prev = o;
        }
    }

    #[test]
    fn overlapping_fades_multiply() {
        // fade_in + fade_out > duration: both ramps apply mid-clip and the
        // envelope dips below either ramp alone.
        let clip = shape_clip(0.0, 2.0).fade_in(2.0).fade_out(2.0);
        let mid = clip.opacity_at(1.0);
        assert!((mid - 0.25).abs() < 1e-12);
    }

    #[test]
    fn fades_longer_than_duration_are_clamped() {
        let clip = shape_clip(0.0, 2.0).fade_in(10.0);
        assert!((clip.opacity_at(1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn base_opacity_scales_the_envelope() {
        let clip = shape_clip(0.0, 4.0).fade_in(2.0).opacity(0.5);
        assert!((clip.opacity_at(1.0) - 0.25).abs() < 1e-12);
        assert!((clip.opacity_at(3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn shifted_copy_leaves_original_untouched() {
        let clip = shape_clip(1.0, 2.0);
        let shifted = clip.with_shifted_start(3.5);
        assert_eq!(shifted.start_sec, 4.5);
        assert_eq!(shifted.duration_sec, 2.0);
        assert_eq!(clip.start_sec, 1.0);
    }

    #[test]
    fn validate_rejects_bad_timing() {
        assert!(shape_clip(-1.0, 2.0).validate().is_err());
        assert!(shape_clip(0.0, 0.0).validate().is_err());
        assert!(shape_clip(0.0, 2.0).fade_in(-0.1).validate().is_err());
        assert!(shape_clip(0.0, 2.0).opacity(1.5).validate().is_err());
        assert!(shape_clip(0.0, 2.0).validate().is_ok());
    }
}
