#![forbid(unsafe_code)]

//! Declarative timeline composition and MP4 rendering.
//!
//! Build a [`Scene`] tree of timed [`Clip`]s (text, images, vector shapes)
//! and [`AudioClip`]s, then hand it to [`render_to_mp4`] together with a
//! caller-owned [`AssetLibrary`]. Nested scenes are flattened into one
//! absolute-time clip list; each output frame samples every clip's
//! visibility, fade envelope, and anchor-relative placement before
//! compositing in layer order.

pub mod assets;
pub mod audio;
pub mod clip;
pub mod composite;
pub mod content;
pub mod core;
pub mod encode_ffmpeg;
pub mod error;
pub mod render;
pub mod scene;

pub use assets::{AssetLibrary, AudioPcm, PreparedImage, PreparedText, TextBrushRgba8};
pub use audio::{AudioClip, AudioSegment, MIX_CHANNELS, MIX_SAMPLE_RATE, mix_segments};
pub use clip::Clip;
pub use content::{
    ClipContent, ContentMode, ImageContent, ShapeContent, ShapeKind, TextAlign, TextContent,
};
pub use core::{AnchorPoint, Point, Size};
pub use encode_ffmpeg::{
    AudioInputConfig, EncodeConfig, FfmpegEncoder, default_mp4_config, is_ffmpeg_on_path,
};
pub use error::{ReelError, ReelResult};
pub use render::{
    FrameRgba, FrameSink, RenderConfig, RenderStats, render_frame_at, render_scene, render_to_mp4,
};
pub use scene::{Layer, Scene};
