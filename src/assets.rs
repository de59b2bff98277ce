//! Caller-owned asset cache passed into the render pipeline.
//!
//! Decoded resources are read-only once loaded and reused across renders.
//! Nothing here is global: the caller (or the CLI) owns one [`AssetLibrary`]
//! and hands it to every render pass. Derived artifacts that can grow without
//! bound (size/mode image rasters, shaped text layouts, audio PCM) sit behind
//! bounded LRU caches; identity-level entries (decoded natural images, font
//! bytes, probed durations) are kept for the library's lifetime.

pub mod decode;

use std::{
    collections::{HashMap, VecDeque},
    hash::Hash,
    path::PathBuf,
    sync::Arc,
};

use crate::{
    audio::MIX_SAMPLE_RATE,
    content::{self, ContentMode, ImageContent, TextAlign, TextContent},
    core::Size,
    error::{ReelError, ReelResult},
};

pub use decode::AudioPcm;

const IMAGE_RASTER_CAPACITY: usize = 32;
const TEXT_LAYOUT_CAPACITY: usize = 64;
const AUDIO_PCM_CAPACITY: usize = 8;

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Image raster prepared for drawing: premultiplied pixels wrapped in a
/// `vello_cpu` paint, already resized/cropped for its content mode.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub paint: vello_cpu::Image,
}

/// Shaped text ready for glyph rendering, plus its measured bounds.
#[derive(Clone)]
pub struct PreparedText {
    pub layout: parley::Layout<TextBrushRgba8>,
    pub font: vello_cpu::peniko::FontData,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct ImageKey {
    source: String,
    size: Option<Size>,
    mode: ContentMode,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    font_source: String,
    size_bits: u32,
    align: TextAlign,
    max_width_bits: Option<u32>,
}

/// LRU map with a fixed capacity; inserting past capacity evicts the least
/// recently used entry.
struct BoundedCache<K, V> {
    map: HashMap<K, Arc<V>>,
    lru: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let value = self.map.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    fn insert(&mut self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.map.insert(key.clone(), value.clone());
        self.touch(&key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.map.remove(&old);
            }
        }
        value
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key.clone());
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map.len()
    }
}

pub struct AssetLibrary {
    root: PathBuf,
    decoded_images: HashMap<String, Arc<image::RgbaImage>>,
    image_rasters: BoundedCache<ImageKey, PreparedImage>,
    font_bytes: HashMap<String, Arc<Vec<u8>>>,
    text_engine: TextLayoutEngine,
    text_layouts: BoundedCache<TextKey, PreparedText>,
    audio_pcm: BoundedCache<String, AudioPcm>,
    audio_durations: HashMap<String, f64>,
}

impl AssetLibrary {
    /// Library resolving sources relative to the current directory.
    pub fn new() -> Self {
        Self::with_root(".")
    }

    /// Library resolving relative source paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            decoded_images: HashMap::new(),
            image_rasters: BoundedCache::new(IMAGE_RASTER_CAPACITY),
            font_bytes: HashMap::new(),
            text_engine: TextLayoutEngine::new(),
            text_layouts: BoundedCache::new(TEXT_LAYOUT_CAPACITY),
            audio_pcm: BoundedCache::new(AUDIO_PCM_CAPACITY),
            audio_durations: HashMap::new(),
        }
    }

    pub(crate) fn resolve(&self, source: &str) -> PathBuf {
        self.root.join(source)
    }

    fn read_bytes(&self, source: &str) -> ReelResult<Vec<u8>> {
        let path = self.resolve(source);
        std::fs::read(&path)
            .map_err(|e| ReelError::decode(format!("failed to read '{}': {e}", path.display())))
    }

    fn decoded_image(&mut self, source: &str) -> ReelResult<Arc<image::RgbaImage>> {
        if let Some(img) = self.decoded_images.get(source) {
            return Ok(img.clone());
        }
        let bytes = self.read_bytes(source)?;
        let img = Arc::new(decode::decode_image(&bytes)?);
        self.decoded_images.insert(source.to_string(), img.clone());
        Ok(img)
    }

    /// Raster for an image clip: decoded once per source, then resized and
    /// cropped per (size, mode) variant.
    pub fn image(&mut self, img: &ImageContent) -> ReelResult<Arc<PreparedImage>> {
        let key = ImageKey {
            source: img.source.clone(),
            size: img.size,
            mode: img.mode,
        };
        if let Some(prepared) = self.image_rasters.get(&key) {
            return Ok(prepared);
        }

        let base = self.decoded_image(&img.source)?;
        let src_size = Size::new(base.width(), base.height());

        let rgba: image::RgbaImage = match (img.size, img.mode) {
            (None, _) | (_, ContentMode::None) => (*base).clone(),
            (Some(target), ContentMode::Fit) => {
                let fitted = content::fit_size(src_size, target);
                image::imageops::resize(
                    base.as_ref(),
                    fitted.width,
                    fitted.height,
                    image::imageops::FilterType::Lanczos3,
                )
            }
            (Some(target), ContentMode::Fill) => {
                let scaled = content::fill_scaled_size(src_size, target);
                let resized = image::imageops::resize(
                    base.as_ref(),
                    scaled.width,
                    scaled.height,
                    image::imageops::FilterType::Lanczos3,
                );
                let (ox, oy) = content::fill_crop_offsets(scaled, target);
                image::imageops::crop_imm(&resized, ox, oy, target.width, target.height).to_image()
            }
        };

        let (width, height) = rgba.dimensions();
        let mut bytes = rgba.into_raw();
        decode::premultiply_rgba8_in_place(&mut bytes);
        let pixmap = pixmap_from_premul_rgba8(&bytes, width, height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        Ok(self
            .image_rasters
            .insert(key, PreparedImage { width, height, paint }))
    }

    pub fn font_bytes(&mut self, source: &str) -> ReelResult<Arc<Vec<u8>>> {
        if let Some(bytes) = self.font_bytes.get(source) {
            return Ok(bytes.clone());
        }
        let bytes = Arc::new(self.read_bytes(source)?);
        self.font_bytes.insert(source.to_string(), bytes.clone());
        Ok(bytes)
    }

    /// Shaped layout for a text clip, measured and ready for glyph drawing.
    pub fn text(&mut self, text: &TextContent) -> ReelResult<Arc<PreparedText>> {
        let key = TextKey {
            text: text.text.clone(),
            font_source: text.font_source.clone(),
            size_bits: text.size_px.to_bits(),
            align: text.align,
            max_width_bits: text.max_width_px.map(f32::to_bits),
        };
        if let Some(prepared) = self.text_layouts.get(&key) {
            return Ok(prepared);
        }

        let font_bytes = self.font_bytes(&text.font_source)?;
        let brush = TextBrushRgba8 {
            r: text.color_rgba8[0],
            g: text.color_rgba8[1],
            b: text.color_rgba8[2],
            a: text.color_rgba8[3],
        };
        let layout = self.text_engine.layout_plain(
            &text.text,
            font_bytes.as_slice(),
            text.size_px,
            brush,
            text.align,
            text.max_width_px,
        )?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );
        let width = layout.width();
        let height = layout.height();

        Ok(self.text_layouts.insert(
            key,
            PreparedText {
                layout,
                font,
                width,
                height,
            },
        ))
    }

    /// Stereo PCM at the mix sample rate, decoded once per source.
    pub fn audio_pcm(&mut self, source: &str) -> ReelResult<Arc<AudioPcm>> {
        let key = source.to_string();
        if let Some(pcm) = self.audio_pcm.get(&key) {
            return Ok(pcm);
        }
        let pcm = decode::decode_audio_f32_stereo(&self.resolve(source), MIX_SAMPLE_RATE)?;
        Ok(self.audio_pcm.insert(key, pcm))
    }

    /// Source duration in seconds, probed once per source.
    pub fn audio_duration_sec(&mut self, source: &str) -> ReelResult<f64> {
        if let Some(&duration) = self.audio_durations.get(source) {
            return Ok(duration);
        }
        let duration = decode::probe_duration_sec(&self.resolve(source))?;
        self.audio_durations.insert(source.to_string(), duration);
        Ok(duration)
    }
}

impl Default for AssetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateful helper building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out plain text using the provided font bytes.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
        align: TextAlign,
        max_width_px: Option<f32>,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReelError::decode("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::decode("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                align_to_parley(align),
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }

        Ok(layout)
    }
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn align_to_parley(align: TextAlign) -> parley::Alignment {
    match align {
        TextAlign::Start => parley::Alignment::Start,
        TextAlign::Center => parley::Alignment::Center,
        TextAlign::End => parley::Alignment::End,
    }
}

fn pixmap_from_premul_rgba8(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ReelError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn write_temp_png(name: &str, width: u32, height: u32) -> (PathBuf, String) {
        let dir = std::env::temp_dir().join(format!("reelkit_assets_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let path = dir.join(name);
        img.save(&path).unwrap();
        (dir, name.to_string())
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let mut cache = BoundedCache::<u32, u32>::new(2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert!(cache.get(&1).is_some());
        cache.insert(3, 30);
        assert_eq!(cache.len(), 2);
        // 2 was the coldest entry.
        assert!(cache.get(&2).is_none());
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&3).is_some());
    }

    #[test]
    fn image_fit_and_fill_dimensions() {
        let (root, name) = write_temp_png("fitfill.png", 40, 30);
        let mut assets = AssetLibrary::with_root(root);

        let natural = assets
            .image(&ImageContent::new(name.clone()))
            .unwrap();
        assert_eq!((natural.width, natural.height), (40, 30));

        let fit = assets
            .image(&ImageContent::new(name.clone()).sized(Size::new(20, 20), ContentMode::Fit))
            .unwrap();
        assert!(fit.width <= 20 && fit.height <= 20);
        assert_eq!((fit.width, fit.height), (20, 15));

        let fill = assets
            .image(&ImageContent::new(name).sized(Size::new(20, 20), ContentMode::Fill))
            .unwrap();
        assert_eq!((fill.width, fill.height), (20, 20));
    }

    #[test]
    fn image_rasters_are_cached_per_variant() {
        let (root, name) = write_temp_png("cached.png", 16, 16);
        let mut assets = AssetLibrary::with_root(root);

        let variant = ImageContent::new(name).sized(Size::new(8, 8), ContentMode::Fit);
        let a = assets.image(&variant).unwrap();
        let b = assets.image(&variant).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn missing_image_is_a_decode_error() {
        let mut assets = AssetLibrary::new();
        let err = assets
            .image(&ImageContent::new("definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, ReelError::Decode(_)));
    }
}
