//! Drawable clip content: text, images, and vector shapes.
//!
//! Each variant supplies a bounding box for anchor placement and a draw hook
//! that paints into a scratch [`vello_cpu::RenderContext`]; timing and alpha
//! are handled by [`Clip`](crate::clip::Clip), never here.

use kurbo::Shape as _;

use crate::{
    assets::AssetLibrary,
    core::Size,
    error::ReelResult,
};

/// Closed set of drawable content kinds.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ClipContent {
    Text(TextContent),
    Image(ImageContent),
    Shape(ShapeContent),
}

impl ClipContent {
    /// Box the anchor rule is applied against: measured for text, the
    /// resized/cropped raster for images, the declared size for shapes.
    pub(crate) fn bounding_box(&self, assets: &mut AssetLibrary) -> ReelResult<Size> {
        match self {
            Self::Text(text) => {
                let prepared = assets.text(text)?;
                Ok(Size::new(
                    prepared.width.ceil() as u32,
                    prepared.height.ceil() as u32,
                ))
            }
            Self::Image(img) => {
                let prepared = assets.image(img)?;
                Ok(Size::new(prepared.width, prepared.height))
            }
            Self::Shape(shape) => Ok(shape.size),
        }
    }

    pub(crate) fn draw(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        origin: (f64, f64),
        assets: &mut AssetLibrary,
    ) -> ReelResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate(origin));
        match self {
            Self::Text(text) => text.draw(ctx, assets),
            Self::Image(img) => img.draw(ctx, assets),
            Self::Shape(shape) => {
                shape.draw(ctx);
                Ok(())
            }
        }
    }
}

impl From<TextContent> for ClipContent {
    fn from(value: TextContent) -> Self {
        Self::Text(value)
    }
}

impl From<ImageContent> for ClipContent {
    fn from(value: ImageContent) -> Self {
        Self::Image(value)
    }
}

impl From<ShapeContent> for ClipContent {
    fn from(value: ShapeContent) -> Self {
        Self::Shape(value)
    }
}

/// Horizontal alignment within a wrapped text box.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextContent {
    pub text: String,
    /// Font file path, resolved through the asset library.
    pub font_source: String,
    pub size_px: f32,
    pub color_rgba8: [u8; 4],
    pub align: TextAlign,
    /// Wrap width; alignment only has a visible effect when set.
    pub max_width_px: Option<f32>,
}

impl TextContent {
    pub fn new(text: impl Into<String>, font_source: impl Into<String>, size_px: f32) -> Self {
        Self {
            text: text.into(),
            font_source: font_source.into(),
            size_px,
            color_rgba8: [255, 255, 255, 255],
            align: TextAlign::default(),
            max_width_px: None,
        }
    }

    pub fn color(mut self, rgba8: [u8; 4]) -> Self {
        self.color_rgba8 = rgba8;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn max_width(mut self, px: f32) -> Self {
        self.max_width_px = Some(px);
        self
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext, assets: &mut AssetLibrary) -> ReelResult<()> {
        let prepared = assets.text(self)?;

        for line in prepared.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&prepared.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        Ok(())
    }
}

/// Policy for fitting a source image into a target box.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ContentMode {
    /// Draw at natural size; the target box is ignored.
    #[default]
    None,
    /// Largest aspect-preserving size that fits entirely inside the box.
    Fit,
    /// Smallest aspect-preserving size that covers the box, center-cropped to
    /// exactly the box.
    Fill,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageContent {
    pub source: String,
    pub size: Option<Size>,
    pub mode: ContentMode,
}

impl ImageContent {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            size: None,
            mode: ContentMode::default(),
        }
    }

    pub fn sized(mut self, size: Size, mode: ContentMode) -> Self {
        self.size = Some(size);
        self.mode = mode;
        self
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext, assets: &mut AssetLibrary) -> ReelResult<()> {
        let prepared = assets.image(self)?;
        ctx.set_paint(prepared.paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(prepared.width),
            f64::from(prepared.height),
        ));
        Ok(())
    }
}

/// Largest size with the source's aspect ratio fitting inside `target`.
pub(crate) fn fit_size(src: Size, target: Size) -> Size {
    let scale = (f64::from(target.width) / f64::from(src.width))
        .min(f64::from(target.height) / f64::from(src.height));
    Size::new(
        ((f64::from(src.width) * scale).round() as u32)
            .max(1)
            .min(target.width.max(1)),
        ((f64::from(src.height) * scale).round() as u32)
            .max(1)
            .min(target.height.max(1)),
    )
}

/// Smallest size with the source's aspect ratio covering `target` in both
/// dimensions; the caller center-crops the excess.
pub(crate) fn fill_scaled_size(src: Size, target: Size) -> Size {
    let scale = (f64::from(target.width) / f64::from(src.width))
        .max(f64::from(target.height) / f64::from(src.height));
    Size::new(
        ((f64::from(src.width) * scale).ceil() as u32).max(target.width),
        ((f64::from(src.height) * scale).ceil() as u32).max(target.height),
    )
}

/// Centered crop offsets of `target` within a covering `scaled` box.
pub(crate) fn fill_crop_offsets(scaled: Size, target: Size) -> (u32, u32) {
    (
        (scaled.width - target.width) / 2,
        (scaled.height - target.height) / 2,
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    Rect,
    Circle,
    Triangle,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ShapeContent {
    pub kind: ShapeKind,
    pub size: Size,
    pub fill_rgba8: [u8; 4],
    pub stroke_rgba8: Option<[u8; 4]>,
    pub stroke_width_px: f64,
}

impl ShapeContent {
    pub fn rect(size: Size, fill_rgba8: [u8; 4]) -> Self {
        Self::new(ShapeKind::Rect, size, fill_rgba8)
    }

    pub fn circle(size: Size, fill_rgba8: [u8; 4]) -> Self {
        Self::new(ShapeKind::Circle, size, fill_rgba8)
    }

    pub fn triangle(size: Size, fill_rgba8: [u8; 4]) -> Self {
        Self::new(ShapeKind::Triangle, size, fill_rgba8)
    }

    fn new(kind: ShapeKind, size: Size, fill_rgba8: [u8; 4]) -> Self {
        Self {
            kind,
            size,
            fill_rgba8,
            stroke_rgba8: None,
            stroke_width_px: 0.0,
        }
    }

    pub fn stroke(mut self, rgba8: [u8; 4], width_px: f64) -> Self {
        self.stroke_rgba8 = Some(rgba8);
        self.stroke_width_px = width_px;
        self
    }

    /// Outline of the shape in local coordinates (origin at the box's
    /// top-left corner).
    pub(crate) fn outline(&self) -> kurbo::BezPath {
        let w = f64::from(self.size.width);
        let h = f64::from(self.size.height);
        match self.kind {
            ShapeKind::Rect => kurbo::Rect::new(0.0, 0.0, w, h).to_path(0.1),
            ShapeKind::Circle => {
                kurbo::Ellipse::new((w / 2.0, h / 2.0), (w / 2.0, h / 2.0), 0.0).to_path(0.1)
            }
            ShapeKind::Triangle => {
                let mut path = kurbo::BezPath::new();
                path.move_to((w / 2.0, 0.0));
                path.line_to((w, h));
                path.line_to((0.0, h));
                path.close_path();
                path
            }
        }
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext) {
        let path = bezpath_to_cpu(&self.outline());

        let [r, g, b, a] = self.fill_rgba8;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_path(&path);

        if let Some([r, g, b, a]) = self.stroke_rgba8
            && self.stroke_width_px > 0.0
        {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(self.stroke_width_px));
            ctx.stroke_path(&path);
        }
    }
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
