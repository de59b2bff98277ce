//! Stroked vector shapes with staggered starts and short fades.
//!
//! Run with: `cargo run --example render_shapes_mp4`

use reelkit::{
    AnchorPoint, AssetLibrary, Clip, Point, RenderConfig, Scene, ShapeContent, Size,
    render_to_mp4,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let (width, height, fps) = (1280u32, 720u32, 30u32);
    let mut scene = Scene::new(0.0);

    scene.add(
        Clip::new(
            ShapeContent::rect(Size::new(520, 240), [255, 90, 60, 255])
                .stroke([255, 255, 255, 255], 6.0),
            0.0,
            4.0,
            Point::new(80, 80),
        )
        .fade_in(0.5)
        .fade_out(0.5)
        .opacity(0.3),
    )?;

    scene.add(
        Clip::new(
            ShapeContent::circle(Size::new(220, 220), [70, 190, 255, 255])
                .stroke([0, 40, 80, 255], 4.0),
            0.5,
            4.0,
            Point::new(width as i32 / 2, height as i32 / 2),
        )
        .anchor(AnchorPoint::Center)
        .fade_in(0.5)
        .fade_out(0.5),
    )?;

    scene.add(
        Clip::new(
            ShapeContent::triangle(Size::new(260, 240), [110, 255, 140, 255])
                .stroke([0, 80, 40, 255], 4.0),
            1.0,
            4.0,
            Point::new(width as i32 - 140, height as i32 - 120),
        )
        .anchor(AnchorPoint::BottomRight)
        .fade_in(0.5)
        .fade_out(0.5),
    )?;

    let cfg = RenderConfig::new(width, height, fps);
    let mut assets = AssetLibrary::new();
    let stats = render_to_mp4(&scene, &cfg, "assets/output_shapes.mp4", &mut assets)?;
    println!("rendered {} frames to assets/output_shapes.mp4", stats.frames_total);
    Ok(())
}
