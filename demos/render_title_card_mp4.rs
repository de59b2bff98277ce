//! Full-bleed background image with a centered fading title.
//!
//! Expects `assets/sample.jpg` and `assets/Inter-Regular.ttf` next to the
//! working directory. Run with: `cargo run --example render_title_card_mp4`

use reelkit::{
    AnchorPoint, AssetLibrary, Clip, ContentMode, ImageContent, Point, RenderConfig, Scene,
    Size, TextAlign, TextContent, render_to_mp4,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let (width, height, fps) = (1920u32, 1080u32, 30u32);
    let mut scene = Scene::new(0.0);

    scene.add(
        Clip::new(
            ImageContent::new("assets/sample.jpg")
                .sized(Size::new(width, height), ContentMode::Fill),
            0.0,
            5.0,
            Point::new(0, 0),
        )
        .fade_in(1.0)
        .fade_out(1.0),
    )?;

    scene.add(
        Clip::new(
            TextContent::new("reelkit demo", "assets/Inter-Regular.ttf", 48.0)
                .color([255, 255, 255, 255])
                .align(TextAlign::Center)
                .max_width(width as f32),
            0.0,
            5.0,
            Point::new(width as i32 / 2, height as i32 / 2),
        )
        .anchor(AnchorPoint::Center)
        .fade_in(1.0)
        .fade_out(1.0),
    )?;

    let cfg = RenderConfig::new(width, height, fps);
    let mut assets = AssetLibrary::new();
    let stats = render_to_mp4(&scene, &cfg, "assets/title_card.mp4", &mut assets)?;
    println!("rendered {} frames to assets/title_card.mp4", stats.frames_total);
    Ok(())
}
