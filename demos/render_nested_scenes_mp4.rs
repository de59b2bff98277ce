//! Nested scenes: the same title scene reused at two timeline offsets, once
//! directly and once inside a delayed overlay scene.
//!
//! Run with: `cargo run --example render_nested_scenes_mp4`

use reelkit::{
    AssetLibrary, Clip, ContentMode, ImageContent, Point, RenderConfig, Scene, Size,
    TextContent, render_to_mp4,
};

fn build_title_scene() -> anyhow::Result<Scene> {
    let mut scene = Scene::new(0.0);
    scene.add(
        Clip::new(
            TextContent::new("nested timelines", "assets/Inter-Regular.ttf", 56.0),
            0.0,
            3.0,
            Point::new(420, 150),
        )
        .fade_in(1.0)
        .fade_out(1.0),
    )?;
    Ok(scene)
}

fn build_image_scene() -> anyhow::Result<Scene> {
    let mut scene = Scene::new(0.0);
    scene.add(
        Clip::new(
            ImageContent::new("assets/sample.jpg").sized(Size::new(800, 450), ContentMode::Fit),
            0.0,
            4.0,
            Point::new(400, 320),
        )
        .fade_in(1.0)
        .fade_out(1.0),
    )?;
    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    // The overlay starts two seconds in and stacks both leaf scenes.
    let mut overlay = Scene::new(2.0);
    overlay.add_scene(build_title_scene()?)?;
    overlay.add_scene(build_image_scene()?)?;

    let mut root = Scene::new(0.0);
    root.add_scene(build_title_scene()?)?;
    root.add_scene(overlay)?;

    let cfg = RenderConfig::new(1280, 720, 24);
    let mut assets = AssetLibrary::new();
    let stats = render_to_mp4(&root, &cfg, "assets/nested_demo.mp4", &mut assets)?;
    println!("rendered {} frames to assets/nested_demo.mp4", stats.frames_total);
    Ok(())
}
