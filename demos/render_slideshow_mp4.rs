//! Slideshow assembled by chaining sibling scenes with `total_duration`,
//! plus a music bed on the root timeline.
//!
//! Run with: `cargo run --example render_slideshow_mp4`

use reelkit::{
    AssetLibrary, AudioClip, Clip, ContentMode, ImageContent, Point, RenderConfig, Scene,
    Size, TextContent, render_to_mp4,
};

struct Slide {
    caption: &'static str,
    picture: &'static str,
}

fn build_slide(slide: &Slide) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(0.0);

    let background = Clip::new(
        ImageContent::new("assets/sample.jpg").sized(Size::new(1920, 1080), ContentMode::Fill),
        0.0,
        3.0,
        Point::new(0, 0),
    );

    let picture = Clip::new(
        ImageContent::new(slide.picture).sized(Size::new(800, 450), ContentMode::Fit),
        0.0,
        3.0,
        Point::new(200, 120),
    )
    .fade_in(0.5)
    .fade_out(0.5);

    let caption = Clip::new(
        TextContent::new(slide.caption, "assets/Inter-Regular.ttf", 32.0),
        0.0,
        3.0,
        Point::new(800, 200),
    )
    .fade_in(0.5)
    .fade_out(0.5);

    scene.add(background)?;
    scene.add(picture)?;
    scene.add(caption)?;
    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let slides = [
        Slide {
            caption: "Every night, Tom waited at the small train station.",
            picture: "assets/sample1.jpg",
        },
        Slide {
            caption: "The lights were weak, and the air was cold.",
            picture: "assets/sample2.jpg",
        },
        Slide {
            caption: "No one else came.",
            picture: "assets/sample3.jpg",
        },
    ];

    let mut assets = AssetLibrary::new();
    let mut root = Scene::new(0.0);
    for slide in &slides {
        let mut scene = build_slide(slide)?;
        scene.start_at = root.total_duration(&mut assets)?;
        root.add_scene(scene)?;
    }
    root.add_audio(AudioClip::new("assets/music.mp3", 0.0).trimmed(0.0, 9.0));

    let cfg = RenderConfig::new(1920, 1080, 30);
    let stats = render_to_mp4(&root, &cfg, "assets/slideshow.mp4", &mut assets)?;
    println!("rendered {} frames to assets/slideshow.mp4", stats.frames_total);
    Ok(())
}
