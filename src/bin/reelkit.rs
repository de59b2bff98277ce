use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use reelkit::{AssetLibrary, RenderConfig, Scene, render_frame_at, render_to_mp4};

#[derive(Parser, Debug)]
#[command(name = "reelkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene description to an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Composite a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1920)]
    width: u32,

    #[arg(long, default_value_t = 1080)]
    height: u32,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Directory asset paths in the scene are resolved against.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline position in seconds.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1920)]
    width: u32,

    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Directory asset paths in the scene are resolved against.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => run_render(args),
        Command::Frame(args) => run_frame(args),
    }
}

fn load_scene(path: &PathBuf) -> anyhow::Result<Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scene '{}'", path.display()))?;
    let scene: Scene = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse scene '{}'", path.display()))?;
    Ok(scene)
}

fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.in_path)?;
    let cfg = RenderConfig::new(args.width, args.height, args.fps);
    let mut assets = AssetLibrary::with_root(args.assets_root);

    let stats = render_to_mp4(&scene, &cfg, &args.out, &mut assets)?;
    println!(
        "wrote {} ({} frames @ {} fps)",
        args.out.display(),
        stats.frames_total,
        args.fps
    );
    Ok(())
}

fn run_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.in_path)?;
    // fps only affects frame indexing, not a single sampled time.
    let cfg = RenderConfig::new(args.width, args.height, 30);
    let mut assets = AssetLibrary::with_root(args.assets_root);

    let frame = render_frame_at(&scene, &cfg, args.at, &mut assets)?;

    let mut data = frame.data;
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .context("frame buffer size mismatch")?;
    img.save(&args.out)
        .with_context(|| format!("failed to write '{}'", args.out.display()))?;
    println!("wrote {}", args.out.display());
    Ok(())
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
