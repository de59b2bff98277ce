use reelkit::{
    AssetLibrary, AudioClip, Clip, Layer, Point, Scene, ShapeContent, Size,
};

fn clip(start: f64, duration: f64) -> Clip {
    Clip::new(
        ShapeContent::rect(Size::new(8, 8), [255, 255, 255, 255]),
        start,
        duration,
        Point::new(0, 0),
    )
}

fn leaf_scene(start_at: f64, clip_start: f64, clip_duration: f64) -> Scene {
    let mut scene = Scene::new(start_at);
    scene.add(clip(clip_start, clip_duration)).unwrap();
    scene
}

#[test]
fn nested_offsets_are_additive_along_the_path() {
    // root(1) -> mid(2) -> leaf(3) holding a clip at 0.5.
    let mut mid = Scene::new(2.0);
    mid.add_scene(leaf_scene(3.0, 0.5, 1.0)).unwrap();
    let mut root = Scene::new(1.0);
    root.add_scene(mid).unwrap();

    let flat = root.flatten();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].start_sec, 6.5);
    assert_eq!(flat[0].end_sec(), 7.5);
}

#[test]
fn flatten_is_idempotent() {
    let mut root = Scene::new(0.5);
    let mut inner = Scene::new(1.0);
    inner.add(clip(0.0, 2.0)).unwrap();
    inner.add(clip(1.0, 1.0)).unwrap();
    root.add_scene(inner).unwrap();

    let first: Vec<(f64, f64)> = root
        .flatten()
        .iter()
        .map(|c| (c.start_sec, c.duration_sec))
        .collect();
    let second: Vec<(f64, f64)> = root
        .flatten()
        .iter()
        .map(|c| (c.start_sec, c.duration_sec))
        .collect();

    assert_eq!(first, second);
    assert_eq!(first, vec![(1.5, 2.0), (2.5, 1.0)]);
}

#[test]
fn child_scene_order_is_layer_order() {
    let mut root = Scene::new(0.0);
    root.add_scene(leaf_scene(0.0, 1.0, 1.0)).unwrap();
    root.add_scene_layered(leaf_scene(0.0, 2.0, 1.0), Layer::Bottom)
        .unwrap();
    root.add_scene_layered(leaf_scene(0.0, 3.0, 1.0), Layer::Top)
        .unwrap();

    // Earlier in the flattened list = painted first = farther back.
    let starts: Vec<f64> = root.flatten().iter().map(|c| c.start_sec).collect();
    assert_eq!(starts, vec![2.0, 1.0, 3.0]);
}

#[test]
fn sibling_scenes_chain_by_running_total() {
    let mut assets = AssetLibrary::new();

    let child_a = leaf_scene(0.0, 0.0, 3.0);
    assert_eq!(child_a.total_duration(&mut assets).unwrap(), 3.0);

    let mut child_b = leaf_scene(0.0, 0.0, 2.0);
    child_b.start_at = child_a.total_duration(&mut assets).unwrap();

    let mut root = Scene::new(0.0);
    root.add_scene(child_a).unwrap();
    root.add_scene(child_b).unwrap();

    // B's clip starts exactly where A ended, and the root spans both.
    let flat = root.flatten();
    assert_eq!(flat[1].start_sec, 3.0);
    assert_eq!(root.total_duration(&mut assets).unwrap(), 5.0);
}

#[test]
fn mixing_content_kinds_is_rejected_with_the_committed_kind() {
    let mut holds_clips = Scene::new(0.0);
    holds_clips.add(clip(0.0, 1.0)).unwrap();
    let err = holds_clips.add_scene(Scene::new(0.0)).unwrap_err();
    assert!(err.to_string().contains("clips"));

    let mut holds_scenes = Scene::new(0.0);
    holds_scenes.add_scene(Scene::new(0.0)).unwrap();
    let err = holds_scenes.add(clip(0.0, 1.0)).unwrap_err();
    assert!(err.to_string().contains("scenes"));
}

#[test]
fn audio_clips_shift_through_nesting() {
    let mut inner = Scene::new(2.0);
    inner.add(clip(0.0, 4.0)).unwrap();
    inner.add_audio(AudioClip::new("voice.wav", 1.0).trimmed(0.0, 2.5));

    let mut root = Scene::new(1.0);
    root.add_scene(inner).unwrap();

    let audio = root.flatten_audio();
    assert_eq!(audio.len(), 1);
    assert_eq!(audio[0].start_sec, 4.0);
    assert_eq!(audio[0].source_start_sec, 0.0);
    assert_eq!(audio[0].source_end_sec, Some(2.5));
}

#[test]
fn scene_json_round_trips() {
    let mut inner = Scene::new(1.0);
    inner
        .add(
            clip(0.0, 2.0)
                .anchor(reelkit::AnchorPoint::Center)
                .fade_in(0.5)
                .fade_out(0.5),
        )
        .unwrap();
    inner.add_audio(AudioClip::new("music.mp3", 0.0));

    let mut root = Scene::new(0.0);
    root.add_scene(inner).unwrap();
    root.add_scene(leaf_scene(2.0, 0.0, 1.0)).unwrap();

    let json = serde_json::to_string_pretty(&root).unwrap();
    let parsed: Scene = serde_json::from_str(&json).unwrap();

    let before: Vec<(f64, f64)> = root
        .flatten()
        .iter()
        .map(|c| (c.start_sec, c.duration_sec))
        .collect();
    let after: Vec<(f64, f64)> = parsed
        .flatten()
        .iter()
        .map(|c| (c.start_sec, c.duration_sec))
        .collect();
    assert_eq!(before, after);
    assert_eq!(parsed.flatten_audio().len(), 1);
}
