//! The composition tree: scenes hold either drawable clips or child scenes.

use crate::{
    assets::AssetLibrary,
    audio::AudioClip,
    clip::Clip,
    error::{ReelError, ReelResult},
};

/// Relative paint order within a scene. `Top` draws last (foreground),
/// `Bottom` draws first (background).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Layer {
    #[default]
    Top,
    Bottom,
}

/// What a scene holds. The first `add`/`add_scene` call commits the variant;
/// the other kind is rejected from then on, so a scene is either a leaf list
/// of clips or a composite of child scenes, never both.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
enum SceneContent {
    #[default]
    Empty,
    Clips(Vec<Clip>),
    Scenes(Vec<Scene>),
}

/// A node in the composition tree with its own time offset.
///
/// The tree is strict: a child belongs to exactly one parent (`add_scene`
/// takes ownership). Mutation happens only while building; flattening is
/// read-only and produces shifted copies, so one built scene can be rendered
/// any number of times (at different frame rates, against different sinks)
/// without corrupting itself.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Start offset in seconds relative to the parent scene.
    pub start_at: f64,
    #[serde(default)]
    content: SceneContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    audio: Vec<AudioClip>,
}

impl Scene {
    pub fn new(start_at: f64) -> Self {
        Self {
            start_at,
            content: SceneContent::Empty,
            audio: Vec::new(),
        }
    }

    /// Add a clip on top of the scene's existing clips.
    pub fn add(&mut self, clip: Clip) -> ReelResult<()> {
        self.add_layered(clip, Layer::Top)
    }

    pub fn add_layered(&mut self, clip: Clip, layer: Layer) -> ReelResult<()> {
        clip.validate()?;
        match &mut self.content {
            SceneContent::Scenes(_) => Err(ReelError::configuration(
                "scene already holds scenes, cannot add clips",
            )),
            SceneContent::Empty => {
                self.content = SceneContent::Clips(vec![clip]);
                Ok(())
            }
            SceneContent::Clips(clips) => {
                match layer {
                    Layer::Top => clips.push(clip),
                    Layer::Bottom => clips.insert(0, clip),
                }
                Ok(())
            }
        }
    }

    /// Add a child scene on top of the existing children.
    pub fn add_scene(&mut self, scene: Scene) -> ReelResult<()> {
        self.add_scene_layered(scene, Layer::Top)
    }

    pub fn add_scene_layered(&mut self, scene: Scene, layer: Layer) -> ReelResult<()> {
        match &mut self.content {
            SceneContent::Clips(_) => Err(ReelError::configuration(
                "scene already holds clips, cannot add scenes",
            )),
            SceneContent::Empty => {
                self.content = SceneContent::Scenes(vec![scene]);
                Ok(())
            }
            SceneContent::Scenes(scenes) => {
                match layer {
                    Layer::Top => scenes.push(scene),
                    Layer::Bottom => scenes.insert(0, scene),
                }
                Ok(())
            }
        }
    }

    /// Audio rides alongside either content kind; it never conflicts with the
    /// clip/scene commitment.
    pub fn add_audio(&mut self, clip: AudioClip) {
        self.audio.push(clip);
    }

    /// Convert the tree below this scene into a single absolute-time clip
    /// list.
    ///
    /// Clip order is paint order: children contribute in child-list order, so
    /// the layering established by `add`/`add_scene` survives flattening.
    /// Offsets are additive along the path from root to leaf, and every
    /// returned clip is a fresh copy — repeated calls never compound.
    pub fn flatten(&self) -> Vec<Clip> {
        match &self.content {
            SceneContent::Empty => Vec::new(),
            SceneContent::Clips(clips) => clips
                .iter()
                .map(|clip| clip.with_shifted_start(self.start_at))
                .collect(),
            SceneContent::Scenes(scenes) => {
                let mut out = Vec::new();
                for child in scenes {
                    for clip in child.flatten() {
                        out.push(clip.with_shifted_start(self.start_at));
                    }
                }
                out
            }
        }
    }

    /// Absolute-time audio list, shifted the same way as [`Scene::flatten`].
    pub fn flatten_audio(&self) -> Vec<AudioClip> {
        let mut out: Vec<AudioClip> = self
            .audio
            .iter()
            .map(|clip| clip.with_shifted_start(self.start_at))
            .collect();
        if let SceneContent::Scenes(scenes) = &self.content {
            for child in scenes {
                for clip in child.flatten_audio() {
                    out.push(clip.with_shifted_start(self.start_at));
                }
            }
        }
        out
    }

    /// Timeline length in seconds: the max end time across all flattened
    /// clips and audio, or `start_at` for an empty scene (an empty scene
    /// still occupies its start point). Callers chain sibling scenes by
    /// setting the next child's `start_at` to the running total.
    pub fn total_duration(&self, assets: &mut AssetLibrary) -> ReelResult<f64> {
        let mut end: Option<f64> = None;
        for clip in self.flatten() {
            end = Some(end.map_or(clip.end_sec(), |e: f64| e.max(clip.end_sec())));
        }
        for audio in self.flatten_audio() {
            let audio_end = audio.end_sec(assets)?;
            end = Some(end.map_or(audio_end, |e: f64| e.max(audio_end)));
        }
        Ok(end.unwrap_or(self.start_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        content::ShapeContent,
        core::{Point, Size},
    };

    fn clip(start: f64, duration: f64) -> Clip {
        Clip::new(
            ShapeContent::rect(Size::new(4, 4), [255, 255, 255, 255]),
            start,
            duration,
            Point::new(0, 0),
        )
    }

    #[test]
    fn add_after_add_scene_is_a_configuration_error() {
        let mut scene = Scene::new(0.0);
        scene.add_scene(Scene::new(0.0)).unwrap();
        let err = scene.add(clip(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, ReelError::Configuration(_)));
        assert!(err.to_string().contains("scenes"));
    }

    #[test]
    fn add_scene_after_add_is_a_configuration_error() {
        let mut scene = Scene::new(0.0);
        scene.add(clip(0.0, 1.0)).unwrap();
        let err = scene.add_scene(Scene::new(0.0)).unwrap_err();
        assert!(matches!(err, ReelError::Configuration(_)));
        assert!(err.to_string().contains("clips"));
    }

    #[test]
    fn flatten_of_empty_scene_is_empty() {
        let scene = Scene::new(2.0);
        assert!(scene.flatten().is_empty());
        assert!(scene.flatten_audio().is_empty());
    }

    #[test]
    fn flatten_shifts_by_own_offset() {
        let mut scene = Scene::new(1.5);
        scene.add(clip(0.5, 2.0)).unwrap();
        let flat = scene.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].start_sec, 2.0);
        assert_eq!(flat[0].duration_sec, 2.0);
    }

    #[test]
    fn bottom_layer_inserts_before_existing_clips() {
        let mut scene = Scene::new(0.0);
        scene.add(clip(1.0, 1.0)).unwrap();
        scene.add_layered(clip(2.0, 1.0), Layer::Bottom).unwrap();
        scene.add_layered(clip(3.0, 1.0), Layer::Top).unwrap();
        let starts: Vec<f64> = scene.flatten().iter().map(|c| c.start_sec).collect();
        assert_eq!(starts, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn empty_scene_total_duration_is_its_offset() {
        let mut assets = AssetLibrary::new();
        let scene = Scene::new(3.25);
        assert_eq!(scene.total_duration(&mut assets).unwrap(), 3.25);
    }

    #[test]
    fn audio_rides_alongside_clips() {
        let mut scene = Scene::new(1.0);
        scene.add(clip(0.0, 1.0)).unwrap();
        scene.add_audio(AudioClip::new("voice.wav", 0.5));
        let audio = scene.flatten_audio();
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].start_sec, 1.5);
    }
}
