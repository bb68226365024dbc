//! Viewer configuration.
//!
//! Everything has a default that matches the bundled fire fighter assets:
//!
//! ```text
//! assets/
//!     models/FireFighter/FireFighter.gltf
//!     images/SimplePeople_FireFighter_Brown.png
//!     animations/Pointing Gesture/Pointing Gesture.gltf
//! ```

use std::path::{Path, PathBuf};

use controller::DEFAULT_BLEND_DURATION;
use registry::ClipName;

/// Settings for a [`Viewer`](../viewer/struct.Viewer.html).
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    asset_root: PathBuf,
    model: PathBuf,
    model_name: String,
    model_scale: f32,
    texture: Option<PathBuf>,
    idle_clip: ClipName,
    gesture_clip: ClipName,
    streamed_clips: Vec<ClipName>,
    blend_duration: f32,
}

/// Builder for creating a [`ViewerConfig`](struct.ViewerConfig.html) with desired parameters.
#[derive(Clone, Debug)]
pub struct Builder {
    config: ViewerConfig,
}

impl Builder {
    /// Path of the model file, relative to the asset root.
    /// Defaults to `models/FireFighter/FireFighter.gltf`.
    pub fn model<P: Into<PathBuf>>(
        &mut self,
        path: P,
    ) -> &mut Self {
        self.config.model = path.into();
        self
    }

    /// Name given to the loaded model. Defaults to `FireFighter`.
    pub fn model_name<S: Into<String>>(
        &mut self,
        name: S,
    ) -> &mut Self {
        self.config.model_name = name.into();
        self
    }

    /// Uniform scale applied to the model. Defaults to `50.0`.
    pub fn model_scale(
        &mut self,
        scale: f32,
    ) -> &mut Self {
        self.config.model_scale = scale;
        self
    }

    /// Path of the model texture, relative to the asset root.
    /// Defaults to `images/SimplePeople_FireFighter_Brown.png`.
    pub fn texture<P: Into<PathBuf>>(
        &mut self,
        path: P,
    ) -> &mut Self {
        self.config.texture = Some(path.into());
        self
    }

    /// Show the model as soon as it is loaded, without a texture.
    pub fn no_texture(&mut self) -> &mut Self {
        self.config.texture = None;
        self
    }

    /// Name under which the model's own first animation is registered.
    /// Defaults to `Idle`.
    pub fn idle_clip<N: Into<ClipName>>(
        &mut self,
        name: N,
    ) -> &mut Self {
        self.config.idle_clip = name.into();
        self
    }

    /// The clip the toggle control switches to from idle.
    /// Defaults to `Pointing Gesture`.
    pub fn gesture_clip<N: Into<ClipName>>(
        &mut self,
        name: N,
    ) -> &mut Self {
        self.config.gesture_clip = name.into();
        self
    }

    /// Clips loaded from `animations/<name>/<name>.gltf` once the model is in.
    /// Defaults to the gesture clip only.
    pub fn streamed_clips<I>(
        &mut self,
        names: I,
    ) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<ClipName>,
    {
        self.config.streamed_clips = names.into_iter().map(Into::into).collect();
        self
    }

    /// Cross-fade duration in seconds. Defaults to `0.5`.
    pub fn blend_duration(
        &mut self,
        seconds: f32,
    ) -> &mut Self {
        self.config.blend_duration = seconds;
        self
    }

    /// Finalize the configuration.
    pub fn build(&mut self) -> ViewerConfig {
        self.config.clone()
    }
}

impl ViewerConfig {
    /// Create a new configuration with default parameters.
    pub fn new<P: Into<PathBuf>>(asset_root: P) -> Self {
        Self::builder(asset_root).build()
    }

    /// Create new `Builder` with standard parameters.
    pub fn builder<P: Into<PathBuf>>(asset_root: P) -> Builder {
        let gesture = ClipName::from("Pointing Gesture");
        Builder {
            config: ViewerConfig {
                asset_root: asset_root.into(),
                model: PathBuf::from("models/FireFighter/FireFighter.gltf"),
                model_name: "FireFighter".to_string(),
                model_scale: 50.0,
                texture: Some(PathBuf::from("images/SimplePeople_FireFighter_Brown.png")),
                idle_clip: ClipName::from("Idle"),
                gesture_clip: gesture.clone(),
                streamed_clips: vec![gesture],
                blend_duration: DEFAULT_BLEND_DURATION,
            },
        }
    }

    /// Directory all other paths are relative to.
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Full path of the model file.
    pub fn model_path(&self) -> PathBuf {
        self.asset_root.join(&self.model)
    }

    /// Name given to the loaded model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Uniform scale applied to the model.
    pub fn model_scale(&self) -> f32 {
        self.model_scale
    }

    /// Full path of the model texture, if any.
    pub fn texture_path(&self) -> Option<PathBuf> {
        self.texture.as_ref().map(|path| self.asset_root.join(path))
    }

    /// Full path of the file a streamed clip is loaded from.
    pub fn clip_path(
        &self,
        name: &ClipName,
    ) -> PathBuf {
        self.asset_root
            .join("animations")
            .join(name.as_str())
            .join(format!("{}.gltf", name))
    }

    /// Name of the idle clip.
    pub fn idle_clip(&self) -> &ClipName {
        &self.idle_clip
    }

    /// Name of the gesture clip.
    pub fn gesture_clip(&self) -> &ClipName {
        &self.gesture_clip
    }

    /// Clips to stream after the model has loaded.
    pub fn streamed_clips(&self) -> &[ClipName] {
        &self.streamed_clips
    }

    /// Cross-fade duration in seconds.
    pub fn blend_duration(&self) -> f32 {
        self.blend_duration
    }
}
