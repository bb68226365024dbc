//! The viewer's frame context.
//!
//! A [`Viewer`] is created once at start-up and driven by the host's frame
//! loop:
//!
//! ```rust,no_run
//! # use clipfade::{Clock, Viewer, ViewerConfig};
//! let mut viewer = Viewer::new(ViewerConfig::new("assets"));
//! let mut clock = Clock::new();
//! loop {
//!     // Forward the toggle control, e.g. a button press.
//!     # let clicked = false;
//!     if clicked {
//!         viewer.click();
//!     }
//!     viewer.frame(clock.delta());
//!     // Draw `viewer.world_transforms()` / `viewer.joint_matrices()`.
//! }
//! ```
//!
//! [`Viewer`]: struct.Viewer.html

use mint;

use config::ViewerConfig;
use controller::AnimationController;
use loader::{LoadEvent, Loader, Model};
use registry::ClipRegistry;
use rig::NodeTransform;

/// Owns every piece of the viewer's state.
pub struct Viewer {
    config: ViewerConfig,
    loader: Loader,
    registry: ClipRegistry,
    model: Option<Model>,
    controller: Option<AnimationController>,
    visible: bool,
    clicks: usize,
}

impl Viewer {
    /// Creates the viewer and requests the model.
    pub fn new(config: ViewerConfig) -> Self {
        let mut loader = Loader::new();
        loader.load_model(config.model_path());
        Viewer {
            config,
            loader,
            registry: ClipRegistry::new(),
            model: None,
            controller: None,
            visible: false,
            clicks: 0,
        }
    }

    /// Queues one press of the toggle control; it is applied on the next frame.
    pub fn click(&mut self) {
        self.clicks += 1;
    }

    /// Runs one frame: applies finished loads and queued clicks, then advances
    /// animation by `delta_time` seconds.
    pub fn frame(
        &mut self,
        delta_time: f32,
    ) {
        for event in self.loader.poll() {
            self.handle(event);
        }

        while self.clicks > 0 {
            self.clicks -= 1;
            self.toggle();
        }

        if let Some(ref mut controller) = self.controller {
            controller.advance(delta_time);
        }
    }

    fn toggle(&mut self) {
        let controller = match self.controller {
            Some(ref mut controller) => controller,
            None => {
                debug!("Ignoring click, the model is not loaded yet");
                return;
            }
        };
        let idle = self.config.idle_clip().as_str();
        let gesture = self.config.gesture_clip().as_str();
        if let Err(err) = controller.toggle(&self.registry, idle, gesture) {
            warn!("Toggle ignored: {}", err);
        }
    }

    /// Applies one finished load.
    ///
    /// Called by [`frame`](#method.frame) for everything the loader finished;
    /// exposed so that hosts with their own loading can feed results in.
    pub fn handle(
        &mut self,
        event: LoadEvent,
    ) {
        match event {
            LoadEvent::Model(path, Ok(model)) => {
                info!("Model {} loaded", path.display());
                self.install_model(model);
            }
            LoadEvent::Clip(name, Ok(clip)) => {
                self.registry.register(name, clip);
            }
            LoadEvent::Texture(path, Ok(texture)) => {
                info!("Texture {} loaded ({}x{})", path.display(), texture.width, texture.height);
                match self.model {
                    Some(ref mut model) => {
                        model.texture = Some(texture);
                        self.visible = true;
                    }
                    None => warn!("Texture {} arrived before the model", path.display()),
                }
            }
            LoadEvent::Model(path, Err(err)) => error!("Failed to load model {}: {}", path.display(), err),
            LoadEvent::Clip(name, Err(err)) => error!("Failed to load clip {:?}: {}", name.as_str(), err),
            LoadEvent::Texture(path, Err(err)) => {
                error!("Failed to load texture {}: {}", path.display(), err)
            }
        }
    }

    fn install_model(
        &mut self,
        mut model: Model,
    ) {
        model.name = self.config.model_name().to_string();
        model.transform = NodeTransform::from_scale(self.config.model_scale());

        let mut controller =
            AnimationController::with_blend_duration(model.rig.clone(), self.config.blend_duration());
        let idle = self.config.idle_clip().clone();
        match model.clips.first() {
            Some(clip) => self.registry.register(idle.clone(), clip.clone()),
            None => warn!("Model {:?} has no embedded animation", model.name),
        }

        for name in self.config.streamed_clips() {
            self.loader.load_clip(name.clone(), self.config.clip_path(name));
        }
        match self.config.texture_path() {
            Some(path) => self.loader.load_texture(path),
            None => self.visible = true,
        }

        if self.registry.contains(idle.as_str()) {
            if let Err(err) = controller.play_clip(&self.registry, idle.as_str()) {
                error!("Unable to start {:?}: {}", idle.as_str(), err);
            }
        }
        self.controller = Some(controller);
        self.model = Some(model);
    }

    /// The configuration the viewer was created with.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The loaded model, once its load event has been handled.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Whether the model is ready to be drawn, i.e. its texture has arrived.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Clips registered so far.
    pub fn registry(&self) -> &ClipRegistry {
        &self.registry
    }

    /// The animation controller, once the model is loaded.
    pub fn controller(&self) -> Option<&AnimationController> {
        self.controller.as_ref()
    }

    /// Number of asset loads still in flight.
    pub fn pending_loads(&self) -> usize {
        self.loader.pending()
    }

    /// Posed world transforms of every joint, with the model placement applied.
    pub fn world_transforms(&self) -> Vec<NodeTransform> {
        match (self.model.as_ref(), self.controller.as_ref()) {
            (Some(model), Some(controller)) => controller.mixer().root().world_transforms(&model.transform),
            _ => Vec::new(),
        }
    }

    /// Skinning matrices of every skin of the model, in skin order.
    pub fn joint_matrices(&self) -> Vec<Vec<mint::ColumnMatrix4<f32>>> {
        let model = match self.model {
            Some(ref model) => model,
            None => return Vec::new(),
        };
        let world = self.world_transforms();
        model.skins.iter().map(|skin| skin.joint_matrices(&world)).collect()
    }
}
