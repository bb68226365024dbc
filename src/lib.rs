//! Cross-faded clip playback for a single skinned character.
//!
//! The crate is split the same way a viewer is: an engine side that knows how
//! to load glTF data and blend animation actions, and a thin controller side
//! that decides *which* clip plays.
//!
//! * [`rig`] and [`animation`] hold the node hierarchy and the
//!   [`Mixer`](animation/struct.Mixer.html) that blends actions into it.
//! * [`loader`] imports models, clips and textures, either directly or on
//!   worker threads that report back through [`LoadEvent`]s.
//! * [`ClipRegistry`] and [`AnimationController`] track the loaded clips and the
//!   active one, and issue cross-fades between them.
//! * [`Viewer`] ties everything into one context object driven once per frame.
//!
//! [`rig`]: rig/index.html
//! [`animation`]: animation/index.html
//! [`loader`]: loader/index.html
//! [`LoadEvent`]: loader/enum.LoadEvent.html
//! [`ClipRegistry`]: registry/struct.ClipRegistry.html
//! [`AnimationController`]: controller/struct.AnimationController.html
//! [`Viewer`]: viewer/struct.Viewer.html

extern crate cgmath;
extern crate froggy;
extern crate gltf;
extern crate image;
#[macro_use]
extern crate log;
extern crate mint;
#[macro_use]
extern crate quick_error;

pub mod animation;
pub mod clock;
pub mod config;
pub mod controller;
mod error;
pub mod loader;
pub mod registry;
pub mod rig;
pub mod viewer;

pub use clock::Clock;
pub use config::ViewerConfig;
pub use controller::{AnimationController, PlaybackState, Transition};
pub use error::{Error, Result};
pub use loader::{LoadEvent, Loader, Model, Texture};
pub use registry::{ClipName, ClipRegistry};
pub use rig::{NodeTransform, Rig, Skin};
pub use viewer::Viewer;
