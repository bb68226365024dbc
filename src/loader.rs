//! `glTF` and texture loading.
//!
//! ### Implementation Notes
//!
//! * The order of function declarations matches the order of usage.
//! * The synchronous entry points are [`import_model`], [`import_clips`] and
//!   [`load_texture`]. [`Loader`] runs them on worker threads and reports the
//!   results as [`LoadEvent`]s.
//!
//! [`import_model`]: fn.import_model.html
//! [`import_clips`]: fn.import_clips.html
//! [`load_texture`]: fn.load_texture.html
//! [`Loader`]: struct.Loader.html
//! [`LoadEvent`]: enum.LoadEvent.html

use gltf;
use image;
use mint;

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::{panic, thread};

use animation::{Binding, Clip, Interpolation, Track, Values};
use error::{Error, Result};
use registry::ClipName;
use rig::{Joint, NodeTransform, Rig, Skin};

/// Decoded RGBA8 image.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub pixels: Vec<u8>,
    /// Whether the pixels are sRGB encoded.
    pub srgb: bool,
    /// Whether rows must be flipped on upload. glTF textures are not flipped.
    pub flip_y: bool,
}

/// A loaded character: its node hierarchy, skins and embedded clips.
#[derive(Clone, Debug)]
pub struct Model {
    /// Display name.
    pub name: String,
    /// Placement of the whole model in the world.
    pub transform: NodeTransform,
    /// Node hierarchy at rest.
    pub rig: Rig,
    /// Skins referencing joints of `rig`.
    pub skins: Vec<Skin>,
    /// Animations embedded in the model file, in file order.
    pub clips: Vec<Clip>,
    /// Texture applied to every mesh, once loaded.
    pub texture: Option<Texture>,
}

/// Name used to bind tracks to a node. Unnamed nodes are named after their index.
fn node_name(node: &gltf::Node) -> String {
    match node.name() {
        Some(name) => name.to_string(),
        None => format!("node{}", node.index()),
    }
}

fn load_rig(document: &gltf::Document) -> Rig {
    let mut parents = vec![None; document.nodes().len()];
    for node in document.nodes() {
        for child in node.children() {
            parents[child.index()] = Some(node.index());
        }
    }

    let joints = document
        .nodes()
        .map(|node| {
            // Decompose the transform to get the translation, rotation, and scale.
            let (translation, rotation, scale) = node.transform().decomposed();
            // Joints do not handle non-uniform scaling, so for now we'll choose Y
            // to be the scale factor in all directions.
            let rest = NodeTransform {
                position: translation.into(),
                orientation: rotation.into(),
                scale: scale[1],
            };
            Joint::new(node_name(&node), parents[node.index()], rest)
        })
        .collect();

    Rig::new(joints)
}

fn load_skin<'a>(
    skin: gltf::Skin<'a>,
    buffers: &[gltf::buffer::Data],
) -> Skin {
    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()].0[..]));
    let inverse_bind_matrices = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter.map(mint::ColumnMatrix4::from).collect(),
        None => Vec::new(),
    };
    Skin {
        name: skin.name().map(str::to_string),
        joints: skin.joints().map(|joint| joint.index()).collect(),
        inverse_bind_matrices,
    }
}

/// Keeps the value element of each `(in-tangent, value, out-tangent)` triplet.
fn strip_tangents<T: Copy>(values: Vec<T>) -> Vec<T> {
    values.chunks(3).filter_map(|chunk| chunk.get(1).cloned()).collect()
}

fn load_animation<'a>(
    animation: gltf::Animation<'a>,
    buffers: &[gltf::buffer::Data],
) -> Result<Clip> {
    use gltf::animation::Interpolation::*;
    use gltf::animation::util::ReadOutputs;

    let name = match animation.name() {
        Some(name) => name.to_string(),
        None => format!("animation{}", animation.index()),
    };

    let mut tracks = Vec::new();
    for channel in animation.channels() {
        let node = channel.target().node();
        let (interpolation, cubic) = match channel.sampler().interpolation() {
            Linear => (Interpolation::Linear, false),
            Step => (Interpolation::Discrete, false),
            // Tangents are dropped and the values are played back linearly.
            CubicSpline => (Interpolation::Linear, true),
        };
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()].0[..]));
        let times: Vec<f32> = match reader.read_inputs() {
            Some(iter) => iter.collect(),
            None => return Err(Error::InvalidTrack(format!("{}: channel without input", name))),
        };
        let outputs = match reader.read_outputs() {
            Some(outputs) => outputs,
            None => return Err(Error::InvalidTrack(format!("{}: channel without output", name))),
        };
        let (binding, values) = match outputs {
            ReadOutputs::Translations(iter) => {
                let mut values: Vec<mint::Vector3<f32>> = iter.map(mint::Vector3::from).collect();
                if cubic {
                    values = strip_tangents(values);
                }
                (Binding::Position, Values::Vector3(values))
            }
            ReadOutputs::Rotations(rotations) => {
                let mut values: Vec<mint::Quaternion<f32>> = rotations
                    .into_f32()
                    .map(mint::Quaternion::from)
                    .collect();
                if cubic {
                    values = strip_tangents(values);
                }
                (Binding::Orientation, Values::Quaternion(values))
            }
            ReadOutputs::Scales(iter) => {
                // Only uniform scaling is supported, so Y is the scale factor.
                let mut values: Vec<f32> = iter.map(|s| s[1]).collect();
                if cubic {
                    values = strip_tangents(values);
                }
                (Binding::Scale, Values::Scalar(values))
            }
            ReadOutputs::MorphTargetWeights(_) => {
                debug!("{}: skipping morph target weights of {}", name, node_name(&node));
                continue;
            }
        };
        if times.is_empty() || values.len() != times.len() {
            return Err(Error::InvalidTrack(format!(
                "{}: {} keyframe times but {} values for {}",
                name,
                times.len(),
                values.len(),
                node_name(&node)
            )));
        }
        tracks.push((
            Track {
                binding,
                interpolation,
                times,
                values,
            },
            // Target the joint by name so clips from other files bind too.
            node_name(&node),
        ));
    }

    Ok(Clip::new(name, tracks))
}

fn load_clips(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<Clip>> {
    document
        .animations()
        .map(|animation| load_animation(animation, buffers))
        .collect()
}

fn load_model(
    name: String,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    path: &Path,
) -> Result<Model> {
    if document.scenes().len() == 0 {
        return Err(Error::NoScene(path.to_path_buf()));
    }
    if document.scenes().len() > 1 {
        warn!("Multiple scenes found in {}, all nodes are loaded into one rig", path.display());
    }

    let rig = load_rig(document);
    let skins = document
        .skins()
        .map(|skin| load_skin(skin, buffers))
        .collect();
    let clips = load_clips(document, buffers)?;
    info!(
        "Loaded model {:?}: {} joints, {} clips",
        name,
        rig.len(),
        clips.len()
    );

    Ok(Model {
        name,
        transform: NodeTransform::default(),
        rig,
        skins,
        clips,
        texture: None,
    })
}

/// Loads a model from a glTF 2.0 file.
///
/// The model is named after the file stem.
pub fn import_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    info!("Loading glTF model {}", path.display());
    let (document, buffers, _) = gltf::import(path)?;
    let name = path.file_stem()
        .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned());
    load_model(name, &document, &buffers, path)
}

/// Loads a model from glTF 2.0 data in memory (`.gltf` with embedded buffers, or `.glb`).
pub fn model_from_slice<S: Into<String>>(
    name: S,
    bytes: &[u8],
) -> Result<Model> {
    let (document, buffers, _) = gltf::import_slice(bytes)?;
    load_model(name.into(), &document, &buffers, Path::new("<memory>"))
}

/// Loads every animation of a glTF 2.0 file as a clip.
///
/// Fails with `NoAnimations` if the file has none.
pub fn import_clips<P: AsRef<Path>>(path: P) -> Result<Vec<Clip>> {
    let path = path.as_ref();
    info!("Loading glTF clips {}", path.display());
    let (document, buffers, _) = gltf::import(path)?;
    let clips = load_clips(&document, &buffers)?;
    if clips.is_empty() {
        return Err(Error::NoAnimations(path.to_path_buf()));
    }
    Ok(clips)
}

/// Loads every animation of in-memory glTF 2.0 data as a clip.
pub fn clips_from_slice(bytes: &[u8]) -> Result<Vec<Clip>> {
    let (document, buffers, _) = gltf::import_slice(bytes)?;
    let clips = load_clips(&document, &buffers)?;
    if clips.is_empty() {
        return Err(Error::NoAnimations(PathBuf::from("<memory>")));
    }
    Ok(clips)
}

/// Decodes an image file into an sRGB RGBA8 texture laid out for glTF meshes.
pub fn load_texture<P: AsRef<Path>>(path: P) -> Result<Texture> {
    let path = path.as_ref();
    info!("Loading texture {}", path.display());
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(Texture {
        width,
        height,
        pixels: image.into_raw(),
        srgb: true,
        flip_y: false,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Completion report of a [`Loader`](struct.Loader.html) request.
#[derive(Debug)]
pub enum LoadEvent {
    /// A model request finished.
    Model(PathBuf, Result<Model>),
    /// A clip request finished. The clip is the first animation of its file.
    Clip(ClipName, Result<Clip>),
    /// A texture request finished.
    Texture(PathBuf, Result<Texture>),
}

/// Runs asset loads on worker threads.
///
/// Requests never block. Each one produces exactly one [`LoadEvent`], which is
/// handed out by [`poll`] once the load has finished. A load that panics is
/// reported as a `LoadPanicked` error. There is no cancellation and no
/// timeout.
///
/// [`LoadEvent`]: enum.LoadEvent.html
/// [`poll`]: struct.Loader.html#method.poll
pub struct Loader {
    tx: mpsc::Sender<LoadEvent>,
    rx: mpsc::Receiver<LoadEvent>,
    pending: usize,
}

impl Loader {
    /// Creates a loader with no requests in flight.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Loader { tx, rx, pending: 0 }
    }

    fn spawn<T, F, E>(
        &mut self,
        label: String,
        job: F,
        event: E,
    ) where
        T: 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
        E: FnOnce(Result<T>) -> LoadEvent + Send + 'static,
    {
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("load {}", label))
            .spawn(move || {
                // A panicking job still owes its requester one event.
                let result = match panic::catch_unwind(panic::AssertUnwindSafe(job)) {
                    Ok(result) => result,
                    Err(payload) => Err(Error::LoadPanicked(panic_message(&*payload))),
                };
                let _ = tx.send(event(result));
            });
        match spawned {
            Ok(_) => self.pending += 1,
            Err(err) => error!("Unable to start loading {}: {}", label, err),
        }
    }

    /// Requests a model.
    pub fn load_model<P: Into<PathBuf>>(
        &mut self,
        path: P,
    ) {
        let path = path.into();
        let target = path.clone();
        self.spawn(
            path.display().to_string(),
            move || import_model(&path),
            move |result| LoadEvent::Model(target, result),
        );
    }

    /// Requests the clip stored in `path`, to be known as `name`.
    pub fn load_clip<N: Into<ClipName>, P: Into<PathBuf>>(
        &mut self,
        name: N,
        path: P,
    ) {
        let name = name.into();
        let path = path.into();
        let clip_name = name.clone();
        self.spawn(
            name.to_string(),
            move || import_clips(&path).map(|mut clips| clips.remove(0).renamed(clip_name.as_str())),
            move |result| LoadEvent::Clip(name, result),
        );
    }

    /// Requests a texture.
    pub fn load_texture<P: Into<PathBuf>>(
        &mut self,
        path: P,
    ) {
        let path = path.into();
        let target = path.clone();
        self.spawn(
            path.display().to_string(),
            move || load_texture(&path),
            move |result| LoadEvent::Texture(target, result),
        );
    }

    /// Returns every load that finished since the last call, without blocking.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let events: Vec<_> = self.rx.try_iter().collect();
        self.pending -= events.len().min(self.pending);
        events
    }

    /// Number of requests that have not been handed out by `poll` yet.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Default for Loader {
    fn default() -> Self {
        Loader::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn panicking_job_is_reported() {
        let mut loader = Loader::new();
        loader.spawn(
            "broken".to_string(),
            || -> Result<Texture> { panic!("decoder blew up") },
            |result| LoadEvent::Texture(PathBuf::from("broken.png"), result),
        );
        assert_eq!(loader.pending(), 1);

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while events.is_empty() && Instant::now() < deadline {
            events = loader.poll();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(loader.pending(), 0);
        match events.pop() {
            Some(LoadEvent::Texture(path, Err(Error::LoadPanicked(reason)))) => {
                assert_eq!(path, PathBuf::from("broken.png"));
                assert!(reason.contains("decoder blew up"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
