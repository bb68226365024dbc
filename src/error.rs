use gltf;
use image;

use std::{io, path, result};

#[cfg_attr(rustfmt, rustfmt_skip)]
quick_error! {
    #[doc = "Error encountered when loading assets or switching clips."]
    #[derive(Debug)]
    pub enum Error {
        #[doc = "A clip was requested that was never registered."]
        ClipNotFound(name: String) {
            description("clip not found")
            display("clip {:?} is not registered", name)
        }

        #[doc = "Standard I/O error."]
        Io(err: io::Error) {
            from()
            description("I/O error")
            display("I/O error: {}", err)
            cause(err)
        }

        #[doc = "glTF import error."]
        Gltf(err: gltf::Error) {
            from()
            description("glTF import error")
            display("glTF import error: {}", err)
            cause(err)
        }

        #[doc = "Image decoding error."]
        Image(err: image::ImageError) {
            from()
            description("image decoding error")
            display("image decoding error: {}", err)
            cause(err)
        }

        #[doc = "Keyframe data that cannot be played back."]
        InvalidTrack(reason: String) {
            description("invalid animation track")
            display("invalid animation track: {}", reason)
        }

        #[doc = "A loader worker panicked before finishing its job."]
        LoadPanicked(reason: String) {
            description("asset load panicked")
            display("asset load panicked: {}", reason)
        }

        #[doc = "A clip file without any animation in it."]
        NoAnimations(path: path::PathBuf) {
            description("no animations found")
            display("no animations found in {}", path.display())
        }

        #[doc = "A model file without any scene in it."]
        NoScene(path: path::PathBuf) {
            description("no scene found")
            display("no scene found in {}", path.display())
        }
    }
}

/// Result type used across the crate.
pub type Result<T> = result::Result<T, Error>;
