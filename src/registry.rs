//! Named clip storage.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use animation::Clip;
use error::{Error, Result};

/// Name under which a [`Clip`](../animation/struct.Clip.html) is registered.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClipName(String);

impl ClipName {
    /// Creates a clip name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        ClipName(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for ClipName {
    fn from(name: &'a str) -> Self {
        ClipName(name.to_string())
    }
}

impl From<String> for ClipName {
    fn from(name: String) -> Self {
        ClipName(name)
    }
}

impl Borrow<str> for ClipName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ClipName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ClipName {
    fn eq(
        &self,
        other: &str,
    ) -> bool {
        self.0 == other
    }
}

impl fmt::Display for ClipName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-only mapping from clip names to loaded clips.
///
/// Entries are never removed. Registering a name twice replaces the earlier
/// clip.
#[derive(Clone, Debug, Default)]
pub struct ClipRegistry {
    clips: HashMap<ClipName, Clip>,
}

impl ClipRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ClipRegistry::default()
    }

    /// Registers `clip` under `name`, replacing any earlier entry.
    ///
    /// The stored clip is renamed to `name`, so actions created from it are
    /// keyed by the registered name.
    pub fn register<N: Into<ClipName>>(
        &mut self,
        name: N,
        clip: Clip,
    ) {
        let name = name.into();
        let clip = clip.renamed(name.as_str());
        if self.clips.insert(name.clone(), clip).is_some() {
            debug!("Replaced clip {:?}", name.as_str());
        } else {
            info!("Registered clip {:?}", name.as_str());
        }
    }

    /// Looks up a clip.
    ///
    /// Fails with [`Error::ClipNotFound`] when `name` was never registered.
    ///
    /// [`Error::ClipNotFound`]: ../enum.Error.html#variant.ClipNotFound
    pub fn get(
        &self,
        name: &str,
    ) -> Result<&Clip> {
        self.clips
            .get(name)
            .ok_or_else(|| Error::ClipNotFound(name.to_string()))
    }

    /// Returns `true` if a clip is registered under `name`.
    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.clips.contains_key(name)
    }

    /// Iterates over the registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &ClipName> {
        self.clips.keys()
    }

    /// Number of registered clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Returns `true` if nothing was registered yet.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
