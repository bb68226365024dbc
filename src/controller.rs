//! Playback state of one animated subject.
//!
//! The [`AnimationController`] decides which clip is active and hands the
//! actual blending to its [`Mixer`]. Starting the first clip is a direct start;
//! every later switch is a cross-fade over [`blend_duration`] seconds, with the
//! incoming clip playing from its start right away.
//!
//! [`AnimationController`]: struct.AnimationController.html
//! [`Mixer`]: ../animation/struct.Mixer.html
//! [`blend_duration`]: struct.AnimationController.html#method.blend_duration

use std::time::Instant;

use animation::{Action, Mixer};
use error::Result;
use registry::{ClipName, ClipRegistry};
use rig::Rig;

/// Default cross-fade duration, in seconds.
pub const DEFAULT_BLEND_DURATION: f32 = 0.5;

/// How the active clip was entered.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    /// Started without blending: the first clip, or a restart of the active one.
    Direct,

    /// Blended in from another clip.
    CrossFade {
        /// The clip that was faded out.
        from: ClipName,
        /// Length of the blend in seconds.
        duration: f32,
    },
}

/// The active clip and its playback handle.
#[derive(Clone, Debug)]
pub struct PlaybackState {
    /// Name of the active clip.
    pub clip: ClipName,
    /// Handle to the mixer action playing `clip`.
    pub action: Action,
    /// When the clip became active.
    pub started: Instant,
    /// How the clip became active.
    pub transition: Transition,
}

/// Owns the playback state of one subject and mediates all clip transitions.
pub struct AnimationController {
    mixer: Mixer,
    playback: Option<PlaybackState>,
    blend_duration: f32,
}

impl AnimationController {
    /// Creates a controller animating `rig`, using the default blend duration.
    pub fn new(rig: Rig) -> Self {
        Self::with_blend_duration(rig, DEFAULT_BLEND_DURATION)
    }

    /// Creates a controller animating `rig`, cross-fading over `blend_duration` seconds.
    pub fn with_blend_duration(
        rig: Rig,
        blend_duration: f32,
    ) -> Self {
        AnimationController {
            mixer: Mixer::new(rig),
            playback: None,
            blend_duration: blend_duration.max(0.0),
        }
    }

    /// Makes the clip registered as `name` the active one.
    ///
    /// The clip's action is rewound and given full weight and normal speed. If
    /// another clip was active, it is cross-faded out while the new one starts
    /// playing immediately; otherwise the new clip simply starts.
    ///
    /// Fails with `ClipNotFound` if `name` is not registered, in which case
    /// nothing changes.
    pub fn play_clip(
        &mut self,
        registry: &ClipRegistry,
        name: &str,
    ) -> Result<()> {
        let clip = registry.get(name)?;
        let mut next = self.mixer.clip_action(clip);
        next.enable()
            .resume()
            .set_effective_time_scale(1.0)
            .set_effective_weight(1.0)
            .set_time(0.0);

        let duration = self.blend_duration;
        let transition = match self.playback {
            Some(ref mut current) => {
                if current.action == next {
                    Transition::Direct
                } else {
                    current.action.cross_fade_to(&next, duration, true);
                    Transition::CrossFade {
                        from: current.clip.clone(),
                        duration,
                    }
                }
            }
            None => Transition::Direct,
        };
        next.play();

        match transition {
            Transition::CrossFade { ref from, duration } => {
                info!("Cross-fading {:?} -> {:?} over {}s", from.as_str(), name, duration)
            }
            Transition::Direct => info!("Playing {:?}", name),
        }
        self.playback = Some(PlaybackState {
            clip: ClipName::from(name),
            action: next,
            started: Instant::now(),
            transition,
        });
        Ok(())
    }

    /// Plays `b` if `a` is the active clip, and `a` otherwise.
    pub fn toggle(
        &mut self,
        registry: &ClipRegistry,
        a: &str,
        b: &str,
    ) -> Result<()> {
        let target = if self.current_clip_name() == a { b } else { a };
        self.play_clip(registry, target)
    }

    /// Name of the active clip, or an empty string if nothing was played yet.
    pub fn current_clip_name(&self) -> &str {
        self.playback
            .as_ref()
            .map_or("", |playback| playback.clip.as_str())
    }

    /// Advances all playback and blending by `delta_time` seconds.
    ///
    /// Must be called once per frame, whether or not a cross-fade is in
    /// flight. Does nothing until a clip has been played.
    pub fn advance(
        &mut self,
        delta_time: f32,
    ) {
        if self.playback.is_none() {
            return;
        }
        self.mixer.update(delta_time.max(0.0));
    }

    /// The active clip, if any.
    pub fn playback(&self) -> Option<&PlaybackState> {
        self.playback.as_ref()
    }

    /// The mixer blending this subject's actions.
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Cross-fade duration in seconds.
    pub fn blend_duration(&self) -> f32 {
        self.blend_duration
    }
}
