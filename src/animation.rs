//! Animation system.
//!
//! ## Introduction
//!
//! The animation system is designed around three structures, namely
//! [`Action`], [`Clip`], and [`Mixer`].
//!
//! ### Action
//!
//! An [`Action`] controls the playback properties of an animation.
//! Methods such as [`play`], [`pause`], [`fade_in`] and [`cross_fade_to`] are
//! provided to control a single animation at runtime.
//!
//! Actions must be created and updated by a [`Mixer`]. Requests made through an
//! action take effect on the next [`Mixer::update`], in the order they were made.
//!
//! ### Mixer
//!
//! An animation [`Mixer`] owns the [`Rig`] it animates and schedules the
//! playback of actions. Every update, the weighted samples of all running
//! actions are blended per joint property and written into the rig.
//!
//! ### Clip
//!
//! An animation [`Clip`] defines the keyframes of an animation and the names of
//! the joints they target. Clips are usually imported from glTF.
//!
//! ## Walkthrough
//!
//! ```rust,no_run
//! # use clipfade::{animation, loader};
//! # fn run() -> clipfade::Result<()> {
//! let model = loader::import_model("FireFighter.gltf")?;
//! let mut mixer = animation::Mixer::new(model.rig.clone());
//!
//! let mut idle = mixer.clip_action(&model.clips[0]);
//! idle.play();
//!
//! let gesture = loader::import_clips("Pointing Gesture.gltf")?.remove(0);
//! let mut pointing = mixer.clip_action(&gesture);
//! idle.cross_fade_to(&pointing, 0.5, true);
//! pointing.play();
//!
//! loop {
//!     mixer.update(1.0 / 60.0);
//! }
//! # }
//! ```
//!
//! [`fade_in`]: struct.Action.html#method.fade_in
//! [`cross_fade_to`]: struct.Action.html#method.cross_fade_to
//! [`play`]: struct.Action.html#method.play
//! [`pause`]: struct.Action.html#method.pause
//!
//! [`Action`]: struct.Action.html
//! [`Clip`]: struct.Clip.html
//! [`Mixer`]: struct.Mixer.html
//! [`Mixer::update`]: struct.Mixer.html#method.update
//! [`Rig`]: ../rig/struct.Rig.html

use cgmath;
use froggy;
use mint;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::mpsc;

use cgmath::VectorSpace;
use rig::{JointIndex, Rig};

/// Describes the interpolation behaviour between keyframes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Interpolation {
    /// Immediate change between keyframe values.
    Discrete,

    /// Linear interpolation between keyframe values.
    ///
    /// Orientations are spherically interpolated.
    Linear,
}

/// Describes the looping behaviour of an [`Action`].
///
/// [`Action`]: struct.Action.html
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LoopMode {
    /// Play the clip in forward order exactly once, i.e. do not loop at all.
    Once,

    /// Play the clip in forward order, repeating from the start.
    Repeat {
        /// The maximum number of repetitions.
        ///
        /// When set to `None`, the loop will repeat indefinitely.
        limit: Option<u32>,
    },

    /// Play the clip alternatively in forward and reverse order.
    PingPong {
        /// The maximum number of direction changes.
        ///
        /// When set to `None`, the loop will repeat indefinitely.
        limit: Option<u32>,
    },
}

/// Describes the target property of an animation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Binding {
    /// Targets the position of a joint.
    ///
    /// The corresponding keyframe values must be [`Vector3`].
    ///
    /// [`Vector3`]: enum.Values.html#variant.Vector3
    Position,

    /// Targets the orientation of a joint.
    ///
    /// The corresponding keyframe values must be [`Quaternion`].
    ///
    /// [`Quaternion`]: enum.Values.html#variant.Quaternion
    Orientation,

    /// Targets the scale of a joint.
    ///
    /// The corresponding keyframe values must be [`Scalar`].
    ///
    /// [`Scalar`]: enum.Values.html#variant.Scalar
    Scale,
}

/// An index into the frames of a track.
enum FrameRef {
    /// The time is before the start of the frames.
    Unstarted,

    /// The time is between the given frame and the next one.
    InProgress(usize),

    /// The time is at or after the last frame.
    Ended,
}

/// The keyframe values of a [`Track`].
///
/// [`Track`]: struct.Track.html
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    /// Quaternion keyframes.
    Quaternion(Vec<mint::Quaternion<f32>>),

    /// Scalar keyframes.
    ///
    /// ## Note
    ///
    /// Only uniform scaling is supported, hence the glTF importer takes the
    /// Y axis as the scaling direction, ignoring any scaling in the X and Z axes.
    Scalar(Vec<f32>),

    /// 3D vector keyframes.
    Vector3(Vec<mint::Vector3<f32>>),
}

impl Values {
    /// Number of keyframe values.
    pub fn len(&self) -> usize {
        match *self {
            Values::Quaternion(ref v) => v.len(),
            Values::Scalar(ref v) => v.len(),
            Values::Vector3(ref v) => v.len(),
        }
    }

    /// Returns `true` if there are no keyframe values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A track of animation keyframes.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    /// The joint property this track updates.
    pub binding: Binding,

    /// The keyframe time values.
    pub times: Vec<f32>,

    /// The keyframe values.
    pub values: Values,

    /// Specifies the interpolation strategy between keyframes.
    pub interpolation: Interpolation,
}

/// A reusable set of keyframe tracks which represent an animation.
#[derive(Clone, Debug)]
pub struct Clip {
    /// A name for this clip.
    pub name: String,

    /// Length of the clip in seconds, i.e. the time of its last keyframe.
    pub duration: f32,

    /// The animation keyframe tracks, paired with the name of the joint they target.
    pub tracks: Vec<(Track, String)>,
}

impl Clip {
    /// Creates a clip, computing its duration from the tracks.
    pub fn new<S: Into<String>>(
        name: S,
        tracks: Vec<(Track, String)>,
    ) -> Self {
        let duration = tracks
            .iter()
            .filter_map(|&(ref track, _)| track.times.last().cloned())
            .fold(0.0_f32, f32::max);
        Clip {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Returns the same clip under a different name.
    pub fn renamed<S: Into<String>>(
        mut self,
        name: S,
    ) -> Self {
        self.name = name.into();
        self
    }
}

/// A sampled track value.
#[derive(Clone, Copy, Debug)]
enum Sample {
    Orientation(cgmath::Quaternion<f32>),
    Position(cgmath::Vector3<f32>),
    Scale(f32),
}

impl Sample {
    fn mix(
        self,
        other: Sample,
        s: f32,
    ) -> Sample {
        match (self, other) {
            (Sample::Orientation(a), Sample::Orientation(b)) => Sample::Orientation(a.slerp(b, s)),
            (Sample::Position(a), Sample::Position(b)) => Sample::Position(a.lerp(b, s)),
            (Sample::Scale(a), Sample::Scale(b)) => Sample::Scale(a * (1.0 - s) + b * s),
            (a, _) => a,
        }
    }
}

impl Track {
    fn frame_at_time(
        &self,
        t: f32,
    ) -> Option<FrameRef> {
        let first = *self.times.first()?;
        if t < first {
            // The clip hasn't started yet.
            return Some(FrameRef::Unstarted);
        }

        let last = self.times.len() - 1;
        if last == 0 || t >= self.times[last] {
            // The clip has ended.
            return Some(FrameRef::Ended);
        }

        let mut i = 0;
        while t > self.times[i + 1] {
            i += 1;
        }

        Some(FrameRef::InProgress(i))
    }

    fn value_at(
        &self,
        index: usize,
    ) -> Option<Sample> {
        match self.values {
            Values::Quaternion(ref v) => v.get(index).map(|&q| Sample::Orientation(q.into())),
            Values::Vector3(ref v) => v.get(index).map(|&p| Sample::Position(p.into())),
            Values::Scalar(ref v) => v.get(index).map(|&s| Sample::Scale(s)),
        }
    }

    /// Evaluates the track at time `t`, clamping outside of the keyframe range.
    fn sample(
        &self,
        t: f32,
    ) -> Option<Sample> {
        let frame_index = match self.frame_at_time(t)? {
            FrameRef::Unstarted => return self.value_at(0),
            FrameRef::Ended => return self.value_at(self.times.len() - 1),
            FrameRef::InProgress(i) => i,
        };
        let start = self.value_at(frame_index)?;
        if self.interpolation == Interpolation::Discrete {
            return Some(start);
        }
        let end = self.value_at(frame_index + 1)?;
        let frame_start_time = self.times[frame_index];
        let frame_delta_time = self.times[frame_index + 1] - frame_start_time;
        if frame_delta_time <= 0.0 {
            return Some(end);
        }
        // Interpolation constant in range `[0.0, 1.0]` between `frame[i]`
        // and `frame[i + 1]`.
        let s = (t - frame_start_time) / frame_delta_time;
        Some(start.mix(end, s))
    }
}

/// A linear ramp over mixer time, used for weight fades and time-scale warps.
#[derive(Clone, Copy, Debug)]
struct Ramp {
    start: f32,
    end: f32,
    from: f32,
    to: f32,
}

impl Ramp {
    fn new(
        now: f32,
        duration: f32,
        from: f32,
        to: f32,
    ) -> Self {
        Ramp {
            start: now,
            end: now + duration.max(0.0),
            from,
            to,
        }
    }

    fn value(
        &self,
        time: f32,
    ) -> f32 {
        if time >= self.end {
            self.to
        } else if time <= self.start {
            self.from
        } else {
            let s = (time - self.start) / (self.end - self.start);
            self.from + (self.to - self.from) * s
        }
    }

    fn is_finished(
        &self,
        time: f32,
    ) -> bool {
        time >= self.end
    }
}

/// Message data sent from `Action` to `Mixer` over a channel.
enum Operation {
    Enable,
    Disable,
    Pause,
    Resume,
    Play,
    Stop,
    SetLoopMode(LoopMode),
    SetTime(f32),
    SetTimeScale(f32),
    SetWeight(f32),
    Fade { duration: f32, from: f32, to: f32 },
    CrossFadeFrom {
        source: froggy::WeakPointer<ActionData>,
        duration: f32,
        warp: bool,
    },
}

/// Message type sent from `Action` to `Mixer`.
type Message = (froggy::WeakPointer<ActionData>, Operation);

/// Controls the playback properties of an animation.
#[derive(Clone, Debug)]
pub struct Action {
    /// Message channel to parent mixer.
    tx: mpsc::Sender<Message>,

    /// Pointer to the action data held by the parent mixer.
    pointer: froggy::Pointer<ActionData>,
}

impl PartialEq for Action {
    fn eq(
        &self,
        other: &Action,
    ) -> bool {
        self.pointer == other.pointer
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.pointer.hash(state);
    }
}

/// Internal data for an animation action.
struct ActionData {
    /// Name of the clip this action plays.
    clip_name: String,

    /// Length of the clip in seconds.
    duration: f32,

    /// Tracks of the clip that resolved to a joint of the mixer's rig.
    bindings: Vec<(Track, JointIndex)>,

    /// A disabled action has no impact.
    enabled: bool,

    /// Set by `play`, cleared by `stop`; only running actions are updated.
    running: bool,

    /// A paused action keeps contributing its current pose.
    paused: bool,

    /// Specifies the looping behaviour of this action.
    loop_mode: LoopMode,

    /// The local time of this action in seconds, in `[0.0, duration]`.
    local_time: f32,

    /// Playback direction for ping-pong loops.
    direction: f32,

    time_scale: f32,
    weight: f32,
    effective_time_scale: f32,
    effective_weight: f32,

    fade: Option<Ramp>,
    warp: Option<Ramp>,
}

/// Snapshot of an [`Action`] as last seen by its [`Mixer`].
///
/// [`Action`]: struct.Action.html
/// [`Mixer`]: struct.Mixer.html
#[derive(Clone, Debug, PartialEq)]
pub struct ActionState {
    /// Name of the clip being played.
    pub clip_name: String,
    /// Whether the action is enabled.
    pub enabled: bool,
    /// Whether the action has been scheduled with `play`.
    pub running: bool,
    /// Whether the action is paused.
    pub paused: bool,
    /// Local time in seconds.
    pub time: f32,
    /// Weight after fading was applied.
    pub effective_weight: f32,
    /// Time scale after warping was applied.
    pub effective_time_scale: f32,
    /// Whether a weight fade is in flight.
    pub fading: bool,
    /// Whether a time-scale warp is in flight.
    pub warping: bool,
}

/// Blended value of one joint property for the current update.
struct Accumulator {
    weight: f32,
    value: Option<Sample>,
}

/// Scheduler for the playback of animation actions.
///
/// Use this to create actions for clips and to update them every frame.
pub struct Mixer {
    root: Rig,
    actions: froggy::Storage<ActionData>,
    cache: HashMap<String, Action>,
    accumulators: HashMap<(JointIndex, Binding), Accumulator>,
    time: f32,
    rx: mpsc::Receiver<Message>,
    tx: mpsc::Sender<Message>,
}

impl Action {
    fn send(
        &mut self,
        operation: Operation,
    ) -> &mut Self {
        let message = (self.pointer.downgrade(), operation);
        let _ = self.tx.send(message);
        self
    }

    /// Enables the animation action.
    pub fn enable(&mut self) -> &mut Self {
        self.send(Operation::Enable)
    }

    /// Disables the animation action.
    pub fn disable(&mut self) -> &mut Self {
        self.send(Operation::Disable)
    }

    /// Pauses the animation action.
    pub fn pause(&mut self) -> &mut Self {
        self.send(Operation::Pause)
    }

    /// Clears the paused flag without scheduling the action.
    pub fn resume(&mut self) -> &mut Self {
        self.send(Operation::Resume)
    }

    /// Plays the animation action.
    pub fn play(&mut self) -> &mut Self {
        self.send(Operation::Play)
    }

    /// Stops the animation action and resets it to the start of its clip.
    pub fn stop(&mut self) -> &mut Self {
        self.send(Operation::Stop)
    }

    /// Sets the animation loop mode.
    pub fn set_loop_mode(
        &mut self,
        loop_mode: LoopMode,
    ) -> &mut Self {
        self.send(Operation::SetLoopMode(loop_mode))
    }

    /// Moves the local time cursor, in seconds.
    pub fn set_time(
        &mut self,
        time: f32,
    ) -> &mut Self {
        self.send(Operation::SetTime(time))
    }

    /// Sets the time scale and cancels any warp in flight.
    pub fn set_effective_time_scale(
        &mut self,
        time_scale: f32,
    ) -> &mut Self {
        self.send(Operation::SetTimeScale(time_scale))
    }

    /// Sets the weight and cancels any fade in flight.
    pub fn set_effective_weight(
        &mut self,
        weight: f32,
    ) -> &mut Self {
        self.send(Operation::SetWeight(weight))
    }

    /// Ramps the weight from 0 to 1 over `duration` seconds.
    pub fn fade_in(
        &mut self,
        duration: f32,
    ) -> &mut Self {
        self.send(Operation::Fade { duration, from: 0.0, to: 1.0 })
    }

    /// Ramps the weight from 1 to 0 over `duration` seconds, then disables the action.
    pub fn fade_out(
        &mut self,
        duration: f32,
    ) -> &mut Self {
        self.send(Operation::Fade { duration, from: 1.0, to: 0.0 })
    }

    /// Fades this action out and `next` in over the same `duration`.
    ///
    /// With `warp` set, the time scales of both actions are ramped as well so
    /// that clips of different lengths stay in step during the blend.
    pub fn cross_fade_to(
        &mut self,
        next: &Action,
        duration: f32,
        warp: bool,
    ) -> &mut Self {
        let message = (
            next.pointer.downgrade(),
            Operation::CrossFadeFrom {
                source: self.pointer.downgrade(),
                duration,
                warp,
            },
        );
        let _ = self.tx.send(message);
        self
    }
}

impl Mixer {
    fn process_messages(&mut self) {
        while let Ok((weak_ptr, operation)) = self.rx.try_recv() {
            let ptr = match weak_ptr.upgrade() {
                Ok(ptr) => ptr,
                Err(_) => continue,
            };
            let now = self.time;
            match operation {
                Operation::CrossFadeFrom { source, duration, warp } => {
                    let source = match source.upgrade() {
                        Ok(source) => source,
                        Err(_) => continue,
                    };
                    let out_duration = self.actions[&source].duration;
                    let in_duration = self.actions[&ptr].duration;
                    let warp = warp && out_duration > 0.0 && in_duration > 0.0;
                    {
                        let outgoing = &mut self.actions[&source];
                        outgoing.schedule_fade(now, duration, 1.0, 0.0);
                        if warp {
                            outgoing.schedule_warp(now, duration, 1.0, out_duration / in_duration);
                        }
                    }
                    let incoming = &mut self.actions[&ptr];
                    incoming.schedule_fade(now, duration, 0.0, 1.0);
                    if warp {
                        incoming.schedule_warp(now, duration, in_duration / out_duration, 1.0);
                    }
                }
                other => self.actions[&ptr].apply(other, now),
            }
        }
    }

    fn update_actions(
        &mut self,
        delta_time: f32,
    ) {
        let now = self.time;
        for acc in self.accumulators.values_mut() {
            acc.weight = 0.0;
            acc.value = None;
        }
        for action in self.actions.iter_mut() {
            if action.running {
                action.update(now, delta_time, &mut self.accumulators);
            }
        }
    }

    fn apply_accumulators(&mut self) {
        for (&(index, binding), acc) in &self.accumulators {
            let joint = match self.root.joint_mut(index) {
                Some(joint) => joint,
                None => continue,
            };
            let rest = match binding {
                Binding::Position => {
                    let p = joint.rest.position;
                    Sample::Position(cgmath::Vector3::new(p.x, p.y, p.z))
                }
                Binding::Orientation => Sample::Orientation(joint.rest.orientation.into()),
                Binding::Scale => Sample::Scale(joint.rest.scale),
            };
            let value = match acc.value {
                Some(value) if acc.weight < 1.0 => value.mix(rest, 1.0 - acc.weight),
                Some(value) => value,
                None => rest,
            };
            match value {
                Sample::Position(v) => joint.local.position = [v.x, v.y, v.z].into(),
                Sample::Orientation(q) => joint.local.orientation = q.into(),
                Sample::Scale(s) => joint.local.scale = s,
            }
        }
    }

    /// Creates a new animation mixer animating `root`.
    pub fn new(root: Rig) -> Self {
        let actions = froggy::Storage::new();
        let (tx, rx) = mpsc::channel();
        Mixer {
            root,
            actions,
            cache: HashMap::new(),
            accumulators: HashMap::new(),
            time: 0.0,
            rx,
            tx,
        }
    }

    /// Returns the [`Action`] for `clip`, creating it on first use.
    ///
    /// Actions are cached by clip name, so asking twice for the same clip
    /// yields handles to the same action. If the keyframes behind a cached
    /// name have changed, the action is rebound to the new ones. A new action
    /// is enabled but not yet playing.
    ///
    /// [`Action`]: struct.Action.html
    pub fn clip_action(
        &mut self,
        clip: &Clip,
    ) -> Action {
        if let Some(action) = self.cache.get(&clip.name) {
            let data = &mut self.actions[&action.pointer];
            if !data.plays(clip, &self.root) {
                debug!("Clip {:?} changed, rebinding its action", clip.name);
                data.rebind(clip, &self.root);
            }
            return action.clone();
        }
        let action_data = ActionData::new(clip, &self.root);
        let pointer = self.actions.create(action_data);
        let tx = self.tx.clone();
        let action = Action { tx, pointer };
        debug!("Created action for clip {:?}", clip.name);
        self.cache.insert(clip.name.clone(), action.clone());
        action
    }

    /// Returns the action previously created for the named clip.
    pub fn existing_action(
        &self,
        clip_name: &str,
    ) -> Option<&Action> {
        self.cache.get(clip_name)
    }

    /// Returns the state of `action` as of the last update.
    ///
    /// Returns `None` for actions created by another mixer.
    pub fn state(
        &self,
        action: &Action,
    ) -> Option<ActionState> {
        if !self.cache.values().any(|known| known == action) {
            return None;
        }
        Some(self.actions[&action.pointer].state())
    }

    /// Total time the mixer has been advanced by, in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// The rig this mixer animates.
    pub fn root(&self) -> &Rig {
        &self.root
    }

    /// Updates the actions owned by the mixer and poses the rig.
    pub fn update(
        &mut self,
        delta_time: f32,
    ) {
        self.process_messages();
        self.time += delta_time;
        self.update_actions(delta_time);
        self.apply_accumulators();
        self.actions.sync_pending();
    }
}

impl ActionData {
    fn bind(
        clip: &Clip,
        root: &Rig,
    ) -> Vec<(Track, JointIndex)> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        for &(ref track, ref target) in &clip.tracks {
            match root.find(target) {
                Some(index) => bindings.push((track.clone(), index)),
                None => warn!("Clip {:?}: no joint named {:?}, skipping track", clip.name, target),
            }
        }
        bindings
    }

    fn new(
        clip: &Clip,
        root: &Rig,
    ) -> Self {
        ActionData {
            clip_name: clip.name.clone(),
            duration: clip.duration,
            bindings: ActionData::bind(clip, root),
            enabled: true,
            running: false,
            paused: false,
            loop_mode: LoopMode::Repeat { limit: None },
            local_time: 0.0,
            direction: 1.0,
            time_scale: 1.0,
            weight: 1.0,
            effective_time_scale: 1.0,
            effective_weight: 1.0,
            fade: None,
            warp: None,
        }
    }

    /// Whether this action's bindings are the ones `clip` resolves to.
    fn plays(
        &self,
        clip: &Clip,
        root: &Rig,
    ) -> bool {
        let resolved = clip
            .tracks
            .iter()
            .filter_map(|&(ref track, ref target)| root.find(target).map(|index| (track, index)));
        self.duration == clip.duration
            && self.bindings.iter().map(|&(ref track, index)| (track, index)).eq(resolved)
    }

    /// Swaps in the keyframes of `clip`, keeping the playback state.
    fn rebind(
        &mut self,
        clip: &Clip,
        root: &Rig,
    ) {
        self.bindings = ActionData::bind(clip, root);
        self.duration = clip.duration;
        self.local_time = self.local_time.min(clip.duration);
    }

    fn state(&self) -> ActionState {
        ActionState {
            clip_name: self.clip_name.clone(),
            enabled: self.enabled,
            running: self.running,
            paused: self.paused,
            time: self.local_time,
            effective_weight: self.effective_weight,
            effective_time_scale: self.effective_time_scale,
            fading: self.fade.is_some(),
            warping: self.warp.is_some(),
        }
    }

    fn apply(
        &mut self,
        operation: Operation,
        now: f32,
    ) {
        match operation {
            Operation::Enable => self.enabled = true,
            Operation::Disable => self.enabled = false,
            Operation::Pause => self.paused = true,
            Operation::Resume => self.paused = false,
            Operation::Play => {
                self.paused = false;
                self.enabled = true;
                self.running = true;
            }
            Operation::Stop => {
                self.running = false;
                self.paused = false;
                self.enabled = true;
                self.local_time = 0.0;
                self.direction = 1.0;
                self.fade = None;
                self.warp = None;
            }
            Operation::SetLoopMode(loop_mode) => {
                self.loop_mode = loop_mode;
                self.direction = 1.0;
            }
            Operation::SetTime(time) => self.local_time = time.max(0.0).min(self.duration),
            Operation::SetTimeScale(time_scale) => {
                self.time_scale = time_scale;
                self.effective_time_scale = if self.paused { 0.0 } else { time_scale };
                self.warp = None;
            }
            Operation::SetWeight(weight) => {
                self.weight = weight;
                self.effective_weight = if self.enabled { weight } else { 0.0 };
                self.fade = None;
            }
            Operation::Fade { duration, from, to } => self.schedule_fade(now, duration, from, to),
            Operation::CrossFadeFrom { .. } => {}
        }
    }

    fn schedule_fade(
        &mut self,
        now: f32,
        duration: f32,
        from: f32,
        to: f32,
    ) {
        self.fade = Some(Ramp::new(now, duration, from, to));
    }

    fn schedule_warp(
        &mut self,
        now: f32,
        duration: f32,
        from: f32,
        to: f32,
    ) {
        // Warp values are relative to the action's own time scale.
        let scale = if self.time_scale != 0.0 { self.time_scale } else { 1.0 };
        self.warp = Some(Ramp::new(now, duration, from / scale, to / scale));
    }

    fn update_weight(
        &mut self,
        now: f32,
    ) -> f32 {
        let mut weight = if self.enabled { self.weight } else { 0.0 };
        if let Some(fade) = self.fade {
            let value = fade.value(now);
            weight *= value;
            if fade.is_finished(now) {
                self.fade = None;
                if value == 0.0 {
                    self.enabled = false;
                }
            }
        }
        self.effective_weight = weight;
        weight
    }

    fn update_time_scale(
        &mut self,
        now: f32,
    ) -> f32 {
        let mut time_scale = 0.0;
        if !self.paused {
            time_scale = self.time_scale;
            if let Some(warp) = self.warp {
                time_scale *= warp.value(now);
                if warp.is_finished(now) {
                    self.warp = None;
                    if time_scale == 0.0 {
                        self.paused = true;
                    } else {
                        self.time_scale = time_scale;
                    }
                }
            }
        }
        self.effective_time_scale = time_scale;
        time_scale
    }

    /// Advances the local time, handling the loop mode at both ends of the clip.
    fn advance_time(
        &mut self,
        delta: f32,
    ) {
        let duration = self.duration;
        if duration <= 0.0 || delta == 0.0 {
            return;
        }

        self.local_time += delta * self.direction;
        match self.loop_mode {
            LoopMode::Once => {
                if self.local_time >= duration || self.local_time < 0.0 {
                    self.local_time = self.local_time.max(0.0).min(duration);
                    self.enabled = false;
                }
            }
            LoopMode::Repeat { limit } => {
                let time = self.local_time;
                if time >= duration || time < 0.0 {
                    // Number of clip boundaries crossed during this step.
                    let wraps = (time / duration).floor().abs() as u32;
                    match limit {
                        Some(remaining) if remaining < wraps => {
                            self.local_time = time.max(0.0).min(duration);
                            self.enabled = false;
                            self.loop_mode = LoopMode::Repeat { limit: Some(0) };
                        }
                        _ => {
                            self.local_time = time.rem_euclid(duration);
                            self.loop_mode = LoopMode::Repeat { limit: limit.map(|n| n - wraps) };
                        }
                    }
                }
            }
            LoopMode::PingPong { limit } => {
                let time = self.local_time;
                if time > duration || time < 0.0 {
                    // Moving forward the boundaries come as end, start, end, ...
                    // and moving backward as start, end, start, ...
                    let forward = time > duration;
                    let crossed = if forward {
                        (time / duration).floor()
                    } else {
                        (-time / duration).floor() + 1.0
                    };
                    let flips = crossed as u32;
                    match limit {
                        Some(remaining) if remaining < flips => {
                            let ends_at_end = forward == (remaining % 2 == 0);
                            self.local_time = if ends_at_end { duration } else { 0.0 };
                            self.enabled = false;
                            self.loop_mode = LoopMode::PingPong { limit: Some(0) };
                        }
                        _ => {
                            let phase = time.rem_euclid(2.0 * duration);
                            self.local_time = if phase > duration {
                                2.0 * duration - phase
                            } else {
                                phase
                            };
                            if flips % 2 == 1 {
                                self.direction = -self.direction;
                            }
                            self.loop_mode = LoopMode::PingPong { limit: limit.map(|n| n - flips) };
                        }
                    }
                }
            }
        }
    }

    /// Updates a single animation action and adds its weighted samples to `accumulators`.
    fn update(
        &mut self,
        now: f32,
        delta_time: f32,
        accumulators: &mut HashMap<(JointIndex, Binding), Accumulator>,
    ) {
        let weight = self.update_weight(now);
        let time_scale = self.update_time_scale(now);
        if self.enabled {
            self.advance_time(delta_time * time_scale);
        }

        for &(ref track, index) in &self.bindings {
            let acc = accumulators
                .entry((index, track.binding))
                .or_insert(Accumulator { weight: 0.0, value: None });
            if weight <= 0.0 {
                continue;
            }
            let sample = match track.sample(self.local_time) {
                Some(sample) => sample,
                None => continue,
            };
            let total = acc.weight + weight;
            acc.value = Some(match acc.value {
                Some(value) => value.mix(sample, weight / total),
                None => sample,
            });
            acc.weight = total;
        }
    }
}
