// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ownership of the active sequence and its playback.
//!
//! A session owns one sequence, one playback controller and the host camera.
//! UI code drives it through the edit and transport methods and registers
//! observers to learn when to redraw. When UI events arrive on another
//! thread, share the session with [`CameraSession::into_shared`] and lock it
//! from both the frame callback and the UI.

use crate::clock::{Clock, MonotonicClock};
use crate::config::SequencerConfig;
use crate::host::{CameraHost, CameraMode};
use crate::keyframe::{EaseType, Keyframe, KeyframeId, Pose};
use crate::playback::{PlaybackController, PlaybackEvent};
use crate::sequence::Sequence;
use crate::store::{SequenceStore, StoreError};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// Change notifications for observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Keyframes, durations or eases changed
    SequenceChanged,
    /// A new or loaded sequence replaced the active one
    SequenceReplaced,
    /// The host camera mode was toggled
    CameraModeChanged(CameraMode),
    /// Transport event from playback
    Playback(PlaybackEvent),
}

/// Callback invoked for every session event
pub type Observer = Box<dyn FnMut(&SessionEvent) + Send>;

/// Session shared between the frame callback and UI threads
pub type SharedSession<H, C = MonotonicClock> = Arc<Mutex<CameraSession<H, C>>>;

/// The active camera sequence, its playback and the host camera
pub struct CameraSession<H: CameraHost, C: Clock = MonotonicClock> {
    config: SequencerConfig,
    sequence: Sequence,
    playback: PlaybackController<C>,
    host: H,
    store: SequenceStore,
    observers: Vec<Observer>,
}

impl<H: CameraHost> CameraSession<H, MonotonicClock> {
    /// Create a session driven by the wall clock
    pub fn new(config: SequencerConfig, host: H) -> Self {
        Self::with_clock(config, host, MonotonicClock::new())
    }
}

impl<H: CameraHost, C: Clock> CameraSession<H, C> {
    /// Create a session driven by `clock`
    pub fn with_clock(config: SequencerConfig, host: H, clock: C) -> Self {
        Self {
            sequence: Sequence::new(config.default_keyframe_duration_ms),
            playback: PlaybackController::with_clock(clock, config.looping),
            store: SequenceStore::new(config.sequences_dir.clone()),
            config,
            host,
            observers: Vec::new(),
        }
    }

    /// Wrap the session for use from several threads
    pub fn into_shared(self) -> SharedSession<H, C> {
        Arc::new(Mutex::new(self))
    }

    /// Register a change observer
    pub fn subscribe(&mut self, observer: impl FnMut(&SessionEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Active settings
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Active sequence
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Playback state
    pub fn playback(&self) -> &PlaybackController<C> {
        &self.playback
    }

    /// Host camera
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host camera
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Saved sequence directory
    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    // Editing

    /// Append a keyframe captured from the live camera
    ///
    /// Requires a logged-in host. The first keyframe of a sequence records
    /// the current region origin as the location anchor.
    pub fn capture_keyframe(&mut self) -> Option<KeyframeId> {
        if !self.host.is_logged_in() {
            tracing::debug!("Ignoring capture while logged out");
            return None;
        }
        self.ensure_free_camera();

        if self.sequence.is_empty() {
            let region = self.host.world_region();
            self.sequence.anchor.tile_x = region.base_x;
            self.sequence.anchor.tile_z = region.base_z;
        }

        let keyframe = Keyframe::new(self.host.current_pose(), self.config.default_ease);
        let id = self.sequence.add(keyframe);
        self.notify(SessionEvent::SequenceChanged);
        Some(id)
    }

    /// Replace a keyframe's pose with the live camera pose
    pub fn overwrite_from_camera(&mut self, id: KeyframeId) -> bool {
        if !self.host.is_logged_in() || !self.sequence.contains(id) {
            return false;
        }
        let pose = self.host.current_pose();
        self.edited(|sequence| sequence.overwrite(id, pose))
    }

    /// Append a copy of a keyframe
    pub fn duplicate(&mut self, id: KeyframeId) -> Option<KeyframeId> {
        let copy = self.sequence.duplicate(id)?;
        self.notify(SessionEvent::SequenceChanged);
        Some(copy)
    }

    /// Delete a keyframe
    pub fn delete(&mut self, id: KeyframeId) -> bool {
        self.edited(|sequence| sequence.remove(id).is_some())
    }

    /// Move a keyframe one slot earlier
    pub fn move_up(&mut self, id: KeyframeId) -> bool {
        self.edited(|sequence| sequence.move_up(id))
    }

    /// Move a keyframe one slot later
    pub fn move_down(&mut self, id: KeyframeId) -> bool {
        self.edited(|sequence| sequence.move_down(id))
    }

    /// Change the duration of the segment leaving a keyframe
    pub fn set_duration(&mut self, id: KeyframeId, duration_ms: u64) -> bool {
        self.edited(|sequence| sequence.set_keyframe_duration(id, duration_ms))
    }

    /// Change the easing of the segment leaving a keyframe
    pub fn set_ease(&mut self, id: KeyframeId, ease: EaseType) -> bool {
        self.edited(|sequence| sequence.set_ease(id, ease))
    }

    /// Turn location preservation on or off
    pub fn set_preserve_location(&mut self, preserve: bool) {
        if self.sequence.anchor.preserve != preserve {
            self.sequence.anchor.preserve = preserve;
            self.notify(SessionEvent::SequenceChanged);
        }
    }

    /// Move the camera to a keyframe's pose
    pub fn preview_keyframe(&mut self, id: KeyframeId) -> bool {
        let Some(pose) = self.sequence.keyframe(id).map(|kf| *kf.pose()) else {
            return false;
        };
        self.ensure_free_camera();
        self.playback.apply(&self.sequence, &mut self.host, pose);
        true
    }

    /// Switch the host between locked and free camera
    pub fn toggle_camera_mode(&mut self) {
        let mode = self.host.camera_mode().toggled();
        self.host.set_camera_mode(mode);
        self.notify(SessionEvent::CameraModeChanged(mode));
    }

    // Transport

    /// Start playback from the first keyframe
    pub fn play(&mut self) -> bool {
        let started = self.playback.play(&self.sequence, &mut self.host);
        self.flush_playback_events();
        started
    }

    /// Pause, or resume if paused
    pub fn toggle_pause(&mut self) -> bool {
        let toggled = self.playback.toggle_pause();
        self.flush_playback_events();
        toggled
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.playback.stop();
        self.flush_playback_events();
    }

    /// Advance playback; call once per rendered frame
    pub fn tick(&mut self) -> Option<Pose> {
        let pose = self.playback.tick(&self.sequence, &mut self.host);
        self.flush_playback_events();
        pose
    }

    /// Milliseconds of playback, excluding pauses
    pub fn elapsed(&self) -> u64 {
        self.playback.elapsed()
    }

    /// Index of the keyframe the active segment starts at
    pub fn current_keyframe_index(&self) -> usize {
        self.playback.current_keyframe_index()
    }

    /// Whether playback restarts after the final keyframe
    pub fn set_looping(&mut self, looping: bool) {
        self.playback.looping = looping;
    }

    // Persistence

    /// Discard the active sequence and start an empty one
    pub fn new_sequence(&mut self) {
        self.replace_sequence(Sequence::new(self.config.default_keyframe_duration_ms));
    }

    /// Save under a name derived from the current time
    pub fn save(&self) -> Result<PathBuf, StoreError> {
        self.store.save_timestamped(&self.sequence)
    }

    /// Save under `name`
    pub fn save_as(&self, name: &str) -> Result<PathBuf, StoreError> {
        self.store.save(&self.sequence, name)
    }

    /// Replace the active sequence with a saved one
    ///
    /// On failure the active sequence is left untouched.
    pub fn load(&mut self, name: &str) -> Result<(), StoreError> {
        let sequence = self
            .store
            .load(name, self.config.default_keyframe_duration_ms)?;
        self.replace_sequence(sequence);
        Ok(())
    }

    /// Names of saved sequences
    pub fn list_saved(&self) -> Result<Vec<String>, StoreError> {
        self.store.list()
    }

    fn replace_sequence(&mut self, sequence: Sequence) {
        self.playback.rewind();
        self.flush_playback_events();
        self.sequence = sequence;
        self.notify(SessionEvent::SequenceReplaced);
    }

    fn ensure_free_camera(&mut self) {
        if self.host.camera_mode() != CameraMode::Free {
            self.host.set_camera_mode(CameraMode::Free);
            self.notify(SessionEvent::CameraModeChanged(CameraMode::Free));
        }
    }

    /// Run an edit and notify observers when it changed something
    fn edited(&mut self, edit: impl FnOnce(&mut Sequence) -> bool) -> bool {
        let changed = edit(&mut self.sequence);
        if changed {
            self.notify(SessionEvent::SequenceChanged);
        }
        changed
    }

    fn flush_playback_events(&mut self) {
        for event in self.playback.take_events() {
            self.notify(SessionEvent::Playback(event));
        }
    }

    fn notify(&mut self, event: SessionEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::RecordingHost;

    fn session() -> (CameraSession<RecordingHost, ManualClock>, ManualClock, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = SequencerConfig {
            default_keyframe_duration_ms: 1000,
            default_ease: EaseType::Linear,
            looping: false,
            sequences_dir: dir.path().join("sequences"),
        };
        let clock = ManualClock::new(10_000);
        let session = CameraSession::with_clock(config, RecordingHost::new(), clock.clone());
        (session, clock, dir)
    }

    fn move_camera(session: &mut CameraSession<RecordingHost, ManualClock>, x: f64) {
        session.host_mut().pose = Pose::new([x, 0.0, x], 100.0, x, 500);
    }

    fn recorder(session: &mut CameraSession<RecordingHost, ManualClock>) -> Arc<Mutex<Vec<SessionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |event| sink.lock().push(*event));
        events
    }

    #[test]
    fn test_capture_requires_login() {
        let (mut session, _clock, _dir) = session();
        session.host_mut().logged_in = false;
        assert!(session.capture_keyframe().is_none());
        assert!(session.sequence().is_empty());
    }

    #[test]
    fn test_capture_records_pose_and_anchor() {
        let (mut session, _clock, _dir) = session();
        let events = recorder(&mut session);

        move_camera(&mut session, 640.0);
        let first = session.capture_keyframe().unwrap();
        move_camera(&mut session, 1280.0);
        session.host_mut().region.base_x = 9999;
        let second = session.capture_keyframe().unwrap();

        assert_eq!(session.host().mode, CameraMode::Free);
        assert_eq!(session.sequence().timestamps(), &[0, 1000]);
        assert_eq!(session.sequence().anchor.tile_x, 3200);
        assert_eq!(
            session.sequence().keyframe(first).map(|kf| kf.pose().focal_x),
            Some(640.0)
        );
        assert_eq!(
            session.sequence().keyframe(second).map(|kf| kf.ease),
            Some(EaseType::Linear)
        );
        assert_eq!(
            events
                .lock()
                .iter()
                .filter(|e| **e == SessionEvent::SequenceChanged)
                .count(),
            2
        );
    }

    #[test]
    fn test_edits_notify_only_on_change() {
        let (mut session, _clock, _dir) = session();
        let a = session.capture_keyframe().unwrap();
        let b = session.capture_keyframe().unwrap();
        let events = recorder(&mut session);

        assert!(!session.delete(KeyframeId::new()));
        assert!(!session.move_up(a));
        assert!(!session.set_duration(b, 400));
        assert!(!session.set_duration(KeyframeId::new(), 400));
        assert!(events.lock().is_empty());

        assert!(session.move_down(a));
        assert!(session.set_duration(b, 400));
        assert!(session.set_ease(a, EaseType::Quint));
        move_camera(&mut session, 5.0);
        assert!(session.overwrite_from_camera(a));
        assert_eq!(session.duplicate(b).map(|_| ()), Some(()));
        assert!(session.delete(a));
        assert_eq!(events.lock().len(), 6);

        assert_eq!(session.sequence().len(), 2);
        assert_eq!(session.sequence().index_of(b), Some(0));
        assert_eq!(session.sequence().timestamps(), &[0, 400]);
    }

    #[test]
    fn test_playback_through_session() {
        let (mut session, clock, _dir) = session();
        move_camera(&mut session, 0.0);
        session.capture_keyframe();
        move_camera(&mut session, 1000.0);
        session.capture_keyframe();
        let events = recorder(&mut session);

        assert!(session.play());
        clock.advance(250);
        let pose = session.tick().unwrap();
        assert!((pose.focal_x - 250.0).abs() < 1e-9);
        assert_eq!(session.host().last_applied(), Some(pose));

        clock.advance(1000);
        session.tick();
        assert_eq!(session.current_keyframe_index(), 1);
        session.tick();
        assert!(!session.playback().is_playing());

        let events = events.lock();
        assert_eq!(events.first(), Some(&SessionEvent::Playback(PlaybackEvent::Started)));
        assert_eq!(events.last(), Some(&SessionEvent::Playback(PlaybackEvent::Stopped)));
    }

    #[test]
    fn test_preview_moves_camera() {
        let (mut session, _clock, _dir) = session();
        move_camera(&mut session, 77.0);
        let id = session.capture_keyframe().unwrap();
        move_camera(&mut session, 0.0);
        session.host_mut().mode = CameraMode::Locked;

        assert!(session.preview_keyframe(id));
        assert_eq!(session.host().mode, CameraMode::Free);
        assert_eq!(session.host().pose.focal_x, 77.0);
        assert!(!session.preview_keyframe(KeyframeId::new()));
    }

    #[test]
    fn test_toggle_camera_mode() {
        let (mut session, _clock, _dir) = session();
        session.toggle_camera_mode();
        assert_eq!(session.host().mode, CameraMode::Free);
        session.toggle_camera_mode();
        assert_eq!(session.host().mode, CameraMode::Locked);
    }

    #[test]
    fn test_save_and_load() {
        let (mut session, _clock, _dir) = session();
        session.capture_keyframe();
        let second = session.capture_keyframe().unwrap();
        session.set_ease(second, EaseType::Expo);
        session.set_preserve_location(true);
        session.save_as("intro").unwrap();

        session.new_sequence();
        assert!(session.sequence().is_empty());

        session.load("intro").unwrap();
        assert_eq!(session.sequence().len(), 2);
        assert!(session.sequence().anchor.preserve);
        assert_eq!(session.sequence().get(1).map(|kf| kf.ease), Some(EaseType::Expo));
        assert_eq!(session.list_saved().unwrap(), vec!["intro.txt".to_string()]);
    }

    #[test]
    fn test_failed_load_keeps_active_sequence() {
        let (mut session, _clock, _dir) = session();
        session.capture_keyframe();
        session.capture_keyframe();
        session.store().ensure_dir().unwrap();
        std::fs::write(session.store().path_for("bad"), "0,1,2\n5,x\n").unwrap();

        assert!(session.load("bad").is_err());
        assert!(session.load("missing").is_err());
        assert_eq!(session.sequence().len(), 2);
    }

    #[test]
    fn test_loading_stops_playback() {
        let (mut session, clock, _dir) = session();
        session.capture_keyframe();
        session.capture_keyframe();
        session.save_as("loop").unwrap();

        session.play();
        clock.advance(1500);
        session.tick();
        assert_eq!(session.current_keyframe_index(), 1);

        session.load("loop").unwrap();
        assert!(!session.playback().is_playing());
        assert_eq!(session.current_keyframe_index(), 0);
        assert_eq!(session.elapsed(), 0);
    }

    #[test]
    fn test_shared_session_across_threads() {
        let (mut session, clock, _dir) = session();
        session.set_looping(true);
        session.capture_keyframe();
        session.capture_keyframe();
        let shared = session.into_shared();
        shared.lock().play();

        let editor = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let mut session = shared.lock();
                    session.capture_keyframe();
                }
            })
        };

        for _ in 0..50 {
            clock.advance(40);
            shared.lock().tick();
        }
        editor.join().unwrap();

        let session = shared.lock();
        assert_eq!(session.sequence().len(), 52);
        assert!(session.playback().is_playing());
    }
}
