//! Animation engine
//!
//! The engine owns every registered tween and sequence, holds the frame-clock
//! subscription while there is work to do, and advances everything once per
//! frame via [`Engine::tick`].
//!
//! The engine is not `Send`: tweens hold weak references to host elements
//! that live on the UI thread. Other threads control animations through an
//! [`EngineHandle`], whose commands are queued and applied at the start of
//! the next tick.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::clock::FrameClock;
use crate::config::{EngineConfig, IdlePolicy};
use crate::events::{record_tween_update, AnimationEvent};
use crate::sequence::{Sequence, SequenceId};
use crate::tween::{Tween, TweenId, TweenState};

#[derive(Clone, Copy, Debug)]
enum Command {
    PauseTween(TweenId),
    ResumeTween(TweenId),
    StopTween(TweenId),
    PauseSequence(SequenceId),
    ResumeSequence(SequenceId),
    StopSequence(SequenceId),
    KillAll,
}

/// A thread-safe handle for controlling animations owned by an [`Engine`].
///
/// Every method returns `false` once the engine has been dropped.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    sender: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    pub fn pause_tween(&self, id: TweenId) -> bool {
        self.send(Command::PauseTween(id))
    }

    pub fn resume_tween(&self, id: TweenId) -> bool {
        self.send(Command::ResumeTween(id))
    }

    pub fn stop_tween(&self, id: TweenId) -> bool {
        self.send(Command::StopTween(id))
    }

    pub fn pause_sequence(&self, id: SequenceId) -> bool {
        self.send(Command::PauseSequence(id))
    }

    pub fn resume_sequence(&self, id: SequenceId) -> bool {
        self.send(Command::ResumeSequence(id))
    }

    pub fn stop_sequence(&self, id: SequenceId) -> bool {
        self.send(Command::StopSequence(id))
    }

    pub fn kill_all(&self) -> bool {
        self.send(Command::KillAll)
    }

    fn send(&self, command: Command) -> bool {
        self.sender.send(command).is_ok()
    }
}

/// Scheduler for tweens and sequences.
///
/// Entries are updated in registration order. Entries that finish during a
/// tick are removed only after the whole pass, so nothing is skipped or
/// visited twice.
pub struct Engine {
    tweens: IndexMap<TweenId, Tween, FxBuildHasher>,
    sequences: IndexMap<SequenceId, Sequence, FxBuildHasher>,
    clock: Box<dyn FrameClock>,
    subscribed: bool,
    config: EngineConfig,
    sender: mpsc::UnboundedSender<Command>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Engine {
    pub fn new(clock: impl FrameClock + 'static) -> Self {
        Self::with_config(clock, EngineConfig::default())
    }

    pub fn with_config(clock: impl FrameClock + 'static, config: EngineConfig) -> Self {
        let (sender, commands) = mpsc::unbounded_channel();
        Self {
            tweens: IndexMap::default(),
            sequences: IndexMap::default(),
            clock: Box::new(clock),
            subscribed: false,
            config,
            sender,
            commands,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current time on the engine's clock
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Get a `Send` handle for controlling animations from other threads
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            sender: self.sender.clone(),
        }
    }

    /// Register a tween. Idle and completed tweens are (re)started at the
    /// current clock time.
    pub fn add_tween(&mut self, mut tween: Tween) -> TweenId {
        let id = tween.id();
        if matches!(tween.state(), TweenState::Idle | TweenState::Completed) {
            tween.start(self.clock.now());
        }
        self.tweens.insert(id, tween);
        debug!(%id, tweens = self.tweens.len(), "tween registered");
        self.ensure_subscribed();
        id
    }

    /// Register a sequence. Idle and completed sequences are (re)started at
    /// the current clock time.
    pub fn add_sequence(&mut self, mut sequence: Sequence) -> SequenceId {
        let id = sequence.id();
        if matches!(sequence.state(), TweenState::Idle | TweenState::Completed) {
            sequence.start(self.clock.now());
        }
        self.sequences.insert(id, sequence);
        debug!(%id, sequences = self.sequences.len(), "sequence registered");
        self.ensure_subscribed();
        id
    }

    /// Deregister a tween without changing its state
    pub fn remove_tween(&mut self, id: TweenId) -> Option<Tween> {
        let tween = self.tweens.shift_remove(&id)?;
        debug!(%id, "tween removed");
        self.release_if_idle();
        Some(tween)
    }

    /// Deregister a sequence without changing its state
    pub fn remove_sequence(&mut self, id: SequenceId) -> Option<Sequence> {
        let sequence = self.sequences.shift_remove(&id)?;
        debug!(%id, "sequence removed");
        self.release_if_idle();
        Some(sequence)
    }

    pub fn tween(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(&id)
    }

    pub fn sequence(&self, id: SequenceId) -> Option<&Sequence> {
        self.sequences.get(&id)
    }

    pub fn tweens(&self) -> impl Iterator<Item = &Tween> {
        self.tweens.values()
    }

    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Returns `false` if no tween with this id is registered
    pub fn pause_tween(&mut self, id: TweenId) -> bool {
        let now = self.clock.now();
        self.pause_tween_at(id, now)
    }

    pub fn resume_tween(&mut self, id: TweenId) -> bool {
        let now = self.clock.now();
        self.resume_tween_at(id, now)
    }

    /// Stop a tween and deregister it. No completion is reported.
    pub fn stop_tween(&mut self, id: TweenId) -> bool {
        let Some(mut tween) = self.tweens.shift_remove(&id) else {
            return false;
        };
        tween.stop();
        debug!(%id, "tween stopped");
        self.release_if_idle();
        true
    }

    pub fn pause_sequence(&mut self, id: SequenceId) -> bool {
        let now = self.clock.now();
        self.pause_sequence_at(id, now)
    }

    pub fn resume_sequence(&mut self, id: SequenceId) -> bool {
        let now = self.clock.now();
        self.resume_sequence_at(id, now)
    }

    /// Stop a sequence and its children and deregister it. No completion is
    /// reported for the sequence or its children.
    pub fn stop_sequence(&mut self, id: SequenceId) -> bool {
        let Some(mut sequence) = self.sequences.shift_remove(&id) else {
            return false;
        };
        sequence.stop();
        debug!(%id, "sequence stopped");
        self.release_if_idle();
        true
    }

    /// Stop and deregister everything
    pub fn kill_all(&mut self) {
        for tween in self.tweens.values_mut() {
            tween.stop();
        }
        for sequence in self.sequences.values_mut() {
            sequence.stop();
        }
        debug!(
            tweens = self.tweens.len(),
            sequences = self.sequences.len(),
            "killing all animations"
        );
        self.tweens.clear();
        self.sequences.clear();
        self.release_if_idle();
    }

    /// Apply control commands queued through [`EngineHandle`]s at `now`
    pub fn process_commands(&mut self, now: f64) {
        while let Ok(command) = self.commands.try_recv() {
            trace!(?command, "applying queued command");
            match command {
                Command::PauseTween(id) => {
                    self.pause_tween_at(id, now);
                }
                Command::ResumeTween(id) => {
                    self.resume_tween_at(id, now);
                }
                Command::StopTween(id) => {
                    self.stop_tween(id);
                }
                Command::PauseSequence(id) => {
                    self.pause_sequence_at(id, now);
                }
                Command::ResumeSequence(id) => {
                    self.resume_sequence_at(id, now);
                }
                Command::StopSequence(id) => {
                    self.stop_sequence(id);
                }
                Command::KillAll => self.kill_all(),
            }
        }
    }

    /// Advance every registered animation to `now` and return what happened.
    pub fn tick(&mut self, now: f64) -> Vec<AnimationEvent> {
        self.process_commands(now);

        let mut events = Vec::new();
        let trace_transitions = self.config.trace_transitions;

        let mut finished_tweens: SmallVec<[TweenId; 8]> = SmallVec::new();
        for (&id, tween) in self.tweens.iter_mut() {
            let before = tween.state();
            let update = tween.update(now);
            record_tween_update(id, update, &mut events);
            if trace_transitions && tween.state() != before {
                trace!(%id, from = ?before, to = ?tween.state(), "tween transition");
            }
            if !tween.is_active() {
                finished_tweens.push(id);
            }
        }

        let mut finished_sequences: SmallVec<[SequenceId; 4]> = SmallVec::new();
        for (&id, sequence) in self.sequences.iter_mut() {
            let before = sequence.state();
            sequence.update(now, &mut events);
            if trace_transitions && sequence.state() != before {
                trace!(%id, from = ?before, to = ?sequence.state(), "sequence transition");
            }
            if !sequence.is_active() {
                finished_sequences.push(id);
            }
        }

        for id in &finished_tweens {
            self.tweens.shift_remove(id);
        }
        for id in &finished_sequences {
            self.sequences.shift_remove(id);
        }
        if !finished_tweens.is_empty() || !finished_sequences.is_empty() {
            debug!(
                tweens = finished_tweens.len(),
                sequences = finished_sequences.len(),
                "finished animations removed"
            );
            self.release_if_idle();
        }

        events
    }

    /// Tick at the clock's current time
    pub fn frame(&mut self) -> Vec<AnimationEvent> {
        let now = self.clock.now();
        self.tick(now)
    }

    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty() && self.sequences.is_empty()
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the engine currently holds the frame-clock subscription
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    fn pause_tween_at(&mut self, id: TweenId, now: f64) -> bool {
        self.tweens.get_mut(&id).map(|t| t.pause(now)).is_some()
    }

    fn resume_tween_at(&mut self, id: TweenId, now: f64) -> bool {
        self.tweens.get_mut(&id).map(|t| t.resume(now)).is_some()
    }

    fn pause_sequence_at(&mut self, id: SequenceId, now: f64) -> bool {
        self.sequences.get_mut(&id).map(|s| s.pause(now)).is_some()
    }

    fn resume_sequence_at(&mut self, id: SequenceId, now: f64) -> bool {
        self.sequences.get_mut(&id).map(|s| s.resume(now)).is_some()
    }

    fn ensure_subscribed(&mut self) {
        if !self.subscribed {
            self.clock.subscribe();
            self.subscribed = true;
            debug!("subscribed to frame clock");
        }
    }

    fn release_if_idle(&mut self) {
        if self.subscribed && self.is_idle() && self.config.idle_policy == IdlePolicy::Unsubscribe {
            self.clock.unsubscribe();
            self.subscribed = false;
            debug!("engine idle, unsubscribed from frame clock");
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.subscribed {
            self.clock.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::property::PropertyTag;
    use crate::tween::tests::Probe;
    use std::rc::Rc;

    fn tween(probe: &Rc<Probe>, duration: f64) -> Tween {
        Tween::builder(probe)
            .from_to(PropertyTag::Opacity, 0.0, 1.0)
            .duration(duration)
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_starts_and_subscribes() {
        let clock = ManualClock::starting_at(2.0);
        let mut engine = Engine::new(clock.clone());
        let probe = Rc::new(Probe::default());

        assert!(!engine.is_subscribed());
        let id = engine.add_tween(tween(&probe, 1.0));
        assert!(engine.is_subscribed());
        assert!(clock.is_subscribed());
        assert_eq!(engine.tween(id).unwrap().state(), TweenState::Running);

        engine.add_tween(tween(&probe, 1.0));
        assert_eq!(clock.subscribe_calls(), 1);
    }

    #[test]
    fn test_finished_tweens_are_removed_and_clock_released() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock.clone());
        let probe = Rc::new(Probe::default());
        let id = engine.add_tween(tween(&probe, 1.0));

        let events = engine.tick(0.5);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.tween_count(), 1);

        let events = engine.tick(1.0);
        assert_eq!(events.last(), Some(&AnimationEvent::TweenCompleted { id }));
        assert!(engine.is_idle());
        assert!(!clock.is_subscribed());
        assert_eq!(clock.unsubscribe_calls(), 1);
    }

    #[test]
    fn test_stop_deregisters_without_completion() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock.clone());
        let probe = Rc::new(Probe::default());
        let id = engine.add_tween(tween(&probe, 1.0));

        engine.tick(0.5);
        assert!(engine.stop_tween(id));
        assert!(engine.tween(id).is_none());
        assert!(!clock.is_subscribed());

        let events = engine.tick(2.0);
        assert!(events.is_empty());
        assert_eq!(probe.scalar(PropertyTag::Opacity), Some(0.5));
    }

    #[test]
    fn test_missing_ids_are_ignored() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock);
        let probe = Rc::new(Probe::default());
        let id = tween(&probe, 1.0).id();

        assert!(!engine.pause_tween(id));
        assert!(!engine.resume_tween(id));
        assert!(!engine.stop_tween(id));
        assert!(engine.remove_tween(id).is_none());
    }

    #[test]
    fn test_pause_uses_clock_time() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock.clone());
        let probe = Rc::new(Probe::default());
        let id = engine.add_tween(tween(&probe, 1.0));

        clock.set(0.25);
        engine.frame();
        assert!(engine.pause_tween(id));
        clock.set(1.25);
        assert!(engine.resume_tween(id));
        clock.set(1.5);
        engine.frame();

        let opacity = probe.scalar(PropertyTag::Opacity).unwrap();
        assert!((opacity - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_kill_all_clears_everything() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock.clone());
        let probe = Rc::new(Probe::default());
        engine.add_tween(tween(&probe, 1.0));
        engine.add_sequence(Sequence::serial(vec![tween(&probe, 1.0)]));

        engine.kill_all();
        assert!(engine.is_idle());
        assert!(!clock.is_subscribed());
        assert!(engine.tick(5.0).is_empty());
    }

    #[test]
    fn test_keep_subscribed_policy() {
        let clock = ManualClock::new();
        let config = EngineConfig {
            idle_policy: IdlePolicy::KeepSubscribed,
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_config(clock.clone(), config);
        let probe = Rc::new(Probe::default());
        engine.add_tween(tween(&probe, 0.5));

        engine.tick(1.0);
        assert!(engine.is_idle());
        assert!(engine.is_subscribed());
        assert_eq!(clock.unsubscribe_calls(), 0);
    }

    #[test]
    fn test_detached_tween_is_swept() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock);
        let probe = Rc::new(Probe::default());
        let id = engine.add_tween(tween(&probe, 1.0));
        drop(probe);

        let events = engine.tick(0.5);
        assert_eq!(events, vec![AnimationEvent::TweenDetached { id }]);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_handle_commands_apply_on_next_tick() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock);
        let probe = Rc::new(Probe::default());
        let id = engine.add_tween(tween(&probe, 1.0));
        let handle = engine.handle();

        assert!(handle.stop_tween(id));
        assert_eq!(engine.tween_count(), 1);

        let events = engine.tick(0.5);
        assert!(events.is_empty());
        assert!(engine.is_idle());
    }

    #[test]
    fn test_handle_reports_dropped_engine() {
        let engine = Engine::new(ManualClock::new());
        let handle = engine.handle();
        drop(engine);
        assert!(!handle.kill_all());
    }

    #[test]
    fn test_tweens_tick_in_registration_order() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(clock);
        let probe = Rc::new(Probe::default());
        let ids: Vec<_> = (0..5).map(|_| engine.add_tween(tween(&probe, 1.0))).collect();

        let events = engine.tick(0.5);
        let seen: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                AnimationEvent::TweenUpdated { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn test_trace_transitions_does_not_change_results() {
        let config = EngineConfig {
            trace_transitions: true,
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_config(ManualClock::new(), config);
        let probe = Rc::new(Probe::default());
        let id = engine.add_tween(tween(&probe, 1.0));

        let events = engine.tick(1.0);
        assert!(events.contains(&AnimationEvent::TweenCompleted { id }));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_completed_tween_restarts_when_registered() {
        let clock = ManualClock::starting_at(2.0);
        let mut engine = Engine::new(clock.clone());
        let probe = Rc::new(Probe::default());
        let mut finished = tween(&probe, 1.0);
        finished.start(0.0);
        assert_eq!(finished.update(1.0), crate::tween::TweenUpdate::Completed);

        let id = engine.add_tween(finished);
        assert_eq!(engine.tween(id).unwrap().state(), TweenState::Running);

        let events = engine.tick(2.5);
        assert_eq!(
            events,
            vec![AnimationEvent::TweenUpdated { id, progress: 0.5 }]
        );
        assert_eq!(engine.tween_count(), 1);
    }

    #[test]
    fn test_completed_sequence_restarts_when_registered() {
        let clock = ManualClock::starting_at(3.0);
        let mut engine = Engine::new(clock.clone());
        let probe = Rc::new(Probe::default());
        let mut sequence = Sequence::serial(vec![tween(&probe, 1.0)]);
        sequence.start(0.0);
        sequence.stop();

        let id = engine.add_sequence(sequence);
        assert_eq!(engine.sequence(id).unwrap().state(), TweenState::Running);
        engine.tick(3.5);
        assert_eq!(engine.sequence_count(), 1);
        assert_eq!(probe.scalar(PropertyTag::Opacity), Some(0.5));
    }
}
