//! Animation lifecycle events
//!
//! Tweens and sequences report progress and completion as values rather than
//! callbacks. [`Engine::tick`](crate::Engine::tick) returns the events of one
//! frame in the order they happened, so hosts can react (including
//! registering new tweens) after the pass has finished.

use crate::sequence::SequenceId;
use crate::tween::{TweenId, TweenUpdate};

/// Something observable that happened during a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationEvent {
    /// A running tween applied new values
    TweenUpdated { id: TweenId, progress: f32 },
    /// A tween reached its end values. Emitted at most once per run and
    /// never for stopped tweens.
    TweenCompleted { id: TweenId },
    /// A tween's target element was dropped; the tween was abandoned
    TweenDetached { id: TweenId },
    /// Every child of a sequence finished. Emitted at most once per run and
    /// never for stopped sequences.
    SequenceCompleted { id: SequenceId },
}

impl AnimationEvent {
    /// Completion of a tween or a sequence
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            AnimationEvent::TweenCompleted { .. } | AnimationEvent::SequenceCompleted { .. }
        )
    }
}

/// Translate the outcome of one tween update into events
pub(crate) fn record_tween_update(
    id: TweenId,
    update: TweenUpdate,
    events: &mut Vec<AnimationEvent>,
) {
    match update {
        TweenUpdate::Idle | TweenUpdate::Delaying => {}
        TweenUpdate::Progressed(progress) => {
            events.push(AnimationEvent::TweenUpdated { id, progress });
        }
        TweenUpdate::Completed => {
            events.push(AnimationEvent::TweenUpdated { id, progress: 1.0 });
            events.push(AnimationEvent::TweenCompleted { id });
        }
        TweenUpdate::Detached => {
            events.push(AnimationEvent::TweenDetached { id });
        }
    }
}
