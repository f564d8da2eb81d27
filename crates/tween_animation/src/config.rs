//! Engine configuration

use serde::{Deserialize, Serialize};

/// What the engine does with its frame-clock subscription when no tween or
/// sequence is registered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdlePolicy {
    /// Drop the subscription until something is registered again
    #[default]
    Unsubscribe,
    /// Stay subscribed and receive empty ticks
    KeepSubscribed,
}

/// Engine configuration (the `[engine]` table of a config file)
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub idle_policy: IdlePolicy,
    /// Emit a `trace!` for every lifecycle transition observed during a tick
    #[serde(default)]
    pub trace_transitions: bool,
}
