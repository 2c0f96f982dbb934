//! Developer debug channel.
//!
//! Each bot instance carries its own [`BotDebug`] handle. When enabled it forwards
//! messages to `tracing` under the `bot` target, tagged with the owning player, so
//! one noisy bot can be inspected without a process-wide switch.

use crate::error::{BotError, DecisionError};
use crate::world::PlayerId;

/// Per-instance debug switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BotDebug {
    enabled: bool,
    player: PlayerId,
}

impl BotDebug {
    pub const fn new(enabled: bool, player: PlayerId) -> Self {
        Self { enabled, player }
    }

    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Reports a swallowed decision failure.
    pub fn decision(&self, error: &DecisionError) {
        if self.enabled {
            tracing::debug!(
                target: "bot",
                player = self.player.0,
                code = error.error_code(),
                severity = error.severity().as_str(),
                "{}",
                error
            );
        }
    }
}

/// Emits a `tracing::debug!` event on the `bot` target if the handle is enabled.
///
/// The message is only formatted when the channel is on.
#[macro_export]
macro_rules! bot_debug {
    ($debug:expr, $($arg:tt)+) => {
        if $debug.enabled() {
            ::tracing::debug!(target: "bot", player = $debug.player().0, $($arg)+);
        }
    };
}
