//! Why the sandbox refused an order or a scenario.

use bot_core::{ActorId, CPos, Command, PlayerId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SandboxError {
    #[error("unknown actor type `{0}`")]
    UnknownType(String),

    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    #[error("actor {actor} is not owned by player {}", player.0)]
    NotOwned { actor: ActorId, player: PlayerId },

    #[error("{command} is missing its {what}")]
    MissingArgument {
        command: Command,
        what: &'static str,
    },

    #[error("queue at {0} is busy")]
    QueueBusy(ActorId),

    #[error("`{item}` cannot be produced at {queue}")]
    NotBuildable { item: String, queue: ActorId },

    #[error("player {} cannot afford `{item}`", player.0)]
    InsufficientFunds { player: PlayerId, item: String },

    #[error("nothing finished to place at {0}")]
    NothingToPlace(ActorId),

    #[error("`{item}` cannot be placed at {cell}")]
    IllegalPlacement { item: String, cell: CPos },

    #[error("actor {0} cannot deploy")]
    CannotDeploy(ActorId),

    #[error("support power `{0}` is not ready")]
    PowerNotReady(String),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
