// Fatal input problems. Anything recoverable is degraded around and logged to
// the run's audit log instead.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("no players to balance")]
    NoPlayers,
    #[error("no seats available: {team_count} teams x {team_capacity} capacity")]
    ZeroCapacity {
        team_count: usize,
        team_capacity: usize,
    },
    #[error("duplicate player id `{0}` in input")]
    DuplicatePlayer(String),
    #[error("invalid existing assignment: {0}")]
    InvalidAssignment(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
