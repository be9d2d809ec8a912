//! The module contains the errors the engine can return.
//!
//! The only error raised while recording expenses is [`PayerNotParticipant`];
//! the remaining variants come from value parsing, the activity book and
//! snapshot restore.
//!
//!  [`PayerNotParticipant`]: EngineError::PayerNotParticipant
use thiserror::Error;

use crate::ParticipantId;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("participant {0} is not part of the activity")]
    PayerNotParticipant(ParticipantId),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid title: {0}")]
    InvalidTitle(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PayerNotParticipant(a), Self::PayerNotParticipant(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidTitle(a), Self::InvalidTitle(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidSnapshot(a), Self::InvalidSnapshot(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
