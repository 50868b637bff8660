// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// Failure reported by the remote CRUD API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CollaboratorError {
    /// The request never produced a usable answer: connect, timeout, decode, 5xx.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server answered and refused: `success: false`, 4xx, missing data.
    #[error("request rejected: {0}")]
    Business(String),
}

impl CollaboratorError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Business(_) => FailureKind::Business,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Transport(detail) | Self::Business(detail) => detail,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == FailureKind::Transport
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Transport,
    Business,
}
