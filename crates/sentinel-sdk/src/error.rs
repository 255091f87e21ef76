// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed errors for [`ReportProver`](crate::client::ReportProver) and
//! [`ReportVerifier`](crate::client::ReportVerifier) operations.

use std::time::Duration;

use sentinel_circuit::ProofError;

#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error("config: {0}")]
    Config(String),

    #[error("proof not ready after {0:?}")]
    TimedOut(Duration),

    #[error("proof worker stopped: {0}")]
    Worker(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SentinelError {
    /// True when the request was rejected because of what the caller sent,
    /// as opposed to the service being unable to answer right now.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Proof(e) if e.is_caller_error())
    }
}

pub type SentinelResult<T> = Result<T, SentinelError>;
