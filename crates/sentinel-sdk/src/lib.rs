// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! # sentinel-sdk
//!
//! Client library for **Sentinel** anonymous violation reports.
//!
//! A reporter holds a secret receipt; `sentinel-sdk` turns it into a Groth16
//! proof that they know the preimage of a public commitment, formatted for
//! the on-chain verifier contract, without revealing the receipt.
//!
//! ## Crate layout
//!
//! | Module | Purpose |
//! |---|---|
//! | *crate root* | Re-exports the handles, payload and error types |
//! | [`client`] | `ReportProver` / `ReportVerifier`, artifacts loaded once |
//! | [`config`] | Artifact paths, report tag, MSM strategy, timeout |
//! | [`progress`] | Stage notifications and cancellation per request |
//! | [`calldata`] | ABI encoding of `reportViolationZK` |
//! | [`error`] | `SentinelError` |
//!
//! ## Typical integration flow
//!
//! ```rust,no_run
//! use sentinel_sdk::{ProveOptions, ReportProver, ReportVerifier, SentinelConfig};
//!
//! # async fn example() -> sentinel_sdk::SentinelResult<()> {
//! // 1. Resolve configuration (file + SENTINEL_* env)
//! let config = SentinelConfig::load(None)?;
//!
//! // 2. Load artifacts once
//! let prover = ReportProver::load(&config)?;
//! let verifier = ReportVerifier::load(&config)?;
//!
//! // 3. Prove and format
//! let payload = prover.prove_report("998877", ProveOptions::default()).await?;
//!
//! // 4. Check locally, then build calldata for the contract
//! assert!(verifier.verify(&payload)?);
//! let _calldata = verifier.report_call(&payload)?;
//! # Ok(())
//! # }
//! ```

pub mod calldata;
pub mod client;
pub mod config;
pub mod error;
pub mod progress;

pub use client::{ReportProver, ReportVerifier};
pub use config::SentinelConfig;
pub use error::{SentinelError, SentinelResult};
pub use progress::ProveOptions;

pub use sentinel_circuit::{ProofError, ProofStage};
pub use sentinel_types::{ReceiptSecret, ReportTag, VerifierPayload};
