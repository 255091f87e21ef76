// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Explicit configuration for the prover and verifier.
//!
//! Resolution order: built-in defaults, then the JSON file
//! (`~/.sentinel/config.json` unless a path is given), then `SENTINEL_*`
//! environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sentinel_circuit::MsmStrategy;
use sentinel_types::{parse_canonical, FieldElement};
use serde::{Deserialize, Serialize};

use crate::calldata::parse_address;
use crate::error::{SentinelError, SentinelResult};

/// Public tag bound into every report proof unless configured otherwise.
pub const DEFAULT_REPORT_TAG: &str = "404";
pub const DEFAULT_PROVE_TIMEOUT_SECS: u64 = 120;

pub const ENV_CIRCUIT: &str = "SENTINEL_CIRCUIT";
pub const ENV_PROVING_KEY: &str = "SENTINEL_PROVING_KEY";
pub const ENV_VERIFICATION_KEY: &str = "SENTINEL_VERIFICATION_KEY";
pub const ENV_TARGET: &str = "SENTINEL_TARGET";
pub const ENV_REPORT_TAG: &str = "SENTINEL_REPORT_TAG";

/// Keys accepted by [`SentinelConfig::set`].
pub const ALLOWED_KEYS: &[&str] = &[
    "circuit_path",
    "proving_key_path",
    "verification_key_path",
    "target_address",
    "report_tag",
    "msm",
    "prove_timeout_secs",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    pub circuit_path: PathBuf,
    pub proving_key_path: PathBuf,
    pub verification_key_path: PathBuf,
    /// Verifier contract that records reports.
    pub target_address: Option<String>,
    pub report_tag: String,
    pub msm: MsmStrategy,
    pub prove_timeout_secs: u64,
}

pub fn sentinel_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sentinel")
}

pub fn default_config_path() -> PathBuf {
    sentinel_dir().join("config.json")
}

impl Default for SentinelConfig {
    fn default() -> Self {
        let dir = sentinel_dir();
        Self {
            circuit_path: dir.join("report.circuit"),
            proving_key_path: dir.join("report.pk"),
            verification_key_path: dir.join("report.vk"),
            target_address: None,
            report_tag: DEFAULT_REPORT_TAG.to_string(),
            msm: MsmStrategy::default(),
            prove_timeout_secs: DEFAULT_PROVE_TIMEOUT_SECS,
        }
    }
}

impl SentinelConfig {
    /// File (when present) plus process environment overrides.
    pub fn load(path: Option<&Path>) -> SentinelResult<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let config = if path.exists() { Self::from_file(&path)? } else { Self::default() };
        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> SentinelResult<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| SentinelError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&data)
            .map_err(|e| SentinelError::Config(format!("invalid {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> SentinelResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SentinelError::Config(format!("cannot create {}: {e}", parent.display())))?;
        }
        let data = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;
        fs::write(path, data)
            .map_err(|e| SentinelError::Config(format!("cannot write {}: {e}", path.display())))
    }

    /// Applies `SENTINEL_*` overrides from `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(ENV_CIRCUIT) {
            self.circuit_path = v.into();
        }
        if let Some(v) = lookup(ENV_PROVING_KEY) {
            self.proving_key_path = v.into();
        }
        if let Some(v) = lookup(ENV_VERIFICATION_KEY) {
            self.verification_key_path = v.into();
        }
        if let Some(v) = lookup(ENV_TARGET) {
            self.target_address = Some(v);
        }
        if let Some(v) = lookup(ENV_REPORT_TAG) {
            self.report_tag = v;
        }
        self
    }

    pub fn validate(&self) -> SentinelResult<()> {
        parse_canonical::<FieldElement>(&self.report_tag)
            .map_err(|e| SentinelError::Config(format!("report_tag: {e}")))?;
        if let Some(target) = &self.target_address {
            parse_address(target)?;
        }
        if self.prove_timeout_secs == 0 {
            return Err(SentinelError::Config("prove_timeout_secs must be positive".into()));
        }
        if let MsmStrategy::Windowed { window_bits } = self.msm {
            if window_bits == 0 || window_bits > MsmStrategy::MAX_WINDOW_BITS {
                return Err(SentinelError::Config(format!(
                    "msm window must be 1..={} bits",
                    MsmStrategy::MAX_WINDOW_BITS
                )));
            }
        }
        Ok(())
    }

    pub fn prove_timeout(&self) -> Duration {
        Duration::from_secs(self.prove_timeout_secs)
    }

    /// Sets one key from its textual form. Unknown keys and unparsable
    /// values are rejected without touching the config.
    pub fn set(&mut self, key: &str, value: &str) -> SentinelResult<()> {
        let mut next = self.clone();
        match key {
            "circuit_path" => next.circuit_path = value.into(),
            "proving_key_path" => next.proving_key_path = value.into(),
            "verification_key_path" => next.verification_key_path = value.into(),
            "target_address" => {
                next.target_address = (!value.is_empty()).then(|| value.to_string())
            }
            "report_tag" => next.report_tag = value.to_string(),
            "msm" => next.msm = parse_msm(value)?,
            "prove_timeout_secs" => {
                next.prove_timeout_secs = value
                    .parse()
                    .map_err(|_| SentinelError::Config(format!("not a number: {value}")))?
            }
            _ => {
                return Err(SentinelError::Config(format!(
                    "unknown config key: {key} (allowed: {})",
                    ALLOWED_KEYS.join(", ")
                )))
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("circuit_path", self.circuit_path.display().to_string()),
            ("proving_key_path", self.proving_key_path.display().to_string()),
            ("verification_key_path", self.verification_key_path.display().to_string()),
            ("target_address", self.target_address.clone().unwrap_or_default()),
            ("report_tag", self.report_tag.clone()),
            ("msm", format_msm(self.msm)),
            ("prove_timeout_secs", self.prove_timeout_secs.to_string()),
        ]
    }
}

/// `pippenger` or `windowed:<bits>`.
pub fn parse_msm(value: &str) -> SentinelResult<MsmStrategy> {
    match value.split_once(':') {
        None if value == "pippenger" => Ok(MsmStrategy::Pippenger),
        Some(("windowed", bits)) => bits
            .parse()
            .map(|window_bits| MsmStrategy::Windowed { window_bits })
            .map_err(|_| SentinelError::Config(format!("bad window size: {bits}"))),
        _ => Err(SentinelError::Config(format!(
            "unknown msm strategy: {value} (expected pippenger or windowed:<bits>)"
        ))),
    }
}

pub fn format_msm(msm: MsmStrategy) -> String {
    match msm {
        MsmStrategy::Pippenger => "pippenger".into(),
        MsmStrategy::Windowed { window_bits } => format!("windowed:{window_bits}"),
    }
}
