// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

use sentinel_circuit::{ProofStage, StageObserver};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Per-request knobs for [`ReportProver`](crate::client::ReportProver).
#[derive(Clone, Debug, Default)]
pub struct ProveOptions {
    /// Receives each stage as it completes. A dropped receiver is ignored.
    pub progress: Option<mpsc::UnboundedSender<ProofStage>>,
    /// Cancelling abandons the request at the next stage boundary.
    pub cancel: Option<CancellationToken>,
}

impl ProveOptions {
    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<ProofStage>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

pub(crate) struct ChannelObserver {
    progress: Option<mpsc::UnboundedSender<ProofStage>>,
    cancel: CancellationToken,
}

impl ChannelObserver {
    pub(crate) fn new(
        progress: Option<mpsc::UnboundedSender<ProofStage>>,
        cancel: CancellationToken,
    ) -> Self {
        Self { progress, cancel }
    }
}

impl StageObserver for ChannelObserver {
    fn on_stage(&self, stage: ProofStage) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(stage);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
