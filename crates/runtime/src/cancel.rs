//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eyestream_common::error::{EyestreamError, EyestreamResult};
use tracing::info;

/// Shared stop flag. Clones observe the same flag; once cancelled it stays
/// cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Cancel this token on SIGINT/Ctrl-C. Only one handler may be installed
    /// per process.
    pub fn install_ctrlc_handler(&self) -> EyestreamResult<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            info!("Shutdown signal received");
            token.cancel();
        })
        .map_err(|e| EyestreamError::Other(anyhow::Error::new(e)))
    }
}
