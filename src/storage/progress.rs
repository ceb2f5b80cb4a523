// ABOUTME: Upload progress snapshots and their human-readable formatting.
// ABOUTME: ProgressTracker keeps reported byte counts monotonically non-decreasing.

use std::fmt;

/// Lifecycle of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Queued,
    InProgress,
    Completed,
    Failed,
    Canceled,
}

impl TransferState {
    /// Terminal states never change again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransferState::Completed | TransferState::Failed | TransferState::Canceled
        )
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransferState::Queued => "Waiting",
            TransferState::InProgress => "InProgress",
            TransferState::Completed => "Completed",
            TransferState::Failed => "Failed",
            TransferState::Canceled => "Canceled",
        };
        f.write_str(label)
    }
}

/// Point-in-time view of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub total_bytes: u64,
    pub bytes_transferred: u64,
    pub state: TransferState,
}

impl UploadProgress {
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return if self.state == TransferState::Completed {
                100.0
            } else {
                0.0
            };
        }
        self.bytes_transferred as f64 * 100.0 / self.total_bytes as f64
    }
}

/// Clamps successive snapshots so transferred bytes never go backwards.
///
/// Retried parts can make a backend's raw counter dip; users should only
/// ever see forward progress.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    high_water: u64,
    samples: usize,
}

impl ProgressTracker {
    pub fn observe(&mut self, mut progress: UploadProgress) -> UploadProgress {
        self.high_water = self.high_water.max(progress.bytes_transferred);
        progress.bytes_transferred = self.high_water;
        self.samples += 1;
        progress
    }

    /// Number of snapshots observed so far.
    pub fn samples(&self) -> usize {
        self.samples
    }
}

/// Format a byte count with binary units, e.g. `12.3 MiB`.
pub fn pretty_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= UNIT as f64 && exp < PREFIXES.len() {
        value /= UNIT as f64;
        exp += 1;
    }
    format!("{value:.1} {}iB", PREFIXES[exp - 1])
}

/// One progress line as shown while polling.
pub fn format_progress(progress: &UploadProgress) -> String {
    format!(
        "  {}: {} \t({:.2}%)",
        progress.state,
        pretty_bytes(progress.bytes_transferred),
        progress.percent()
    )
}
