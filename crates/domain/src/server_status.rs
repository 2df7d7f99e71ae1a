//! Live server telemetry delivered as a snapshot followed by patches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processor usage figures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    /// Logical core count.
    pub cores: u32,
    /// Percentage used by user processes.
    pub user_percent: f64,
    /// Percentage used by the system.
    pub system_percent: f64,
    /// Idle percentage.
    pub idle_percent: f64,
}

/// Memory usage figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Installed bytes.
    pub total_bytes: u64,
    /// Bytes in use.
    pub used_bytes: u64,
}

impl MemoryUsage {
    /// Returns the used share in percent, zero when total is unknown.
    #[must_use]
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 * 100.0 / self.total_bytes as f64
    }
}

/// Usage of one mounted file system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsage {
    /// Mount point.
    pub mount: String,
    /// File system type.
    #[serde(default)]
    pub fs_type: Option<String>,
    /// Capacity in bytes.
    pub total_bytes: u64,
    /// Bytes in use.
    pub used_bytes: u64,
}

/// Full server status snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    /// Host name.
    #[serde(default)]
    pub host_name: String,
    /// Processor usage.
    #[serde(default)]
    pub cpu: CpuUsage,
    /// Memory usage.
    #[serde(default)]
    pub memory: MemoryUsage,
    /// Mounted file systems.
    #[serde(default)]
    pub disks: Vec<DiskUsage>,
    /// Seconds since the server started.
    #[serde(default)]
    pub uptime_seconds: u64,
    /// When the figures were sampled.
    #[serde(default)]
    pub sampled_at: Option<DateTime<Utc>>,
}

/// Incremental update; absent sections keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatch {
    /// Replacement processor usage.
    #[serde(default)]
    pub cpu: Option<CpuUsage>,
    /// Replacement memory usage.
    #[serde(default)]
    pub memory: Option<MemoryUsage>,
    /// Replacement disk list.
    #[serde(default)]
    pub disks: Option<Vec<DiskUsage>>,
    /// Replacement uptime.
    #[serde(default)]
    pub uptime_seconds: Option<u64>,
    /// Replacement sample time.
    #[serde(default)]
    pub sampled_at: Option<DateTime<Utc>>,
}

impl ServerStatus {
    /// Merges a patch into the snapshot.
    pub fn apply(&mut self, patch: StatusPatch) {
        if let Some(cpu) = patch.cpu {
            self.cpu = cpu;
        }
        if let Some(memory) = patch.memory {
            self.memory = memory;
        }
        if let Some(disks) = patch.disks {
            self.disks = disks;
        }
        if let Some(uptime_seconds) = patch.uptime_seconds {
            self.uptime_seconds = uptime_seconds;
        }
        if patch.sampled_at.is_some() {
            self.sampled_at = patch.sampled_at;
        }
    }
}

/// One message of the status stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// Full state; replaces whatever was shown.
    Snapshot(ServerStatus),
    /// Partial state merged into the current snapshot.
    Patch(StatusPatch),
}
