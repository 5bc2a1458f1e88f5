//! Per-phase timing payload produced by one provisioning run.

use serde::{Deserialize, Serialize};

/// File name the caller persists the metrics under.
pub const METRICS_FILE_NAME: &str = "npm_metrics.json";

/// Wall-clock duration of one phase, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub duration: u64,
}

impl PhaseTiming {
    pub fn from_millis(duration: u128) -> Self {
        Self {
            duration: u64::try_from(duration).unwrap_or(u64::MAX),
        }
    }
}

/// Phases that did not run are absent, never recorded as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningMetrics {
    pub setup: PhaseTiming,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebuild: Option<PhaseTiming>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<PhaseTiming>,
}

/// Named metrics payload handed to the caller for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsArtifact {
    pub name: String,
    pub data: ProvisioningMetrics,
}

impl MetricsArtifact {
    pub fn new(data: ProvisioningMetrics) -> Self {
        Self {
            name: METRICS_FILE_NAME.to_string(),
            data,
        }
    }
}
