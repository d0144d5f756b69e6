//! Load-test (experiment) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workload description of a load test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TestSpec {
    /// Dataset the prompts are drawn from (e.g. "GSM8K")
    #[serde(default)]
    pub data_set: String,

    /// Declared duration magnitude
    #[serde(default)]
    pub duration: f64,

    /// Declared duration unit ("hour", "min", "sec")
    #[serde(default)]
    pub duration_unit: String,

    /// Traffic distribution (e.g. "poisson", "normal")
    #[serde(default)]
    pub distribution: String,

    #[serde(default)]
    pub tps_mean: Option<f64>,

    #[serde(default)]
    pub tps_std: Option<f64>,
}

/// Sampling parameters sent with every generated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(default)]
    pub others: String,
}

/// Aggregate outcome of a finished test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TestResult {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub success: u64,
    /// Mean request latency; the field name is the one the serving API emits.
    #[serde(default)]
    pub elasped_avg: f64,
}

/// Magnitude and unit of a test's declared run time.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredDuration {
    pub magnitude: f64,
    pub unit: String,
}

/// A single load-test run against a serving instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// Unique identifier
    pub test_id: String,

    #[serde(default)]
    pub instance_id: String,

    #[serde(default)]
    pub test_spec: TestSpec,

    #[serde(default)]
    pub param_spec: Option<ParamSpec>,

    #[serde(default)]
    pub test_status: Option<String>,

    #[serde(default)]
    pub prompt_tps: Option<f64>,

    #[serde(default)]
    pub generation_tps: Option<f64>,

    #[serde(default)]
    pub result: Option<TestResult>,

    /// Creation instant, normalized to UTC on the way in
    #[serde(with = "crate::models::timestamp::utc_timestamp")]
    pub create_time: DateTime<Utc>,
}

impl ExperimentRecord {
    pub fn identifier(&self) -> &str {
        &self.test_id
    }

    pub fn creation_timestamp(&self) -> DateTime<Utc> {
        self.create_time
    }

    pub fn declared_duration(&self) -> DeclaredDuration {
        DeclaredDuration {
            magnitude: self.test_spec.duration,
            unit: self.test_spec.duration_unit.clone(),
        }
    }
}

/// One page of experiments as returned by the serving API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExperimentPage {
    #[serde(default)]
    pub data: Vec<ExperimentRecord>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_num: u32,
    #[serde(default)]
    pub total_page: u32,
}

/// Request body for launching a load test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTest {
    pub instance_id: String,
    pub test_spec: TestSpec,
    pub param_spec: ParamSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}
