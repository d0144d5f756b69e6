//! Serving instance records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CpuSpec {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub core_amount: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GpuSpec {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub video_memory: String,
    #[serde(default)]
    pub card_amount: u32,
}

/// Hardware the instance runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InstanceSpec {
    #[serde(default)]
    pub cpu: CpuSpec,
    #[serde(default)]
    pub gpu: GpuSpec,
    #[serde(default)]
    pub memory: String,
}

/// Engine arguments the instance was started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StartupArgs {
    /// Prometheus job label the instance exports metrics under
    #[serde(default)]
    pub exported_job: String,
    #[serde(default)]
    pub dtype: String,
    #[serde(default)]
    pub load_format: String,
    #[serde(default)]
    pub max_num_batched_tokens: u64,
    #[serde(default)]
    pub max_num_seqs: u64,
    #[serde(default)]
    pub max_paddings: u64,
    #[serde(default)]
    pub max_seq_len: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub tokenizer: String,
    #[serde(default)]
    pub pipeline_parallel_size: u32,
    #[serde(default)]
    pub tensor_parallel_size: u32,
    #[serde(default)]
    pub quantization: Option<String>,
}

/// A deployed model-serving instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub instance_id: String,

    #[serde(default)]
    pub instance_name: Option<String>,

    #[serde(default)]
    pub instance_spec: Option<InstanceSpec>,

    #[serde(default)]
    pub startup_args: Option<StartupArgs>,

    #[serde(default)]
    pub serving_id: String,

    #[serde(default)]
    pub enode_id: String,

    #[serde(default)]
    pub deploy_status: String,

    #[serde(default)]
    pub create_time: String,
}

impl InstanceRecord {
    /// Display name, falling back to the id when unnamed.
    pub fn display_name(&self) -> &str {
        self.instance_name.as_deref().unwrap_or(&self.instance_id)
    }

    pub fn exported_job(&self) -> &str {
        self.startup_args
            .as_ref()
            .map(|args| args.exported_job.as_str())
            .unwrap_or("")
    }
}

/// Instance list wrapper returned by the serving API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstanceList {
    #[serde(default)]
    pub data: Vec<InstanceRecord>,
}

/// Request body for deploying a new instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInstance {
    pub instance_name: String,
    pub model: String,
}

impl Default for CreateInstance {
    fn default() -> Self {
        Self {
            instance_name: "enova_test".to_string(),
            model: "THUDM/chatglm3-6b".to_string(),
        }
    }
}
