//! 工作流与任务文件
//!
//! Workflow 只提供 description / output 两个文本字段，供上下文构建使用；
//! TaskFile 是命令行入口读取的 TOML 任务文件（[workflow] + [agent]）。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::AgentSpec;
use crate::core::AgentError;

/// 工作流定义（只读）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// 工作流描述：要做什么
    #[serde(default)]
    pub description: String,
    /// 期望的输出
    #[serde(default)]
    pub output: String,
}

impl Workflow {
    pub fn new(description: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            output: output.into(),
        }
    }
}

/// TOML 任务文件
#[derive(Debug, Clone, Deserialize)]
pub struct TaskFile {
    pub workflow: Workflow,
    pub agent: AgentSpec,
}

impl TaskFile {
    pub fn parse(text: &str) -> Result<Self, AgentError> {
        toml::from_str(text).map_err(|e| AgentError::ConfigError(format!("invalid task file: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AgentError::ConfigError(format!("cannot read task file {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }
}
