//! 智能体定义
//!
//! Agent 是执行循环的只读输入：角色名、描述、模型 id 与可选的工具表。
//! system_prompt 生成每轮调用前置的 system 消息（角色 + 固定的工作方式）。

use serde::Deserialize;

use crate::tools::ToolRegistry;

/// 智能体：构造后不可变，由调用方持有
#[derive(Debug, Clone)]
pub struct Agent {
    pub role: String,
    pub description: String,
    pub model: String,
    pub tools: Option<ToolRegistry>,
}

impl Agent {
    pub fn new(role: impl Into<String>, description: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            description: description.into(),
            model: model.into(),
            tools: None,
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// 有非空工具表时返回
    pub fn toolset(&self) -> Option<&ToolRegistry> {
        self.tools.as_ref().filter(|t| !t.is_empty())
    }

    /// 每轮调用前置的 system 指令
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\n\n\
             Your job is to complete the assigned task.\n\
             1. You can break down the task into steps\n\
             2. You can use available tools when needed\n\n\
             First try to complete the task on your own.\n\
             Only ask question to the user if you cannot complete the task without their input.",
            self.role, self.description
        )
    }
}

/// 任务文件中的 [agent] 段；model 缺省时由调用方用配置中的默认模型补齐
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    #[serde(default)]
    pub description: String,
    pub model: Option<String>,
}

impl AgentSpec {
    pub fn into_agent(self, default_model: &str) -> Agent {
        let model = self.model.unwrap_or_else(|| default_model.to_string());
        Agent::new(self.role, self.description, model)
    }
}
