//! 任务执行过程事件：供 CLI / 前端订阅轮次、工具调用、观察结果与步骤

use serde::Serialize;

/// 单步过程事件（可序列化为 JSON）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// 开始第 turn 轮模型调用（从 1 计）
    TurnStarted { turn: usize },
    /// 调用工具（参数为截断后的原始文本）
    ToolCall {
        id: String,
        tool: String,
        args_preview: String,
    },
    /// 工具返回（预览）
    Observation {
        id: String,
        tool: String,
        preview: String,
    },
    /// 模型给出的中间步骤
    Step {
        name: String,
        result: String,
        reasoning: String,
    },
    Complete { result: String, turns: usize },
}
