//! JSON Schema 生成（schemars）
//!
//! - 工具参数 Schema：由 TypedTool::Args 自动生成，子 Schema 内联，避免 $ref
//! - TurnResult Schema：作为结构化输出要求（task_result）随每次模型调用下发

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::ResponseSchema;

/// 结构化输出的名称
pub const TASK_RESULT_SCHEMA_NAME: &str = "task_result";

/// 非工具调用轮次的结构化结果：中间步骤或任务完成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnResult {
    Step {
        /// The name of the step
        name: String,
        /// The result of the step
        result: String,
        /// The reasoning for this step
        reasoning: String,
    },
    Complete {
        /// The final result of the task
        result: String,
        /// The reasoning for completing the task
        reasoning: String,
    },
}

/// 模型返回的结构化载荷外层：{"response": TurnResult}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaskResultEnvelope {
    pub response: TurnResult,
}

/// 生成类型 T 的内联 JSON Schema（去掉顶层 $schema / title）
pub fn parameters_schema_for<T: JsonSchema>() -> Value {
    let schema = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<T>();
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| Value::Object(Default::default()));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    value
}

/// 结构化输出要求（task_result）
pub fn task_result_schema() -> ResponseSchema {
    ResponseSchema {
        name: TASK_RESULT_SCHEMA_NAME.to_string(),
        schema: parameters_schema_for::<TaskResultEnvelope>(),
    }
}
