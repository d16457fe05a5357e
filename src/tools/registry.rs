//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），ToolRegistry 是智能体的
//! 「工具名 -> 工具」映射；TypedTool 以强类型参数声明工具，参数 Schema 由 schemars 自动生成。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::tools::schema::parameters_schema_for;

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 与返回值均为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（注册时的默认键）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema（供 LLM 生成正确的参数格式）
    /// 默认返回空对象，表示无参数
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具；返回任意可序列化结果
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// 强类型工具：参数类型同时用于生成 Schema 与校验（反序列化失败即参数非法）
#[async_trait]
pub trait TypedTool: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + Send;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, String>;
}

/// 将 TypedTool 适配为 dyn Tool
pub struct Typed<T>(pub T);

#[async_trait]
impl<T: TypedTool> Tool for Typed<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn parameters_schema(&self) -> Value {
        parameters_schema_for::<T::Args>()
    }

    async fn execute(&self, args: Value) -> Result<Value, String> {
        let args: T::Args =
            serde_json::from_value(args).map_err(|e| format!("invalid arguments: {e}"))?;
        let output = self.0.call(args).await?;
        serde_json::to_value(output).map_err(|e| format!("unserializable result: {e}"))
    }
}

/// 工具注册表：按名称存储 Arc<dyn Tool>（按名称排序，保证函数描述顺序稳定）
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以工具自身名称注册
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// 以指定名称注册（映射键即模型看到的函数名）
    pub fn register_as(&mut self, name: impl Into<String>, tool: Arc<dyn Tool>) {
        self.tools.insert(name.into(), tool);
    }

    /// 注册强类型工具
    pub fn register_typed<T: TypedTool>(&mut self, tool: T) {
        self.register(Typed(tool));
    }

    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<dyn Tool>)> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct AddArgs {
        /// 加数
        a: i64,
        b: i64,
    }

    struct Add;

    #[async_trait]
    impl TypedTool for Add {
        type Args = AddArgs;
        type Output = i64;

        fn name(&self) -> &str {
            "add"
        }

        fn description(&self) -> &str {
            "Add two integers"
        }

        async fn call(&self, args: AddArgs) -> Result<i64, String> {
            Ok(args.a + args.b)
        }
    }

    #[tokio::test]
    async fn test_typed_tool_executes_with_valid_args() {
        let tool = Typed(Add);
        let out = tool.execute(serde_json::json!({"a": 2, "b": 40})).await.unwrap();
        assert_eq!(out, serde_json::json!(42));
    }

    #[tokio::test]
    async fn test_typed_tool_rejects_invalid_args() {
        let tool = Typed(Add);
        let err = tool.execute(serde_json::json!({"a": "two"})).await.unwrap_err();
        assert!(err.starts_with("invalid arguments"));
    }

    #[test]
    fn test_typed_tool_schema_lists_fields() {
        let schema = Typed(Add).parameters_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].get("a").is_some());
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"a") && required.contains(&"b"));
    }

    #[test]
    fn test_registry_is_ordered_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register_typed(Add);
        registry.register_as("zeta", Arc::new(Typed(Add)));
        registry.register_as("alpha", Arc::new(Typed(Add)));
        assert_eq!(registry.tool_names(), vec!["add", "alpha", "zeta"]);
        assert!(registry.get("zeta").is_some());
        assert!(registry.get("missing").is_none());
    }
}
