//! Echo 工具（测试用）

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::tools::TypedTool;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EchoArgs {
    /// Text to echo back
    pub text: String,
}

/// Echo 工具：回显文本
pub struct EchoTool;

#[async_trait]
impl TypedTool for EchoTool {
    type Args = EchoArgs;
    type Output = String;

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo text back unchanged (for testing)"
    }

    async fn call(&self, args: EchoArgs) -> Result<String, String> {
        Ok(args.text)
    }
}
