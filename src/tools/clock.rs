//! 当前时间工具

use async_trait::async_trait;
use chrono::{Local, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::TypedTool;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ClockArgs {
    /// Return UTC instead of the local time zone
    #[serde(default)]
    pub utc: bool,
}

#[derive(Debug, Serialize)]
pub struct ClockReading {
    pub rfc3339: String,
    pub unix: i64,
}

/// 返回当前时间（RFC 3339 + Unix 秒）
pub struct ClockTool;

#[async_trait]
impl TypedTool for ClockTool {
    type Args = ClockArgs;
    type Output = ClockReading;

    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time"
    }

    async fn call(&self, args: ClockArgs) -> Result<ClockReading, String> {
        let reading = if args.utc {
            let now = Utc::now();
            ClockReading {
                rfc3339: now.to_rfc3339(),
                unix: now.timestamp(),
            }
        } else {
            let now = Local::now();
            ClockReading {
                rfc3339: now.to_rfc3339(),
                unix: now.timestamp(),
            }
        };
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, Typed};

    #[tokio::test]
    async fn test_utc_reading_parses_back() {
        let out = Typed(ClockTool)
            .execute(serde_json::json!({"utc": true}))
            .await
            .unwrap();
        let text = out["rfc3339"].as_str().unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(text).unwrap();
        assert_eq!(parsed.timestamp(), out["unix"].as_i64().unwrap());
    }

    #[tokio::test]
    async fn test_arguments_are_optional() {
        assert!(Typed(ClockTool).execute(serde_json::json!({})).await.is_ok());
    }
}
