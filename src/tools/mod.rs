pub mod clock;
pub mod echo;
pub mod executor;
pub mod registry;
pub mod schema;

pub use clock::ClockTool;
pub use echo::EchoTool;
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry, Typed, TypedTool};
pub use schema::{task_result_schema, TaskResultEnvelope, TurnResult};
