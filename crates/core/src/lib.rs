// Tool-Calling Evaluation Harness
//
// This crate drives a language-model API through scripted multi-turn
// conversations, executes the tool calls the model requests against
// registered tools, and records every turn to an append-only JSONL log.
//
// Key design decisions:
// - Tools describe themselves with a declarative ToolDescriptor; schemas and
//   argument coercion are both derived from it
// - Tools are values implementing the Tool trait, dispatched by ToolRegistry
// - Tool execution never fails: every call yields exactly one textual result
// - One Message sum type serves the driver, the chat wire format and the log
// - The model API sits behind the ModelApi trait (HTTP client lives in
//   toolbench-openai, a scripted stand-in lives in `memory`)
// - Each turn is bounded by a maximum number of tool-execution rounds

// Tool description, schemas and coercion
pub mod coercion;
pub mod docstring;
pub mod schema;
pub mod tool_types;

// Execution
pub mod mock_tools;
pub mod tools;

// Conversation flow
pub mod conversations;
pub mod driver;
pub mod message;
pub mod protocol;
pub mod runner;
pub mod traits;
pub mod turn_log;

pub mod error;

// In-memory implementations for testing
pub mod memory;

// Re-exports for convenience
pub use coercion::{coerce_arguments, coerce_value, CoercionError};
pub use conversations::{load_conversations, ConversationFile, ConversationSpec};
pub use driver::{
    Conversation, ConversationContext, ConversationDriver, DriverMode, TurnOutcome,
    DEFAULT_MAX_TOOL_ROUNDS,
};
pub use error::{HarnessError, Result};
pub use message::Message;
pub use runner::{run_conversations, run_samples, select_samples, RunConfig, RunSummary};
pub use schema::{generate_schema, render_system_prompt, SchemaFlavor};
pub use tool_types::{
    CustomType, ParamType, ParameterSpec, Presence, RawArguments, ToolCall, ToolDescriptor,
    ToolResult,
};
pub use tools::{Tool, ToolError, ToolExecutor, ToolRegistry, ToolRegistryBuilder};
pub use traits::{ModelApi, TurnLogger};
pub use turn_log::{ConversationTurn, JsonlTurnLogger};
