// Tool Abstraction and Executor
//
// This module provides the Tool capability and the registry that dispatches
// tool calls requested by the model.
//
// Design decisions:
// - Tools are values implementing the Tool trait (descriptor + invoke), not
//   reflected functions
// - ToolRegistry owns the name -> tool table and implements ToolExecutor
// - Execution never fails: unknown tools, bad arguments and tool errors all
//   become textual results tagged with the originating call id
// - Tools are kept in name order so schema listings are deterministic

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::coercion::coerce_arguments;
use crate::error::{HarnessError, Result};
use crate::schema::{generate_schema, render_system_prompt, SchemaFlavor};
use crate::tool_types::{Presence, ToolCall, ToolDescriptor, ToolResult};

// ============================================================================
// ToolError - what a tool reports on invalid input or failure
// ============================================================================

/// Error raised by a tool invocation.
///
/// The message is fed back to the model verbatim, so it should describe the
/// problem in terms the model can act on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// The arguments were understood but are not acceptable
    #[error("{0}")]
    InvalidArgument(String),

    /// The tool could not produce a result
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidArgument(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ToolError::Failed(message.into())
    }
}

// ============================================================================
// Tool Trait
// ============================================================================

/// A callable the model can invoke by name.
///
/// # Example
///
/// ```ignore
/// struct Echo {
///     descriptor: ToolDescriptor,
/// }
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn descriptor(&self) -> &ToolDescriptor {
///         &self.descriptor
///     }
///
///     async fn invoke(&self, arguments: Map<String, Value>) -> Result<Value, ToolError> {
///         Ok(json!({ "echoed": arguments.get("message") }))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declared name, parameters and description
    fn descriptor(&self) -> &ToolDescriptor;

    /// Unique tool name
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Invocation schema in the requested shape
    fn schema(&self, flavor: SchemaFlavor) -> Value {
        generate_schema(self.descriptor(), flavor)
    }

    /// Run the tool with already-coerced arguments
    async fn invoke(&self, arguments: Map<String, Value>) -> std::result::Result<Value, ToolError>;
}

// ============================================================================
// ToolExecutor - batch execution contract used by the driver
// ============================================================================

/// Executes batches of tool calls.
///
/// Implementations must return exactly one result per request, in order,
/// with the request's call id, and must never fail.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute one tool call
    async fn execute(&self, call: &ToolCall) -> ToolResult;

    /// Execute calls one after another, preserving order
    async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call).await);
        }
        results
    }
}

// ============================================================================
// ToolRegistry - name -> tool dispatch table
// ============================================================================

/// A registry of tools that implements ToolExecutor.
///
/// # Example
///
/// ```ignore
/// let registry = ToolRegistry::builder()
///     .tool(GetWeatherTool::new())
///     .tool(ConvertUnitsTool::new())
///     .build();
///
/// let scoped = registry.filtered(&["get_weather"])?;
/// let results = scoped.execute_all(&calls).await;
/// ```
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Create a registry holding every bundled mock tool
    pub fn with_mock_tools() -> Self {
        crate::mock_tools::all()
            .into_iter()
            .fold(ToolRegistry::builder(), |builder, tool| builder.tool_arc(tool))
            .build()
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Register an Arc-wrapped tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All tool names, in name order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Descriptors of all registered tools, in name order
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// Schemas of all registered tools, in name order
    pub fn schemas(&self, flavor: SchemaFlavor) -> Vec<Value> {
        self.tools.values().map(|t| t.schema(flavor)).collect()
    }

    /// Tool listing and call instructions for the prompt-embedded mode
    pub fn render_system_prompt(&self) -> String {
        render_system_prompt(self.descriptors())
    }

    /// New registry exposing only the named tools.
    ///
    /// Fails on the first name that is not registered, so a misconfigured
    /// sample is caught before any call is made.
    pub fn filtered<S: AsRef<str>>(&self, names: &[S]) -> Result<ToolRegistry> {
        let mut tools = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            let tool = self
                .tools
                .get(name)
                .ok_or_else(|| HarnessError::UnknownTool(name.to_string()))?;
            tools.insert(name.to_string(), Arc::clone(tool));
        }
        Ok(ToolRegistry { tools })
    }

    /// Create a builder for fluent tool registration
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool_name = %call.name, call_id = %call.call_id, "Unknown tool requested");
            return ToolResult {
                call_id: call.call_id.clone(),
                output: format!("Unknown function: {}", call.name),
            };
        };

        debug!(tool_name = %call.name, call_id = %call.call_id, "Executing tool");

        let output = match run_tool(tool.as_ref(), call).await {
            Ok(value) => value,
            Err(message) => {
                warn!(
                    tool_name = %call.name,
                    call_id = %call.call_id,
                    error = %message,
                    "Tool execution failed"
                );
                format!("Error executing {}: {}", call.name, message)
            }
        };

        ToolResult {
            call_id: call.call_id.clone(),
            output,
        }
    }
}

/// Resolve, coerce, invoke and serialize; any failure comes back as its message
async fn run_tool(tool: &dyn Tool, call: &ToolCall) -> std::result::Result<String, String> {
    let descriptor = tool.descriptor();
    let raw = match call.arguments.resolve() {
        Value::Object(map) => map,
        // Parameterless calls arrive as "" or null
        Value::Null => Map::new(),
        Value::String(text) if text.trim().is_empty() => Map::new(),
        // A bare value can only bind to a single declared parameter
        other if descriptor.parameters.len() == 1 => {
            let mut map = Map::new();
            map.insert(descriptor.parameters[0].name.clone(), other);
            map
        }
        other => return Err(format!("arguments must be a JSON object, got {}", other)),
    };

    if let Some(missing) = descriptor
        .parameters
        .iter()
        .find(|p| p.is_required() && !raw.contains_key(&p.name))
    {
        return Err(format!("missing required argument: '{}'", missing.name));
    }

    let mut arguments = coerce_arguments(descriptor, &raw).map_err(|e| e.to_string())?;
    for param in &descriptor.parameters {
        if arguments.contains_key(&param.name) {
            continue;
        }
        match &param.presence {
            Presence::Default(value) => {
                arguments.insert(param.name.clone(), value.clone());
            }
            Presence::Optional => {
                arguments.insert(param.name.clone(), Value::Null);
            }
            Presence::Required => {}
        }
    }

    let value = tool.invoke(arguments).await.map_err(|e| e.to_string())?;
    serde_json::to_string(&value).map_err(|e| e.to_string())
}

// ============================================================================
// ToolRegistryBuilder - Fluent API for Building Registry
// ============================================================================

/// Builder for creating a ToolRegistry with a fluent API.
pub struct ToolRegistryBuilder {
    registry: ToolRegistry,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
        }
    }

    /// Add a tool to the registry
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.registry.register(tool);
        self
    }

    /// Add an Arc-wrapped tool to the registry
    pub fn tool_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.registry.register_arc(tool);
        self
    }

    /// Build the registry
    pub fn build(self) -> ToolRegistry {
        self.registry
    }
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_types::{ParamType, ParameterSpec};
    use serde_json::json;

    struct CountTool {
        descriptor: ToolDescriptor,
    }

    impl CountTool {
        fn new() -> Self {
            Self {
                descriptor: ToolDescriptor::new(
                    "count_items",
                    "Count the items of a list.",
                    vec![ParameterSpec::new("items", ParamType::Array)],
                ),
            }
        }
    }

    #[async_trait]
    impl Tool for CountTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn invoke(
            &self,
            arguments: Map<String, Value>,
        ) -> std::result::Result<Value, ToolError> {
            let items = arguments
                .get("items")
                .and_then(|v| v.as_array())
                .ok_or_else(|| ToolError::invalid("items must be a list"))?;
            Ok(json!({ "count": items.len() }))
        }
    }

    #[tokio::test]
    async fn test_coerces_before_invoking() {
        let registry = ToolRegistry::builder().tool(CountTool::new()).build();
        let call = ToolCall::new("call_1", "count_items", json!({"items": "a, b, c"}));

        let result = registry.execute(&call).await;

        assert_eq!(result.call_id, "call_1");
        assert_eq!(result.output, r#"{"count":3}"#);
    }

    #[tokio::test]
    async fn test_bare_text_binds_to_single_parameter() {
        let registry = ToolRegistry::builder().tool(CountTool::new()).build();
        let call = ToolCall::new("call_1", "count_items", "x,y");

        let result = registry.execute(&call).await;

        assert_eq!(result.output, r#"{"count":2}"#);
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let registry = ToolRegistry::builder().tool(CountTool::new()).build();
        let call = ToolCall::new("call_1", "count_items", json!({}));

        let result = registry.execute(&call).await;

        assert_eq!(
            result.output,
            "Error executing count_items: missing required argument: 'items'"
        );
    }

    struct EchoTool {
        descriptor: ToolDescriptor,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                descriptor: ToolDescriptor::new(
                    "echo_args",
                    "Echo the arguments back.",
                    vec![
                        ParameterSpec::new("x", ParamType::String),
                        ParameterSpec::new("precision", ParamType::Integer).with_default(2),
                        ParameterSpec::new("note", ParamType::String).optional(),
                    ],
                ),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn invoke(
            &self,
            arguments: Map<String, Value>,
        ) -> std::result::Result<Value, ToolError> {
            Ok(Value::Object(arguments))
        }
    }

    struct PingTool {
        descriptor: ToolDescriptor,
    }

    #[async_trait]
    impl Tool for PingTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn invoke(&self, _: Map<String, Value>) -> std::result::Result<Value, ToolError> {
            Ok(json!("pong"))
        }
    }

    #[tokio::test]
    async fn test_absent_arguments_take_declared_defaults() {
        let registry = ToolRegistry::builder().tool(EchoTool::new()).build();
        let call = ToolCall::new("call_1", "echo_args", json!({"x": "a"}));

        let result = registry.execute(&call).await;
        let output: Value = serde_json::from_str(&result.output).unwrap();

        assert_eq!(output["x"], "a");
        assert_eq!(output["precision"], 2);
        assert!(output.as_object().unwrap().contains_key("note"));
        assert_eq!(output["note"], Value::Null);
    }

    #[tokio::test]
    async fn test_supplied_argument_overrides_default() {
        let registry = ToolRegistry::builder().tool(EchoTool::new()).build();
        let call = ToolCall::new("call_1", "echo_args", r#"{"x": "a", "precision": "5"}"#);

        let output: Value = serde_json::from_str(&registry.execute(&call).await.output).unwrap();

        assert_eq!(output["precision"], 5);
    }

    #[tokio::test]
    async fn test_empty_arguments_for_parameterless_tool() {
        let registry = ToolRegistry::builder()
            .tool(PingTool {
                descriptor: ToolDescriptor::new("ping", "Ping.", vec![]),
            })
            .build();

        for raw in ["", "null", "  "] {
            let result = registry.execute(&ToolCall::new("call_1", "ping", raw)).await;
            assert_eq!(result.output, r#""pong""#, "arguments {:?}", raw);
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall::new("call_9", "does_not_exist", json!({}));

        let result = registry.execute(&call).await;

        assert_eq!(result.call_id, "call_9");
        assert_eq!(result.output, "Unknown function: does_not_exist");
    }

    #[test]
    fn test_registry_is_name_ordered() {
        let registry = ToolRegistry::with_mock_tools();
        let names = registry.tool_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(registry.schemas(SchemaFlavor::Flat).len(), registry.len());
    }

    #[test]
    fn test_filtered_registry() {
        let registry = ToolRegistry::with_mock_tools();

        let scoped = registry.filtered(&["get_weather"]).unwrap();
        assert_eq!(scoped.tool_names(), vec!["get_weather"]);

        let err = registry
            .filtered(&["get_weather", "missing_tool"])
            .unwrap_err();
        assert!(matches!(err, HarnessError::UnknownTool(ref name) if name == "missing_tool"));
    }
}
