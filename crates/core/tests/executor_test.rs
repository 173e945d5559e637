// Integration tests for tool execution through the registry

use serde_json::{json, Value};
use toolbench_core::{
    mock_tools::{ConvertUnitsTool, GetWeatherTool},
    SchemaFlavor, ToolCall, ToolExecutor, ToolRegistry,
};

fn registry() -> ToolRegistry {
    ToolRegistry::builder()
        .tool(GetWeatherTool::new())
        .tool(ConvertUnitsTool::new())
        .build()
}

#[tokio::test]
async fn test_weather_round_trip() {
    let result = registry()
        .execute(&ToolCall::new(
            "call_1",
            "get_weather",
            json!({"location": "Boston"}),
        ))
        .await;

    assert_eq!(result.call_id, "call_1");
    let parsed: Value = serde_json::from_str(&result.output).unwrap();
    assert_eq!(
        parsed,
        json!({"location": "Boston", "temperature": 72, "forecast": ["sunny", "windy"]})
    );
}

#[tokio::test]
async fn test_tool_failure_is_reported_as_data() {
    let result = registry()
        .execute(&ToolCall::new(
            "call_2",
            "get_weather",
            r#"{"location": "Madrid"}"#,
        ))
        .await;

    assert_eq!(result.call_id, "call_2");
    assert!(result.output.contains("Error executing get_weather"));
}

#[tokio::test]
async fn test_unknown_tool_keeps_call_id() {
    let result = registry()
        .execute(&ToolCall::new("call_3", "does_not_exist", json!({})))
        .await;

    assert_eq!(result.call_id, "call_3");
    assert_eq!(result.output, "Unknown function: does_not_exist");
}

#[tokio::test]
async fn test_execute_all_is_total_and_ordered() {
    let calls = vec![
        ToolCall::new("a", "get_weather", json!({"location": "Boston"})),
        ToolCall::new("b", "does_not_exist", json!({})),
        ToolCall::new("c", "convert_units", "{not json"),
        ToolCall::new(
            "d",
            "convert_units",
            json!({"value": "5", "from_unit": "kilometers", "to_unit": "parsecs"}),
        ),
        ToolCall::new(
            "e",
            "convert_units",
            r#"{"value": "2", "from_unit": "kilograms", "to_unit": "grams"}"#,
        ),
    ];

    let results = registry().execute_all(&calls).await;

    assert_eq!(results.len(), calls.len());
    for (call, result) in calls.iter().zip(&results) {
        assert_eq!(call.call_id, result.call_id);
    }
    assert!(results[2].output.starts_with("Error executing convert_units"));
    assert!(results[3].output.starts_with("Error executing convert_units"));
    let converted: Value = serde_json::from_str(&results[4].output).unwrap();
    assert_eq!(converted["result"], 2000.0);
}

#[test]
fn test_filtered_executor() {
    let registry = registry();

    let scoped = registry.filtered(&["get_weather"]).unwrap();
    assert_eq!(scoped.tool_names(), vec!["get_weather"]);
    assert!(!scoped.has("convert_units"));

    let err = registry
        .filtered(&["get_weather", "missing_tool"])
        .unwrap_err();
    assert!(err.to_string().contains("missing_tool"));
}

#[tokio::test]
async fn test_filtered_executor_hides_other_tools() {
    let scoped = registry().filtered(&["get_weather"]).unwrap();
    let result = scoped
        .execute(&ToolCall::new("call_1", "convert_units", json!({})))
        .await;
    assert_eq!(result.output, "Unknown function: convert_units");
}

#[test]
fn test_schema_determinism() {
    let registry = registry();
    for flavor in [SchemaFlavor::Flat, SchemaFlavor::Nested] {
        assert_eq!(registry.schemas(flavor), registry.schemas(flavor));
    }
    assert_eq!(registry.render_system_prompt(), registry.render_system_prompt());
}
