// OpenAI Protocol Types
//
// Request and response shapes for the two model API variants the driver
// speaks:
// - Responses API (stateful chain): `{model, input, tools, previous_response_id?}`
//   answered by a list of output items
// - Chat Completions: `{model, messages, tools?}` answered by
//   `choices[0].message` with optional `tool_calls`
//
// Output items of unknown type are kept as raw JSON so text can still be
// scavenged from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;
use crate::tool_types::{RawArguments, ToolCall, ToolResult};

/// Fallback answer when a response carries no text at all
pub const NO_TEXT_RESPONSE: &str = "No text response found";

// ============================================================================
// Chat Completions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: ChatFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Chat Completions request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

/// Chat Completions response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// The first choice's message, if the API returned any choice
    pub fn message(&self) -> Option<&Message> {
        self.choices.first().map(|choice| &choice.message)
    }
}

// ============================================================================
// Responses API
// ============================================================================

/// One item of Responses API input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    /// A role-tagged text message
    Message { role: String, content: String },
    /// The output of a tool call requested in the previous response
    FunctionCallOutput { call_id: String, output: String },
}

impl InputItem {
    pub fn user(content: impl Into<String>) -> Self {
        InputItem::Message {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

impl From<&ToolResult> for InputItem {
    fn from(result: &ToolResult) -> Self {
        InputItem::FunctionCallOutput {
            call_id: result.call_id.clone(),
            output: result.output.clone(),
        }
    }
}

/// Responses API request
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: Vec<InputItem>,
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

/// Responses API response
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesResponse {
    /// Continuation handle for the next request
    pub id: String,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    /// Convenience text some endpoints include directly
    #[serde(default)]
    pub output_text: Option<String>,
}

/// Output item, typed when recognised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputItem {
    Typed(TypedOutputItem),
    Unrecognized(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypedOutputItem {
    Message {
        #[serde(default)]
        role: Option<String>,
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ResponsesResponse {
    /// Tool calls requested by this response, in output order
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Typed(TypedOutputItem::FunctionCall {
                    call_id,
                    name,
                    arguments,
                }) => Some(ToolCall {
                    call_id: call_id.clone(),
                    name: name.clone(),
                    arguments: RawArguments::Text(arguments.clone()),
                }),
                _ => None,
            })
            .collect()
    }

    /// Displayable text, looked up in order:
    /// 1. `output_text` parts of the first message item
    /// 2. the raw `output_text` field
    /// 3. any text-bearing item at all
    pub fn text(&self) -> String {
        self.message_text()
            .or_else(|| self.output_text.clone().filter(|t| !t.is_empty()))
            .or_else(|| self.scavenged_text())
            .unwrap_or_else(|| NO_TEXT_RESPONSE.to_string())
    }

    /// Text of the first message item, if it carries any `output_text`
    pub fn message_text(&self) -> Option<String> {
        self.output.iter().find_map(|item| match item {
            OutputItem::Typed(TypedOutputItem::Message { content, .. }) => {
                let text: String = content
                    .iter()
                    .filter(|part| part.kind == "output_text")
                    .filter_map(|part| part.text.as_deref())
                    .collect();
                (!text.is_empty()).then_some(text)
            }
            _ => None,
        })
    }

    fn scavenged_text(&self) -> Option<String> {
        self.output.iter().find_map(|item| match item {
            OutputItem::Typed(TypedOutputItem::Message { content, .. }) => content
                .iter()
                .filter_map(|part| part.text.clone())
                .find(|t| !t.is_empty()),
            OutputItem::Typed(TypedOutputItem::FunctionCall { .. }) => None,
            OutputItem::Unrecognized(value) => text_in_value(value),
        })
    }
}

/// `text` on the item itself, or on any of its `content` parts
fn text_in_value(value: &Value) -> Option<String> {
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }
    value
        .get("content")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .find(|t| !t.is_empty())
        .map(str::to_string)
}
