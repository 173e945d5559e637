// Message types
//
// Message is the single transcript representation used by the driver, the
// chat request builder and the turn log. It serializes through the
// OpenAI chat wire record, emitting only the fields a variant carries.

use serde::{Deserialize, Serialize};

use crate::protocol::{ChatFunctionCall, ChatMessage, ChatToolCall};
use crate::tool_types::{RawArguments, ToolCall, ToolResult};

/// A message in the conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ChatMessage", try_from = "ChatMessage")]
pub enum Message {
    /// Instructions injected ahead of the conversation
    System { content: String },
    /// User input
    User { content: String },
    /// Model output, possibly requesting tool calls
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    /// Output of one executed tool call
    ToolResult { call_id: String, output: String },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Assistant message with text only
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Assistant message requesting tool calls
    pub fn assistant_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content,
            tool_calls,
        }
    }

    pub fn tool_result(result: &ToolResult) -> Self {
        Message::ToolResult {
            call_id: result.call_id.clone(),
            output: result.output.clone(),
        }
    }

    /// Wire role name
    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant { .. } => "assistant",
            Message::ToolResult { .. } => "tool",
        }
    }

    /// Text content, if the message carries any
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::System { content } | Message::User { content } => Some(content),
            Message::Assistant { content, .. } => content.as_deref(),
            Message::ToolResult { output, .. } => Some(output),
        }
    }
}

impl From<Message> for ChatMessage {
    fn from(message: Message) -> Self {
        let role = message.role().to_string();
        match message {
            Message::System { content } | Message::User { content } => ChatMessage {
                role,
                content: Some(content),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Assistant {
                content,
                tool_calls,
            } => ChatMessage {
                role,
                content,
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls.into_iter().map(ChatToolCall::from).collect())
                },
                tool_call_id: None,
            },
            Message::ToolResult { call_id, output } => ChatMessage {
                role,
                content: Some(output),
                tool_calls: None,
                tool_call_id: Some(call_id),
            },
        }
    }
}

impl TryFrom<ChatMessage> for Message {
    type Error = String;

    fn try_from(message: ChatMessage) -> std::result::Result<Self, Self::Error> {
        match message.role.as_str() {
            "system" | "developer" => Ok(Message::System {
                content: message.content.unwrap_or_default(),
            }),
            "user" => Ok(Message::User {
                content: message.content.unwrap_or_default(),
            }),
            "assistant" => Ok(Message::Assistant {
                content: message.content,
                tool_calls: message
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(ToolCall::from)
                    .collect(),
            }),
            "tool" => Ok(Message::ToolResult {
                call_id: message
                    .tool_call_id
                    .ok_or_else(|| "tool message without tool_call_id".to_string())?,
                output: message.content.unwrap_or_default(),
            }),
            other => Err(format!("unknown message role: {}", other)),
        }
    }
}

impl From<ToolCall> for ChatToolCall {
    fn from(call: ToolCall) -> Self {
        ChatToolCall {
            id: call.call_id,
            kind: "function".to_string(),
            function: ChatFunctionCall {
                name: call.name,
                arguments: call.arguments.to_wire_string(),
            },
        }
    }
}

impl From<ChatToolCall> for ToolCall {
    fn from(call: ChatToolCall) -> Self {
        ToolCall {
            call_id: call.id,
            name: call.function.name,
            arguments: RawArguments::Text(call.function.arguments),
        }
    }
}
