// In-memory implementations for testing
//
// - ScriptedModel plays back queued replies through either API variant and
//   records every request it receives
// - InMemoryTurnLogger keeps logged turns in a Vec

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use crate::error::{HarnessError, Result};
use crate::message::Message;
use crate::protocol::{
    ChatChoice, ChatRequest, ChatResponse, OutputContent, OutputItem, ResponsesRequest,
    ResponsesResponse, TypedOutputItem,
};
use crate::tool_types::ToolCall;
use crate::traits::{ModelApi, TurnLogger};
use crate::turn_log::ConversationTurn;

// ============================================================================
// ScriptedModel - Returns predefined replies
// ============================================================================

/// A scripted model reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Final text, no tool calls
    Text(String),
    /// Tool-call request, with optional accompanying text
    ToolCalls {
        text: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    /// Model API failure
    Failure(String),
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        ScriptedReply::Text(text.into())
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        ScriptedReply::ToolCalls {
            text: None,
            tool_calls,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ScriptedReply::Failure(message.into())
    }
}

/// A request the scripted model received
#[derive(Debug, Clone)]
pub enum RecordedRequest {
    Responses(ResponsesRequest),
    Chat(ChatRequest),
}

impl RecordedRequest {
    pub fn as_responses(&self) -> Option<&ResponsesRequest> {
        match self {
            RecordedRequest::Responses(request) => Some(request),
            RecordedRequest::Chat(_) => None,
        }
    }

    pub fn as_chat(&self) -> Option<&ChatRequest> {
        match self {
            RecordedRequest::Chat(request) => Some(request),
            RecordedRequest::Responses(_) => None,
        }
    }
}

/// Mock model API for testing
///
/// Returns queued replies in sequence, shaped for whichever API variant is
/// called. Responses-mode ids are `resp_1`, `resp_2`, ... in call order.
#[derive(Debug, Default, Clone)]
pub struct ScriptedModel {
    replies: Arc<RwLock<Vec<ScriptedReply>>>,
    call_index: Arc<RwLock<usize>>,
    call_log: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model that plays back the given replies
    pub fn with_replies(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(RwLock::new(replies)),
            ..Self::default()
        }
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.call_log.read().await.clone()
    }

    async fn next_reply(&self, request: RecordedRequest) -> (usize, ScriptedReply) {
        self.call_log.write().await.push(request);

        let mut index = self.call_index.write().await;
        let reply = self
            .replies
            .read()
            .await
            .get(*index)
            .cloned()
            .unwrap_or_else(|| ScriptedReply::text("Mock response (no more replies configured)"));
        *index += 1;
        (*index, reply)
    }
}

#[async_trait]
impl ModelApi for ScriptedModel {
    async fn create_response(&self, request: ResponsesRequest) -> Result<ResponsesResponse> {
        let (n, reply) = self.next_reply(RecordedRequest::Responses(request)).await;

        let (text, tool_calls) = match reply {
            ScriptedReply::Text(text) => (Some(text), Vec::new()),
            ScriptedReply::ToolCalls { text, tool_calls } => (text, tool_calls),
            ScriptedReply::Failure(message) => return Err(HarnessError::llm(message)),
        };

        let mut output = Vec::new();
        if let Some(text) = text {
            output.push(OutputItem::Typed(TypedOutputItem::Message {
                role: Some("assistant".to_string()),
                content: vec![OutputContent {
                    kind: "output_text".to_string(),
                    text: Some(text),
                }],
            }));
        }
        for call in tool_calls {
            output.push(OutputItem::Typed(TypedOutputItem::FunctionCall {
                call_id: call.call_id,
                name: call.name,
                arguments: call.arguments.to_wire_string(),
            }));
        }
        // Something unrecognised, as real endpoints emit reasoning items
        output.push(OutputItem::Unrecognized(json!({"type": "reasoning", "summary": []})));

        Ok(ResponsesResponse {
            id: format!("resp_{}", n),
            output,
            output_text: None,
        })
    }

    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let (_, reply) = self.next_reply(RecordedRequest::Chat(request)).await;

        let message = match reply {
            ScriptedReply::Text(text) => Message::assistant(text),
            ScriptedReply::ToolCalls { text, tool_calls } => {
                Message::assistant_with_tools(text, tool_calls)
            }
            ScriptedReply::Failure(message) => return Err(HarnessError::llm(message)),
        };

        Ok(ChatResponse {
            choices: vec![ChatChoice {
                message,
                finish_reason: Some("stop".to_string()),
            }],
        })
    }
}

// ============================================================================
// InMemoryTurnLogger
// ============================================================================

/// Turn logger that keeps turns in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryTurnLogger {
    turns: Arc<Mutex<Vec<ConversationTurn>>>,
}

impl InMemoryTurnLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns logged so far, in order
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.turns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TurnLogger for InMemoryTurnLogger {
    fn log(&self, turn: &ConversationTurn) -> Result<()> {
        self.turns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(turn.clone());
        Ok(())
    }
}
