// Conversation Driver
//
// Runs one user turn as a small state machine:
//
// ```text
// AwaitingModel ──(no tool calls)──> FinalText
//      ^    │
//      │    └──(tool calls)──> ExecutingTools ──> AppendingResults ─┐
//      └────────────────────────────────────────────────────────────┘
// ```
//
// Design decisions:
// - Two scheduling variants share the loop: the Responses chain (the API
//   keeps history, we keep only the previous response id) and chat (we keep
//   the full message list)
// - Tool calls within a round run sequentially, in request order
// - A per-turn round limit ends runaway loops with ToolLoopExceeded
// - Model API errors propagate untouched; tool errors never reach here

use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{HarnessError, Result};
use crate::message::Message;
use crate::protocol::{ChatRequest, InputItem, ResponsesRequest, NO_TEXT_RESPONSE};
use crate::schema::SchemaFlavor;
use crate::tool_types::{ToolCall, ToolResult};
use crate::tools::{ToolExecutor, ToolRegistry};
use crate::traits::ModelApi;
use crate::turn_log::ConversationTurn;

/// Default limit on tool-execution rounds per turn
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;

// ============================================================================
// DriverMode
// ============================================================================

/// How the driver talks to the model and advertises tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverMode {
    /// Responses API with a response-chain handle
    Responses,
    /// Chat Completions with schemas passed as the `tools` parameter
    #[default]
    ChatTools,
    /// Chat Completions with schemas rendered into a leading system message
    SystemPrompt,
}

impl DriverMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverMode::Responses => "responses",
            DriverMode::ChatTools => "chat_tools",
            DriverMode::SystemPrompt => "system_prompt",
        }
    }
}

impl fmt::Display for DriverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverMode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "responses" => Ok(DriverMode::Responses),
            "chat_tools" => Ok(DriverMode::ChatTools),
            "system_prompt" => Ok(DriverMode::SystemPrompt),
            other => Err(HarnessError::config(format!(
                "unknown mode '{}' (expected responses, chat_tools or system_prompt)",
                other
            ))),
        }
    }
}

// ============================================================================
// Conversation state
// ============================================================================

/// Source of truth for conversation history; exactly one per conversation
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationContext {
    /// History lives with the API; the transcript is kept only for logging
    ResponseChain {
        previous_response_id: Option<String>,
        transcript: Vec<Message>,
    },
    /// History is the explicit message list sent with every request
    Messages(Vec<Message>),
}

/// One conversation sample being driven
#[derive(Debug, Clone)]
pub struct Conversation {
    pub sample_id: usize,
    context: ConversationContext,
    turns: usize,
}

impl Conversation {
    pub fn new(sample_id: usize, mode: DriverMode) -> Self {
        let context = match mode {
            DriverMode::Responses => ConversationContext::ResponseChain {
                previous_response_id: None,
                transcript: Vec::new(),
            },
            DriverMode::ChatTools | DriverMode::SystemPrompt => {
                ConversationContext::Messages(Vec::new())
            }
        };
        Self {
            sample_id,
            context,
            turns: 0,
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Transcript so far
    pub fn messages(&self) -> &[Message] {
        match &self.context {
            ConversationContext::ResponseChain { transcript, .. } => transcript,
            ConversationContext::Messages(messages) => messages,
        }
    }

    /// Handle of the latest response, in chain mode
    pub fn response_id(&self) -> Option<&str> {
        match &self.context {
            ConversationContext::ResponseChain {
                previous_response_id,
                ..
            } => previous_response_id.as_deref(),
            ConversationContext::Messages(_) => None,
        }
    }

    /// Freeze a finished turn into its log record
    pub fn record_turn(&mut self, user_message: &str, outcome: TurnOutcome) -> ConversationTurn {
        self.turns += 1;
        ConversationTurn {
            sample_id: self.sample_id,
            turn_id: self.turns,
            messages: self.messages().to_vec(),
            user_message: user_message.to_string(),
            tool_calls: outcome.tool_calls,
            tool_outputs: outcome.tool_outputs,
            assistant_message: outcome.final_text,
        }
    }

    fn push(&mut self, message: Message) {
        match &mut self.context {
            ConversationContext::ResponseChain { transcript, .. } => transcript.push(message),
            ConversationContext::Messages(messages) => messages.push(message),
        }
    }

    fn set_response_id(&mut self, id: String) {
        if let ConversationContext::ResponseChain {
            previous_response_id,
            ..
        } = &mut self.context
        {
            *previous_response_id = Some(id);
        }
    }
}

/// What one turn produced
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub final_text: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_outputs: Vec<ToolResult>,
    /// Tool-execution rounds it took to reach the final text
    pub rounds: usize,
    /// Chain handle after the turn, in Responses mode
    pub response_id: Option<String>,
}

// ============================================================================
// Turn state machine
// ============================================================================

#[derive(Debug)]
enum TurnState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    AppendingResults(Vec<ToolResult>),
    FinalText(String),
}

/// Model reply reduced to what the state machine needs
struct ModelReply {
    tool_calls: Vec<ToolCall>,
    text: String,
}

/// Drives turns against a model API
pub struct ConversationDriver<M: ModelApi> {
    model_api: M,
    model: String,
    mode: DriverMode,
    max_tool_rounds: usize,
}

impl<M: ModelApi> ConversationDriver<M> {
    pub fn new(model_api: M, model: impl Into<String>, mode: DriverMode) -> Self {
        Self {
            model_api,
            model: model.into(),
            mode,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the per-turn limit on tool-execution rounds
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Run one user turn to its final answer
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        tools: &ToolRegistry,
        user_message: &str,
    ) -> Result<TurnOutcome> {
        if self.mode == DriverMode::SystemPrompt && conversation.messages().is_empty() {
            conversation.push(Message::system(tools.render_system_prompt()));
        }
        conversation.push(Message::user(user_message));

        let mut pending_input = vec![InputItem::user(user_message)];
        let mut tool_calls = Vec::new();
        let mut tool_outputs = Vec::new();
        let mut rounds = 0;
        let mut state = TurnState::AwaitingModel;

        loop {
            state = match state {
                TurnState::AwaitingModel => {
                    let reply = self
                        .ask_model(conversation, tools, std::mem::take(&mut pending_input))
                        .await?;

                    if reply.tool_calls.is_empty() {
                        TurnState::FinalText(reply.text)
                    } else if rounds >= self.max_tool_rounds {
                        return Err(HarnessError::ToolLoopExceeded(self.max_tool_rounds));
                    } else {
                        TurnState::ExecutingTools(reply.tool_calls)
                    }
                }
                TurnState::ExecutingTools(calls) => {
                    rounds += 1;
                    debug!(
                        sample_id = conversation.sample_id,
                        round = rounds,
                        calls = calls.len(),
                        "Executing tool calls"
                    );
                    let results = tools.execute_all(&calls).await;
                    tool_calls.extend(calls);
                    TurnState::AppendingResults(results)
                }
                TurnState::AppendingResults(results) => {
                    for result in &results {
                        conversation.push(Message::tool_result(result));
                    }
                    if self.mode == DriverMode::Responses {
                        pending_input = results.iter().map(InputItem::from).collect();
                    }
                    tool_outputs.extend(results);
                    TurnState::AwaitingModel
                }
                TurnState::FinalText(text) => {
                    info!(
                        sample_id = conversation.sample_id,
                        rounds,
                        tool_calls = tool_calls.len(),
                        "Turn complete"
                    );
                    return Ok(TurnOutcome {
                        final_text: text,
                        tool_calls,
                        tool_outputs,
                        rounds,
                        response_id: conversation.response_id().map(str::to_string),
                    });
                }
            };
        }
    }

    async fn ask_model(
        &self,
        conversation: &mut Conversation,
        tools: &ToolRegistry,
        input: Vec<InputItem>,
    ) -> Result<ModelReply> {
        match self.mode {
            DriverMode::Responses => self.ask_responses(conversation, tools, input).await,
            DriverMode::ChatTools | DriverMode::SystemPrompt => {
                self.ask_chat(conversation, tools).await
            }
        }
    }

    async fn ask_responses(
        &self,
        conversation: &mut Conversation,
        tools: &ToolRegistry,
        input: Vec<InputItem>,
    ) -> Result<ModelReply> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            input,
            tools: tools.schemas(SchemaFlavor::Flat),
            previous_response_id: conversation.response_id().map(str::to_string),
        };

        let response = self.model_api.create_response(request).await?;
        conversation.set_response_id(response.id.clone());

        let tool_calls = response.tool_calls();
        if tool_calls.is_empty() {
            let text = response.text();
            conversation.push(Message::assistant(text.clone()));
            Ok(ModelReply {
                tool_calls,
                text,
            })
        } else {
            conversation.push(Message::assistant_with_tools(
                response.message_text(),
                tool_calls.clone(),
            ));
            Ok(ModelReply {
                tool_calls,
                text: String::new(),
            })
        }
    }

    async fn ask_chat(
        &self,
        conversation: &mut Conversation,
        tools: &ToolRegistry,
    ) -> Result<ModelReply> {
        let schemas = match self.mode {
            DriverMode::ChatTools if !tools.is_empty() => {
                Some(tools.schemas(SchemaFlavor::Nested))
            }
            _ => None,
        };
        let request = ChatRequest {
            model: self.model.clone(),
            messages: conversation.messages().to_vec(),
            tools: schemas,
        };

        let response = self.model_api.chat_completion(request).await?;
        let message = response
            .message()
            .cloned()
            .ok_or_else(|| HarnessError::llm("chat completion returned no choices"))?;

        let reply = match &message {
            Message::Assistant {
                content,
                tool_calls,
            } => ModelReply {
                tool_calls: tool_calls.clone(),
                text: content
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| NO_TEXT_RESPONSE.to_string()),
            },
            other => {
                return Err(HarnessError::llm(format!(
                    "expected an assistant message, got role '{}'",
                    other.role()
                )))
            }
        };

        conversation.push(message);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("responses".parse::<DriverMode>().unwrap(), DriverMode::Responses);
        assert_eq!("chat_tools".parse::<DriverMode>().unwrap(), DriverMode::ChatTools);
        assert_eq!(
            "system_prompt".parse::<DriverMode>().unwrap(),
            DriverMode::SystemPrompt
        );
        assert!("stream".parse::<DriverMode>().is_err());
        assert_eq!(DriverMode::default(), DriverMode::ChatTools);
    }

    #[test]
    fn test_conversation_context_follows_mode() {
        let chain = Conversation::new(1, DriverMode::Responses);
        assert!(matches!(
            chain.context(),
            ConversationContext::ResponseChain { .. }
        ));

        let chat = Conversation::new(1, DriverMode::SystemPrompt);
        assert!(matches!(chat.context(), ConversationContext::Messages(_)));
        assert!(chat.response_id().is_none());
    }

    #[test]
    fn test_record_turn_increments_turn_id() {
        let mut conversation = Conversation::new(3, DriverMode::ChatTools);
        conversation.push(Message::user("Hi"));

        let outcome = TurnOutcome {
            final_text: "Hello".to_string(),
            tool_calls: vec![],
            tool_outputs: vec![],
            rounds: 0,
            response_id: None,
        };
        let first = conversation.record_turn("Hi", outcome.clone());
        let second = conversation.record_turn("Again", outcome);

        assert_eq!(first.sample_id, 3);
        assert_eq!(first.turn_id, 1);
        assert_eq!(second.turn_id, 2);
        assert_eq!(first.messages, vec![Message::user("Hi")]);
    }
}
