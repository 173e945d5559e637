// Core traits for pluggable collaborators
//
// These traits keep the driver independent of:
// - the HTTP client that talks to the model API (and scripted stand-ins for tests)
// - where finished turns are persisted

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{ChatRequest, ChatResponse, ResponsesRequest, ResponsesResponse};
use crate::turn_log::ConversationTurn;

// ============================================================================
// ModelApi - the remote model, treated as a black box
// ============================================================================

/// Request/response access to the model.
///
/// Errors are not retried by the caller; any retry policy belongs to the
/// implementation.
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// Stateful-chain request (Responses API)
    async fn create_response(&self, request: ResponsesRequest) -> Result<ResponsesResponse>;

    /// Stateless request carrying the full message list (Chat Completions)
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
impl<T: ModelApi + ?Sized> ModelApi for std::sync::Arc<T> {
    async fn create_response(&self, request: ResponsesRequest) -> Result<ResponsesResponse> {
        (**self).create_response(request).await
    }

    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        (**self).chat_completion(request).await
    }
}

// ============================================================================
// TurnLogger - persistence of finished turns
// ============================================================================

/// Persists finished turns.
///
/// Implementations append; a logged turn is never rewritten.
pub trait TurnLogger: Send + Sync {
    /// Persist one turn
    fn log(&self, turn: &ConversationTurn) -> Result<()>;
}
