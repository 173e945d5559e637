// Error types for the harness
//
// Tool-level failures never show up here: the executor turns them into
// textual results. These errors are the ones that stop a turn or a run.

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors that can occur while driving conversations
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Model API failure (network, status, malformed response)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A tool subset named a tool that is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The model kept requesting tools past the per-turn limit
    #[error("Tool loop exceeded: model still requesting tools after {0} rounds")]
    ToolLoopExceeded(usize),

    /// Conversation file could not be read or parsed
    #[error("Conversation file error: {0}")]
    ConversationFile(String),

    /// Turn log could not be written
    #[error("Turn log error: {0}")]
    Log(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HarnessError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        HarnessError::Llm(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        HarnessError::Configuration(msg.into())
    }

    /// Create a conversation file error
    pub fn conversation_file(msg: impl Into<String>) -> Self {
        HarnessError::ConversationFile(msg.into())
    }
}
