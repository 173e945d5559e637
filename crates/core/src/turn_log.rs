// Turn Logger
//
// One JSON line per finished turn, appended to a log file. The file is opened
// in append mode for each turn and closed again before returning, so earlier
// lines are never truncated or rewritten. Not safe for concurrent writers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::message::Message;
use crate::tool_types::{ToolCall, ToolResult};
use crate::traits::TurnLogger;

/// Record of one user input and everything it caused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sample_id: usize,
    /// 1-based, increasing within a conversation
    pub turn_id: usize,
    /// Transcript snapshot at the time of logging
    pub messages: Vec<Message>,
    pub user_message: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_outputs: Vec<ToolResult>,
    pub assistant_message: String,
}

/// `conversation_logs_<model>_<timestamp>.jsonl`
pub fn log_file_name(model: &str, timestamp: DateTime<Local>) -> String {
    let model: String = model
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!(
        "conversation_logs_{}_{}.jsonl",
        model,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Appends turns to a JSONL file
#[derive(Debug, Clone)]
pub struct JsonlTurnLogger {
    path: PathBuf,
}

impl JsonlTurnLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Logger writing to `dir/conversation_logs_<model>_<now>.jsonl`
    pub fn for_model(dir: impl AsRef<Path>, model: &str) -> Self {
        Self::new(dir.as_ref().join(log_file_name(model, Local::now())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TurnLogger for JsonlTurnLogger {
    fn log(&self, turn: &ConversationTurn) -> Result<()> {
        let line = serde_json::to_string(turn).map_err(anyhow::Error::from)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        debug!(
            sample_id = turn.sample_id,
            turn_id = turn.turn_id,
            path = %self.path.display(),
            "Turn logged"
        );
        Ok(())
    }
}
