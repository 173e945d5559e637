// Sample runner
//
// Drives every selected conversation sample, one turn at a time, and hands
// each finished turn to the turn logger.
//
// Failure policy:
// - ToolLoopExceeded abandons the rest of that sample and moves on
// - an unknown tool subset in any selected sample fails before the first turn
// - any other error (model API, log I/O) ends the run

use std::path::PathBuf;
use tracing::{info, warn};

use crate::conversations::{load_conversations, ConversationSpec};
use crate::driver::{Conversation, ConversationDriver, DriverMode, DEFAULT_MAX_TOOL_ROUNDS};
use crate::error::{HarnessError, Result};
use crate::tools::ToolRegistry;
use crate::traits::{ModelApi, TurnLogger};

/// Everything a run needs, built once before the run starts
#[derive(Clone)]
pub struct RunConfig {
    pub conversations_file: PathBuf,
    pub model: String,
    pub mode: DriverMode,
    /// 1-based sample indices to run; `None` runs every sample
    pub samples: Option<Vec<usize>>,
    pub api_key: String,
    pub base_url: Option<String>,
    /// Directory receiving the JSONL turn log
    pub output_dir: PathBuf,
    pub max_tool_rounds: usize,
}

impl RunConfig {
    pub fn new(
        conversations_file: impl Into<PathBuf>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            conversations_file: conversations_file.into(),
            model: model.into(),
            mode: DriverMode::default(),
            samples: None,
            api_key: api_key.into(),
            base_url: None,
            output_dir: PathBuf::from("."),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("conversations_file", &self.conversations_file)
            .field("model", &self.model)
            .field("mode", &self.mode)
            .field("samples", &self.samples)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish()
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: usize,
    pub turns: usize,
    /// Samples cut short by the tool-round limit
    pub abandoned: usize,
}

/// Samples to run, as `(1-based index, spec)`, in file order.
///
/// Indices outside the file are reported and skipped.
pub fn select_samples<'a>(
    specs: &'a [ConversationSpec],
    filter: Option<&[usize]>,
) -> Vec<(usize, &'a ConversationSpec)> {
    let Some(filter) = filter else {
        return specs.iter().enumerate().map(|(i, s)| (i + 1, s)).collect();
    };

    for index in filter {
        if *index == 0 || *index > specs.len() {
            warn!(
                sample_id = index,
                available = specs.len(),
                "Sample index out of range, skipping"
            );
        }
    }

    specs
        .iter()
        .enumerate()
        .map(|(i, s)| (i + 1, s))
        .filter(|(id, _)| filter.contains(id))
        .collect()
}

/// Load the conversations file named in `config` and run it
pub async fn run_samples<M: ModelApi>(
    config: &RunConfig,
    model_api: M,
    registry: &ToolRegistry,
    logger: &dyn TurnLogger,
) -> Result<RunSummary> {
    let specs = load_conversations(&config.conversations_file)?;
    run_conversations(config, &specs, model_api, registry, logger).await
}

/// Run already-loaded conversation samples
pub async fn run_conversations<M: ModelApi>(
    config: &RunConfig,
    specs: &[ConversationSpec],
    model_api: M,
    registry: &ToolRegistry,
    logger: &dyn TurnLogger,
) -> Result<RunSummary> {
    let driver = ConversationDriver::new(model_api, config.model.clone(), config.mode)
        .with_max_tool_rounds(config.max_tool_rounds);
    let mut summary = RunSummary::default();

    // Tool subsets are resolved up front so a bad name fails before any model call
    let selected = select_samples(specs, config.samples.as_deref())
        .into_iter()
        .map(|(sample_id, spec)| -> Result<_> {
            let tools = match &spec.tools {
                Some(names) => registry.filtered(names)?,
                None => registry.clone(),
            };
            Ok((sample_id, spec, tools))
        })
        .collect::<Result<Vec<_>>>()?;

    for (sample_id, spec, tools) in selected {
        info!(
            sample_id,
            name = %spec.label(sample_id),
            tools = tools.len(),
            mode = %config.mode,
            "Running sample"
        );
        summary.samples += 1;

        let mut conversation = Conversation::new(sample_id, config.mode);
        for user_message in &spec.messages {
            let outcome = match driver.run_turn(&mut conversation, &tools, user_message).await {
                Ok(outcome) => outcome,
                Err(HarnessError::ToolLoopExceeded(rounds)) => {
                    warn!(
                        sample_id,
                        rounds, "Tool loop exceeded, abandoning remaining turns of sample"
                    );
                    summary.abandoned += 1;
                    break;
                }
                Err(e) => return Err(e),
            };

            println!("[sample {}] {}", sample_id, outcome.final_text);

            let turn = conversation.record_turn(user_message, outcome);
            logger.log(&turn)?;
            summary.turns += 1;
        }
    }

    info!(
        samples = summary.samples,
        turns = summary.turns,
        abandoned = summary.abandoned,
        "Run complete"
    );
    Ok(summary)
}
