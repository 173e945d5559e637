// OpenAI model API for toolbench
//
// Implements `toolbench_core::ModelApi` over HTTP:
// - stateful-chain mode posts to `{base_url}/responses`
// - chat modes post to `{base_url}/chat/completions`
//
// Any OpenAI-compatible server works as long as it speaks these two
// endpoints; point `base_url` at it.

mod client;

pub use client::{ModelEndpoint, OpenAiClient, DEFAULT_BASE_URL};
