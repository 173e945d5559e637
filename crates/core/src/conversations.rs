// Conversation file loading
//
// ```yaml
// conversations:
//   - name: weather
//     tools: [get_weather]      # optional; omitted means every registered tool
//     messages:
//       - "What's the weather in Boston?"
//       - "And tomorrow?"
// ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HarnessError, Result};

/// Top-level document of a conversations file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationFile {
    pub conversations: Vec<ConversationSpec>,
}

/// One scripted conversation sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSpec {
    #[serde(default)]
    pub name: Option<String>,
    /// Tool subset offered to the model; `None` means all tools
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    /// User messages, sent one per turn in order
    #[serde(default)]
    pub messages: Vec<String>,
}

impl ConversationSpec {
    /// Display name, falling back to the 1-based sample index
    pub fn label(&self, sample_id: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("sample-{}", sample_id))
    }
}

/// Parse a conversations document
pub fn parse_conversations(source: &str) -> Result<Vec<ConversationSpec>> {
    let file: ConversationFile = serde_yaml::from_str(source)
        .map_err(|e| HarnessError::conversation_file(format!("invalid YAML: {}", e)))?;
    Ok(file.conversations)
}

/// Read and parse a conversations file
pub fn load_conversations(path: impl AsRef<Path>) -> Result<Vec<ConversationSpec>> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| {
        HarnessError::conversation_file(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_conversations(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conversations() {
        let specs = parse_conversations(
            r#"
conversations:
  - name: weather
    tools: [get_weather]
    messages:
      - "What's the weather in Boston?"
      - "Thanks"
  - messages: ["Convert 5 km to miles"]
"#,
        )
        .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].label(1), "weather");
        assert_eq!(specs[0].tools, Some(vec!["get_weather".to_string()]));
        assert_eq!(specs[0].messages.len(), 2);
        assert_eq!(specs[1].tools, None);
        assert_eq!(specs[1].label(2), "sample-2");
    }

    #[test]
    fn test_empty_message_list() {
        let specs = parse_conversations("conversations:\n  - name: quiet\n").unwrap();
        assert!(specs[0].messages.is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_conversation_file_error() {
        let err = parse_conversations("conversations: [unterminated").unwrap_err();
        assert!(matches!(err, HarnessError::ConversationFile(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convs.yaml");
        std::fs::write(&path, "conversations:\n  - messages: [\"Hi\"]\n").unwrap();

        let specs = load_conversations(&path).unwrap();
        assert_eq!(specs[0].messages, vec!["Hi".to_string()]);

        let missing = load_conversations(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, HarnessError::ConversationFile(_)));
    }
}
