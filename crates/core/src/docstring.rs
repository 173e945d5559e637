// Docstring scanning
//
// Best-effort extraction of a summary line and per-argument descriptions from
// a Google-style docstring. Malformed input never fails: missing pieces are
// simply absent from the result.

use std::collections::HashMap;

/// First non-empty line, trimmed
pub fn summary(doc: &str) -> String {
    doc.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// `name: text` lines inside the `Args:` block.
///
/// The block starts after a line reading `Args:` and ends at the first blank
/// line or the next section header. A header is a well-known section name
/// (`Returns:`, `Raises:`, ...) or a one-word `Name:` line indented less than
/// the argument entries. An argument with an empty description stays inside
/// the block.
pub fn arg_descriptions(doc: &str) -> HashMap<String, String> {
    let mut descriptions = HashMap::new();
    let mut in_args = false;
    let mut entry_indent: Option<usize> = None;

    for line in doc.lines() {
        let trimmed = line.trim();

        if !in_args {
            in_args = trimmed == "Args:";
            continue;
        }

        if trimmed.is_empty() {
            break;
        }

        let indent = line.len() - line.trim_start().len();
        let entry_indent = *entry_indent.get_or_insert(indent);
        if is_section_header(trimmed, indent < entry_indent) {
            break;
        }

        if let Some((name, text)) = trimmed.split_once(':') {
            let name = name.trim();
            if !name.is_empty() && !name.contains(char::is_whitespace) {
                descriptions.insert(name.to_string(), text.trim().to_string());
            }
        }
    }

    descriptions
}

const SECTION_HEADERS: &[&str] = &[
    "Args", "Arguments", "Attributes", "Example", "Examples", "Note", "Notes", "Raises",
    "Returns", "Todo", "Warning", "Warnings", "Yields",
];

fn is_section_header(line: &str, dedented: bool) -> bool {
    let Some(name) = line.strip_suffix(':') else {
        return false;
    };
    if name.is_empty() || name.contains(char::is_whitespace) {
        return false;
    }
    dedented || SECTION_HEADERS.contains(&name)
}
