// Argument value types

use toolbench_core::DriverMode;

/// Parse a `--mode` value; names match the conversation config spelling
pub fn parse_mode(value: &str) -> Result<DriverMode, String> {
    value.trim().parse().map_err(|e: toolbench_core::HarnessError| e.to_string())
}

/// Parsed `--samples` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleIds(Vec<usize>);

impl SampleIds {
    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

/// Parse `1,3,4` into sample indices
pub fn parse_samples(value: &str) -> Result<SampleIds, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| format!("'{}' is not a sample index", part))
        })
        .collect::<Result<Vec<_>, _>>()
        .and_then(|ids| {
            if ids.is_empty() {
                Err("expected at least one sample index".to_string())
            } else {
                Ok(SampleIds(ids))
            }
        })
}
