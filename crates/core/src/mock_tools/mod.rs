// Mock tools
//
// Deterministic stand-ins for real services, used by the `run` binary and by
// tests. Each tool validates its input and fails with a descriptive
// ToolError instead of returning a sentinel.

mod currency;
mod meetings;
mod units;
mod weather;

pub use currency::ConvertCurrencyTool;
pub use meetings::ScheduleMeetingTool;
pub use units::ConvertUnitsTool;
pub use weather::GetWeatherTool;

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::tools::{Tool, ToolError};

/// Every bundled mock tool
pub fn all() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetWeatherTool::new()),
        Arc::new(ConvertUnitsTool::new()),
        Arc::new(ConvertCurrencyTool::new()),
        Arc::new(ScheduleMeetingTool::new()),
    ]
}

fn str_arg<'a>(arguments: &'a Map<String, Value>, name: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid(format!("'{}' must be a string", name)))
}

fn f64_arg(arguments: &Map<String, Value>, name: &str) -> Result<f64, ToolError> {
    arguments
        .get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::invalid(format!("'{}' must be a number", name)))
}

/// Round to two decimals, for money and measurements
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
