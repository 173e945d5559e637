// Tool: schedule_meeting
//
// Exercises the richer parts of the type vocabulary: a list, an int|str
// union and an optional mapping.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::str_arg;
use crate::tool_types::{ParamType, ParameterSpec, ToolDescriptor};
use crate::tools::{Tool, ToolError};

/// Meeting scheduler that only validates and echoes
pub struct ScheduleMeetingTool {
    descriptor: ToolDescriptor,
}

impl ScheduleMeetingTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "schedule_meeting",
                "Schedule a meeting with a list of attendees.",
                vec![
                    ParameterSpec::new("title", ParamType::String).describe("Meeting title"),
                    ParameterSpec::new("attendees", ParamType::Array)
                        .describe("Email addresses of the attendees"),
                    ParameterSpec::new(
                        "duration",
                        ParamType::Union(vec![ParamType::Integer, ParamType::String]),
                    )
                    .describe("Length in minutes, or a label such as 'half hour'")
                    .with_default(30),
                    ParameterSpec::new("details", ParamType::optional(ParamType::Object))
                        .describe("Free-form extra details")
                        .optional(),
                ],
            ),
        }
    }
}

impl Default for ScheduleMeetingTool {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_minutes(value: Option<&Value>) -> Result<i64, ToolError> {
    match value {
        None | Some(Value::Null) => Err(ToolError::invalid("'duration' is required")),
        Some(Value::Number(n)) => n
            .as_i64()
            .filter(|m| *m > 0)
            .ok_or_else(|| ToolError::invalid("duration must be a positive number of minutes")),
        Some(Value::String(label)) => match label.trim().to_lowercase().as_str() {
            "quarter hour" => Ok(15),
            "half hour" => Ok(30),
            "hour" | "one hour" => Ok(60),
            other => Err(ToolError::invalid(format!("unrecognised duration '{}'", other))),
        },
        Some(other) => Err(ToolError::invalid(format!("invalid duration {}", other))),
    }
}

#[async_trait]
impl Tool for ScheduleMeetingTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: Map<String, Value>) -> Result<Value, ToolError> {
        let title = str_arg(&arguments, "title")?;
        let attendees = arguments
            .get("attendees")
            .and_then(Value::as_array)
            .ok_or_else(|| ToolError::invalid("'attendees' must be a list"))?;
        if attendees.is_empty() {
            return Err(ToolError::invalid("a meeting needs at least one attendee"));
        }
        let duration = duration_minutes(arguments.get("duration"))?;
        let details = arguments.get("details").cloned().unwrap_or(Value::Null);

        Ok(json!({
            "status": "scheduled",
            "title": title,
            "attendees": attendees,
            "duration_minutes": duration,
            "details": details
        }))
    }
}
