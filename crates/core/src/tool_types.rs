// Tool descriptors and tool-call types
//
// Design Decision: A tool describes itself with a ToolDescriptor built once at
// registration time. Schema generation and argument coercion both read the
// descriptor, so nothing inspects a tool at runtime.
//
// Design Decision: Parameter types form a small closed vocabulary
// (ParamType). Anything outside the basic scalars renders as "string" in the
// schema but keeps its full shape for coercion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::docstring;

// ============================================================================
// Parameter types
// ============================================================================

/// Constructor for a parameter type outside the built-in vocabulary.
///
/// The constructor receives the raw argument value and either returns the
/// value the tool should see or a human-readable reason for the failure.
#[derive(Clone, Copy)]
pub struct CustomType {
    pub name: &'static str,
    pub construct: fn(&Value) -> std::result::Result<Value, String>,
}

impl CustomType {
    /// Calendar date in ISO `YYYY-MM-DD` form, normalised to that form.
    pub fn date() -> Self {
        Self {
            name: "date",
            construct: construct_date,
        }
    }
}

fn construct_date(value: &Value) -> std::result::Result<Value, String> {
    let text = value
        .as_str()
        .ok_or_else(|| format!("expected an ISO date string, got {}", value))?;
    let date = chrono::NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid isoformat string '{}': {}", text, e))?;
    Ok(Value::String(date.format("%Y-%m-%d").to_string()))
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType").field("name", &self.name).finish()
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Declared type of a tool parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// Text
    String,
    /// Whole number
    Integer,
    /// Real number
    Number,
    /// True/false
    Boolean,
    /// Constrained choice between the listed alternatives
    Enum(Vec<String>),
    /// Union of branches, tried in declaration order
    Union(Vec<ParamType>),
    /// Sequence of values
    Array,
    /// Key/value mapping
    Object,
    /// The null branch of an optional union
    Null,
    /// Any other type, built by its own constructor
    Custom(CustomType),
}

impl ParamType {
    /// Constrained choice from string-like alternatives
    pub fn one_of<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamType::Enum(alternatives.into_iter().map(Into::into).collect())
    }

    /// `inner | null`
    pub fn optional(inner: ParamType) -> Self {
        ParamType::Union(vec![inner, ParamType::Null])
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => write!(f, "string"),
            ParamType::Integer => write!(f, "integer"),
            ParamType::Number => write!(f, "number"),
            ParamType::Boolean => write!(f, "boolean"),
            ParamType::Enum(alternatives) => write!(f, "enum[{}]", alternatives.join(", ")),
            ParamType::Union(branches) => {
                let names: Vec<String> = branches.iter().map(|b| b.to_string()).collect();
                write!(f, "{}", names.join(" | "))
            }
            ParamType::Array => write!(f, "array"),
            ParamType::Object => write!(f, "object"),
            ParamType::Null => write!(f, "null"),
            ParamType::Custom(custom) => write!(f, "{}", custom.name),
        }
    }
}

// ============================================================================
// Parameter and tool descriptors
// ============================================================================

/// Whether a parameter must be supplied, and what it defaults to otherwise
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Presence {
    /// No default: the model must supply a value
    #[default]
    Required,
    /// Defaults to null; no default is surfaced in the schema
    Optional,
    /// Defaults to a concrete value, surfaced in the schema
    Default(Value),
}

/// One declared parameter of a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub presence: Presence,
    pub description: String,
}

impl ParameterSpec {
    /// A required parameter without description
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            presence: Presence::Required,
            description: String::new(),
        }
    }

    /// Make the parameter optional with a null default
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Give the parameter a concrete default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.presence = if value.is_null() {
            Presence::Optional
        } else {
            Presence::Default(value)
        };
        self
    }

    /// Set the parameter description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// A parameter is required iff it has no default
    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }

    /// The default surfaced in the schema (never null)
    pub fn default_value(&self) -> Option<&Value> {
        match &self.presence {
            Presence::Default(value) => Some(value),
            _ => None,
        }
    }
}

/// Immutable description of a registered tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Build a descriptor from a docstring-style text block.
    ///
    /// The first non-empty line becomes the description. Parameters declared
    /// without a description pick one up from the `Args:` block when a line
    /// `name: text` is present there; otherwise they stay empty.
    pub fn from_doc(name: impl Into<String>, doc: &str, parameters: Vec<ParameterSpec>) -> Self {
        let documented = docstring::arg_descriptions(doc);
        let parameters = parameters
            .into_iter()
            .map(|mut param| {
                if param.description.is_empty() {
                    if let Some(text) = documented.get(&param.name) {
                        param.description = text.clone();
                    }
                }
                param
            })
            .collect();

        Self {
            name: name.into(),
            description: docstring::summary(doc),
            parameters,
        }
    }

    /// Look up a declared parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

// ============================================================================
// Tool calls and results
// ============================================================================

/// Arguments exactly as the model supplied them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawArguments {
    /// JSON text (the usual wire form)
    Text(String),
    /// Already-decoded value
    Value(Value),
}

impl RawArguments {
    /// Decode the arguments; text that is not valid JSON is kept as a string value
    pub fn resolve(&self) -> Value {
        match self {
            RawArguments::Text(text) => {
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
            }
            RawArguments::Value(value) => value.clone(),
        }
    }

    /// Wire form used when echoing a call back to the model
    pub fn to_wire_string(&self) -> String {
        match self {
            RawArguments::Text(text) => text.clone(),
            RawArguments::Value(value) => value.to_string(),
        }
    }
}

impl From<Value> for RawArguments {
    fn from(value: Value) -> Self {
        RawArguments::Value(value)
    }
}

impl From<&str> for RawArguments {
    fn from(text: &str) -> Self {
        RawArguments::Text(text.to_string())
    }
}

/// Tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id, unique within a turn
    pub call_id: String,
    /// Tool name to execute
    pub name: String,
    /// Arguments as supplied by the model
    pub arguments: RawArguments,
}

impl ToolCall {
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<RawArguments>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Outcome of one tool call, already rendered as text for the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Call id of the originating request
    pub call_id: String,
    /// Serialized tool output, or an error description
    pub output: String,
}
