// Tool: convert_units

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{f64_arg, round2, str_arg};
use crate::tool_types::{ParamType, ParameterSpec, ToolDescriptor};
use crate::tools::{Tool, ToolError};

/// Supported units and their size in the base unit of their dimension
const UNITS: [(&str, Dimension, f64); 8] = [
    ("meters", Dimension::Length, 1.0),
    ("kilometers", Dimension::Length, 1000.0),
    ("miles", Dimension::Length, 1609.344),
    ("feet", Dimension::Length, 0.3048),
    ("grams", Dimension::Mass, 1.0),
    ("kilograms", Dimension::Mass, 1000.0),
    ("pounds", Dimension::Mass, 453.592_37),
    ("ounces", Dimension::Mass, 28.349_523_125),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Length,
    Mass,
}

fn lookup(unit: &str) -> Result<(Dimension, f64), ToolError> {
    UNITS
        .iter()
        .find(|(name, _, _)| *name == unit)
        .map(|(_, dimension, factor)| (*dimension, *factor))
        .ok_or_else(|| ToolError::invalid(format!("unsupported unit '{}'", unit)))
}

/// Length and mass conversion
pub struct ConvertUnitsTool {
    descriptor: ToolDescriptor,
}

impl ConvertUnitsTool {
    pub fn new() -> Self {
        let unit_names = || ParamType::one_of(UNITS.iter().map(|(name, _, _)| *name));
        Self {
            descriptor: ToolDescriptor::new(
                "convert_units",
                "Convert a measurement between length or mass units.",
                vec![
                    ParameterSpec::new("value", ParamType::Number)
                        .describe("Quantity to convert"),
                    ParameterSpec::new("from_unit", unit_names()).describe("Unit of the value"),
                    ParameterSpec::new("to_unit", unit_names()).describe("Unit to convert to"),
                ],
            ),
        }
    }
}

impl Default for ConvertUnitsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ConvertUnitsTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: Map<String, Value>) -> Result<Value, ToolError> {
        let value = f64_arg(&arguments, "value")?;
        let from_unit = str_arg(&arguments, "from_unit")?;
        let to_unit = str_arg(&arguments, "to_unit")?;

        let (from_dimension, from_factor) = lookup(from_unit)?;
        let (to_dimension, to_factor) = lookup(to_unit)?;
        if from_dimension != to_dimension {
            return Err(ToolError::invalid(format!(
                "cannot convert {} to {}",
                from_unit, to_unit
            )));
        }

        Ok(json!({
            "value": value,
            "from_unit": from_unit,
            "to_unit": to_unit,
            "result": round2(value * from_factor / to_factor)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: f64, from_unit: &str, to_unit: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("value".to_string(), json!(value));
        map.insert("from_unit".to_string(), json!(from_unit));
        map.insert("to_unit".to_string(), json!(to_unit));
        map
    }

    #[tokio::test]
    async fn test_converts_within_dimension() {
        let tool = ConvertUnitsTool::new();
        let result = tool.invoke(args(5.0, "kilometers", "miles")).await.unwrap();
        assert_eq!(result["result"], 3.11);
    }

    #[tokio::test]
    async fn test_rejects_mixed_dimensions() {
        let tool = ConvertUnitsTool::new();
        let err = tool.invoke(args(1.0, "meters", "pounds")).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot convert meters to pounds");
    }

    #[test]
    fn test_units_are_an_enum() {
        let tool = ConvertUnitsTool::new();
        assert!(matches!(
            tool.descriptor().parameters[1].param_type,
            ParamType::Enum(ref units) if units.len() == UNITS.len()
        ));
    }
}
