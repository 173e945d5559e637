// Tool: get_weather

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::str_arg;
use crate::tool_types::{ParamType, ParameterSpec, ToolDescriptor};
use crate::tools::{Tool, ToolError};

const DOC: &str = "Get the current weather for a location.

Args:
    location: City name, e.g. Boston
";

/// Weather lookup with a single known city
pub struct GetWeatherTool {
    descriptor: ToolDescriptor,
}

impl GetWeatherTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::from_doc(
                "get_weather",
                DOC,
                vec![ParameterSpec::new("location", ParamType::String)],
            ),
        }
    }
}

impl Default for GetWeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: Map<String, Value>) -> Result<Value, ToolError> {
        let location = str_arg(&arguments, "location")?;
        if location != "Boston" {
            return Err(ToolError::failed(format!(
                "no weather data available for '{}'",
                location
            )));
        }

        Ok(json!({
            "location": "Boston",
            "temperature": 72,
            "forecast": ["sunny", "windy"]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_city() {
        let tool = GetWeatherTool::new();

        let mut args = Map::new();
        args.insert("location".to_string(), json!("Boston"));
        assert_eq!(tool.invoke(args).await.unwrap()["temperature"], 72);

        let mut args = Map::new();
        args.insert("location".to_string(), json!("Madrid"));
        assert!(tool.invoke(args).await.is_err());
    }

    #[test]
    fn test_descriptor_from_doc() {
        let tool = GetWeatherTool::new();
        assert_eq!(tool.descriptor().description, "Get the current weather for a location.");
        assert_eq!(
            tool.descriptor().parameters[0].description,
            "City name, e.g. Boston"
        );
    }
}
