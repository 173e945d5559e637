// Tool: convert_currency

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{f64_arg, round2, str_arg};
use crate::tool_types::{CustomType, ParamType, ParameterSpec, ToolDescriptor};
use crate::tools::{Tool, ToolError};

const DOC: &str = "Convert an amount of money from one currency to another.

Args:
    amount: Amount of money to convert
    from_currency: ISO 4217 code of the source currency
    to_currency: ISO 4217 code of the target currency
    date: Date of the exchange rate, YYYY-MM-DD (defaults to today)

Returns:
    dict: The converted amount and the rate used
";

/// Fixed rates against USD
const USD_RATES: [(&str, f64); 5] = [
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 151.5),
    ("CAD", 1.36),
];

fn usd_rate(code: &str) -> Result<f64, ToolError> {
    USD_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, rate)| *rate)
        .ok_or_else(|| ToolError::invalid(format!("unsupported currency '{}'", code)))
}

/// Currency conversion over a fixed rate table
pub struct ConvertCurrencyTool {
    descriptor: ToolDescriptor,
}

impl ConvertCurrencyTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::from_doc(
                "convert_currency",
                DOC,
                vec![
                    ParameterSpec::new("amount", ParamType::Number),
                    ParameterSpec::new("from_currency", ParamType::String),
                    ParameterSpec::new("to_currency", ParamType::String),
                    ParameterSpec::new(
                        "date",
                        ParamType::optional(ParamType::Custom(CustomType::date())),
                    )
                    .optional(),
                ],
            ),
        }
    }
}

impl Default for ConvertCurrencyTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ConvertCurrencyTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: Map<String, Value>) -> Result<Value, ToolError> {
        let amount = f64_arg(&arguments, "amount")?;
        if amount < 0.0 {
            return Err(ToolError::invalid("amount must not be negative"));
        }
        let from = str_arg(&arguments, "from_currency")?.to_uppercase();
        let to = str_arg(&arguments, "to_currency")?.to_uppercase();

        let rate = usd_rate(&to)? / usd_rate(&from)?;
        let date = match arguments.get("date").and_then(Value::as_str) {
            Some(date) => date.to_string(),
            None => chrono::Local::now().format("%Y-%m-%d").to_string(),
        };

        Ok(json!({
            "amount": amount,
            "from_currency": from,
            "to_currency": to,
            "rate": (rate * 10_000.0).round() / 10_000.0,
            "converted_amount": round2(amount * rate),
            "date": date
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_converts_with_fixed_rates() {
        let tool = ConvertCurrencyTool::new();
        let mut args = Map::new();
        args.insert("amount".to_string(), json!(100.0));
        args.insert("from_currency".to_string(), json!("usd"));
        args.insert("to_currency".to_string(), json!("EUR"));
        args.insert("date".to_string(), json!("2024-01-15"));

        let result = tool.invoke(args).await.unwrap();
        assert_eq!(result["converted_amount"], 92.0);
        assert_eq!(result["from_currency"], "USD");
        assert_eq!(result["date"], "2024-01-15");
    }

    #[tokio::test]
    async fn test_unknown_currency() {
        let tool = ConvertCurrencyTool::new();
        let mut args = Map::new();
        args.insert("amount".to_string(), json!(1.0));
        args.insert("from_currency".to_string(), json!("USD"));
        args.insert("to_currency".to_string(), json!("XYZ"));

        let err = tool.invoke(args).await.unwrap_err();
        assert_eq!(err.to_string(), "unsupported currency 'XYZ'");
    }

    #[test]
    fn test_date_is_optional() {
        let tool = ConvertCurrencyTool::new();
        let date = tool.descriptor().parameter("date").unwrap();
        assert!(!date.is_required());
        assert!(date.description.starts_with("Date of the exchange rate"));
    }
}
