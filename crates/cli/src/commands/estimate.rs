//! Price estimation command

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::client::{ApiClient, EstimateResponse};
use crate::output::{format_estimate, format_timestamp, print_warning, OutputFormat};

/// Row for the estimate result table
#[derive(Tabled)]
struct EstimateRow {
    #[tabled(rename = "Estimated Value")]
    estimate: String,
    #[tabled(rename = "Model")]
    model_version: String,
    #[tabled(rename = "Generated At")]
    generated_at: String,
}

/// Request a price estimate from attribute flags or a JSON file
pub async fn run(
    client: &ApiClient,
    fields: Vec<String>,
    input: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let attributes = match input {
        Some(path) => read_attributes_file(&path)?,
        None => parse_field_flags(&fields)?,
    };

    if attributes.is_empty() {
        print_warning("No attributes supplied; use --field NAME=VALUE or --input FILE");
        anyhow::bail!("empty estimation request");
    }

    let response: EstimateResponse = client
        .post("api/v1/estimate", &Value::Object(attributes))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            let row = EstimateRow {
                estimate: format_estimate(response.estimate),
                model_version: response.model_version.clone(),
                generated_at: format_timestamp(response.generated_at),
            };
            let table = tabled::Table::new([row])
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

/// Parse repeated `NAME=VALUE` flags into a JSON attribute map. Values
/// that parse as numbers are sent as numbers; everything else as text.
fn parse_field_flags(fields: &[String]) -> Result<Map<String, Value>> {
    let mut attributes = Map::new();

    for field in fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("expected NAME=VALUE, got {field:?}"))?;
        if name.is_empty() {
            anyhow::bail!("expected NAME=VALUE, got {field:?}");
        }
        attributes.insert(name.to_string(), parse_value(value));
    }

    Ok(attributes)
}

fn parse_value(value: &str) -> Value {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        _ => Value::String(value.to_string()),
    }
}

fn read_attributes_file(path: &str) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read attributes file {path:?}"))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Attributes file {path:?} is not valid JSON"))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Attributes file {path:?} must contain a JSON object"),
    }
}
