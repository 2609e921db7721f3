//! Schema inspection command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, SchemaResponse};
use crate::output::OutputFormat;

/// Row for the field inventory table
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Allowed Values")]
    values: String,
}

/// Show the fields an estimation request must supply
pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let schema: SchemaResponse = client.get("api/v1/schema").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        OutputFormat::Table => {
            let mut rows: Vec<FieldRow> = schema
                .numeric_fields
                .iter()
                .map(|name| FieldRow {
                    name: name.clone(),
                    kind: "numeric".to_string(),
                    values: "any number".to_string(),
                })
                .collect();

            rows.extend(schema.categorical_fields.iter().map(|field| FieldRow {
                name: field.name.clone(),
                kind: "categorical".to_string(),
                values: field.values.join(" | "),
            }));

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "\nModel {} expects a {}-wide feature vector",
                schema.model_version, schema.feature_width
            );
        }
    }

    Ok(())
}
