//! Service health and readiness command

use anyhow::Result;
use serde_json::json;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, OutputFormat};

/// Row for the component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Show service health and readiness
pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_, health) = client.get_with_status("healthz").await?;
    let (_, readiness) = client.get_with_status("readyz").await?;

    match format {
        OutputFormat::Json => {
            let combined = json!({ "health": health, "readiness": readiness });
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
        OutputFormat::Table => {
            let mut rows = vec![ComponentRow {
                component: "service".to_string(),
                status: color_status(health["status"].as_str().unwrap_or("unknown")),
                message: if readiness["ready"].as_bool().unwrap_or(false) {
                    "ready".to_string()
                } else {
                    readiness["reason"].as_str().unwrap_or("not ready").to_string()
                },
            }];

            if let Some(components) = health["components"].as_object() {
                rows.extend(components.iter().map(|(name, detail)| ComponentRow {
                    component: name.clone(),
                    status: color_status(detail["status"].as_str().unwrap_or("unknown")),
                    message: detail["message"].as_str().unwrap_or("").to_string(),
                }));
            }

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
