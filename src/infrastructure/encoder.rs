// Output encoding - Dashboard JSON, optionally base64 wrapped
use crate::domain::dashboard::Dashboard;
use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Base64,
}

impl OutputFormat {
    pub fn from_flag(base64: bool) -> Self {
        if base64 {
            OutputFormat::Base64
        } else {
            OutputFormat::Json
        }
    }
}

pub fn encode_dashboard(dashboard: &Dashboard, format: OutputFormat) -> Result<String> {
    let json = serde_json::to_string(dashboard)?;
    debug!(bytes = json.len(), ?format, "Dashboard serialized");

    Ok(match format {
        OutputFormat::Json => json,
        OutputFormat::Base64 => STANDARD.encode(json),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output() {
        let dashboard = Dashboard::new("Firehose".to_string());

        let output = encode_dashboard(&dashboard, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["title"], "Firehose");
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_base64_output_wraps_json() {
        let dashboard = Dashboard::new("Firehose".to_string());
        let json = encode_dashboard(&dashboard, OutputFormat::Json).unwrap();

        let output = encode_dashboard(&dashboard, OutputFormat::Base64).unwrap();

        assert_eq!(STANDARD.decode(output).unwrap(), json.into_bytes());
    }

    #[test]
    fn test_format_from_flag() {
        assert_eq!(OutputFormat::from_flag(true), OutputFormat::Base64);
        assert_eq!(OutputFormat::from_flag(false), OutputFormat::Json);
    }
}
