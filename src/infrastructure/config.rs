// Settings loading and InfluxQL query templating
use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_SETTINGS_FILE: &str = "config/dashboards";
pub const DEFAULT_LAMBDA_INSIGHTS_NAMESPACE: &str = "LambdaInsights";

/// Defaults for options the command line may leave out
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub lambda_insights_namespace: String,
    pub base64: bool,
}

/// Built-in defaults, then the optional settings file, then `DASHBOARDS_*` variables
pub fn load_settings(path: &str) -> Result<Settings> {
    let settings = config::Config::builder()
        .set_default("lambda_insights_namespace", DEFAULT_LAMBDA_INSIGHTS_NAMESPACE)?
        .set_default("base64", false)?
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("DASHBOARDS"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${var}` placeholders in a query string.
///
/// Substitution is a single left-to-right pass: substituted values are never
/// scanned again, and unknown placeholders are kept as written.
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(query.len());
    let mut rest = query;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after
            .find('}')
            .and_then(|end| vars.get(&after[..end]).map(|value| (end, value)));

        match value {
            Some((end, value)) => {
                result.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                result.push_str("${");
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}
