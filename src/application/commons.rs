// Shared constants and helpers for the service generators
use crate::domain::dashboard::DashboardLink;
use crate::domain::panel::SeriesOverride;
use std::collections::HashMap;

pub const ALERT_THRESHOLD: bool = false;
pub const ALERT_REF_ID: &str = "A";
pub const TIMEZONE: &str = "";
pub const SHARED_CROSSHAIR: bool = true;
pub const EDITABLE: bool = false;
pub const TRANSPARENT: bool = true;
pub const RAW_QUERY: bool = true;
pub const RETENTION_POLICY: &str = "autogen";
pub const DEFAULT_REFRESH: &str = "1m";

pub const MINIMUM_ALIAS: &str = "Min";
pub const AVERAGE_ALIAS: &str = "Avg";
pub const MAXIMUM_ALIAS: &str = "Max";

pub fn documentation_link(url: &str) -> DashboardLink {
    DashboardLink {
        target_blank: true,
        title: "Link to Documentation".to_string(),
        url: url.to_string(),
    }
}

/// Min/mean/max band: max fills down to min, mean drawn as a line on top
pub fn min_mean_max_overrides(
    min_alias: &str,
    mean_alias: &str,
    max_alias: &str,
) -> Vec<SeriesOverride> {
    vec![
        SeriesOverride::new(min_alias).color("#C8F2C2").lines(false),
        SeriesOverride::new(mean_alias).color("#FADE2A").fill(0),
        SeriesOverride::new(max_alias)
            .color("rgb(77, 159, 179)")
            .fill_below_to(min_alias)
            .lines(false),
    ]
}

/// Variables every InfluxQL template in this crate is filled with
pub fn influx_vars(measurement: &str, name: &str) -> HashMap<String, String> {
    HashMap::from([
        ("retention_policy".to_string(), RETENTION_POLICY.to_string()),
        ("measurement".to_string(), measurement.to_string()),
        ("name".to_string(), name.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documentation_link() {
        let link = documentation_link("https://docs.aws.amazon.com");

        assert!(link.target_blank);
        assert_eq!(link.title, "Link to Documentation");
        assert_eq!(link.url, "https://docs.aws.amazon.com");
    }

    #[test]
    fn test_min_mean_max_overrides() {
        let overrides = min_mean_max_overrides("Min", "Avg", "Max");

        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides[0].lines, Some(false));
        assert_eq!(overrides[1].fill, Some(0));
        assert_eq!(overrides[2].fill_below_to.as_deref(), Some("Min"));
        assert_eq!(overrides[2].color.as_deref(), Some("rgb(77, 159, 179)"));
    }
}
