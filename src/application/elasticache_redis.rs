// ElastiCache Redis graphs
// https://aws.amazon.com/blogs/database/monitoring-best-practices-with-amazon-elasticache-for-redis-using-amazon-cloudwatch/
use crate::application::commons::{ALERT_REF_ID, EDITABLE, SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT};
use crate::application::dispatcher::DashboardRequest;
use crate::domain::alert::{Alert, AlertCondition, Evaluator, Notifications, Operator, TimeRange};
use crate::domain::dashboard::{Dashboard, DashboardLink, Row};
use crate::domain::panel::{single_y_axis, Graph, PanelOptions, SeriesOverride, YAxes, YAxis};
use crate::domain::style::{
    BLUE, BYTES, GREEN, MILLISECONDS_FORMAT, ORANGE, PERCENT_FORMAT, RED, SHORT_FORMAT, YELLOW,
};
use crate::domain::target::CloudwatchMetricsTarget;
use crate::error::Result;

const NAMESPACE: &str = "AWS/ElastiCache";
const PERIOD: &str = "1m";
const DOCUMENTATION_URL: &str =
    "https://aws.amazon.com/blogs/database/monitoring-best-practices-with-amazon-elasticache-for-redis-using-amazon-cloudwatch/";

/// One plotted metric and how it is drawn
struct Series {
    alias: &'static str,
    metric_name: &'static str,
    statistic: &'static str,
    color: &'static str,
    lines: bool,
    right_axis: bool,
    ref_id: Option<&'static str>,
}

impl Series {
    fn line(alias: &'static str, metric_name: &'static str, color: &'static str) -> Self {
        Self {
            alias,
            metric_name,
            statistic: "Maximum",
            color,
            lines: true,
            right_axis: false,
            ref_id: None,
        }
    }

    fn bars(alias: &'static str, metric_name: &'static str, color: &'static str) -> Self {
        Self {
            lines: false,
            ..Self::line(alias, metric_name, color)
        }
    }

    fn right_axis(self) -> Self {
        Self {
            right_axis: true,
            ..self
        }
    }

    fn statistic(self, statistic: &'static str) -> Self {
        Self { statistic, ..self }
    }

    fn ref_id(self, ref_id: &'static str) -> Self {
        Self {
            ref_id: Some(ref_id),
            ..self
        }
    }
}

fn redis_graph(
    title: &str,
    cache_cluster_id: &str,
    data_source: &str,
    y_axes: YAxes,
    series: &[Series],
) -> Graph {
    let targets: Vec<CloudwatchMetricsTarget> = series
        .iter()
        .map(|s| {
            let target = CloudwatchMetricsTarget::new(NAMESPACE, s.metric_name, s.statistic)
                .alias(s.alias)
                .period(PERIOD)
                .dimension("CacheClusterId", cache_cluster_id);
            match s.ref_id {
                Some(ref_id) => target.ref_id(ref_id),
                None => target,
            }
        })
        .collect();

    let series_overrides = series
        .iter()
        .map(|s| {
            let series_override = SeriesOverride::new(s.alias)
                .color(s.color)
                .lines(s.lines)
                .bars(!s.lines);
            if s.right_axis {
                series_override.yaxis(2)
            } else {
                series_override
            }
        })
        .collect();

    Graph::new(title, data_source)
        .targets(targets)
        .y_axes(y_axes)
        .series_overrides(series_overrides)
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .bars(true)
        .lines(false)
        .auto_ref_ids()
}

pub fn cpu_usage_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "Engine CPU utilization",
        cache_cluster_id,
        data_source,
        single_y_axis(PERCENT_FORMAT),
        &[Series::line("Engine CPU utilization", "EngineCPUUtilization", GREEN)],
    )
}

pub fn cpu_credit_usage_graph(
    cache_cluster_id: &str,
    data_source: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let alert = notifications.map(|notifications| {
        Alert::new(
            "ElastiCache Redis CPU credit balance alert".to_string(),
            "ElastiCache Redis CPU credit balance alert".to_string(),
            notifications,
        )
        .condition(
            AlertCondition::new(ALERT_REF_ID, TimeRange::last("5m"), Evaluator::LowerThan(250.0))
                .operator(Operator::Or),
        )
        .frequency("2m")
        .grace_period("2m")
    });

    redis_graph(
        "CPU credit utilization",
        cache_cluster_id,
        data_source,
        single_y_axis(SHORT_FORMAT),
        &[
            Series::line("CPU credit balance", "CPUCreditBalance", GREEN)
                .statistic("Minimum")
                .ref_id(ALERT_REF_ID),
            Series::line("CPU credit usage", "CPUCreditUsage", YELLOW),
        ],
    )
    .alert(alert)
}

pub fn swap_and_memory_usage_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "Memory and Swap usage",
        cache_cluster_id,
        data_source,
        single_y_axis(BYTES),
        &[
            Series::line("Bytes used for cache", "BytesUsedForCache", GREEN),
            Series::line("Swap Usage", "SwapUsage", BLUE),
        ],
    )
}

pub fn network_in_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "Network in",
        cache_cluster_id,
        data_source,
        single_y_axis(BYTES),
        &[Series::bars("Network bytes in", "NetworkBytesIn", GREEN).ref_id(ALERT_REF_ID)],
    )
}

pub fn connections_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "Current connections",
        cache_cluster_id,
        data_source,
        single_y_axis(SHORT_FORMAT),
        &[Series::line("Current connections", "CurrConnections", GREEN).ref_id(ALERT_REF_ID)],
    )
}

pub fn db_memory_usage_and_evictions_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "DB memory usage and Evictions",
        cache_cluster_id,
        data_source,
        YAxes::new(YAxis::new(PERCENT_FORMAT), YAxis::new(SHORT_FORMAT)),
        &[
            Series::line(
                "Database memory usage percentage",
                "DatabaseMemoryUsagePercentage",
                ORANGE,
            ),
            Series::line("Evictions", "Evictions", RED).right_axis(),
        ],
    )
}

pub fn network_out_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "Network out",
        cache_cluster_id,
        data_source,
        single_y_axis(BYTES),
        &[Series::bars("Network bytes out", "NetworkBytesOut", RED)],
    )
}

pub fn replication_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "Replication",
        cache_cluster_id,
        data_source,
        YAxes::new(YAxis::new(BYTES), YAxis::new(MILLISECONDS_FORMAT)),
        &[
            Series::bars("Replication bytes", "ReplicationBytes", GREEN),
            Series::line("Replication lag", "ReplicationLag", RED).right_axis(),
        ],
    )
}

pub fn latency_graph(cache_cluster_id: &str, data_source: &str) -> Graph {
    redis_graph(
        "Latency",
        cache_cluster_id,
        data_source,
        single_y_axis(MILLISECONDS_FORMAT),
        &[Series::line("String based CMDs latency", "StringBasedCmdsLatency", GREEN)],
    )
}

pub fn elasticache_redis_dashboard(
    request: &DashboardRequest,
    cache_cluster_id: &str,
) -> Result<Dashboard> {
    let cloudwatch = request.cloudwatch("elasticache-redis")?;
    let id = cache_cluster_id;

    let rows = vec![
        Row::new(vec![
            cpu_usage_graph(id, cloudwatch).into(),
            cpu_credit_usage_graph(id, cloudwatch, request.notifications()).into(),
            swap_and_memory_usage_graph(id, cloudwatch).into(),
        ])
        .editable(EDITABLE),
        Row::new(vec![
            network_in_graph(id, cloudwatch).into(),
            connections_graph(id, cloudwatch).into(),
            db_memory_usage_and_evictions_graph(id, cloudwatch).into(),
        ])
        .editable(EDITABLE),
        Row::new(vec![
            network_out_graph(id, cloudwatch).into(),
            replication_graph(id, cloudwatch).into(),
            latency_graph(id, cloudwatch).into(),
        ])
        .editable(EDITABLE),
    ];

    Ok(Dashboard::new(format!("ElastiCache Redis: {}", request.name))
        .editable(EDITABLE)
        .tags(["elasticache".to_string(), "redis".to_string(), request.environment.clone()])
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
        .rows(rows)
        .links(vec![DashboardLink {
            target_blank: true,
            title: "Documentation".to_string(),
            url: DOCUMENTATION_URL.to_string(),
        }])
        .auto_panel_ids())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::tests::request;
    use crate::domain::panel::Panel;

    #[test]
    fn test_cpu_credit_graph_alert() {
        let notifications = Notifications::new(["lorem"]).unwrap();
        let graph = cpu_credit_usage_graph("redis-001", "cloudwatch", Some(&notifications));
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["targets"][0]["metricName"], "CPUCreditBalance");
        assert_eq!(json["targets"][0]["statistics"], serde_json::json!(["Minimum"]));
        assert_eq!(json["targets"][0]["refId"], "A");
        assert_eq!(json["targets"][1]["refId"], "B");

        let alert = graph.alert.unwrap();
        assert_eq!(alert.conditions[0].evaluator, Evaluator::LowerThan(250.0));
        assert_eq!(alert.conditions[0].operator, Operator::Or);
        assert_eq!(alert.frequency, "2m");
        assert_eq!(alert.grace_period, "2m");
    }

    #[test]
    fn test_cpu_credit_graph_without_notifications() {
        assert!(cpu_credit_usage_graph("redis-001", "cloudwatch", None).alert.is_none());
    }

    #[test]
    fn test_replication_graph_uses_right_axis_for_lag() {
        let graph = replication_graph("redis-001", "cloudwatch");

        assert_eq!(graph.yaxes.left.format, "bytes");
        assert_eq!(graph.yaxes.right.format, "ms");
        assert_eq!(graph.series_overrides[1].alias, "Replication lag");
        assert_eq!(graph.series_overrides[1].yaxis, Some(2));
        assert_eq!(graph.series_overrides[0].bars, Some(true));
    }

    #[test]
    fn test_targets_use_cluster_dimension() {
        let graph = network_in_graph("redis-001", "cloudwatch");
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["targets"][0]["namespace"], "AWS/ElastiCache");
        assert_eq!(json["targets"][0]["period"], "1m");
        assert_eq!(json["targets"][0]["dimensions"]["CacheClusterId"], "redis-001");
    }

    #[test]
    fn test_dashboard_layout() {
        let dashboard = elasticache_redis_dashboard(&request("cache"), "redis-001").unwrap();

        assert_eq!(dashboard.title, "ElastiCache Redis: cache");
        assert_eq!(dashboard.tags, vec!["elasticache", "redis", "alpha"]);
        assert_eq!(dashboard.rows.len(), 3);
        assert!(dashboard.rows.iter().all(|row| row.panels.len() == 3));
        assert_eq!(dashboard.links[0].url, DOCUMENTATION_URL);

        let titles: Vec<_> = dashboard.rows[2].panels.iter().map(Panel::title).collect();
        assert_eq!(titles, vec!["Network out", "Replication", "Latency"]);
    }
}
