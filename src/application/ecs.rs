// ECS service behind an application load balancer
// https://docs.aws.amazon.com/AmazonECS/latest/developerguide/cloudwatch-metrics.html
use crate::application::commons::{
    ALERT_REF_ID, ALERT_THRESHOLD, AVERAGE_ALIAS, EDITABLE, MAXIMUM_ALIAS, MINIMUM_ALIAS,
    SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT,
};
use crate::application::dispatcher::DashboardRequest;
use crate::domain::alert::{Alert, AlertCondition, Evaluator, Notifications, TimeRange};
use crate::domain::dashboard::Dashboard;
use crate::domain::panel::{
    single_y_axis, Graph, GridPos, Logs, Panel, PanelOptions, RowPanel, SeriesOverride, Stat, Text,
    ThresholdStep, TimeSeries,
};
use crate::domain::style::{GREEN, MEGA_BYTES, ORANGE, PERCENT_FORMAT, RED, YELLOW};
use crate::domain::target::{
    auto_ref_ids, CloudwatchMetricsTarget, ElasticsearchTarget, MetricAggregation, Target,
};
use crate::error::Result;
use std::collections::BTreeMap;

const ECS_NAMESPACE: &str = "AWS/ECS";
const CONTAINER_INSIGHTS_NAMESPACE: &str = "ECS/ContainerInsights";
const ALB_NAMESPACE: &str = "AWS/ApplicationELB";

/// Target-side arguments of the `ecs-alb-service` dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcsAlbService {
    pub cluster_name: String,
    pub loadbalancer: String,
    pub target_group: String,
    /// Upper bound on the task count; the capacity alerts fire at 90% of it
    pub max: u32,
    pub elasticsearch_data_source: Option<String>,
    pub kibana_url: Option<String>,
}

fn service_target(
    namespace: &str,
    metric_name: &str,
    statistic: &str,
    name: &str,
    cluster_name: &str,
) -> CloudwatchMetricsTarget {
    CloudwatchMetricsTarget::new(namespace, metric_name, statistic)
        .dimension("ServiceName", name)
        .dimension("ClusterName", cluster_name)
}

/// Container Insights task and memory counters, reduced with `Maximum`
fn insights_target(metric_name: &str, name: &str, cluster_name: &str) -> CloudwatchMetricsTarget {
    service_target(CONTAINER_INSIGHTS_NAMESPACE, metric_name, "Maximum", name, cluster_name)
}

fn alb_target(metric_name: &str, alias: &str, service: &EcsAlbService) -> CloudwatchMetricsTarget {
    CloudwatchMetricsTarget::new(ALB_NAMESPACE, metric_name, "Sum")
        .alias(alias)
        .dimension("LoadBalancer", &service.loadbalancer)
        .dimension("TargetGroup", &service.target_group)
}

/// Min/Avg/Max of one metric, Avg carrying `avg_ref_id` when given
fn min_avg_max_targets(
    namespace: &str,
    metric_name: &str,
    name: &str,
    cluster_name: &str,
    avg_ref_id: Option<&str>,
) -> Vec<CloudwatchMetricsTarget> {
    let average =
        service_target(namespace, metric_name, "Average", name, cluster_name).alias(AVERAGE_ALIAS);
    vec![
        service_target(namespace, metric_name, "Minimum", name, cluster_name)
            .alias(MINIMUM_ALIAS),
        match avg_ref_id {
            Some(ref_id) => average.ref_id(ref_id),
            None => average,
        },
        service_target(namespace, metric_name, "Maximum", name, cluster_name)
            .alias(MAXIMUM_ALIAS),
    ]
}

fn utilization_overrides() -> Vec<SeriesOverride> {
    vec![
        SeriesOverride::new(MINIMUM_ALIAS).color(GREEN).lines(false),
        SeriesOverride::new(AVERAGE_ALIAS).color(YELLOW).fill(0),
        SeriesOverride::new(MAXIMUM_ALIAS)
            .color(GREEN)
            .fill_below_to(MINIMUM_ALIAS)
            .lines(false),
    ]
}

/// Alert on the `A` series exceeding `threshold` over the last 15 minutes
fn capacity_alert(
    name: String,
    message: String,
    threshold: f64,
    notifications: &Notifications,
) -> Alert {
    Alert::new(name, message, notifications)
        .condition(AlertCondition::new(
            ALERT_REF_ID,
            TimeRange::last("15m"),
            Evaluator::GreaterThan(threshold),
        ))
        .grace_period("1m")
}

pub fn task_count_stat(name: &str, data_source: &str, cluster_name: &str) -> Stat {
    let mut targets: Vec<Target> = vec![
        insights_target("DesiredTaskCount", name, cluster_name)
            .alias("Desired")
            .into(),
        insights_target("PendingTaskCount", name, cluster_name)
            .alias("Pending")
            .into(),
        insights_target("RunningTaskCount", name, cluster_name)
            .alias("Running")
            .ref_id(ALERT_REF_ID)
            .into(),
    ];
    auto_ref_ids(&mut targets);

    Stat::new("Task Count", data_source)
        .targets(targets)
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .color_mode("background")
        .alignment("center")
        .reduce_calc("lastNotNull")
        .thresholds(vec![ThresholdStep::base("blue")])
}

pub fn cpu_utilization_graph(name: &str, data_source: &str, cluster_name: &str) -> Graph {
    Graph::new("CPU Utilization Percentage", data_source)
        .targets(min_avg_max_targets(ECS_NAMESPACE, "CPUUtilization", name, cluster_name, None))
        .series_overrides(utilization_overrides())
        .y_axes(single_y_axis(PERCENT_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .auto_ref_ids()
}

pub fn memory_utilization_graph(name: &str, data_source: &str, cluster_name: &str) -> Graph {
    let reserved_alias = "Memory reserved";
    let mut targets = min_avg_max_targets(
        CONTAINER_INSIGHTS_NAMESPACE,
        "MemoryUtilized",
        name,
        cluster_name,
        Some(ALERT_REF_ID),
    );
    targets.push(
        insights_target("MemoryReserved", name, cluster_name)
            .alias(reserved_alias),
    );

    let mut series_overrides = vec![SeriesOverride::new(reserved_alias).color(RED).fill(0)];
    series_overrides.extend(utilization_overrides());

    Graph::new("Memory Utilization", data_source)
        .targets(targets)
        .series_overrides(series_overrides)
        .y_axes(single_y_axis(MEGA_BYTES))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn memory_utilization_percentage_graph(
    name: &str,
    data_source: &str,
    cluster_name: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let alert = notifications.map(|notifications| {
        capacity_alert(
            format!("{name} Memory utilization Errors"),
            format!("{name} is having Memory utilization errors"),
            85.0,
            notifications,
        )
    });

    Graph::new("Memory Utilization Percentage", data_source)
        .targets(min_avg_max_targets(
            CONTAINER_INSIGHTS_NAMESPACE,
            "MemoryUtilization",
            name,
            cluster_name,
            Some(ALERT_REF_ID),
        ))
        .series_overrides(utilization_overrides())
        .y_axes(single_y_axis(PERCENT_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn requests_graph(data_source: &str, service: &EcsAlbService) -> Graph {
    let (count_alias, per_target_alias) = ("RequestCount", "RequestCountPerTarget");

    Graph::new("Requests", data_source)
        .targets(vec![
            alb_target("RequestCount", count_alias, service),
            alb_target("RequestCountPerTarget", per_target_alias, service),
        ])
        .series_overrides(vec![
            SeriesOverride::new(count_alias).color(YELLOW).fill(0),
            SeriesOverride::new(per_target_alias).color(GREEN).fill(0),
        ])
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .auto_ref_ids()
}

pub fn responses_graph(
    name: &str,
    data_source: &str,
    service: &EcsAlbService,
    notifications: Option<&Notifications>,
) -> Graph {
    let codes = [("2xx", GREEN), ("3xx", YELLOW), ("4xx", ORANGE), ("5xx", RED)];

    let targets = codes
        .iter()
        .map(|(alias, _)| {
            let metric_name = format!("HTTPCode_Target_{}_Count", alias.to_uppercase());
            let target = alb_target(&metric_name, alias, service);
            if *alias == "5xx" {
                target.ref_id(ALERT_REF_ID)
            } else {
                target
            }
        })
        .collect::<Vec<_>>();

    let series_overrides = codes
        .iter()
        .map(|(alias, color)| SeriesOverride::new(alias).color(color).fill(0))
        .collect();

    let alert = notifications.map(|notifications| {
        capacity_alert(
            format!("{name} has 5XX errors"),
            format!("{name} has 5XX errors"),
            0.0,
            notifications,
        )
    });

    Graph::new("Responses", data_source)
        .targets(targets)
        .series_overrides(series_overrides)
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .auto_ref_ids()
}

pub fn deployments_panel(name: &str, data_source: &str, cluster_name: &str) -> TimeSeries {
    TimeSeries::new("Deployments", data_source)
        .targets(vec![
            insights_target("DeploymentCount", name, cluster_name)
                .alias("Deployment"),
        ])
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .axis_placement("hidden")
        .tooltip_mode("none")
}

fn task_graph(
    title: &str,
    metric_name: &str,
    name: &str,
    data_source: &str,
    cluster_name: &str,
    alert: Option<Alert>,
) -> Graph {
    Graph::new(title, data_source)
        .targets(vec![
            insights_target(metric_name, name, cluster_name)
                .alias("Containers")
                .ref_id(ALERT_REF_ID),
        ])
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn running_tasks_graph(
    name: &str,
    data_source: &str,
    cluster_name: &str,
    max: u32,
    notifications: Option<&Notifications>,
) -> Graph {
    let alert = notifications.map(|notifications| {
        capacity_alert(
            format!("{name} Running count of containers nearing the max"),
            format!("{name} is having Running count of containers nearing the max"),
            0.9 * f64::from(max),
            notifications,
        )
    });
    task_graph("Running Tasks", "RunningTaskCount", name, data_source, cluster_name, alert)
}

pub fn desired_tasks_graph(
    name: &str,
    data_source: &str,
    cluster_name: &str,
    max: u32,
    notifications: Option<&Notifications>,
) -> Graph {
    let alert = notifications.map(|notifications| {
        capacity_alert(
            format!("{name} Desired count of containers nearing the max"),
            format!("{name} is having Desired count of containers nearing the max"),
            0.9 * f64::from(max),
            notifications,
        )
    });
    task_graph("Desired Tasks", "DesiredTaskCount", name, data_source, cluster_name, alert)
}

pub fn pending_tasks_graph(
    name: &str,
    data_source: &str,
    cluster_name: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let alert = notifications.map(|notifications| {
        capacity_alert(
            format!("Unable to schedule containers for {name}"),
            format!("Unable to schedule containers for {name}"),
            0.0,
            notifications,
        )
    });
    task_graph("Pending Tasks", "PendingTaskCount", name, data_source, cluster_name, alert)
}

pub fn error_logs_query(name: &str) -> String {
    format!("tag: \"{name}\" AND log.level: [50 TO *] AND NOT log.msg: \"\"")
}

pub fn helpful_resources_panel(name: &str, kibana_url: Option<&str>) -> Text {
    let kibana = kibana_url
        .map(|url| format!("<a href=\"{url}\" target=\"_blank\">Kibana URL</a>\n\n"))
        .unwrap_or_default();
    let content = format!(
        "\n# Helpful resources\n\n## Elasticsearch\n\n{kibana}Elasticsearch query to find all error logs: `{}`\n",
        error_logs_query(name)
    );

    Text::new("Helpful resources", content, "markdown").transparent(TRANSPARENT)
}

pub fn error_logs_panel(name: &str, data_source: &str) -> Logs {
    let metrics = vec![MetricAggregation {
        id: "1".to_string(),
        kind: "logs".to_string(),
        settings: BTreeMap::from([("limit".to_string(), "10000".to_string())]),
    }];

    Logs::new("Error Logs", data_source)
        .targets(vec![ElasticsearchTarget::new(error_logs_query(name), metrics)])
        .transparent(TRANSPARENT)
        .wrap_log_messages(false)
        .prettify_log_message(false)
        .enable_log_details(true)
        .dedup_strategy("exact")
}

fn row(title: &str, y: u32) -> Panel {
    RowPanel::new(title).grid_pos(GridPos::new(1, 24, 0, y)).into()
}

pub fn ecs_alb_service_dashboard(
    request: &DashboardRequest,
    service: &EcsAlbService,
) -> Result<Dashboard> {
    let name = request.name.as_str();
    let cloudwatch = request.cloudwatch("ecs-alb-service")?;
    let cluster = service.cluster_name.as_str();
    let notifications = request.notifications();

    let mut panels: Vec<Panel> = vec![
        row("Summary", 0),
        task_count_stat(name, cloudwatch, cluster).grid_pos(GridPos::new(8, 12, 0, 1)).into(),
        deployments_panel(name, cloudwatch, cluster).grid_pos(GridPos::new(8, 12, 12, 1)).into(),
        row("Capacity", 9),
        running_tasks_graph(name, cloudwatch, cluster, service.max, notifications)
            .grid_pos(GridPos::new(8, 8, 0, 10))
            .into(),
        desired_tasks_graph(name, cloudwatch, cluster, service.max, notifications)
            .grid_pos(GridPos::new(8, 8, 8, 10))
            .into(),
        pending_tasks_graph(name, cloudwatch, cluster, notifications)
            .grid_pos(GridPos::new(8, 8, 16, 10))
            .into(),
        row("Utilization", 18),
        cpu_utilization_graph(name, cloudwatch, cluster)
            .grid_pos(GridPos::new(8, 8, 0, 19))
            .into(),
        memory_utilization_graph(name, cloudwatch, cluster)
            .grid_pos(GridPos::new(8, 8, 8, 19))
            .into(),
        memory_utilization_percentage_graph(name, cloudwatch, cluster, notifications)
            .grid_pos(GridPos::new(8, 8, 16, 19))
            .into(),
        row("Requests and Responses", 27),
        requests_graph(cloudwatch, service).grid_pos(GridPos::new(8, 12, 0, 28)).into(),
        responses_graph(name, cloudwatch, service, notifications)
            .grid_pos(GridPos::new(8, 12, 12, 28))
            .into(),
        row("Logs", 36),
        helpful_resources_panel(name, service.kibana_url.as_deref())
            .grid_pos(GridPos::new(8, 24, 0, 37))
            .into(),
    ];

    if let Some(elasticsearch) = service.elasticsearch_data_source.as_deref() {
        panels.push(
            error_logs_panel(name, elasticsearch)
                .grid_pos(GridPos::new(24, 24, 0, 45))
                .into(),
        );
    }

    Ok(Dashboard::new(format!("ECS Service: {name}"))
        .editable(EDITABLE)
        .tags([
            "ecs".to_string(),
            "ecs-service".to_string(),
            "containers".to_string(),
            "service".to_string(),
            request.environment.clone(),
        ])
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
        .panels(panels)
        .auto_panel_ids())
}
