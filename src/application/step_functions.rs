// Step function execution graphs
// https://docs.aws.amazon.com/step-functions/latest/dg/procedure-cw-metrics.html
use crate::application::commons::{
    min_mean_max_overrides, ALERT_THRESHOLD, AVERAGE_ALIAS, DEFAULT_REFRESH, EDITABLE,
    MAXIMUM_ALIAS, MINIMUM_ALIAS, SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT,
};
use crate::application::dispatcher::DashboardRequest;
use crate::application::lambdas::{
    duration_graph, invocations_graph, logs_panel, memory_utilization_graph,
    memory_utilization_percentage_graph,
};
use crate::domain::alert::{Alert, AlertCondition, Evaluator, Notifications, Operator, TimeRange};
use crate::domain::dashboard::{Dashboard, Row};
use crate::domain::panel::{Graph, PanelOptions, SeriesOverride, YAxes, YAxis};
use crate::domain::style::{BLUE, GREEN, MILLISECONDS_FORMAT, ORANGE, RED, SHORT_FORMAT};
use crate::domain::target::CloudwatchMetricsTarget;
use crate::error::{DashboardError, Result};

const NAMESPACE: &str = "AWS/States";
const DASHBOARD_PREFIX: &str = "Step Function: ";
const STATE_MACHINE_ARN_PREFIX: &str = "arn:aws:states";

/// Alias, metric, color and fixed ref id of each execution series
const EXECUTION_SERIES: [(&str, &str, &str, Option<&str>); 6] = [
    ("Executions - Started", "ExecutionsStarted", BLUE, None),
    ("Executions - Succeeded", "ExecutionsSucceeded", GREEN, None),
    ("Executions - Aborted", "ExecutionsAborted", RED, Some("A")),
    ("Executions - Failed", "ExecutionsFailed", RED, Some("B")),
    ("Executions - Throttled", "ExecutionsThrottled", ORANGE, Some("C")),
    ("Executions - Timeout", "ExecutionsTimedOut", RED, Some("D")),
];

pub fn execution_metrics_graph(
    arn: &str,
    data_source: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let targets: Vec<CloudwatchMetricsTarget> = EXECUTION_SERIES
        .iter()
        .map(|(alias, metric_name, _, ref_id)| {
            let target = CloudwatchMetricsTarget::new(NAMESPACE, metric_name, "Sum")
                .alias(alias)
                .dimension("StateMachineArn", arn);
            match ref_id {
                Some(ref_id) => target.ref_id(ref_id),
                None => target,
            }
        })
        .collect();

    let series_overrides = EXECUTION_SERIES
        .iter()
        .map(|(alias, _, color, _)| SeriesOverride::new(alias).points(false).color(color))
        .collect();

    let alert = notifications.map(|notifications| {
        EXECUTION_SERIES
            .iter()
            .filter_map(|(_, _, _, ref_id)| *ref_id)
            .fold(
                Alert::new(
                    format!("{arn} execution issues"),
                    format!("{arn} might have failed, aborted, throttled or timedout"),
                    notifications,
                ),
                |alert, ref_id| {
                    let evaluator = Evaluator::GreaterThan(0.0);
                    let condition = AlertCondition::new(ref_id, TimeRange::last("5m"), evaluator);
                    alert.condition(condition.operator(Operator::Or))
                },
            )
            .grace_period("2m")
            .frequency("2m")
    });

    Graph::new("Step function execution metrics", data_source)
        .targets(targets)
        .series_overrides(series_overrides)
        .y_axes(YAxes::new(
            YAxis::new(SHORT_FORMAT).decimals(2),
            YAxis::new(SHORT_FORMAT).decimals(2),
        ))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn execution_duration_graph(arn: &str, data_source: &str) -> Graph {
    let targets: Vec<CloudwatchMetricsTarget> = [
        (MINIMUM_ALIAS, "Minimum"),
        (AVERAGE_ALIAS, "Average"),
        (MAXIMUM_ALIAS, "Maximum"),
    ]
    .into_iter()
    .map(|(alias, statistic)| {
        CloudwatchMetricsTarget::new(NAMESPACE, "ExecutionTime", statistic)
            .alias(alias)
            .dimension("StateMachineArn", arn)
    })
    .collect();

    Graph::new("Step function execution duration", data_source)
        .targets(targets)
        .series_overrides(min_mean_max_overrides(MINIMUM_ALIAS, AVERAGE_ALIAS, MAXIMUM_ALIAS))
        .y_axes(YAxes::new(
            YAxis::new(MILLISECONDS_FORMAT).decimals(2),
            YAxis::new(MILLISECONDS_FORMAT).decimals(2),
        ))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

/// Metrics row and collapsed logs row for one lambda of the state machine
fn lambda_rows(lambda: &str, request: &DashboardRequest, cloudwatch: &str) -> [Row; 2] {
    let insights = request.lambda_insights_namespace.as_str();

    [
        Row::new(vec![
            invocations_graph(lambda, cloudwatch, None).into(),
            duration_graph(lambda, cloudwatch).into(),
            memory_utilization_percentage_graph(
                lambda,
                cloudwatch,
                insights,
                request.notifications(),
            )
            .into(),
            memory_utilization_graph(lambda, cloudwatch, insights).into(),
        ])
        .title(&format!("{lambda} Lambda Metrics"))
        .collapse(false),
        Row::new(vec![logs_panel(lambda, cloudwatch).into()])
            .title(&format!("{lambda} Lambda Logs"))
            .collapse(true),
    ]
}

pub fn step_function_dashboard(
    request: &DashboardRequest,
    lambdas: &[String],
) -> Result<Dashboard> {
    let arn = request.name.as_str();
    if !arn.starts_with(STATE_MACHINE_ARN_PREFIX) {
        return Err(DashboardError::InvalidStateMachineArn(arn.to_string()));
    }
    let cloudwatch = request.cloudwatch("step-function")?;
    let state_machine = arn.rsplit(':').next().unwrap_or(arn);

    let mut tags = vec!["step-function".to_string(), request.environment.clone()];
    let mut rows = vec![Row::new(vec![
        execution_duration_graph(arn, cloudwatch).into(),
        execution_metrics_graph(arn, cloudwatch, request.notifications()).into(),
    ])
    .title("Step Function Execution Metrics")];

    if !lambdas.is_empty() {
        tags.push("lambda".to_string());
        rows.extend(lambdas.iter().flat_map(|lambda| lambda_rows(lambda, request, cloudwatch)));
    }

    Ok(Dashboard::new(format!("{DASHBOARD_PREFIX}{state_machine}"))
        .editable(EDITABLE)
        .tags(tags)
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
        .rows(rows)
        .refresh(DEFAULT_REFRESH)
        .auto_panel_ids())
}
