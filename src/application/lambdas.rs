// Lambda panels and the per-trigger lambda dashboards
// https://docs.aws.amazon.com/lambda/latest/dg/monitoring-metrics.html
use crate::application::commons::{
    min_mean_max_overrides, ALERT_REF_ID, ALERT_THRESHOLD, AVERAGE_ALIAS, EDITABLE, MAXIMUM_ALIAS,
    MINIMUM_ALIAS, SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT,
};
use crate::application::dispatcher::DashboardRequest;
use crate::application::release::{release_annotations, release_templating};
use crate::application::sns::sns_graph;
use crate::domain::alert::{Alert, AlertCondition, Evaluator, Notifications, TimeRange};
use crate::domain::dashboard::{Dashboard, Row};
use crate::domain::panel::{
    single_y_axis, Graph, Logs, PanelOptions, SeriesOverride, YAxes, YAxis,
};
use crate::domain::style::{DECIMAL_MEGA_BYTES, GREEN, MILLISECONDS_FORMAT, RED, SHORT_FORMAT};
use crate::domain::target::{CloudwatchLogsInsightsTarget, CloudwatchMetricsTarget};
use crate::error::Result;

const NAMESPACE: &str = "AWS/Lambda";
const DASHBOARD_PREFIX: &str = "Lambda: ";

const INVOCATIONS_ALIAS: &str = "Invocations";
const ERRORS_ALIAS: &str = "Errors";

const LOGS_QUERY: &str = "fields @timestamp, @xrayTraceId, @message \
    | filter @message like /^(?!.*(START|END|REPORT|LOGS|EXTENSION)).*$/ \
    | sort @timestamp desc";

/// Event source a lambda is invoked from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaTrigger {
    CognitoIdp,
    CloudwatchEventSchedule,
    CloudwatchEventTrigger,
    CloudwatchLogs,
    Sqs { fifo: bool },
    Sns { topics: Vec<String>, fifo: bool },
    Null,
}

impl LambdaTrigger {
    /// Tags for dashboards that show only the lambda itself
    fn tags(&self) -> Vec<&'static str> {
        match self {
            LambdaTrigger::CloudwatchEventSchedule => vec!["cron"],
            LambdaTrigger::CognitoIdp => vec!["cognito"],
            LambdaTrigger::CloudwatchEventTrigger => vec!["cloudwatch events"],
            LambdaTrigger::CloudwatchLogs => vec!["cloudwatch logs"],
            LambdaTrigger::Null | LambdaTrigger::Sqs { .. } | LambdaTrigger::Sns { .. } => vec![],
        }
    }
}

fn lambda_target(
    namespace: &str,
    metric_name: &str,
    statistic: &str,
    alias: &str,
    dimension: (&str, &str),
) -> CloudwatchMetricsTarget {
    CloudwatchMetricsTarget::new(namespace, metric_name, statistic)
        .alias(alias)
        .dimension(dimension.0, dimension.1)
}

fn two_decimal_axes(left_format: &str) -> YAxes {
    YAxes::new(
        YAxis::new(left_format).decimals(2),
        YAxis::new(SHORT_FORMAT).decimals(2),
    )
}

pub fn invocations_graph(
    name: &str,
    data_source: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let dimension = ("FunctionName", name);
    let targets = vec![
        lambda_target(NAMESPACE, "Invocations", "Sum", INVOCATIONS_ALIAS, dimension),
        lambda_target(NAMESPACE, "Errors", "Sum", ERRORS_ALIAS, dimension).ref_id(ALERT_REF_ID),
    ];

    let series_overrides = vec![
        SeriesOverride::new(INVOCATIONS_ALIAS).points(false).color(GREEN),
        SeriesOverride::new(ERRORS_ALIAS).points(false).color(RED),
    ];

    let alert = notifications.map(|notifications| {
        Alert::new(
            format!("{name} Invocation Errors"),
            format!("{name} is having invocation errors"),
            notifications,
        )
        .condition(AlertCondition::new(
            ALERT_REF_ID,
            TimeRange::last("5m"),
            Evaluator::GreaterThan(0.0),
        ))
        .grace_period("1m")
    });

    Graph::new("Lambda Invocations and Errors", data_source)
        .targets(targets)
        .series_overrides(series_overrides)
        .y_axes(two_decimal_axes(SHORT_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn duration_graph(name: &str, data_source: &str) -> Graph {
    let dimension = ("FunctionName", name);
    let targets = vec![
        lambda_target(NAMESPACE, "Duration", "Minimum", MINIMUM_ALIAS, dimension),
        lambda_target(NAMESPACE, "Duration", "Average", AVERAGE_ALIAS, dimension),
        lambda_target(NAMESPACE, "Duration", "Maximum", MAXIMUM_ALIAS, dimension),
    ];

    Graph::new("Lambda Invocation Duration", data_source)
        .targets(targets)
        .series_overrides(min_mean_max_overrides(MINIMUM_ALIAS, AVERAGE_ALIAS, MAXIMUM_ALIAS))
        .y_axes(two_decimal_axes(MILLISECONDS_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn memory_utilization_percentage_graph(
    name: &str,
    data_source: &str,
    insights_namespace: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let dimension = ("function_name", name);
    let targets = vec![
        lambda_target(
            insights_namespace,
            "memory_utilization",
            "Minimum",
            MINIMUM_ALIAS,
            dimension,
        ),
        lambda_target(insights_namespace, "memory_utilization", "Average", AVERAGE_ALIAS, dimension)
            .ref_id(ALERT_REF_ID),
        lambda_target(
            insights_namespace,
            "memory_utilization",
            "Maximum",
            MAXIMUM_ALIAS,
            dimension,
        ),
    ];

    let alert = notifications.map(|notifications| {
        Alert::new(
            format!("{name} Memory utilization Errors"),
            format!("{name} is having Memory utilization errors"),
            notifications,
        )
        .condition(AlertCondition::new(
            ALERT_REF_ID,
            TimeRange::last("5m"),
            Evaluator::GreaterThan(90.0),
        ))
        .grace_period("1m")
    });

    Graph::new("Lambda Memory Utilization Percentage", data_source)
        .targets(targets)
        .series_overrides(min_mean_max_overrides(MINIMUM_ALIAS, AVERAGE_ALIAS, MAXIMUM_ALIAS))
        .y_axes(two_decimal_axes(SHORT_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn memory_utilization_graph(name: &str, data_source: &str, insights_namespace: &str) -> Graph {
    let dimension = ("function_name", name);
    let targets = vec![
        lambda_target(
            insights_namespace,
            "used_memory_max",
            "Maximum",
            "used_memory_max",
            dimension,
        ),
        lambda_target(insights_namespace, "total_memory", "Maximum", "allocated_memory", dimension),
    ];

    let series_overrides = vec![
        SeriesOverride::new("used_memory_max").points(false).color(GREEN),
        SeriesOverride::new("allocated_memory").points(false).color(RED).fill(0),
    ];

    Graph::new("Lambda Memory Utilization", data_source)
        .targets(targets)
        .series_overrides(series_overrides)
        .y_axes(single_y_axis(DECIMAL_MEGA_BYTES))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn logs_panel(name: &str, data_source: &str) -> Logs {
    let targets = vec![CloudwatchLogsInsightsTarget::new(
        LOGS_QUERY,
        vec![format!("/aws/lambda/{name}")],
    )];

    Logs::new("Logs", data_source)
        .targets(targets)
        .wrap_log_messages(true)
        .prettify_log_message(true)
        .enable_log_details(true)
}

fn queue_name(name: &str, fifo: bool) -> String {
    if fifo {
        format!("{name}.fifo")
    } else {
        name.to_string()
    }
}

pub fn sqs_graph(name: &str, data_source: &str, fifo: bool) -> Graph {
    let queue = queue_name(name, fifo);
    let targets = vec![
        CloudwatchMetricsTarget::new("AWS/SQS", "NumberOfMessagesSent", "Sum")
            .alias("Number of messages sent to the queue")
            .period("1m")
            .dimension("QueueName", &queue),
    ];

    Graph::new(&format!("SQS: {queue}"), data_source)
        .targets(targets)
        .y_axes(single_y_axis(SHORT_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .auto_ref_ids()
}

// https://docs.aws.amazon.com/AWSSimpleQueueService/latest/SQSDeveloperGuide/sqs-monitoring-using-cloudwatch.html
pub fn sqs_dead_letter_graph(
    name: &str,
    data_source: &str,
    fifo: bool,
    notifications: Option<&Notifications>,
) -> Graph {
    let queue = queue_name(name, fifo);
    let mut target =
        CloudwatchMetricsTarget::new("AWS/SQS", "ApproximateNumberOfMessagesVisible", "Maximum")
            .alias("Approximate number of messages available")
            .period("1m")
            .dimension("QueueName", &queue);
    if notifications.is_some() {
        target = target.ref_id(ALERT_REF_ID);
    }

    let alert = notifications.map(|notifications| {
        Alert::new(
            format!("{queue} messages"),
            format!("{queue} is having messages"),
            notifications,
        )
        .condition(AlertCondition::new(
            ALERT_REF_ID,
            TimeRange::last("5m"),
            Evaluator::GreaterThan(0.0),
        ))
        .grace_period("5m")
    });

    Graph::new(&format!("SQS Dead Letter Queue: {queue}"), data_source)
        .targets(vec![target])
        .y_axes(single_y_axis(SHORT_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

fn lambda_dashboard_base(request: &DashboardRequest, tags: Vec<String>) -> Dashboard {
    let influxdb = request.influxdb_data_source.as_deref();

    Dashboard::new(format!("{DASHBOARD_PREFIX}{}", request.name))
        .editable(EDITABLE)
        .annotations(influxdb.map(release_annotations).unwrap_or_default())
        .templating(release_templating(influxdb))
        .tags(tags)
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
}

fn lambda_only_dashboard(request: &DashboardRequest, trigger: &LambdaTrigger) -> Result<Dashboard> {
    let name = request.name.as_str();
    let cloudwatch = request.cloudwatch("lambda")?;
    let insights = request.lambda_insights_namespace.as_str();
    let notifications = request.notifications();

    let tags = trigger
        .tags()
        .into_iter()
        .chain(["lambda"])
        .map(str::to_string)
        .chain([request.environment.clone()])
        .collect();

    Ok(lambda_dashboard_base(request, tags)
        .rows(vec![
            Row::new(vec![
                invocations_graph(name, cloudwatch, notifications).into(),
                duration_graph(name, cloudwatch).into(),
            ]),
            Row::new(vec![
                memory_utilization_percentage_graph(name, cloudwatch, insights, notifications)
                    .into(),
                memory_utilization_graph(name, cloudwatch, insights).into(),
            ]),
            Row::new(vec![logs_panel(name, cloudwatch).into()]),
        ])
        .auto_panel_ids())
}

/// Invocations, memory and logs rows shared by the queue-driven dashboards
fn lambda_rows(request: &DashboardRequest, cloudwatch: &str, collapse: bool) -> Vec<Row> {
    let name = request.name.as_str();
    let insights = request.lambda_insights_namespace.as_str();

    vec![
        Row::new(vec![
            invocations_graph(name, cloudwatch, None).into(),
            duration_graph(name, cloudwatch).into(),
        ])
        .title("Invocations")
        .collapse(collapse),
        Row::new(vec![
            memory_utilization_percentage_graph(
                name,
                cloudwatch,
                insights,
                request.notifications(),
            )
            .into(),
            memory_utilization_graph(name, cloudwatch, insights).into(),
        ])
        .title("Memory Utilization")
        .collapse(collapse),
        Row::new(vec![logs_panel(name, cloudwatch).into()])
            .title("Logs")
            .collapse(true),
    ]
}

fn queue_rows(
    request: &DashboardRequest,
    cloudwatch: &str,
    fifo: bool,
    collapse: bool,
) -> Vec<Row> {
    let name = request.name.as_str();
    let dead_letter_queue = format!("{name}-dlq");

    vec![
        Row::new(vec![sqs_graph(name, cloudwatch, fifo).into()])
            .title("Queues")
            .collapse(collapse),
        Row::new(vec![
            sqs_dead_letter_graph(&dead_letter_queue, cloudwatch, fifo, request.notifications())
                .into(),
        ])
        .title("Dead Letter Queues")
        .collapse(collapse),
    ]
}

fn queue_tags(request: &DashboardRequest, extra: &[&str], fifo: bool) -> Vec<String> {
    let mut tags = vec!["lambda".to_string(), "sqs".to_string(), request.environment.clone()];
    tags.extend(extra.iter().map(|tag| tag.to_string()));
    if fifo {
        tags.push("fifo".to_string());
    }
    tags
}

fn lambda_sqs_dashboard(request: &DashboardRequest, fifo: bool) -> Result<Dashboard> {
    let cloudwatch = request.cloudwatch("lambda")?;

    let mut rows = lambda_rows(request, cloudwatch, false);
    rows.extend(queue_rows(request, cloudwatch, fifo, false));

    Ok(lambda_dashboard_base(request, queue_tags(request, &[], fifo))
        .rows(rows)
        .auto_panel_ids())
}

fn lambda_sns_sqs_dashboard(
    request: &DashboardRequest,
    topics: &[String],
    fifo: bool,
) -> Result<Dashboard> {
    let cloudwatch = request.cloudwatch("lambda")?;

    let topic_panels = topics
        .iter()
        .map(|topic| sns_graph(topic, cloudwatch, request.notifications()).into())
        .collect();

    let mut rows = vec![Row::new(topic_panels).title("SNS Topics").collapse(true)];
    rows.extend(lambda_rows(request, cloudwatch, true));
    rows.extend(queue_rows(request, cloudwatch, fifo, true));

    Ok(lambda_dashboard_base(request, queue_tags(request, &["sns"], fifo))
        .rows(rows)
        .auto_panel_ids())
}

pub fn lambda_dashboard(request: &DashboardRequest, trigger: &LambdaTrigger) -> Result<Dashboard> {
    match trigger {
        LambdaTrigger::Sqs { fifo } => lambda_sqs_dashboard(request, *fifo),
        LambdaTrigger::Sns { topics, fifo } => lambda_sns_sqs_dashboard(request, topics, *fifo),
        _ => lambda_only_dashboard(request, trigger),
    }
}
