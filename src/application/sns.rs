// SNS topic graph
use crate::application::commons::{ALERT_REF_ID, ALERT_THRESHOLD, EDITABLE, TRANSPARENT};
use crate::domain::alert::{Alert, AlertCondition, Evaluator, Notifications, Operator, TimeRange};
use crate::domain::panel::{single_y_axis, Graph, PanelOptions, SeriesOverride};
use crate::domain::style::{RED, SHORT_FORMAT};
use crate::domain::target::CloudwatchMetricsTarget;

const NAMESPACE: &str = "AWS/SNS";
const PERIOD: &str = "5m";

const PUBLISHED_ALIAS: &str = "Published";
const DELIVERED_ALIAS: &str = "Delivered";
const FAILED_ALIAS: &str = "Failed";

/// Topic name from either a bare name or a topic ARN
pub fn topic_name(topic: &str) -> &str {
    if topic.starts_with("arn:aws:sns") {
        topic.rsplit(':').next().unwrap_or(topic)
    } else {
        topic
    }
}

fn topic_target(metric_name: &str, alias: &str, topic: &str) -> CloudwatchMetricsTarget {
    CloudwatchMetricsTarget::new(NAMESPACE, metric_name, "Sum")
        .alias(alias)
        .period(PERIOD)
        .dimension("TopicName", topic)
}

pub fn sns_graph(topic: &str, data_source: &str, notifications: Option<&Notifications>) -> Graph {
    let name = topic_name(topic);

    let mut failed = topic_target("NumberOfNotificationsFailed", FAILED_ALIAS, name);
    if notifications.is_some() {
        failed = failed.ref_id(ALERT_REF_ID);
    }

    let targets = vec![
        topic_target("NumberOfMessagesPublished", PUBLISHED_ALIAS, name),
        topic_target("NumberOfNotificationsDelivered", DELIVERED_ALIAS, name),
        failed,
    ];

    let series_overrides = vec![
        SeriesOverride::new(FAILED_ALIAS).yaxis(2).color(RED),
        SeriesOverride::new(PUBLISHED_ALIAS).zindex(1),
    ];

    // https://docs.aws.amazon.com/sns/latest/dg/sns-monitoring-using-cloudwatch.html
    let alert = notifications.map(|notifications| {
        Alert::new(
            format!("{name} alerts"),
            format!("{name} seems to have no subscriptions or failed deliveries"),
            notifications,
        )
        .no_data_state("keep_state")
        .condition(
            AlertCondition::new(ALERT_REF_ID, TimeRange::last("15m"), Evaluator::GreaterThan(0.0))
                .operator(Operator::Or),
        )
        .frequency("2m")
        .grace_period("2m")
    });

    Graph::new(&format!("SNS: {name}"), data_source)
        .targets(targets)
        .y_axes(single_y_axis(SHORT_FORMAT))
        .series_overrides(series_overrides)
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .bars(true)
        .lines(false)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}
