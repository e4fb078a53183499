// API Gateway request and error graphs
// https://docs.aws.amazon.com/apigateway/latest/developerguide/api-gateway-metrics-and-dimensions.html
use crate::application::commons::{
    ALERT_REF_ID, ALERT_THRESHOLD, EDITABLE, SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT,
};
use crate::application::dispatcher::DashboardRequest;
use crate::application::lambdas::invocations_graph;
use crate::application::release::{release_annotations, release_templating};
use crate::domain::alert::{Alert, AlertCondition, Evaluator, Notifications, TimeRange};
use crate::domain::dashboard::{Dashboard, Row};
use crate::domain::panel::{Graph, PanelOptions, SeriesOverride, YAxes, YAxis};
use crate::domain::style::{GREEN, RED, SHORT_FORMAT};
use crate::domain::target::CloudwatchMetricsTarget;
use crate::error::Result;

const NAMESPACE: &str = "AWS/ApiGateway";
const PERIOD: &str = "1m";

const ALIAS_4XX: &str = "4xx";
const ALIAS_5XX: &str = "5xx";
const REQUESTS_ALIAS: &str = "requests";

fn api_target(name: &str, metric_name: &str, alias: &str, ref_id: &str) -> CloudwatchMetricsTarget {
    CloudwatchMetricsTarget::new(NAMESPACE, metric_name, "Sum")
        .alias(alias)
        .period(PERIOD)
        .dimension("ApiName", name)
        .ref_id(ref_id)
}

/// Requests as green bars with the error series as red bars on the right axis
fn error_overrides(error_alias: &str) -> Vec<SeriesOverride> {
    vec![
        SeriesOverride::new(REQUESTS_ALIAS)
            .lines(false)
            .points(false)
            .bars(true)
            .color(GREEN),
        SeriesOverride::new(error_alias)
            .yaxis(2)
            .lines(false)
            .points(false)
            .bars(true)
            .color(RED)
            .zindex(1),
    ]
}

fn short_axes() -> YAxes {
    YAxes::new(YAxis::new(SHORT_FORMAT), YAxis::new(SHORT_FORMAT))
}

pub fn requests_5xx_graph(
    name: &str,
    data_source: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let targets = vec![
        api_target(name, "5XXError", ALIAS_5XX, ALERT_REF_ID),
        api_target(name, "Count", REQUESTS_ALIAS, "C"),
    ];

    let alert = notifications.map(|notifications| {
        Alert::new(
            format!("{name} API Gateway 5XX Errors"),
            format!("{name} is having 5XX errors"),
            notifications,
        )
        .condition(AlertCondition::new(
            ALERT_REF_ID,
            TimeRange::last("15m"),
            Evaluator::GreaterThan(0.0),
        ))
        .frequency("2m")
        .grace_period("2m")
    });

    Graph::new(&format!("API Gateway Requests and 5XX errors: {name}"), data_source)
        .targets(targets)
        .series_overrides(error_overrides(ALIAS_5XX))
        .y_axes(short_axes())
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert(alert)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn requests_4xx_graph(name: &str, data_source: &str) -> Graph {
    let targets = vec![
        api_target(name, "4XXError", ALIAS_4XX, "A"),
        api_target(name, "Count", REQUESTS_ALIAS, "B"),
    ];

    Graph::new(&format!("API Gateway Requests and 4XX errors: {name}"), data_source)
        .targets(targets)
        .series_overrides(error_overrides(ALIAS_4XX))
        .y_axes(short_axes())
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .alert_threshold(ALERT_THRESHOLD)
        .auto_ref_ids()
}

pub fn api_gateway_dashboard(request: &DashboardRequest, lambdas: &[String]) -> Result<Dashboard> {
    let name = request.name.as_str();
    let cloudwatch = request.cloudwatch("api-gateway")?;
    let influxdb = request.influxdb_data_source.as_deref();

    let mut tags = vec!["api-gateway".to_string(), request.environment.clone()];
    let mut rows = vec![
        Row::new(vec![requests_4xx_graph(name, cloudwatch).into()]),
        Row::new(vec![requests_5xx_graph(name, cloudwatch, request.notifications()).into()]),
    ];

    if !lambdas.is_empty() {
        tags.push("lambda".to_string());
        rows.push(Row::new(
            lambdas
                .iter()
                .map(|lambda| invocations_graph(lambda, cloudwatch, None).into())
                .collect(),
        ));
    }

    Ok(Dashboard::new(format!("API Gateway: {name}"))
        .editable(EDITABLE)
        .annotations(influxdb.map(release_annotations).unwrap_or_default())
        .templating(release_templating(influxdb))
        .tags(tags)
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
        .rows(rows)
        .auto_panel_ids())
}
