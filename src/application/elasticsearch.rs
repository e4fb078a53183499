// Elasticsearch domain graphs over the CloudWatch metrics mirrored into InfluxDB
use crate::application::commons::{
    influx_vars, EDITABLE, RAW_QUERY, SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT,
};
use crate::application::dispatcher::DashboardRequest;
use crate::application::release::{release_annotations, release_template};
use crate::domain::dashboard::{Dashboard, Row};
use crate::domain::panel::{single_y_axis, Graph, PanelOptions, SeriesOverride, YAxes, YAxis};
use crate::domain::style::{GREEN, MEGA_BYTES, ORANGE, PERCENT_FORMAT, SHORT_FORMAT, YELLOW};
use crate::domain::target::InfluxDbTarget;
use crate::domain::templating::{Template, Templating};
use crate::error::Result;
use crate::infrastructure::config::prepare_query;

const ES_MEASUREMENT: &str = "cloudwatch_aws_es";
const DOMAIN_VARIABLE: &str = "elasticsearch";

pub fn elasticsearch_template(data_source: &str) -> Template {
    Template::new(
        DOMAIN_VARIABLE,
        "SHOW TAG VALUES WITH KEY = \"domain_name\" WHERE $timeFilter",
        data_source,
    )
    .label("Elasticsearch")
    .refresh(2)
    .sort(5)
    .multi(false)
    .include_all(false)
    .hide(0)
}

/// `selector` is the aggregation over one field, `fill` the InfluxQL fill mode
fn es_query(selector: &str, fill: &str) -> String {
    let template = format!(
        "SELECT {selector} FROM \"${{retention_policy}}\".\"${{measurement}}\" WHERE (\"domain_name\" =~ /^${{name}}$/) AND $timeFilter GROUP BY time(1m) fill({fill})"
    );
    prepare_query(&template, &influx_vars(ES_MEASUREMENT, &format!("${DOMAIN_VARIABLE}")))
}

struct Series {
    alias: &'static str,
    selector: &'static str,
    color: &'static str,
    right_axis: bool,
}

impl Series {
    fn new(alias: &'static str, selector: &'static str, color: &'static str) -> Self {
        Self {
            alias,
            selector,
            color,
            right_axis: false,
        }
    }

    fn right_axis(self) -> Self {
        Self {
            right_axis: true,
            ..self
        }
    }
}

fn es_graph(title: &str, data_source: &str, y_axes: YAxes, fill: &str, series: &[Series]) -> Graph {
    let targets: Vec<InfluxDbTarget> = series
        .iter()
        .map(|s| InfluxDbTarget::new(es_query(s.selector, fill), RAW_QUERY).alias(s.alias))
        .collect();

    let series_overrides = series
        .iter()
        .map(|s| {
            let series_override = SeriesOverride::new(s.alias)
                .color(s.color)
                .lines(true)
                .bars(false);
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

pub fn cpu_graph(data_source: &str) -> Graph {
    es_graph(
        "CPU utilization",
        data_source,
        single_y_axis(PERCENT_FORMAT),
        "previous",
        &[Series::new("CPU utilization", "max(\"cpu_utilization_maximum\")", GREEN)],
    )
}

pub fn jvm_memory_pressure_graph(data_source: &str) -> Graph {
    es_graph(
        "JVM memory pressure",
        data_source,
        single_y_axis(PERCENT_FORMAT),
        "previous",
        &[Series::new(
            "JVM memory pressure",
            "max(\"jvm_memory_pressure_maximum\")",
            GREEN,
        )],
    )
}

pub fn documents_graph(data_source: &str) -> Graph {
    es_graph(
        "Documents",
        data_source,
        YAxes::new(YAxis::new(SHORT_FORMAT), YAxis::new(SHORT_FORMAT)),
        "previous",
        &[
            Series::new("Searchable documents", "max(\"searchable_documents_maximum\")", GREEN),
            Series::new("Deleted documents", "max(\"deleted_documents_maximum\")", ORANGE)
                .right_axis(),
        ],
    )
}

pub fn storage_graph(data_source: &str) -> Graph {
    es_graph(
        "Storage",
        data_source,
        YAxes::new(YAxis::new(MEGA_BYTES), YAxis::new(MEGA_BYTES)),
        "previous",
        &[
            Series::new("Free storage", "min(\"free_storage_space_minimum\")", GREEN),
            Series::new("Used space", "max(\"cluster_used_space_maximum\")", ORANGE).right_axis(),
        ],
    )
}

pub fn requests_graph(data_source: &str) -> Graph {
    es_graph(
        "Requests",
        data_source,
        single_y_axis(SHORT_FORMAT),
        "0",
        &[
            Series::new("2xx", "max(\"2xx_sum\")", GREEN),
            Series::new("3xx", "max(\"3xx_sum\")", YELLOW),
            Series::new("4xx", "max(\"4xx_sum\")", ORANGE),
            Series::new("5xx", "max(\"5xx_sum\")", ORANGE),
        ],
    )
}

pub fn elasticsearch_dashboard(request: &DashboardRequest) -> Result<Dashboard> {
    let influxdb = request.influxdb("elasticsearch")?;

    let rows = vec![
        Row::new(vec![
            cpu_graph(influxdb).into(),
            jvm_memory_pressure_graph(influxdb).into(),
        ])
        .editable(EDITABLE),
        Row::new(vec![documents_graph(influxdb).into()]).editable(EDITABLE),
        Row::new(vec![storage_graph(influxdb).into()]).editable(EDITABLE),
        Row::new(vec![requests_graph(influxdb).into()]).editable(EDITABLE),
    ];

    Ok(Dashboard::new("Elasticsearch".to_string())
        .editable(EDITABLE)
        .annotations(release_annotations(influxdb))
        .templating(Templating::new(vec![
            elasticsearch_template(influxdb),
            release_template(influxdb),
        ]))
        .tags(["elasticsearch".to_string(), request.environment.clone()])
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
        .rows(rows)
        .auto_panel_ids())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::tests::request;
    use crate::domain::panel::Panel;

    #[test]
    fn test_template() {
        let template = elasticsearch_template("influxdb");

        assert_eq!(template.name, "elasticsearch");
        assert_eq!(template.query, "SHOW TAG VALUES WITH KEY = \"domain_name\" WHERE $timeFilter");
        assert_eq!(template.sort, 5);
        assert!(!template.multi);
        assert!(!template.include_all);
    }

    #[test]
    fn test_cpu_query_filters_on_domain_variable() {
        let json = serde_json::to_value(cpu_graph("influxdb")).unwrap();

        assert_eq!(
            json["targets"][0]["query"],
            "SELECT max(\"cpu_utilization_maximum\") FROM \"autogen\".\"cloudwatch_aws_es\" WHERE (\"domain_name\" =~ /^$elasticsearch$/) AND $timeFilter GROUP BY time(1m) fill(previous)"
        );
        assert_eq!(json["targets"][0]["refId"], "A");
    }

    #[test]
    fn test_requests_fill_with_zero() {
        let graph = requests_graph("influxdb");
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(graph.base.targets.len(), 4);
        assert!(json["targets"][3]["query"].as_str().unwrap().ends_with("fill(0)"));
        assert!(graph.bars);
        assert!(!graph.lines);
    }

    #[test]
    fn test_storage_graph_axes() {
        let graph = storage_graph("influxdb");

        assert_eq!(graph.yaxes.left.format, "mbytes");
        assert_eq!(graph.series_overrides[1].alias, "Used space");
        assert_eq!(graph.series_overrides[1].yaxis, Some(2));
        assert_eq!(graph.series_overrides[0].lines, Some(true));
    }

    #[test]
    fn test_dashboard() {
        let dashboard = elasticsearch_dashboard(&request("search")).unwrap();

        assert_eq!(dashboard.title, "Elasticsearch");
        assert_eq!(dashboard.tags, vec!["elasticsearch", "alpha"]);
        let names: Vec<_> = dashboard.templating.list.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["elasticsearch", "release"]);
        assert_eq!(dashboard.annotations.list.len(), 3);

        let layout: Vec<Vec<&str>> = dashboard
            .rows
            .iter()
            .map(|row| row.panels.iter().map(Panel::title).collect())
            .collect();
        assert_eq!(
            layout,
            vec![
                vec!["CPU utilization", "JVM memory pressure"],
                vec!["Documents"],
                vec!["Storage"],
                vec!["Requests"],
            ]
        );
    }

    #[test]
    fn test_dashboard_requires_influxdb() {
        let mut request = request("search");
        request.influxdb_data_source = None;

        assert!(elasticsearch_dashboard(&request).is_err());
    }
}
