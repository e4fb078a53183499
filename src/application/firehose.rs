// Firehose delivery stream graphs, one row per stream
use crate::application::commons::{
    influx_vars, EDITABLE, RAW_QUERY, SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT,
};
use crate::application::dispatcher::DashboardRequest;
use crate::domain::dashboard::{Dashboard, Row};
use crate::domain::panel::{single_y_axis, Graph, PanelOptions, SeriesOverride};
use crate::domain::style::{GREEN, ORANGE, SHORT_FORMAT, YELLOW};
use crate::domain::target::InfluxDbTarget;
use crate::domain::templating::{Template, Templating};
use crate::error::Result;
use crate::infrastructure::config::prepare_query;

const FIREHOSE_MEASUREMENT: &str = "cloudwatch_aws_firehose";
const STREAM_VARIABLE: &str = "firehose";

const INCOMING_RECORDS_ALIAS: &str = "Incoming records";
const DELIVERY_SUCCESS_ALIAS: &str = "Delivery to S3 Success";
const DELIVERY_RECORDS_ALIAS: &str = "Delivery to S3";

pub fn firehose_template(data_source: &str) -> Template {
    Template::new(
        STREAM_VARIABLE,
        "SHOW TAG VALUES WITH KEY = \"delivery_stream_name\" WHERE $timeFilter",
        data_source,
    )
    .label("Firehose")
    .refresh(2)
    .sort(5)
    .multi(true)
    .include_all(true)
}

fn firehose_query(field: &str) -> String {
    let template = format!(
        "SELECT sum(\"{field}\") FROM \"${{retention_policy}}\".\"${{measurement}}\" WHERE (\"delivery_stream_name\" =~ /^${{name}}$/) AND $timeFilter GROUP BY time(5m), \"delivery_stream_name\" fill(0)"
    );
    prepare_query(&template, &influx_vars(FIREHOSE_MEASUREMENT, &format!("${STREAM_VARIABLE}")))
}

pub fn firehose_graph(data_source: &str) -> Graph {
    let targets = vec![
        InfluxDbTarget::new(firehose_query("incoming_records_sum"), RAW_QUERY)
            .alias(INCOMING_RECORDS_ALIAS),
        InfluxDbTarget::new(firehose_query("delivery_to_s3._success_sum"), RAW_QUERY)
            .alias(DELIVERY_SUCCESS_ALIAS),
        InfluxDbTarget::new(firehose_query("delivery_to_s3._records_sum"), RAW_QUERY)
            .alias(DELIVERY_RECORDS_ALIAS),
    ];

    let series_overrides = vec![
        SeriesOverride::new(INCOMING_RECORDS_ALIAS).color(ORANGE),
        SeriesOverride::new(DELIVERY_SUCCESS_ALIAS).color(GREEN).zindex(1),
        SeriesOverride::new(DELIVERY_RECORDS_ALIAS).color(YELLOW),
    ];

    Graph::new(&format!("Firehose: ${STREAM_VARIABLE}"), data_source)
        .targets(targets)
        .y_axes(single_y_axis(SHORT_FORMAT))
        .series_overrides(series_overrides)
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .bars(true)
        .lines(false)
        .auto_ref_ids()
}

pub fn firehose_dashboard(request: &DashboardRequest) -> Result<Dashboard> {
    let influxdb = request.influxdb("firehose")?;

    Ok(Dashboard::new("Firehose".to_string())
        .editable(EDITABLE)
        .templating(Templating::new(vec![firehose_template(influxdb)]))
        .tags(["firehose".to_string(), request.environment.clone()])
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
        .rows(vec![Row::new(vec![firehose_graph(influxdb).into()])
            .repeat(STREAM_VARIABLE)
            .title(&format!("${STREAM_VARIABLE}"))
            .editable(EDITABLE)])
        .auto_panel_ids())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::tests::request;

    #[test]
    fn test_template_allows_every_stream() {
        let template = firehose_template("influxdb");

        assert_eq!(template.name, "firehose");
        assert_eq!(template.label, "Firehose");
        assert!(template.multi);
        assert!(template.include_all);
        assert_eq!(template.sort, 5);
    }

    #[test]
    fn test_graph_queries() {
        let graph = firehose_graph("influxdb");
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(graph.base.title, "Firehose: $firehose");
        assert_eq!(
            json["targets"][0]["query"],
            "SELECT sum(\"incoming_records_sum\") FROM \"autogen\".\"cloudwatch_aws_firehose\" WHERE (\"delivery_stream_name\" =~ /^$firehose$/) AND $timeFilter GROUP BY time(5m), \"delivery_stream_name\" fill(0)"
        );
        assert_eq!(json["targets"][2]["alias"], "Delivery to S3");
        assert_eq!(json["targets"][2]["refId"], "C");
        assert_eq!(graph.series_overrides[1].zindex, Some(1));
        assert!(graph.bars);
    }

    #[test]
    fn test_dashboard_repeats_row_per_stream() {
        let dashboard = firehose_dashboard(&request("delivery")).unwrap();

        assert_eq!(dashboard.title, "Firehose");
        assert_eq!(dashboard.tags, vec!["firehose", "alpha"]);
        assert_eq!(dashboard.rows.len(), 1);
        assert_eq!(dashboard.rows[0].repeat.as_deref(), Some("firehose"));
        assert_eq!(dashboard.rows[0].display_title(), "$firehose");
        assert_eq!(dashboard.templating.list.len(), 1);
        assert!(dashboard.annotations.list.is_empty());
    }
}
