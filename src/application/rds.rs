// RDS graphs over the CloudWatch metrics mirrored into InfluxDB
// https://docs.aws.amazon.com/AmazonRDS/latest/UserGuide/MonitoringOverview.html
use crate::application::commons::{
    documentation_link, influx_vars, min_mean_max_overrides, ALERT_REF_ID, EDITABLE, RAW_QUERY,
    SHARED_CROSSHAIR, TIMEZONE, TRANSPARENT,
};
use crate::application::dispatcher::DashboardRequest;
use crate::application::release::{release_annotations, release_templating};
use crate::domain::alert::{Alert, AlertCondition, Evaluator, Notifications, TimeRange};
use crate::domain::dashboard::{Dashboard, Row};
use crate::domain::panel::{single_y_axis, Graph, PanelOptions};
use crate::domain::style::PERCENT_FORMAT;
use crate::domain::target::InfluxDbTarget;
use crate::error::Result;
use crate::infrastructure::config::prepare_query;
use std::fmt;

const RDS_MEASUREMENT: &str = "cloudwatch_aws_rds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdsEngine {
    Mysql,
    Postgres,
}

impl RdsEngine {
    pub fn as_str(self) -> &'static str {
        match self {
            RdsEngine::Mysql => "mysql",
            RdsEngine::Postgres => "postgres",
        }
    }
}

impl fmt::Display for RdsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn rds_query(selector: &str, name: &str) -> String {
    let template = format!(
        "SELECT {selector} FROM \"${{retention_policy}}\".\"${{measurement}}\" WHERE (\"db_instance_identifier\" ='${{name}}') AND $timeFilter GROUP BY time(1m) fill(previous)"
    );
    prepare_query(&template, &influx_vars(RDS_MEASUREMENT, name))
}

pub fn cpu_graph(name: &str, data_source: &str, notifications: Option<&Notifications>) -> Graph {
    let (min_alias, mean_alias, max_alias) = ("min", "mean", "max");

    let targets = vec![
        InfluxDbTarget::new(rds_query("max(\"cpu_utilization_maximum\")", name), RAW_QUERY)
            .alias(max_alias)
            .ref_id(ALERT_REF_ID),
        InfluxDbTarget::new(rds_query("mean(\"cpu_utilization_average\")", name), RAW_QUERY)
            .alias(mean_alias),
        InfluxDbTarget::new(rds_query("min(\"cpu_utilization_minimum\")", name), RAW_QUERY)
            .alias(min_alias),
    ];

    let alert = notifications.map(|notifications| {
        Alert::new(
            format!("{name} CPU utilization Errors"),
            format!("{name} is having CPU utilization errors"),
            notifications,
        )
        .no_data_state("keep_state")
        .condition(AlertCondition::new(
            ALERT_REF_ID,
            TimeRange::last("5m"),
            Evaluator::GreaterThan(80.0),
        ))
        .grace_period("1m")
    });

    Graph::new("CPU utilization", data_source)
        .targets(targets)
        .y_axes(single_y_axis(PERCENT_FORMAT))
        .series_overrides(min_mean_max_overrides(min_alias, mean_alias, max_alias))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .bars(false)
        .lines(true)
        .alert(alert)
        .auto_ref_ids()
}

pub fn burst_balance_graph(
    name: &str,
    data_source: &str,
    notifications: Option<&Notifications>,
) -> Graph {
    let targets = vec![
        InfluxDbTarget::new(rds_query("min(\"burst_balance_minimum\")", name), RAW_QUERY)
            .ref_id(ALERT_REF_ID),
    ];

    let alert = notifications.map(|notifications| {
        Alert::new(
            format!("{name} Burst Balance Errors"),
            format!("{name} is having Burst Balance errors"),
            notifications,
        )
        .no_data_state("keep_state")
        .condition(AlertCondition::new(
            ALERT_REF_ID,
            TimeRange::last("5m"),
            Evaluator::LowerThan(40.0),
        ))
        .grace_period("1m")
    });

    Graph::new("Burst Balance", data_source)
        .targets(targets)
        .y_axes(single_y_axis(PERCENT_FORMAT))
        .transparent(TRANSPARENT)
        .editable(EDITABLE)
        .bars(false)
        .lines(true)
        .alert(alert)
        .auto_ref_ids()
}

pub fn rds_dashboard(request: &DashboardRequest, engine: RdsEngine) -> Result<Dashboard> {
    let name = request.name.as_str();
    let influxdb = request.influxdb("rds")?;
    let notifications = request.notifications();

    Ok(Dashboard::new(format!("RDS: {name}"))
        .editable(EDITABLE)
        .annotations(release_annotations(influxdb))
        .templating(release_templating(Some(influxdb)))
        .tags([
            request.environment.clone(),
            engine.to_string(),
            "rds".to_string(),
            "database".to_string(),
        ])
        .timezone(TIMEZONE)
        .shared_crosshair(SHARED_CROSSHAIR)
        .rows(vec![Row::new(vec![
            cpu_graph(name, influxdb, notifications).into(),
            burst_balance_graph(name, influxdb, notifications).into(),
        ])])
        .links(vec![documentation_link(
            "https://docs.aws.amazon.com/AmazonRDS/latest/UserGuide/MonitoringOverview.html",
        )])
        .auto_panel_ids())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::tests::request;
    use crate::domain::target::Target;
    use std::collections::HashSet;

    fn queries(graph: &Graph) -> Vec<String> {
        graph
            .base
            .targets
            .iter()
            .map(|target| match target {
                Target::InfluxDb(target) => target.query.clone(),
                other => panic!("unexpected target {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_cpu_graph_queries() {
        let graph = cpu_graph("db-1", "influxdb", None);

        assert_eq!(
            queries(&graph)[0],
            "SELECT max(\"cpu_utilization_maximum\") FROM \"autogen\".\"cloudwatch_aws_rds\" WHERE (\"db_instance_identifier\" ='db-1') AND $timeFilter GROUP BY time(1m) fill(previous)"
        );
        let ids: Vec<_> = graph.base.targets.iter().map(|t| t.ref_id().unwrap()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(graph.yaxes.left.format, "percent");
        assert!(graph.alert.is_none());
    }

    #[test]
    fn test_name_with_placeholder_is_kept_verbatim() {
        let queries: HashSet<String> = (0..50)
            .map(|_| queries(&cpu_graph("${measurement}", "influxdb", None))[0].clone())
            .collect();

        assert_eq!(queries.len(), 1);
        let query = queries.into_iter().next().unwrap();
        assert!(query.contains("FROM \"autogen\".\"cloudwatch_aws_rds\""));
        assert!(query.contains("(\"db_instance_identifier\" ='${measurement}')"));
    }

    #[test]
    fn test_cpu_graph_alert() {
        let notifications = Notifications::new(["lorem"]).unwrap();
        let alert = cpu_graph("db-1", "influxdb", Some(&notifications)).alert.unwrap();

        assert_eq!(alert.no_data_state, "keep_state");
        assert_eq!(alert.conditions[0].evaluator, Evaluator::GreaterThan(80.0));
        assert_eq!(alert.grace_period, "1m");
    }

    #[test]
    fn test_burst_balance_graph_alert() {
        let notifications = Notifications::new(["lorem"]).unwrap();
        let graph = burst_balance_graph("db-1", "influxdb", Some(&notifications));

        assert!(queries(&graph)[0].starts_with("SELECT min(\"burst_balance_minimum\")"));
        let alert = graph.alert.unwrap();
        assert_eq!(alert.no_data_state, "keep_state");
        assert_eq!(alert.conditions[0].evaluator, Evaluator::LowerThan(40.0));
    }

    #[test]
    fn test_rds_dashboard() {
        let dashboard = rds_dashboard(&request("db-1"), RdsEngine::Mysql).unwrap();

        assert_eq!(dashboard.title, "RDS: db-1");
        assert_eq!(dashboard.tags, vec!["alpha", "mysql", "rds", "database"]);
        assert_eq!(dashboard.rows.len(), 1);
        assert_eq!(dashboard.rows[0].panels.len(), 2);
        assert_eq!(dashboard.links.len(), 1);
        assert_eq!(dashboard.annotations.list.len(), 3);
        assert_eq!(dashboard.templating.list[0].name, "release");
    }
}
