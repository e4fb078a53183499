// Release annotations and the release filter variable
use crate::domain::style::{GREEN, ORANGE, RED};
use crate::domain::templating::{Annotation, Annotations, Template, Templating};

const DEPLOYMENT_MEASUREMENT: &str = "deployment_status";

fn deployment_query(result: u8) -> String {
    format!(
        "SELECT \"release\" FROM \"{DEPLOYMENT_MEASUREMENT}\" WHERE (\"operation\"='deploy') AND (\"result\"='{result}') AND (\"release\" =~ /^$release/) AND $timeFilter"
    )
}

fn deployment_annotation(
    data_source: &str,
    name: &str,
    color: &str,
    result: u8,
    enable: bool,
) -> Annotation {
    Annotation {
        data_source: data_source.to_string(),
        enable,
        hide: false,
        icon_color: color.to_string(),
        limit: 100,
        name: name.to_string(),
        query: deployment_query(result),
        show_in: 0,
        tags: Vec::new(),
        kind: "tags".to_string(),
    }
}

/// Deployment markers: successful releases on by default, failed and aborted ones opt-in
pub fn release_annotations(data_source: &str) -> Annotations {
    Annotations::new(vec![
        deployment_annotation(
            data_source,
            "Show Deployments in Graphs (green dashed line)",
            GREEN,
            0,
            true,
        ),
        deployment_annotation(
            data_source,
            "Show Failed Deployments in Graphs (red dashed line)",
            RED,
            2,
            false,
        ),
        deployment_annotation(
            data_source,
            "Show Aborted Deployments in Graphs (orange dashed line)",
            ORANGE,
            1,
            false,
        ),
    ])
}

pub fn release_template(data_source: &str) -> Template {
    Template::new(
        "release",
        &format!("SELECT \"release\" FROM \"{DEPLOYMENT_MEASUREMENT}\" WHERE $timeFilter"),
        data_source,
    )
    .label("Filter by Branch/Release")
    .hide(2)
    .include_all(true)
    .multi(true)
    .refresh(2)
    .sort(1)
}

pub fn release_templating(data_source: Option<&str>) -> Templating {
    match data_source {
        Some(data_source) => Templating::new(vec![release_template(data_source)]),
        None => Templating::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_annotations() {
        let annotations = release_annotations("influxdb");

        assert_eq!(annotations.list.len(), 3);
        assert!(annotations.list[0].enable);
        assert!(!annotations.list[1].enable);
        assert!(!annotations.list[2].enable);
        assert_eq!(annotations.list[0].icon_color, GREEN);
        assert_eq!(annotations.list[1].icon_color, RED);
        assert_eq!(annotations.list[2].icon_color, ORANGE);
        assert!(annotations.list[1].query.contains("(\"result\"='2')"));
        assert!(annotations.list.iter().all(|a| a.limit == 100 && !a.hide));
        assert!(annotations.list.iter().all(|a| a.data_source == "influxdb"));
    }

    #[test]
    fn test_release_template() {
        let template = release_template("influxdb");

        assert_eq!(template.name, "release");
        assert_eq!(template.label, "Filter by Branch/Release");
        assert_eq!(
            template.query,
            "SELECT \"release\" FROM \"deployment_status\" WHERE $timeFilter"
        );
        assert_eq!(template.hide, 2);
        assert_eq!(template.refresh, 2);
        assert_eq!(template.sort, 1);
        assert!(template.include_all);
        assert!(template.multi);
    }

    #[test]
    fn test_release_templating_without_data_source_is_empty() {
        assert!(release_templating(None).list.is_empty());
        assert_eq!(release_templating(Some("influxdb")).list.len(), 1);
    }
}
