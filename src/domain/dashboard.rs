// Dashboard domain model
use super::panel::Panel;
use super::templating::{Annotations, Templating};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;

const SCHEMA_VERSION: u32 = 12;
const DEFAULT_ROW_HEIGHT: &str = "250px";
const DEFAULT_ROW_TITLE: &str = "New row";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLink {
    pub target_blank: bool,
    pub title: String,
    pub url: String,
}

/// A horizontal band of panels in a row-based dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub title: Option<String>,
    pub collapse: bool,
    pub editable: bool,
    pub repeat: Option<String>,
    pub height: String,
    pub panels: Vec<Panel>,
}

impl Row {
    pub fn new(panels: Vec<Panel>) -> Self {
        Self {
            title: None,
            collapse: false,
            editable: true,
            repeat: None,
            height: DEFAULT_ROW_HEIGHT.to_string(),
            panels,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn repeat(mut self, variable: &str) -> Self {
        self.repeat = Some(variable.to_string());
        self
    }

    /// Title as rendered, falling back to Grafana's placeholder
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_ROW_TITLE)
    }

    pub fn shows_title(&self) -> bool {
        self.title.is_some()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Row", 7)?;
        state.serialize_field("collapse", &self.collapse)?;
        state.serialize_field("editable", &self.editable)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("panels", &self.panels)?;
        state.serialize_field("showTitle", &self.shows_title())?;
        state.serialize_field("title", self.display_title())?;
        state.serialize_field("repeat", &self.repeat)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub title: String,
    pub tags: Vec<String>,
    pub timezone: String,
    pub editable: bool,
    pub shared_crosshair: bool,
    pub refresh: String,
    pub links: Vec<DashboardLink>,
    pub annotations: Annotations,
    pub templating: Templating,
    pub rows: Vec<Row>,
    pub panels: Vec<Panel>,
}

impl Dashboard {
    pub fn new(title: String) -> Self {
        Self {
            title,
            tags: Vec::new(),
            timezone: "utc".to_string(),
            editable: true,
            shared_crosshair: false,
            refresh: "10s".to_string(),
            links: Vec::new(),
            annotations: Annotations::default(),
            templating: Templating::default(),
            rows: Vec::new(),
            panels: Vec::new(),
        }
    }

    pub fn tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn shared_crosshair(mut self, shared: bool) -> Self {
        self.shared_crosshair = shared;
        self
    }

    pub fn refresh(mut self, refresh: &str) -> Self {
        self.refresh = refresh.to_string();
        self
    }

    pub fn links(mut self, links: Vec<DashboardLink>) -> Self {
        self.links = links;
        self
    }

    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn templating(mut self, templating: Templating) -> Self {
        self.templating = templating;
        self
    }

    pub fn rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn panels(mut self, panels: Vec<Panel>) -> Self {
        self.panels = panels;
        self
    }

    /// Number every panel 1, 2, 3, ... leaving existing ids untouched and never reusing them.
    pub fn auto_panel_ids(mut self) -> Self {
        let used: HashSet<u32> = self.id_slots().filter_map(|slot| *slot).collect();
        let mut candidates = (1..).filter(|id| !used.contains(id));

        for slot in self.id_slots() {
            if slot.is_none() {
                *slot = candidates.next();
            }
        }
        self
    }

    fn id_slots(&mut self) -> impl Iterator<Item = &mut Option<u32>> {
        let row_slots = self
            .rows
            .iter_mut()
            .flat_map(|row| row.panels.iter_mut())
            .flat_map(Panel::id_slots);
        let free_slots = self.panels.iter_mut().flat_map(Panel::id_slots);
        row_slots.chain(free_slots)
    }
}

impl Serialize for Dashboard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Dashboard", 18)?;
        state.serialize_field("__inputs", &json!([]))?;
        state.serialize_field("annotations", &self.annotations)?;
        state.serialize_field("editable", &self.editable)?;
        state.serialize_field("gnetId", &serde_json::Value::Null)?;
        state.serialize_field("graphTooltip", &u8::from(self.shared_crosshair))?;
        state.serialize_field("hideControls", &false)?;
        state.serialize_field("id", &serde_json::Value::Null)?;
        state.serialize_field("links", &self.links)?;
        state.serialize_field("panels", &self.panels)?;
        state.serialize_field("refresh", &self.refresh)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("schemaVersion", &SCHEMA_VERSION)?;
        state.serialize_field("sharedCrosshair", &self.shared_crosshair)?;
        state.serialize_field("style", "dark")?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("templating", &self.templating)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("time", &json!({ "from": "now-1h", "to": "now" }))?;
        state.serialize_field(
            "timepicker",
            &json!({
                "refresh_intervals": [
                    "5s", "10s", "30s", "1m", "5m", "15m", "30m", "1h", "2h", "1d",
                ],
                "time_options": ["5m", "15m", "1h", "6h", "12h", "24h", "2d", "7d", "30d"],
            }),
        )?;
        state.serialize_field("timezone", &self.timezone)?;
        state.serialize_field("version", &0)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::panel::{Graph, PanelOptions, RowPanel, Text};

    fn graph(title: &str) -> Panel {
        Graph::new(title, "cloudwatch").into()
    }

    fn with_id(panel: Panel, id: u32) -> Panel {
        let mut panel = panel;
        panel.set_id(id);
        panel
    }

    #[test]
    fn test_untitled_row_uses_placeholder() {
        let json = serde_json::to_value(Row::new(vec![])).unwrap();

        assert_eq!(json["title"], "New row");
        assert_eq!(json["showTitle"], false);
        assert_eq!(json["height"], "250px");
    }

    #[test]
    fn test_titled_row_shows_title() {
        let json = serde_json::to_value(Row::new(vec![]).title("Queues")).unwrap();

        assert_eq!(json["showTitle"], true);
        assert_eq!(json["title"], "Queues");
    }

    #[test]
    fn test_auto_panel_ids_numbers_in_row_order() {
        let dashboard = Dashboard::new("d".into())
            .rows(vec![
                Row::new(vec![graph("a"), graph("b")]),
                Row::new(vec![graph("c")]),
            ])
            .auto_panel_ids();

        let ids: Vec<_> = dashboard
            .rows
            .iter()
            .flat_map(|row| row.panels.iter().map(Panel::id))
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_auto_panel_ids_keeps_and_skips_existing_ids() {
        let dashboard = Dashboard::new("d".into())
            .rows(vec![Row::new(vec![graph("a"), with_id(graph("b"), 1), graph("c")])])
            .auto_panel_ids();

        let ids: Vec<_> = dashboard.rows[0].panels.iter().map(Panel::id).collect();
        assert_eq!(ids, vec![Some(2), Some(1), Some(3)]);
    }

    #[test]
    fn test_auto_panel_ids_covers_free_panels() {
        let dashboard = Dashboard::new("d".into())
            .panels(vec![
                RowPanel::new("Summary").into(),
                Text::new("Help", "text".into(), "markdown").transparent(true).into(),
            ])
            .auto_panel_ids();

        let ids: Vec<_> = dashboard.panels.iter().map(Panel::id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_dashboard_fixed_fields() {
        let dashboard = Dashboard::new("RDS: db".into()).shared_crosshair(true);
        let json = serde_json::to_value(dashboard).unwrap();

        assert_eq!(json["title"], "RDS: db");
        assert_eq!(json["schemaVersion"], 12);
        assert_eq!(json["style"], "dark");
        assert_eq!(json["graphTooltip"], 1);
        assert_eq!(json["time"]["from"], "now-1h");
        assert_eq!(json["templating"]["list"], json!([]));
    }
}
