// Panel kinds placed inside rows or directly on a dashboard
use super::alert::Alert;
use super::style::SHORT_FORMAT;
use super::target::{auto_ref_ids, Target};
use serde::ser::Serializer;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridPos {
    pub h: u32,
    pub w: u32,
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub fn new(h: u32, w: u32, x: u32, y: u32) -> Self {
        Self { h, w, x, y }
    }
}

/// Fields every panel kind carries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelBase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub title: String,
    #[serde(rename = "datasource", skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    pub targets: Vec<Target>,
    pub transparent: bool,
    pub editable: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_pos: Option<GridPos>,
}

impl PanelBase {
    fn new(title: &str, data_source: Option<&str>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            data_source: data_source.map(str::to_string),
            targets: Vec::new(),
            transparent: false,
            editable: true,
            description: String::new(),
            grid_pos: None,
        }
    }
}

/// Builder methods shared by every panel kind
pub trait PanelOptions: Sized {
    fn base_mut(&mut self) -> &mut PanelBase;

    fn targets<T: Into<Target>>(mut self, targets: Vec<T>) -> Self {
        self.base_mut().targets = targets.into_iter().map(Into::into).collect();
        self
    }

    fn transparent(mut self, transparent: bool) -> Self {
        self.base_mut().transparent = transparent;
        self
    }

    fn editable(mut self, editable: bool) -> Self {
        self.base_mut().editable = editable;
        self
    }

    fn grid_pos(mut self, grid_pos: GridPos) -> Self {
        self.base_mut().grid_pos = Some(grid_pos);
        self
    }
}

macro_rules! panel_options {
    ($($panel:ty),*) => {
        $(impl PanelOptions for $panel {
            fn base_mut(&mut self) -> &mut PanelBase {
                &mut self.base
            }
        })*
    };
}

panel_options!(Graph, Stat, Logs, TimeSeries, Text, RowPanel);

/// Per-series drawing overrides; only the fields that are set get emitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOverride {
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bars: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_below_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zindex: Option<i32>,
}

impl SeriesOverride {
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            ..Default::default()
        }
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn lines(mut self, lines: bool) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn bars(mut self, bars: bool) -> Self {
        self.bars = Some(bars);
        self
    }

    pub fn points(mut self, points: bool) -> Self {
        self.points = Some(points);
        self
    }

    pub fn fill(mut self, fill: u32) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn fill_below_to(mut self, alias: &str) -> Self {
        self.fill_below_to = Some(alias.to_string());
        self
    }

    pub fn yaxis(mut self, yaxis: u32) -> Self {
        self.yaxis = Some(yaxis);
        self
    }

    pub fn zindex(mut self, zindex: i32) -> Self {
        self.zindex = Some(zindex);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxis {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    pub label: Option<String>,
    pub log_base: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub show: bool,
}

impl Default for YAxis {
    fn default() -> Self {
        Self {
            format: SHORT_FORMAT.to_string(),
            decimals: None,
            label: None,
            log_base: 1,
            min: None,
            max: None,
            show: true,
        }
    }
}

impl YAxis {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            ..Default::default()
        }
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

/// Left and right axis of a graph, serialized as a two-element list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YAxes {
    pub left: YAxis,
    pub right: YAxis,
}

impl YAxes {
    pub fn new(left: YAxis, right: YAxis) -> Self {
        Self { left, right }
    }
}

impl Serialize for YAxes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [&self.left, &self.right].serialize(serializer)
    }
}

pub fn single_y_axis(format: &str) -> YAxes {
    YAxes::new(YAxis::new(format), YAxis::default())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[serde(flatten)]
    pub base: PanelBase,
    #[serde(rename = "type")]
    kind: &'static str,
    pub bars: bool,
    pub lines: bool,
    pub points: bool,
    pub fill: u32,
    pub line_width: u32,
    pub pointradius: u32,
    pub null_point_mode: &'static str,
    pub stack: bool,
    pub percentage: bool,
    pub stepped_line: bool,
    pub series_overrides: Vec<SeriesOverride>,
    pub yaxes: YAxes,
    pub xaxis: serde_json::Value,
    pub legend: serde_json::Value,
    pub tooltip: serde_json::Value,
    pub thresholds: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(rename = "options", serialize_with = "alert_threshold_options")]
    pub alert_threshold: bool,
}

fn alert_threshold_options<S: Serializer>(show: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    json!({ "alertThreshold": show }).serialize(serializer)
}

impl Graph {
    pub fn new(title: &str, data_source: &str) -> Self {
        Self {
            base: PanelBase::new(title, Some(data_source)),
            kind: "graph",
            bars: false,
            lines: true,
            points: false,
            fill: 1,
            line_width: 2,
            pointradius: 5,
            null_point_mode: "connected",
            stack: false,
            percentage: false,
            stepped_line: false,
            series_overrides: Vec::new(),
            yaxes: YAxes::default(),
            xaxis: json!({ "mode": "time", "show": true, "values": [] }),
            legend: json!({ "show": true, "values": false, "alignAsTable": false }),
            tooltip: json!({ "shared": true, "sort": 0, "value_type": "individual" }),
            thresholds: Vec::new(),
            alert: None,
            alert_threshold: true,
        }
    }

    pub fn series_overrides(mut self, overrides: Vec<SeriesOverride>) -> Self {
        self.series_overrides = overrides;
        self
    }

    pub fn y_axes(mut self, yaxes: YAxes) -> Self {
        self.yaxes = yaxes;
        self
    }

    pub fn bars(mut self, bars: bool) -> Self {
        self.bars = bars;
        self
    }

    pub fn lines(mut self, lines: bool) -> Self {
        self.lines = lines;
        self
    }

    pub fn alert(mut self, alert: Option<Alert>) -> Self {
        self.alert = alert;
        self
    }

    /// Whether alert thresholds are drawn on the graph
    pub fn alert_threshold(mut self, show: bool) -> Self {
        self.alert_threshold = show;
        self
    }

    pub fn auto_ref_ids(mut self) -> Self {
        auto_ref_ids(&mut self.base.targets);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdStep {
    pub color: String,
    pub value: Option<f64>,
}

impl ThresholdStep {
    pub fn base(color: &str) -> Self {
        Self {
            color: color.to_string(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatOptions {
    pub reduce_calc: String,
    pub color_mode: String,
    pub graph_mode: String,
    pub alignment: String,
    pub justify_mode: &'static str,
    pub orientation: &'static str,
    pub text_mode: &'static str,
}

impl Serialize for StatOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        json!({
            "reduceOptions": {
                "calcs": [self.reduce_calc],
                "fields": "",
                "values": false,
            },
            "colorMode": self.color_mode,
            "graphMode": self.graph_mode,
            "justifyMode": self.justify_mode,
            "orientation": self.orientation,
            "textMode": self.text_mode,
            "alignment": self.alignment,
        })
        .serialize(serializer)
    }
}

/// Single value panel; `format` and `thresholds` become its `fieldConfig`
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub base: PanelBase,
    pub format: String,
    pub thresholds: Vec<ThresholdStep>,
    pub options: StatOptions,
}

impl Stat {
    pub fn new(title: &str, data_source: &str) -> Self {
        Self {
            base: PanelBase::new(title, Some(data_source)),
            format: "none".to_string(),
            thresholds: Vec::new(),
            options: StatOptions {
                reduce_calc: "mean".to_string(),
                color_mode: "value".to_string(),
                graph_mode: "area".to_string(),
                alignment: "auto".to_string(),
                justify_mode: "auto",
                orientation: "auto",
                text_mode: "auto",
            },
        }
    }

    pub fn thresholds(mut self, thresholds: Vec<ThresholdStep>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn color_mode(mut self, mode: &str) -> Self {
        self.options.color_mode = mode.to_string();
        self
    }

    pub fn alignment(mut self, alignment: &str) -> Self {
        self.options.alignment = alignment.to_string();
        self
    }

    pub fn reduce_calc(mut self, calc: &str) -> Self {
        self.options.reduce_calc = calc.to_string();
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldConfigPanel<'a, O: Serialize> {
    #[serde(flatten)]
    base: &'a PanelBase,
    #[serde(rename = "type")]
    kind: &'static str,
    field_config: serde_json::Value,
    options: O,
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FieldConfigPanel {
            base: &self.base,
            kind: "stat",
            field_config: json!({
                "defaults": {
                    "unit": self.format,
                    "mappings": [],
                    "thresholds": { "mode": "absolute", "steps": self.thresholds },
                },
                "overrides": [],
            }),
            options: &self.options,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsOptions {
    pub show_labels: bool,
    pub show_common_labels: bool,
    pub show_time: bool,
    pub wrap_log_message: bool,
    pub prettify_log_message: bool,
    pub enable_log_details: bool,
    pub dedup_strategy: String,
    pub sort_order: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Logs {
    #[serde(flatten)]
    pub base: PanelBase,
    #[serde(rename = "type")]
    kind: &'static str,
    pub options: LogsOptions,
}

impl Logs {
    pub fn new(title: &str, data_source: &str) -> Self {
        Self {
            base: PanelBase::new(title, Some(data_source)),
            kind: "logs",
            options: LogsOptions {
                show_labels: false,
                show_common_labels: false,
                show_time: false,
                wrap_log_message: false,
                prettify_log_message: false,
                enable_log_details: true,
                dedup_strategy: "none".to_string(),
                sort_order: "Descending",
            },
        }
    }

    pub fn wrap_log_messages(mut self, wrap: bool) -> Self {
        self.options.wrap_log_message = wrap;
        self
    }

    pub fn prettify_log_message(mut self, prettify: bool) -> Self {
        self.options.prettify_log_message = prettify;
        self
    }

    pub fn enable_log_details(mut self, enable: bool) -> Self {
        self.options.enable_log_details = enable;
        self
    }

    pub fn dedup_strategy(mut self, strategy: &str) -> Self {
        self.options.dedup_strategy = strategy.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub base: PanelBase,
    pub axis_placement: String,
    pub tooltip_mode: String,
}

impl TimeSeries {
    pub fn new(title: &str, data_source: &str) -> Self {
        Self {
            base: PanelBase::new(title, Some(data_source)),
            axis_placement: "auto".to_string(),
            tooltip_mode: "single".to_string(),
        }
    }

    pub fn axis_placement(mut self, placement: &str) -> Self {
        self.axis_placement = placement.to_string();
        self
    }

    pub fn tooltip_mode(mut self, mode: &str) -> Self {
        self.tooltip_mode = mode.to_string();
        self
    }
}

impl Serialize for TimeSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FieldConfigPanel {
            base: &self.base,
            kind: "timeseries",
            field_config: json!({
                "defaults": {
                    "unit": "none",
                    "custom": {
                        "axisPlacement": self.axis_placement,
                        "drawStyle": "line",
                        "lineInterpolation": "linear",
                        "lineWidth": 1,
                        "fillOpacity": 0,
                        "showPoints": "auto",
                        "spanNulls": false,
                    },
                    "mappings": [],
                },
                "overrides": [],
            }),
            options: json!({
                "legend": { "displayMode": "list", "placement": "bottom" },
                "tooltip": { "mode": self.tooltip_mode },
            }),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOptions {
    pub content: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    #[serde(flatten)]
    pub base: PanelBase,
    #[serde(rename = "type")]
    kind: &'static str,
    pub options: TextOptions,
}

impl Text {
    pub fn new(title: &str, content: String, mode: &str) -> Self {
        Self {
            base: PanelBase::new(title, None),
            kind: "text",
            options: TextOptions {
                content,
                mode: mode.to_string(),
            },
        }
    }
}

/// Row header inside a panel-based layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowPanel {
    #[serde(flatten)]
    pub base: PanelBase,
    #[serde(rename = "type")]
    kind: &'static str,
    pub collapsed: bool,
    pub panels: Vec<Panel>,
}

impl RowPanel {
    pub fn new(title: &str) -> Self {
        Self {
            base: PanelBase::new(title, None),
            kind: "row",
            collapsed: false,
            panels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Panel {
    Graph(Graph),
    Stat(Stat),
    Logs(Logs),
    TimeSeries(TimeSeries),
    Text(Text),
    Row(RowPanel),
}

impl Panel {
    fn base_mut(&mut self) -> &mut PanelBase {
        match self {
            Panel::Graph(p) => &mut p.base,
            Panel::Stat(p) => &mut p.base,
            Panel::Logs(p) => &mut p.base,
            Panel::TimeSeries(p) => &mut p.base,
            Panel::Text(p) => &mut p.base,
            Panel::Row(p) => &mut p.base,
        }
    }

    /// Id slot of this panel followed by the slots of any panels nested in it
    pub fn id_slots(&mut self) -> Vec<&mut Option<u32>> {
        match self {
            Panel::Row(row) => {
                let mut slots = vec![&mut row.base.id];
                slots.extend(row.panels.iter_mut().flat_map(Panel::id_slots));
                slots
            }
            panel => vec![&mut panel.base_mut().id],
        }
    }
}

#[cfg(test)]
impl Panel {
    pub fn base(&self) -> &PanelBase {
        match self {
            Panel::Graph(p) => &p.base,
            Panel::Stat(p) => &p.base,
            Panel::Logs(p) => &p.base,
            Panel::TimeSeries(p) => &p.base,
            Panel::Text(p) => &p.base,
            Panel::Row(p) => &p.base,
        }
    }

    pub fn title(&self) -> &str {
        &self.base().title
    }

    pub fn id(&self) -> Option<u32> {
        self.base().id
    }

    pub fn set_id(&mut self, id: u32) {
        self.base_mut().id = Some(id);
    }

    pub fn as_graph(&self) -> Option<&Graph> {
        match self {
            Panel::Graph(graph) => Some(graph),
            _ => None,
        }
    }
}

macro_rules! into_panel {
    ($($variant:ident => $panel:ty),*) => {
        $(impl From<$panel> for Panel {
            fn from(panel: $panel) -> Self {
                Panel::$variant(panel)
            }
        })*
    };
}

into_panel!(
    Graph => Graph,
    Stat => Stat,
    Logs => Logs,
    TimeSeries => TimeSeries,
    Text => Text,
    Row => RowPanel
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::CloudwatchMetricsTarget;

    #[test]
    fn test_graph_serializes_type_and_flattened_base() {
        let graph = Graph::new("Requests", "cloudwatch")
            .targets(vec![CloudwatchMetricsTarget::new("AWS/ApiGateway", "Count", "Sum")])
            .transparent(true)
            .auto_ref_ids();
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["type"], "graph");
        assert_eq!(json["title"], "Requests");
        assert_eq!(json["datasource"], "cloudwatch");
        assert_eq!(json["transparent"], true);
        assert_eq!(json["targets"][0]["refId"], "A");
        assert!(json.get("alert").is_none());
        assert_eq!(json["thresholds"], json!([]));
    }

    #[test]
    fn test_yaxes_serialize_as_list() {
        let json = serde_json::to_value(single_y_axis("percent")).unwrap();

        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert_eq!(json[0]["format"], "percent");
        assert_eq!(json[1]["format"], "short");
        assert_eq!(json[0]["logBase"], 1);
    }

    #[test]
    fn test_series_override_emits_only_set_fields() {
        let series_override = SeriesOverride::new("Max").fill_below_to("Min").lines(false);
        let json = serde_json::to_value(series_override).unwrap();

        assert_eq!(json, json!({ "alias": "Max", "fillBelowTo": "Min", "lines": false }));
    }

    #[test]
    fn test_stat_options_reach_json() {
        let mut stat = Stat::new("Task Count", "cloudwatch")
            .color_mode("background")
            .alignment("center")
            .reduce_calc("lastNotNull")
            .thresholds(vec![ThresholdStep::base("blue")]);
        stat.format = "decmbytes".to_string();
        let json = serde_json::to_value(&stat).unwrap();

        assert_eq!(json["type"], "stat");
        assert_eq!(json["options"]["colorMode"], "background");
        assert_eq!(json["options"]["alignment"], "center");
        assert_eq!(json["options"]["reduceOptions"]["calcs"], json!(["lastNotNull"]));
        assert_eq!(json["fieldConfig"]["defaults"]["unit"], "decmbytes");
        assert_eq!(json["fieldConfig"]["defaults"]["thresholds"]["steps"][0]["color"], "blue");
    }

    #[test]
    fn test_stat_fields_written_directly_reach_json() {
        let mut stat = Stat::new("Latency", "cloudwatch");
        stat.format = "ms".to_string();
        stat.thresholds = vec![ThresholdStep::base("red")];
        stat.options.color_mode = "background".to_string();
        let json = serde_json::to_value(&stat).unwrap();

        assert_eq!(json["fieldConfig"]["defaults"]["unit"], "ms");
        assert_eq!(
            json["fieldConfig"]["defaults"]["thresholds"]["steps"],
            json!([{ "color": "red", "value": null }])
        );
        assert_eq!(json["options"]["colorMode"], "background");
    }

    #[test]
    fn test_alert_threshold_toggle() {
        let graph = Graph::new("g", "ds").alert_threshold(false);
        let json = serde_json::to_value(&graph).unwrap();

        assert!(!graph.alert_threshold);
        assert_eq!(json["options"], json!({ "alertThreshold": false }));

        let mut graph = Graph::new("g", "ds");
        graph.alert_threshold = false;
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["options"]["alertThreshold"], false);
        assert!(json.get("alertThreshold").is_none());
    }

    #[test]
    fn test_timeseries_json_follows_fields() {
        let mut panel = TimeSeries::new("Deployments", "cloudwatch").axis_placement("hidden");
        panel.tooltip_mode = "none".to_string();
        let json = serde_json::to_value(&panel).unwrap();

        assert_eq!(json["type"], "timeseries");
        assert_eq!(json["title"], "Deployments");
        assert_eq!(json["fieldConfig"]["defaults"]["custom"]["axisPlacement"], "hidden");
        assert_eq!(json["options"]["tooltip"]["mode"], "none");
    }

    #[test]
    fn test_row_panel_has_no_datasource() {
        let row = RowPanel::new("Summary").grid_pos(GridPos::new(1, 24, 0, 0));
        let json = serde_json::to_value(Panel::from(row)).unwrap();

        assert_eq!(json["type"], "row");
        assert!(json.get("datasource").is_none());
        assert_eq!(json["gridPos"], json!({ "h": 1, "w": 24, "x": 0, "y": 0 }));
    }
}
