// Query targets feeding a panel
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A single CloudWatch metric query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudwatchMetricsTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub namespace: String,
    pub metric_name: String,
    pub statistics: Vec<String>,
    pub dimensions: BTreeMap<String, String>,
    pub period: String,
    pub region: String,
    pub match_exact: bool,
    pub expression: String,
    pub id: String,
    pub query_mode: &'static str,
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

impl CloudwatchMetricsTarget {
    pub fn new(namespace: &str, metric_name: &str, statistic: &str) -> Self {
        Self {
            alias: None,
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            statistics: vec![statistic.to_string()],
            dimensions: BTreeMap::new(),
            period: String::new(),
            region: "default".to_string(),
            match_exact: true,
            expression: String::new(),
            id: String::new(),
            query_mode: "Metrics",
            hide: false,
            ref_id: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn dimension(mut self, key: &str, value: &str) -> Self {
        self.dimensions.insert(key.to_string(), value.to_string());
        self
    }

    pub fn period(mut self, period: &str) -> Self {
        self.period = period.to_string();
        self
    }

    pub fn ref_id(mut self, ref_id: &str) -> Self {
        self.ref_id = Some(ref_id.to_string());
        self
    }
}

/// A CloudWatch Logs Insights query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudwatchLogsInsightsTarget {
    pub expression: String,
    pub log_group_names: Vec<String>,
    pub region: String,
    pub stats_groups: Vec<String>,
    pub id: String,
    pub query_mode: &'static str,
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

impl CloudwatchLogsInsightsTarget {
    pub fn new(expression: &str, log_group_names: Vec<String>) -> Self {
        Self {
            expression: expression.to_string(),
            log_group_names,
            region: "default".to_string(),
            stats_groups: Vec::new(),
            id: String::new(),
            query_mode: "Logs",
            hide: false,
            ref_id: None,
        }
    }
}

/// A raw InfluxQL query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluxDbTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub query: String,
    pub raw_query: bool,
    pub result_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

impl InfluxDbTarget {
    pub fn new(query: String, raw_query: bool) -> Self {
        Self {
            alias: None,
            query,
            raw_query,
            result_format: "time_series",
            ref_id: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn ref_id(mut self, ref_id: &str) -> Self {
        self.ref_id = Some(ref_id.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAggregation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub settings: BTreeMap<String, String>,
}

/// A Lucene query against an Elasticsearch data source; aggregations go out under `metrics`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub query: String,
    pub metrics: Vec<MetricAggregation>,
    pub bucket_aggs: Vec<serde_json::Value>,
    pub time_field: String,
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

impl ElasticsearchTarget {
    pub fn new(query: String, metrics: Vec<MetricAggregation>) -> Self {
        Self {
            alias: None,
            query,
            metrics,
            bucket_aggs: Vec::new(),
            time_field: "@timestamp".to_string(),
            hide: false,
            ref_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Target {
    CloudwatchMetrics(CloudwatchMetricsTarget),
    CloudwatchLogsInsights(CloudwatchLogsInsightsTarget),
    InfluxDb(InfluxDbTarget),
    Elasticsearch(ElasticsearchTarget),
}

impl Target {
    pub fn ref_id(&self) -> Option<&str> {
        match self {
            Target::CloudwatchMetrics(t) => t.ref_id.as_deref(),
            Target::CloudwatchLogsInsights(t) => t.ref_id.as_deref(),
            Target::InfluxDb(t) => t.ref_id.as_deref(),
            Target::Elasticsearch(t) => t.ref_id.as_deref(),
        }
    }

    pub fn set_ref_id(&mut self, ref_id: String) {
        let slot = match self {
            Target::CloudwatchMetrics(t) => &mut t.ref_id,
            Target::CloudwatchLogsInsights(t) => &mut t.ref_id,
            Target::InfluxDb(t) => &mut t.ref_id,
            Target::Elasticsearch(t) => &mut t.ref_id,
        };
        *slot = Some(ref_id);
    }
}

impl From<CloudwatchMetricsTarget> for Target {
    fn from(target: CloudwatchMetricsTarget) -> Self {
        Target::CloudwatchMetrics(target)
    }
}

impl From<CloudwatchLogsInsightsTarget> for Target {
    fn from(target: CloudwatchLogsInsightsTarget) -> Self {
        Target::CloudwatchLogsInsights(target)
    }
}

impl From<InfluxDbTarget> for Target {
    fn from(target: InfluxDbTarget) -> Self {
        Target::InfluxDb(target)
    }
}

impl From<ElasticsearchTarget> for Target {
    fn from(target: ElasticsearchTarget) -> Self {
        Target::Elasticsearch(target)
    }
}

/// Spreadsheet-style label for the n-th ref id: A..Z, AA, AB, ...
fn ref_id_label(mut index: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.iter().rev().collect()
}

/// Give every target without a ref id the next letter not already taken.
pub fn auto_ref_ids(targets: &mut [Target]) {
    let used: HashSet<String> = targets
        .iter()
        .filter_map(|t| t.ref_id().map(str::to_string))
        .collect();

    let mut next = 0;
    for target in targets.iter_mut().filter(|t| t.ref_id().is_none()) {
        let ref_id = loop {
            let candidate = ref_id_label(next);
            next += 1;
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        target.set_ref_id(ref_id);
    }
}
