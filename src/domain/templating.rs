// Dashboard variables and annotation queries
use serde::Serialize;

/// A query-backed dashboard variable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub label: String,
    pub query: String,
    pub definition: String,
    #[serde(rename = "datasource")]
    pub data_source: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub refresh: u8,
    pub sort: u8,
    pub hide: u8,
    pub multi: bool,
    pub include_all: bool,
    pub all_value: String,
    pub use_tags: bool,
    pub regex: String,
    pub options: Vec<serde_json::Value>,
    pub current: serde_json::Value,
}

impl Template {
    pub fn new(name: &str, query: &str, data_source: &str) -> Self {
        Self {
            name: name.to_string(),
            label: String::new(),
            query: query.to_string(),
            definition: query.to_string(),
            data_source: data_source.to_string(),
            kind: "query",
            refresh: 1,
            sort: 0,
            hide: 0,
            multi: false,
            include_all: false,
            all_value: String::new(),
            use_tags: false,
            regex: String::new(),
            options: Vec::new(),
            current: serde_json::json!({}),
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn refresh(mut self, refresh: u8) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn sort(mut self, sort: u8) -> Self {
        self.sort = sort;
        self
    }

    pub fn hide(mut self, hide: u8) -> Self {
        self.hide = hide;
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn include_all(mut self, include_all: bool) -> Self {
        self.include_all = include_all;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Templating {
    pub list: Vec<Template>,
}

impl Templating {
    pub fn new(list: Vec<Template>) -> Self {
        Self { list }
    }
}

/// Query annotation drawn as markers across graphs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(rename = "datasource")]
    pub data_source: String,
    pub enable: bool,
    pub hide: bool,
    pub icon_color: String,
    pub limit: u32,
    pub name: String,
    pub query: String,
    pub show_in: u32,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Annotations {
    pub list: Vec<Annotation>,
}

impl Annotations {
    pub fn new(list: Vec<Annotation>) -> Self {
        Self { list }
    }
}
