// Legacy panel alerts and their notification routing
use crate::error::DashboardError;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

/// A notification channel, referenced by uid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub uid: String,
}

/// Non-empty list of notification channels an alert is routed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Notifications(Vec<Notification>);

impl Notifications {
    pub fn new<I, S>(uids: I) -> Result<Self, DashboardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels: Vec<Notification> = uids
            .into_iter()
            .map(|uid| Notification { uid: uid.into() })
            .collect();

        if channels.is_empty() {
            return Err(DashboardError::NoNotificationTargets);
        }

        Ok(Self(channels))
    }

    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|n| n.uid.as_str())
    }
}

impl TryFrom<Vec<String>> for Notifications {
    type Error = DashboardError;

    fn try_from(uids: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(uids)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluator {
    GreaterThan(f64),
    LowerThan(f64),
}

impl Serialize for Evaluator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (kind, value) = match self {
            Evaluator::GreaterThan(v) => ("gt", *v),
            Evaluator::LowerThan(v) => ("lt", *v),
        };
        let mut state = serializer.serialize_struct("Evaluator", 2)?;
        state.serialize_field("params", &[value])?;
        state.serialize_field("type", kind)?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    /// Window ending now, e.g. `TimeRange::last("5m")`
    pub fn last(from: &str) -> Self {
        Self {
            from: from.to_string(),
            to: "now".to_string(),
        }
    }
}

/// A threshold check over one target of the panel, reduced with `max`
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCondition {
    pub ref_id: String,
    pub time_range: TimeRange,
    pub evaluator: Evaluator,
    pub operator: Operator,
}

impl AlertCondition {
    pub fn new(ref_id: &str, time_range: TimeRange, evaluator: Evaluator) -> Self {
        Self {
            ref_id: ref_id.to_string(),
            time_range,
            evaluator,
            operator: Operator::And,
        }
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }
}

impl Serialize for AlertCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AlertCondition", 5)?;
        state.serialize_field("evaluator", &self.evaluator)?;
        state.serialize_field("operator", &json!({ "type": self.operator.as_str() }))?;
        state.serialize_field(
            "query",
            &json!({
                "model": { "refId": self.ref_id },
                "params": [self.ref_id, self.time_range.from, self.time_range.to],
            }),
        )?;
        state.serialize_field(
            "reducer",
            &json!({ "params": [], "type": "max" }),
        )?;
        state.serialize_field("type", "query")?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub name: String,
    pub message: String,
    pub conditions: Vec<AlertCondition>,
    pub execution_error_state: String,
    pub no_data_state: String,
    pub frequency: String,
    #[serde(rename = "for")]
    pub grace_period: String,
    pub handler: u8,
    pub notifications: Notifications,
    pub alert_rule_tags: BTreeMap<String, String>,
}

impl Alert {
    pub fn new(name: String, message: String, notifications: &Notifications) -> Self {
        Self {
            name,
            message,
            conditions: Vec::new(),
            execution_error_state: "alerting".to_string(),
            no_data_state: "no_data".to_string(),
            frequency: "60s".to_string(),
            grace_period: "5m".to_string(),
            handler: 1,
            notifications: notifications.clone(),
            alert_rule_tags: BTreeMap::new(),
        }
    }

    pub fn condition(mut self, condition: AlertCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn frequency(mut self, frequency: &str) -> Self {
        self.frequency = frequency.to_string();
        self
    }

    pub fn grace_period(mut self, grace_period: &str) -> Self {
        self.grace_period = grace_period.to_string();
        self
    }

    pub fn no_data_state(mut self, state: &str) -> Self {
        self.no_data_state = state.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_notifications_are_rejected() {
        let result = Notifications::new(Vec::<String>::new());
        assert!(matches!(result, Err(DashboardError::NoNotificationTargets)));
    }

    #[test]
    fn test_notifications_serialize_as_uid_objects() {
        let notifications = Notifications::new(["slack-1", "slack-2"]).unwrap();
        let json = serde_json::to_value(&notifications).unwrap();

        assert_eq!(json, json!([{ "uid": "slack-1" }, { "uid": "slack-2" }]));
        assert_eq!(notifications.uids().collect::<Vec<_>>(), vec!["slack-1", "slack-2"]);
    }

    #[test]
    fn test_alert_defaults() {
        let notifications = Notifications::new(["ops"]).unwrap();
        let alert = Alert::new("name".into(), "message".into(), &notifications);

        assert_eq!(alert.execution_error_state, "alerting");
        assert_eq!(alert.no_data_state, "no_data");
        assert_eq!(alert.frequency, "60s");
        assert_eq!(alert.grace_period, "5m");
    }

    #[test]
    fn test_condition_json_shape() {
        let condition = AlertCondition::new("B", TimeRange::last("15m"), Evaluator::LowerThan(40.0))
            .operator(Operator::Or);
        let json = serde_json::to_value(&condition).unwrap();

        assert_eq!(json["evaluator"], json!({ "params": [40.0], "type": "lt" }));
        assert_eq!(json["operator"]["type"], "or");
        assert_eq!(json["query"]["model"]["refId"], "B");
        assert_eq!(json["query"]["params"], json!(["B", "15m", "now"]));
        assert_eq!(json["reducer"]["type"], "max");
        assert_eq!(json["type"], "query");
    }

    #[test]
    fn test_grace_period_serializes_as_for() {
        let notifications = Notifications::new(["ops"]).unwrap();
        let alert = Alert::new("n".into(), "m".into(), &notifications).grace_period("2m");
        let json = serde_json::to_value(&alert).unwrap();

        assert_eq!(json["for"], "2m");
        assert_eq!(json["notifications"][0]["uid"], "ops");
    }
}
