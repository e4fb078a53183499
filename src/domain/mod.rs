// Domain layer - Grafana dashboard schema model
pub mod alert;
pub mod dashboard;
pub mod panel;
pub mod style;
pub mod target;
pub mod templating;
