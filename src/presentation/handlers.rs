// CLI handler - Turns parsed arguments into an encoded dashboard
use crate::application::dispatcher::{generate, DashboardRequest, ServiceRequest};
use crate::application::ecs::EcsAlbService;
use crate::application::lambdas::LambdaTrigger;
use crate::domain::alert::Notifications;
use crate::error::Result;
use crate::infrastructure::config::Settings;
use crate::infrastructure::encoder::{encode_dashboard, OutputFormat};
use crate::presentation::cli::{Cli, ServiceCommand, TriggerCommand};
use tracing::info;

/// Normalize the global flags: notification uids become channels, config fills the gaps
pub fn apply_options(cli: &Cli, settings: &Settings) -> Result<DashboardRequest> {
    let notifications = if cli.notifications.is_empty() {
        None
    } else {
        Some(Notifications::new(cli.notifications.iter().cloned())?)
    };

    Ok(DashboardRequest {
        name: cli.name.clone(),
        environment: cli.environment.clone(),
        cloudwatch_data_source: cli.cloudwatch_data_source.clone(),
        influxdb_data_source: cli.influxdb_data_source.clone(),
        notifications,
        lambda_insights_namespace: cli
            .lambda_insights_namespace
            .clone()
            .unwrap_or_else(|| settings.lambda_insights_namespace.clone()),
    })
}

fn lambda_trigger(trigger: &TriggerCommand) -> LambdaTrigger {
    match trigger {
        TriggerCommand::CognitoIdp => LambdaTrigger::CognitoIdp,
        TriggerCommand::CloudwatchEventSchedule => LambdaTrigger::CloudwatchEventSchedule,
        TriggerCommand::CloudwatchEventTrigger => LambdaTrigger::CloudwatchEventTrigger,
        TriggerCommand::CloudwatchLogs => LambdaTrigger::CloudwatchLogs,
        TriggerCommand::Null => LambdaTrigger::Null,
        TriggerCommand::Sns { topics, fifo } => LambdaTrigger::Sns {
            topics: topics.clone(),
            fifo: *fifo,
        },
        TriggerCommand::Sqs { fifo } => LambdaTrigger::Sqs { fifo: *fifo },
    }
}

pub fn service_request(command: &ServiceCommand) -> ServiceRequest {
    match command {
        ServiceCommand::ApiGateway { lambdas } => ServiceRequest::ApiGateway {
            lambdas: lambdas.clone(),
        },
        ServiceCommand::Rds { engine } => ServiceRequest::Rds {
            engine: (*engine).into(),
        },
        ServiceCommand::Firehose => ServiceRequest::Firehose,
        ServiceCommand::ElasticacheRedis { cache_cluster_id } => ServiceRequest::ElasticacheRedis {
            cache_cluster_id: cache_cluster_id.clone(),
        },
        ServiceCommand::Elasticsearch { client_id } => ServiceRequest::Elasticsearch {
            client_id: client_id.clone(),
        },
        ServiceCommand::StepFunction { lambdas } => ServiceRequest::StepFunction {
            lambdas: lambdas.clone(),
        },
        ServiceCommand::EcsAlbService {
            cluster_name,
            loadbalancer,
            target_group,
            max,
            elasticsearch_data_source,
            kibana_url,
        } => ServiceRequest::EcsAlbService(EcsAlbService {
            cluster_name: cluster_name.clone(),
            loadbalancer: loadbalancer.clone(),
            target_group: target_group.clone(),
            max: *max,
            elasticsearch_data_source: elasticsearch_data_source.clone(),
            kibana_url: kibana_url.clone(),
        }),
        ServiceCommand::Lambda { trigger } => ServiceRequest::Lambda(lambda_trigger(trigger)),
    }
}

/// Generate the requested dashboard and encode it for stdout
pub fn render_dashboard(cli: &Cli, settings: &Settings) -> Result<String> {
    let request = apply_options(cli, settings)?;
    let service = service_request(&cli.service);
    let dashboard = generate(&request, &service)?;

    let format = OutputFormat::from_flag(cli.base64 || settings.base64);
    info!(?format, "Encoding dashboard");
    encode_dashboard(&dashboard, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rds::RdsEngine;
    use crate::error::DashboardError;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use clap::Parser;

    fn settings() -> Settings {
        Settings {
            lambda_insights_namespace: "LambdaInsights".to_string(),
            base64: false,
        }
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["grafana-dashboards", "--name", "service-1", "--environment", "alpha"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_apply_options_builds_notification_channels() {
        let args = [
            "--notifications",
            "ops",
            "dev",
            "--influxdb_data_source",
            "influxdb",
            "firehose",
        ];
        let request = apply_options(&cli(&args), &settings()).unwrap();

        let uids: Vec<_> = request.notifications.as_ref().unwrap().uids().collect();
        assert_eq!(uids, vec!["ops", "dev"]);
        let json = serde_json::to_value(request.notifications.unwrap()).unwrap();
        assert_eq!(json, serde_json::json!([{ "uid": "ops" }, { "uid": "dev" }]));
    }

    #[test]
    fn test_apply_options_without_notifications() {
        let request = apply_options(&cli(&["firehose"]), &settings()).unwrap();

        assert!(request.notifications.is_none());
        assert_eq!(request.lambda_insights_namespace, "LambdaInsights");
    }

    #[test]
    fn test_cli_insights_namespace_wins_over_settings() {
        let request = apply_options(
            &cli(&["--lambda_insights_namespace", "Custom", "firehose"]),
            &settings(),
        )
        .unwrap();

        assert_eq!(request.lambda_insights_namespace, "Custom");
    }

    #[test]
    fn test_service_request_mapping() {
        let parsed = cli(&["rds", "--engine", "mysql"]);
        assert_eq!(
            service_request(&parsed.service),
            ServiceRequest::Rds {
                engine: RdsEngine::Mysql
            }
        );

        let parsed = cli(&["lambda", "sqs", "--fifo"]);
        assert_eq!(
            service_request(&parsed.service),
            ServiceRequest::Lambda(LambdaTrigger::Sqs { fifo: true })
        );
    }

    #[test]
    fn test_render_dashboard_as_json() {
        let cli = cli(&["--influxdb_data_source", "influxdb", "firehose"]);
        let output = render_dashboard(&cli, &settings()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["title"], "Firehose");
    }

    #[test]
    fn test_render_dashboard_base64_from_settings() {
        let settings = Settings {
            base64: true,
            ..settings()
        };

        let cli = cli(&["--influxdb_data_source", "influxdb", "firehose"]);
        let output = render_dashboard(&cli, &settings).unwrap();

        let decoded = STANDARD.decode(output).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(value["title"], "Firehose");
    }

    #[test]
    fn test_render_dashboard_reports_missing_data_source() {
        let result = render_dashboard(&cli(&["firehose"]), &settings());

        assert!(matches!(
            result,
            Err(DashboardError::MissingDataSource {
                service: "firehose",
                ..
            })
        ));
    }
}
