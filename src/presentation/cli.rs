// Command line definition
use crate::application::rds::RdsEngine;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate Grafana dashboards for AWS services")]
pub struct Cli {
    /// Name of the resource the dashboard is for
    #[arg(long)]
    pub name: String,

    /// Environment name
    #[arg(long)]
    pub environment: String,

    /// Cloudwatch datasource name
    #[arg(long = "cloudwatch_data_source")]
    pub cloudwatch_data_source: Option<String>,

    /// InfluxDB datasource name
    #[arg(long = "influxdb_data_source")]
    pub influxdb_data_source: Option<String>,

    /// Notification channel uids to route alerts to
    #[arg(long, num_args = 1..)]
    pub notifications: Vec<String>,

    /// CloudWatch namespace of Lambda Insights metrics
    #[arg(long = "lambda_insights_namespace")]
    pub lambda_insights_namespace: Option<String>,

    /// Print the dashboard base64 encoded
    #[arg(long)]
    pub base64: bool,

    #[command(subcommand)]
    pub service: ServiceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    /// Create dashboard for API gateways
    ApiGateway {
        /// Lambda names or ARNs
        #[arg(long, num_args = 1..)]
        lambdas: Vec<String>,
    },
    /// Create dashboard for RDS
    Rds {
        /// DB engine
        #[arg(long, value_enum)]
        engine: EngineArg,
    },
    /// Create dashboard for AWS Firehose
    Firehose,
    /// Create dashboard for AWS ElastiCache
    ElasticacheRedis {
        #[arg(long = "cache_cluster_id")]
        cache_cluster_id: String,
    },
    /// Create dashboard for AWS ES
    Elasticsearch {
        #[arg(long = "client_id")]
        client_id: String,
    },
    /// Create dashboard for Step function
    StepFunction {
        /// Lambda names or ARNs
        #[arg(long, num_args = 1..)]
        lambdas: Vec<String>,
    },
    /// Create dashboard for an ECS service behind an ALB
    EcsAlbService {
        #[arg(long = "cluster_name")]
        cluster_name: String,
        #[arg(long)]
        loadbalancer: String,
        #[arg(long = "target_group")]
        target_group: String,
        /// Maximum number of tasks the service scales to
        #[arg(long)]
        max: u32,
        #[arg(long = "elasticsearch_data_source")]
        elasticsearch_data_source: Option<String>,
        #[arg(long = "kibana_url")]
        kibana_url: Option<String>,
    },
    /// Create dashboard for lambdas
    Lambda {
        #[command(subcommand)]
        trigger: TriggerCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum TriggerCommand {
    /// Lambda is triggered by Cognito
    CognitoIdp,
    /// Lambda is triggered by Cron
    CloudwatchEventSchedule,
    /// Lambda is triggered by Cloudwatch Events
    CloudwatchEventTrigger,
    /// Lambda is triggered by Cloudwatch logs
    CloudwatchLogs,
    /// Lambda is triggered by external forces
    Null,
    /// Lambda is triggered by SNS
    Sns {
        /// SNS topic names or ARNs
        #[arg(long, num_args = 1.., required = true)]
        topics: Vec<String>,
        #[arg(long)]
        fifo: bool,
    },
    /// Lambda is triggered by SQS
    Sqs {
        #[arg(long)]
        fifo: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EngineArg {
    Mysql,
    Postgres,
}

impl From<EngineArg> for RdsEngine {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Mysql => RdsEngine::Mysql,
            EngineArg::Postgres => RdsEngine::Postgres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&[
            "grafana-dashboards",
            "--name",
            "db-1",
            "--environment",
            "alpha",
            "--influxdb_data_source",
            "influxdb",
            "--notifications",
            "ops",
            "dev",
            "--base64",
            "rds",
            "--engine",
            "postgres",
        ]);

        assert_eq!(cli.name, "db-1");
        assert_eq!(cli.influxdb_data_source.as_deref(), Some("influxdb"));
        assert_eq!(cli.notifications, vec!["ops", "dev"]);
        assert!(cli.base64);
        assert!(matches!(
            cli.service,
            ServiceCommand::Rds {
                engine: EngineArg::Postgres
            }
        ));
    }

    #[test]
    fn test_lambda_sns_trigger() {
        let cli = parse(&[
            "grafana-dashboards",
            "--name",
            "lambda-1",
            "--environment",
            "alpha",
            "lambda",
            "sns",
            "--topics",
            "topic-1",
            "topic-2",
            "--fifo",
        ]);

        match cli.service {
            ServiceCommand::Lambda {
                trigger: TriggerCommand::Sns { topics, fifo },
            } => {
                assert_eq!(topics, vec!["topic-1", "topic-2"]);
                assert!(fifo);
            }
            other => panic!("unexpected service {other:?}"),
        }
    }

    #[test]
    fn test_sns_requires_topics() {
        let result = Cli::try_parse_from([
            "grafana-dashboards",
            "--name",
            "lambda-1",
            "--environment",
            "alpha",
            "lambda",
            "sns",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_engine() {
        let result = Cli::try_parse_from([
            "grafana-dashboards",
            "--name",
            "db-1",
            "--environment",
            "alpha",
            "rds",
            "--engine",
            "oracle",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_lambdas_default_to_empty() {
        let cli = parse(&[
            "grafana-dashboards",
            "--name",
            "api",
            "--environment",
            "alpha",
            "api-gateway",
        ]);

        assert!(matches!(
            cli.service,
            ServiceCommand::ApiGateway { lambdas } if lambdas.is_empty()
        ));
    }

    #[test]
    fn test_ecs_alb_service_flags() {
        let cli = parse(&[
            "grafana-dashboards",
            "--name",
            "orders",
            "--environment",
            "alpha",
            "ecs-alb-service",
            "--cluster_name",
            "cluster-1",
            "--loadbalancer",
            "app/lb/123",
            "--target_group",
            "targetgroup/tg/456",
            "--max",
            "4",
        ]);

        match cli.service {
            ServiceCommand::EcsAlbService {
                cluster_name,
                max,
                elasticsearch_data_source,
                ..
            } => {
                assert_eq!(cluster_name, "cluster-1");
                assert_eq!(max, 4);
                assert!(elasticsearch_data_source.is_none());
            }
            other => panic!("unexpected service {other:?}"),
        }
    }
}
