// Dispatcher - Routes a service request to its dashboard generator
use crate::application::api_gateways::api_gateway_dashboard;
use crate::application::ecs::{ecs_alb_service_dashboard, EcsAlbService};
use crate::application::elasticache_redis::elasticache_redis_dashboard;
use crate::application::elasticsearch::elasticsearch_dashboard;
use crate::application::firehose::firehose_dashboard;
use crate::application::lambdas::{lambda_dashboard, LambdaTrigger};
use crate::application::rds::{rds_dashboard, RdsEngine};
use crate::application::step_functions::step_function_dashboard;
use crate::domain::alert::Notifications;
use crate::domain::dashboard::Dashboard;
use crate::error::{DashboardError, Result};
use tracing::{debug, info};

/// Options shared by every generator
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub name: String,
    pub environment: String,
    pub cloudwatch_data_source: Option<String>,
    pub influxdb_data_source: Option<String>,
    pub notifications: Option<Notifications>,
    pub lambda_insights_namespace: String,
}

impl DashboardRequest {
    pub fn cloudwatch(&self, service: &'static str) -> Result<&str> {
        self.cloudwatch_data_source
            .as_deref()
            .ok_or(DashboardError::MissingDataSource {
                service,
                flag: "cloudwatch_data_source",
            })
    }

    pub fn influxdb(&self, service: &'static str) -> Result<&str> {
        self.influxdb_data_source
            .as_deref()
            .ok_or(DashboardError::MissingDataSource {
                service,
                flag: "influxdb_data_source",
            })
    }

    pub fn notifications(&self) -> Option<&Notifications> {
        self.notifications.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRequest {
    Lambda(LambdaTrigger),
    ApiGateway { lambdas: Vec<String> },
    StepFunction { lambdas: Vec<String> },
    Firehose,
    ElasticacheRedis { cache_cluster_id: String },
    Elasticsearch { client_id: String },
    Rds { engine: RdsEngine },
    EcsAlbService(EcsAlbService),
}

impl ServiceRequest {
    pub fn service_name(&self) -> &'static str {
        match self {
            ServiceRequest::Lambda(_) => "lambda",
            ServiceRequest::ApiGateway { .. } => "api-gateway",
            ServiceRequest::StepFunction { .. } => "step-function",
            ServiceRequest::Firehose => "firehose",
            ServiceRequest::ElasticacheRedis { .. } => "elasticache-redis",
            ServiceRequest::Elasticsearch { .. } => "elasticsearch",
            ServiceRequest::Rds { .. } => "rds",
            ServiceRequest::EcsAlbService(_) => "ecs-alb-service",
        }
    }
}

pub fn generate(request: &DashboardRequest, service: &ServiceRequest) -> Result<Dashboard> {
    info!(
        service = service.service_name(),
        name = %request.name,
        environment = %request.environment,
        channels = ?request.notifications().map(|n| n.uids().collect::<Vec<_>>()),
        "Generating dashboard"
    );

    let dashboard = match service {
        ServiceRequest::Lambda(trigger) => lambda_dashboard(request, trigger)?,
        ServiceRequest::ApiGateway { lambdas } => api_gateway_dashboard(request, lambdas)?,
        ServiceRequest::StepFunction { lambdas } => step_function_dashboard(request, lambdas)?,
        ServiceRequest::Firehose => firehose_dashboard(request)?,
        ServiceRequest::ElasticacheRedis { cache_cluster_id } => {
            elasticache_redis_dashboard(request, cache_cluster_id)?
        }
        ServiceRequest::Elasticsearch { client_id } => {
            debug!(client_id = %client_id, "Elasticsearch client");
            elasticsearch_dashboard(request)?
        }
        ServiceRequest::Rds { engine } => rds_dashboard(request, *engine)?,
        ServiceRequest::EcsAlbService(service) => ecs_alb_service_dashboard(request, service)?,
    };

    debug!(
        title = %dashboard.title,
        rows = dashboard.rows.len(),
        panels = dashboard.panels.len(),
        "Dashboard generated"
    );
    Ok(dashboard)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn request(name: &str) -> DashboardRequest {
        DashboardRequest {
            name: name.to_string(),
            environment: "alpha".to_string(),
            cloudwatch_data_source: Some("cloudwatch".to_string()),
            influxdb_data_source: Some("influxdb".to_string()),
            notifications: None,
            lambda_insights_namespace: "insights".to_string(),
        }
    }

    #[test]
    fn test_every_lambda_trigger_generates_a_dashboard() {
        let triggers = [
            LambdaTrigger::CognitoIdp,
            LambdaTrigger::CloudwatchEventSchedule,
            LambdaTrigger::CloudwatchEventTrigger,
            LambdaTrigger::CloudwatchLogs,
            LambdaTrigger::Sns {
                topics: vec!["topic-1".into(), "topic-2".into()],
                fifo: false,
            },
            LambdaTrigger::Sqs { fifo: false },
            LambdaTrigger::Null,
        ];

        for trigger in triggers {
            let dashboard =
                generate(&request("lambda-1"), &ServiceRequest::Lambda(trigger)).unwrap();
            assert_eq!(dashboard.title, "Lambda: lambda-1");
        }
    }

    #[test]
    fn test_every_service_is_dispatched() {
        let services = [
            ServiceRequest::ApiGateway { lambdas: vec![] },
            ServiceRequest::StepFunction { lambdas: vec![] },
            ServiceRequest::Firehose,
            ServiceRequest::ElasticacheRedis {
                cache_cluster_id: "redis-001".into(),
            },
            ServiceRequest::Elasticsearch {
                client_id: "1234".into(),
            },
            ServiceRequest::Rds {
                engine: RdsEngine::Postgres,
            },
            ServiceRequest::EcsAlbService(EcsAlbService {
                cluster_name: "cluster-1".into(),
                loadbalancer: "app/lb/123".into(),
                target_group: "targetgroup/tg/456".into(),
                max: 4,
                elasticsearch_data_source: None,
                kibana_url: None,
            }),
        ];

        let request = request("arn:aws:states:eu-west-1:1234567890:stateMachine:service");
        for service in services {
            let dashboard = generate(&request, &service).unwrap();
            assert!(!dashboard.title.is_empty(), "{}", service.service_name());
        }
    }

    #[test]
    fn test_missing_data_source_is_reported() {
        let mut request = request("db-1");
        request.influxdb_data_source = None;

        let error = generate(
            &request,
            &ServiceRequest::Rds {
                engine: RdsEngine::Mysql,
            },
        )
        .unwrap_err();

        assert!(matches!(
            error,
            DashboardError::MissingDataSource {
                service: "rds",
                flag: "influxdb_data_source"
            }
        ));
        assert_eq!(error.to_string(), "rds dashboard requires --influxdb_data_source");
    }
}
