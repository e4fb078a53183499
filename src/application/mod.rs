// Application layer - One dashboard generator per AWS service
pub mod api_gateways;
pub mod commons;
pub mod dispatcher;
pub mod ecs;
pub mod elasticache_redis;
pub mod elasticsearch;
pub mod firehose;
pub mod lambdas;
pub mod rds;
pub mod release;
pub mod sns;
pub mod step_functions;
