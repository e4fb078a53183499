// Infrastructure layer - Configuration, query templating and output encoding
pub mod config;
pub mod encoder;
