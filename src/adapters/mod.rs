pub mod definition_registry;
pub mod health_handler;
pub mod metrics_handler;
pub mod mock_value;
pub mod record_store;
pub mod request_dispatcher;
pub mod route_registrar;
pub mod seed_generator;
pub mod sql_store;
