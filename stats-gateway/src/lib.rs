pub mod aggregator;
pub mod ai;
pub mod api;
pub mod backend;
pub mod batch;
pub mod config;
pub mod errors;
pub mod matches;
pub mod metrics_defs;
pub mod model;
pub mod regions;
pub mod retry;
pub mod router;
pub mod service;

#[cfg(test)]
mod testutils;

use crate::errors::GatewayError;
use crate::service::GatewayService;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use shared::admin_service::AdminService;
use shared::http::run_http_service;

/// Body of every response produced by the gateway.
pub type ResponseBody = BoxBody<Bytes, GatewayError>;

/// Serves the API and admin listeners until one of them fails.
pub async fn run(config: config::Config) -> Result<(), GatewayError> {
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let gateway = GatewayService::new(&config);
    let ready = gateway.is_ready();
    let admin: AdminService<_, GatewayError> = AdminService::new(move || ready);

    let gateway_task = run_http_service(&config.listener.host, config.listener.port, gateway);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin,
    );
    tokio::try_join!(gateway_task, admin_task)?;
    Ok(())
}
