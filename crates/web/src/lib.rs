pub use crate::common::RouteResult;

use std::net::SocketAddr;

use axum::{extract::FromRef, routing::on, Router};
use capture::TraceOptions;
use database::SqliteDatabase;
use regions::{
    client::Client,
    session::{self, SessionHandle},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::common::{route_not_found, METHOD_FILTER_ALL};

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod middleware;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub session: SessionHandle,
    pub regions: Client<SqliteDatabase>,
}

impl WebState {
    /// Starts the editing session that all requests share.
    pub fn new(regions: Client<SqliteDatabase>, options: TraceOptions) -> Self {
        Self {
            session: session::spawn(regions.clone(), options),
            regions,
        }
    }
}

pub async fn start_web_server(
    bind_address: SocketAddr,
    state: WebState,
) -> std::io::Result<()> {
    let routes = Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(bind_address).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}
