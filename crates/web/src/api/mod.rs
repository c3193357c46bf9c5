use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{get, on},
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::json;

pub mod v1;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/api{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(index).layer(axum::middleware::from_fn(base_url_middleware)))
        .route("/ping", get(ping))
        .nest_service("/v1", v1::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Serialize)]
struct Index {
    version: &'static str,
}

/// Entry point for clients that follow links instead of hardcoding paths.
async fn index(Extension(base_url): Extension<Arc<BaseUrl>>) -> Json<hateoas::Response<Index>> {
    let index = Index {
        version: env!("CARGO_PKG_VERSION"),
    };
    hateoas::Response::builder(index, base_url)
        .link("self", resource!(""))
        .link("trace", v1::resource!("/trace"))
        .link("regions", v1::resource!("/regions"))
        .build()
        .json()
}

async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;

    use super::*;

    #[tokio::test]
    async fn index_links_to_both_resources() {
        let base_url = Arc::new(BaseUrl::from_headers(&HeaderMap::new()));
        let Json(index) = index(Extension(base_url)).await;
        let links = index
            .links
            .iter()
            .map(|link| (link.relation.as_str(), link.hypertext_reference.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            links,
            vec![
                ("self", "http://localhost/api"),
                ("trace", "http://localhost/api/v1/trace"),
                ("regions", "http://localhost/api/v1/regions"),
            ]
        );
    }
}
