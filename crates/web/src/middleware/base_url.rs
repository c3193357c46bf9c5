use std::sync::Arc;

use axum::{extract, http::HeaderMap, middleware::Next, response::IntoResponse};

/// Where the api is reachable from the client's point of view. Honors the
/// usual reverse proxy headers so links stay valid behind one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let proto = header("x-forwarded-proto").unwrap_or("http").to_string();
        let host = header("x-forwarded-host")
            .or_else(|| header("host"))
            .unwrap_or("localhost")
            .to_string();
        let prefix = header("x-forwarded-prefix")
            .unwrap_or("")
            .trim_end_matches('/')
            .to_string();

        BaseUrl {
            proto,
            host,
            prefix,
        }
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!(
            "{}://{}{}{}",
            self.proto,
            self.host,
            self.prefix,
            path.into()
        )
    }
}

pub async fn base_url_middleware(mut req: extract::Request, next: Next) -> impl IntoResponse {
    let base_url = BaseUrl::from_headers(req.headers());
    req.extensions_mut().insert(Arc::new(base_url));

    next.run(req).await
}
