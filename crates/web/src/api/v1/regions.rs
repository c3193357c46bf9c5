use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use model::{ExampleData, GeoPoint, Region, RenderShape};
use schemars::JsonSchema;
use serde::Serialize;
use utility::id::Id;

use crate::{
    common::{
        route_not_found, schema, HateoasResult, PageParams, RouteErrorResponse,
        RouteResult, VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/regions{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<RegionDto>))
        .route("/:id", get(get_region).delete(delete_region))
        .route("/", get(get_regions).delete(delete_regions))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// A stored region together with what a map needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionDto {
    pub id: Id<Region>,
    pub created_at: DateTime<Utc>,
    pub shape: RenderShape,
    pub perimeter_meters: f64,
    pub points: Vec<GeoPoint>,
}

impl From<Region> for RegionDto {
    fn from(region: Region) -> Self {
        Self {
            id: region.id,
            created_at: region.created_at,
            shape: RenderShape::from_point_count(region.points.len()),
            perimeter_meters: region.perimeter_meters(),
            points: region.points,
        }
    }
}

impl ExampleData for RegionDto {
    fn example_data() -> Self {
        Region::example_data().into()
    }
}

async fn get_regions(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { regions, .. }): State<WebState>,
    Query(params): Query<PageParams>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<RegionDto>>> {
    let regions = regions.get_regions().await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;
    let data = regions
        .into_iter()
        .map(|region| region_hateoas(region, base_url.clone()))
        .collect::<Vec<_>>();

    Ok(
        hateoas::Response::builder(VecResponse::from_params(data, params), base_url)
            .link("self", resource!(""))
            .link("schema", resource!("/schema"))
            .build()
            .json(),
    )
}

async fn get_region(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { regions, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<RegionDto> {
    let not_found = || RouteErrorResponse::not_found(&Method::GET, original_uri.path());
    let id = id.parse::<Id<Region>>().map_err(|_| not_found())?;
    regions
        .get_region(id)
        .await
        .map(|region| region_hateoas(region, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn delete_region(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { regions, .. }): State<WebState>,
) -> RouteResult<StatusCode> {
    let not_found = || RouteErrorResponse::not_found(&Method::DELETE, original_uri.path());
    let id = id.parse::<Id<Region>>().map_err(|_| not_found())?;
    regions
        .delete_region(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}

async fn delete_regions(
    State(WebState { regions, .. }): State<WebState>,
) -> RouteResult<StatusCode> {
    regions.delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn region_hateoas(
    region: Region,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<RegionDto> {
    let id = region.id;
    hateoas::Response::builder(RegionDto::from(region), base_url)
        .link("self", resource!("/{}", id))
        .build()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;
    use chrono::TimeZone;
    use regions::database::{Database, RegionRepo};

    use super::*;
    use crate::tests::state;

    fn base_url() -> Extension<Arc<BaseUrl>> {
        Extension(Arc::new(BaseUrl::from_headers(&HeaderMap::new())))
    }

    fn uri(path: &str) -> OriginalUri {
        OriginalUri(path.parse().unwrap())
    }

    fn region(minute: u32) -> Region {
        Region {
            id: Id::generate(),
            created_at: Utc.with_ymd_and_hms(2024, 10, 19, 12, minute, 0).unwrap(),
            points: vec![
                GeoPoint::new(54.3233, 10.1394),
                GeoPoint::new(54.3240, 10.1410),
                GeoPoint::new(54.3225, 10.1422),
            ],
        }
    }

    #[test]
    fn dto_describes_a_closed_polygon() {
        let region = region(0);
        let dto = RegionDto::from(region.clone());
        assert_eq!(dto.shape, RenderShape::Polygon);
        assert_eq!(dto.perimeter_meters, region.perimeter_meters());
        assert_eq!(dto.points, region.points);
    }

    #[tokio::test]
    async fn lists_regions_with_links() {
        let state = state().await;
        let (a, b) = (region(0), region(1));
        state.regions.save_region(&a).await.unwrap();
        state.regions.save_region(&b).await.unwrap();

        let query = Query(PageParams {
            page: None,
            page_size: None,
        });
        let response = get_regions(uri("/api/v1/regions"), State(state), query, base_url())
            .await
            .unwrap()
            .0;

        assert_eq!(
            response.links[0].hypertext_reference,
            "http://localhost/api/v1/regions"
        );
        let ids = response
            .content
            .data
            .iter()
            .map(|region| region.content.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(
            response.content.data[0].links[0].hypertext_reference,
            format!("http://localhost/api/v1/regions/{}", a.id)
        );
    }

    #[tokio::test]
    async fn unknown_or_malformed_ids_are_not_found() {
        let state = state().await;
        let missing = Id::<Region>::generate().to_string();

        let result = get_region(
            uri("/api/v1/regions/x"),
            Path(missing.clone()),
            State(state.clone()),
            base_url(),
        )
        .await;
        assert_eq!(result.unwrap_err().status_code, StatusCode::NOT_FOUND);

        let result = get_region(
            uri("/api/v1/regions/x"),
            Path("not-a-uuid".to_owned()),
            State(state.clone()),
            base_url(),
        )
        .await;
        assert_eq!(result.unwrap_err().status_code, StatusCode::NOT_FOUND);

        let result =
            delete_region(uri("/api/v1/regions/x"), Path(missing), State(state)).await;
        assert_eq!(result.unwrap_err().status_code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deletes_regions() {
        let state = state().await;
        let (a, b) = (region(0), region(1));
        state.regions.save_region(&a).await.unwrap();
        state.regions.save_region(&b).await.unwrap();

        let status = delete_region(
            uri("/api/v1/regions/x"),
            Path(a.id.to_string()),
            State(state.clone()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.regions.get_regions().await.unwrap(), vec![b]);

        delete_regions(State(state.clone())).await.unwrap();
        let remaining = state.regions.database.auto().list_regions().await.unwrap();
        assert!(remaining.is_empty());
    }
}
