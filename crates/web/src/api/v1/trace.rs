//! The live editing session. Every request that changes the trace answers
//! with the resulting snapshot; renderers that only want to follow along can
//! subscribe to `/stream`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, on, post},
    Extension, Json, Router,
};
use axum_extra::TypedHeader;
use capture::{InputEvent, TraceSnapshot};
use futures::stream::Stream;
use model::{region::MIN_REGION_POINTS, GeoPoint};
use regions::session::SessionHandle;
use serde::Deserialize;
use tokio_stream::{wrappers::WatchStream, StreamExt as _};

use crate::{
    common::{
        route_not_found, schema_no_example, HateoasResult, RouteErrorResponse,
        RouteResult, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

use super::regions::{region_hateoas, RegionDto};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/trace{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(get_trace))
        .route("/schema", get(schema_no_example::<TraceSnapshot>))
        .route("/events/schema", get(schema_no_example::<InputEvent>))
        .route("/begin", post(begin))
        .route("/tap", post(tap))
        .route("/center", post(center))
        .route("/drag", post(drag))
        .route("/undo", post(undo))
        .route("/clear", post(clear))
        .route("/cancel", post(cancel))
        .route("/events", post(event))
        .route("/finalize", post(finalize))
        .route("/stream", get(stream))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum DragPhase {
    Begin,
    Changed,
    End,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct DragInput {
    phase: DragPhase,
    point: GeoPoint,
}

impl From<DragInput> for InputEvent {
    fn from(input: DragInput) -> Self {
        match input.phase {
            DragPhase::Begin => InputEvent::DragBegin(input.point),
            DragPhase::Changed => InputEvent::DragChanged(input.point),
            DragPhase::End => InputEvent::DragEnd(input.point),
        }
    }
}

async fn get_trace(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TraceSnapshot> {
    let snapshot = session.snapshot().await?;
    Ok(snapshot_hateoas(snapshot, base_url).json())
}

async fn begin(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, InputEvent::Begin, base_url).await
}

async fn tap(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(point): Json<GeoPoint>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, InputEvent::Tap(point), base_url).await
}

/// Taps the center of the map camera. Panning across the antimeridian leaves
/// the camera outside the coordinate range, so the center is normalized first.
async fn center(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(camera_center): Json<GeoPoint>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, InputEvent::Tap(camera_center.normalized()), base_url).await
}

async fn drag(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(input): Json<DragInput>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, input.into(), base_url).await
}

async fn undo(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, InputEvent::Undo, base_url).await
}

async fn clear(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, InputEvent::Clear, base_url).await
}

async fn cancel(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, InputEvent::Cancel, base_url).await
}

async fn event(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(event): Json<InputEvent>,
) -> HateoasResult<TraceSnapshot> {
    apply(&session, event, base_url).await
}

async fn finalize(
    State(WebState { session, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<RegionDto>>)> {
    let region = session.finalize().await?;
    Ok((StatusCode::CREATED, region_hateoas(region, base_url).json()))
}

async fn stream(
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    State(WebState { session, .. }): State<WebState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    match user_agent {
        Some(TypedHeader(user_agent)) => {
            log::info!("`{}` is following the trace", user_agent.as_str())
        }
        None => log::info!("a client is following the trace"),
    }

    let snapshots = WatchStream::new(session.subscribe())
        .map(|snapshot| Event::default().event("snapshot").json_data(snapshot));

    Sse::new(snapshots).keep_alive(KeepAlive::default())
}

/// Points outside the valid coordinate range are refused before they reach
/// the session.
async fn apply(
    session: &SessionHandle,
    event: InputEvent,
    base_url: Arc<BaseUrl>,
) -> HateoasResult<TraceSnapshot> {
    if let Some(point) = event.point() {
        if !point.is_in_range() {
            return Err(RouteErrorResponse::bad_request(format!(
                "({}, {}) is not a valid coordinate",
                point.latitude, point.longitude
            )));
        }
    }
    let snapshot = session.input(event).await?;
    Ok(snapshot_hateoas(snapshot, base_url).json())
}

fn snapshot_hateoas(
    snapshot: TraceSnapshot,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<TraceSnapshot> {
    let editing = snapshot.editing;
    let can_finalize = editing && snapshot.points.len() >= MIN_REGION_POINTS;
    let can_undo = editing && !snapshot.points.is_empty();
    hateoas::Response::builder(snapshot, base_url)
        .link("self", resource!(""))
        .link("stream", resource!("/stream"))
        .link_if(!editing, "begin", resource!("/begin"))
        .link_if(editing, "events", resource!("/events"))
        .link_if(can_undo, "undo", resource!("/undo"))
        .link_if(can_finalize, "finalize", resource!("/finalize"))
        .build()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{http::HeaderMap, response::IntoResponse};
    use model::RenderShape;
    use tokio_stream::StreamExt;
    use utility::geo::meters_to_latitude_degrees;

    use super::*;
    use crate::tests::state;

    fn base_url() -> Extension<Arc<BaseUrl>> {
        Extension(Arc::new(BaseUrl::from_headers(&HeaderMap::new())))
    }

    fn north(meters: f64) -> GeoPoint {
        GeoPoint::new(54.0 + meters_to_latitude_degrees(meters), 10.0)
    }

    fn relations(response: &hateoas::Response<TraceSnapshot>) -> Vec<&str> {
        response
            .links
            .iter()
            .map(|link| link.relation.as_str())
            .collect()
    }

    #[tokio::test]
    async fn taps_build_a_polygon_and_finalize_stores_it() {
        let state = state().await;
        begin(State(state.clone()), base_url()).await.unwrap();
        for meters in [0.0, 10.0, 20.0] {
            tap(State(state.clone()), base_url(), Json(north(meters)))
                .await
                .unwrap();
        }

        let response = get_trace(State(state.clone()), base_url()).await.unwrap().0;
        assert_eq!(response.content.shape, RenderShape::Polygon);
        assert!(relations(&response).contains(&"finalize"));

        let (status, Json(region)) = finalize(State(state.clone()), base_url())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(region.content.points.len(), 3);
        assert_eq!(
            state.regions.get_region(region.content.id).await.unwrap().points,
            region.content.points
        );

        let response = get_trace(State(state), base_url()).await.unwrap().0;
        assert!(!response.content.editing);
        assert!(relations(&response).contains(&"begin"));
    }

    #[tokio::test]
    async fn finalizing_too_early_is_a_conflict() {
        let state = state().await;
        begin(State(state.clone()), base_url()).await.unwrap();
        tap(State(state.clone()), base_url(), Json(north(0.0)))
            .await
            .unwrap();

        let result = finalize(State(state.clone()), base_url()).await;
        assert_eq!(result.unwrap_err().status_code, StatusCode::CONFLICT);

        let response = get_trace(State(state), base_url()).await.unwrap().0;
        assert_eq!(response.content.points, vec![north(0.0)]);
        assert!(!relations(&response).contains(&"finalize"));
    }

    #[tokio::test]
    async fn out_of_range_points_are_refused() {
        let state = state().await;
        begin(State(state.clone()), base_url()).await.unwrap();

        let result = tap(
            State(state.clone()),
            base_url(),
            Json(GeoPoint::new(91.0, 0.0)),
        )
        .await;
        assert_eq!(result.unwrap_err().status_code, StatusCode::BAD_REQUEST);

        let result = event(
            State(state.clone()),
            base_url(),
            Json(InputEvent::DragChanged(GeoPoint::new(0.0, -181.0))),
        )
        .await;
        assert_eq!(result.unwrap_err().status_code, StatusCode::BAD_REQUEST);

        let response = get_trace(State(state), base_url()).await.unwrap().0;
        assert!(response.content.points.is_empty());
    }

    #[tokio::test]
    async fn panned_camera_centers_are_normalized() {
        let state = state().await;
        begin(State(state.clone()), base_url()).await.unwrap();

        let response = center(
            State(state.clone()),
            base_url(),
            Json(GeoPoint::new(54.0, 190.0)),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(response.content.points, vec![GeoPoint::new(54.0, -170.0)]);

        // the same point as a raw tap is refused
        let result = tap(State(state), base_url(), Json(GeoPoint::new(54.0, 190.0))).await;
        assert_eq!(result.unwrap_err().status_code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn drag_phases_are_filtered() {
        let state = state().await;
        begin(State(state.clone()), base_url()).await.unwrap();
        let inputs = [
            (DragPhase::Begin, 0.0),
            (DragPhase::Changed, 1.0),
            (DragPhase::Changed, 4.0),
            (DragPhase::End, 5.0),
        ];
        for (phase, meters) in inputs {
            let input = DragInput {
                phase,
                point: north(meters),
            };
            drag(State(state.clone()), base_url(), Json(input))
                .await
                .unwrap();
        }

        let response = get_trace(State(state), base_url()).await.unwrap().0;
        assert_eq!(response.content.points, vec![north(0.0), north(4.0)]);
    }

    #[tokio::test]
    async fn undo_clear_and_cancel() {
        let state = state().await;
        begin(State(state.clone()), base_url()).await.unwrap();
        for meters in [0.0, 10.0] {
            tap(State(state.clone()), base_url(), Json(north(meters)))
                .await
                .unwrap();
        }

        let response = undo(State(state.clone()), base_url()).await.unwrap().0;
        assert_eq!(response.content.points, vec![north(0.0)]);

        let response = clear(State(state.clone()), base_url()).await.unwrap().0;
        assert!(response.content.points.is_empty());
        assert!(response.content.editing);
        assert!(!relations(&response).contains(&"undo"));

        let response = cancel(State(state), base_url()).await.unwrap().0;
        assert!(!response.content.editing);
    }

    /// Reads frames off an event stream body until one carries a snapshot.
    async fn next_snapshot<S>(body: &mut S) -> TraceSnapshot
    where
        S: Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
    {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), body.next())
                .await
                .expect("no event within five seconds")
                .expect("event stream ended")
                .unwrap();
            let text = String::from_utf8(frame.to_vec()).unwrap();
            if !text.contains("event: snapshot") && !text.contains("event:snapshot") {
                continue;
            }
            let data = text
                .lines()
                .find_map(|line| line.strip_prefix("data:"))
                .unwrap();
            return serde_json::from_str(data.trim_start()).unwrap();
        }
    }

    #[tokio::test]
    async fn followers_receive_each_new_snapshot() {
        let state = state().await;
        begin(State(state.clone()), base_url()).await.unwrap();

        let response = stream(None, State(state.clone())).await.into_response();
        let mut body = response.into_body().into_data_stream();

        let initial = next_snapshot(&mut body).await;
        assert!(initial.editing);
        assert!(initial.points.is_empty());

        tap(State(state.clone()), base_url(), Json(north(0.0)))
            .await
            .unwrap();
        let tapped = next_snapshot(&mut body).await;
        assert_eq!(tapped.points, vec![north(0.0)]);

        cancel(State(state), base_url()).await.unwrap();
        assert!(!next_snapshot(&mut body).await.editing);
    }

    #[test]
    fn drag_input_has_a_json_form() {
        let input: DragInput = serde_json::from_value(serde_json::json!({
            "phase": "changed",
            "point": { "latitude": 54.3, "longitude": 10.1 }
        }))
        .unwrap();
        assert_eq!(
            InputEvent::from(input),
            InputEvent::DragChanged(GeoPoint::new(54.3, 10.1))
        );
    }
}
