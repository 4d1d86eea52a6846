// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::controller::{CuratingResult, Order, PlantDetail, PlantID, PlantSummary};
use crate::error::{ApiError, ErrorBody};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    ListPlants,
    CuratingResult,
    SearchByName,
    SearchByTag,
    DetailPlant,
}

#[derive(Debug)]
pub struct ApiRoute {
    pub verb: Verb,
    pub path: &'static str,
    pub endpoint: Endpoint,
}

/// Every plant route, in declaration order.
///
/// `/plants/{plant_id}` stays last so no literal sibling such as `curating`
/// can ever be read as an id.
pub const ROUTES: &[ApiRoute] = &[
    ApiRoute {
        verb: Verb::Get,
        path: "/plants",
        endpoint: Endpoint::ListPlants,
    },
    ApiRoute {
        verb: Verb::Get,
        path: "/plants/curating",
        endpoint: Endpoint::CuratingResult,
    },
    ApiRoute {
        verb: Verb::Post,
        path: "/plants/encyclopedia/keyword",
        endpoint: Endpoint::SearchByName,
    },
    ApiRoute {
        verb: Verb::Post,
        path: "/plants/encyclopedia/tag",
        endpoint: Endpoint::SearchByTag,
    },
    ApiRoute {
        verb: Verb::Get,
        path: "/plants/{plant_id}",
        endpoint: Endpoint::DetailPlant,
    },
];

fn method_router(route: &ApiRoute) -> MethodRouter<Arc<AppState>> {
    let filter = match route.verb {
        Verb::Get => MethodFilter::GET,
        Verb::Post => MethodFilter::POST,
    };

    match route.endpoint {
        Endpoint::ListPlants => on(filter, list_plants),
        Endpoint::CuratingResult => on(filter, curating_result),
        Endpoint::SearchByName => on(filter, search_by_name),
        Endpoint::SearchByTag => on(filter, search_by_tag),
        Endpoint::DetailPlant => on(filter, detail_plant),
    }
}

pub fn configure(state: Arc<AppState>) -> Router {
    ROUTES
        .iter()
        .fold(Router::new(), |router, route| {
            router.route(route.path, method_router(route))
        })
        .with_state(state)
}

// plants?order=recent
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// `recent` sorts newest first, `view` most viewed first.
    pub order: Option<Order>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CuratingQuery {
    /// Name of the plant the curating quiz ended on.
    #[param(example = "몬스테라")]
    pub result: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct KeywordSearch {
    #[schema(example = "몬스테라")]
    pub keyword: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TagSearch {
    /// Comma-delimited tag list.
    #[schema(example = "#꽃,#열매")]
    pub tags: String,
}

#[utoipa::path(
    get,
    path = "/plants",
    tag = "plants",
    params(
        ("api-key" = String, Header, description = "API key"),
        ListQuery,
    ),
    responses(
        (status = 200, description = "Plant summaries in the requested order", body = [PlantSummary]),
        (status = 400, description = "Unknown order", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
    )
)]
pub async fn list_plants(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<PlantSummary>>, ApiError> {
    let Query(query) = query?;
    debug!("list plants, order: {:?}", query.order);

    let plants = state.controller.list_plants(query.order).await?;
    Ok(Json(plants))
}

#[utoipa::path(
    get,
    path = "/plants/curating",
    tag = "plants",
    params(
        ("api-key" = String, Header, description = "API key"),
        CuratingQuery,
    ),
    responses(
        (status = 200, description = "The curated plant", body = CuratingResult),
        (status = 400, description = "Missing result", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "No such plant", body = ErrorBody),
    )
)]
pub async fn curating_result(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CuratingQuery>, QueryRejection>,
) -> Result<Json<CuratingResult>, ApiError> {
    let Query(query) = query?;

    let result = state.controller.curating_result(&query.result).await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/plants/encyclopedia/keyword",
    tag = "plants",
    params(("api-key" = String, Header, description = "API key")),
    request_body = KeywordSearch,
    responses(
        (status = 200, description = "Plants whose name matches the keyword", body = [PlantSummary]),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
    )
)]
pub async fn search_by_name(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<KeywordSearch>, JsonRejection>,
) -> Result<Json<Vec<PlantSummary>>, ApiError> {
    let Json(payload) = payload?;

    let plants = state.controller.search_by_name(&payload.keyword).await?;
    Ok(Json(plants))
}

#[utoipa::path(
    post,
    path = "/plants/encyclopedia/tag",
    tag = "plants",
    params(("api-key" = String, Header, description = "API key")),
    request_body = TagSearch,
    responses(
        (status = 200, description = "Plants carrying the tags", body = [PlantSummary]),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
    )
)]
pub async fn search_by_tag(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TagSearch>, JsonRejection>,
) -> Result<Json<Vec<PlantSummary>>, ApiError> {
    let Json(payload) = payload?;

    let plants = state.controller.search_by_tag(&payload.tags).await?;
    Ok(Json(plants))
}

#[utoipa::path(
    get,
    path = "/plants/{plant_id}",
    tag = "plants",
    params(
        ("api-key" = String, Header, description = "API key"),
        ("plant_id" = i64, Path, description = "Plant id", example = 1),
    ),
    responses(
        (status = 200, description = "The plant's details", body = PlantDetail),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "No such plant", body = ErrorBody),
    )
)]
pub async fn detail_plant(
    State(state): State<Arc<AppState>>,
    plant_id: Result<Path<PlantID>, PathRejection>,
) -> Result<Json<PlantDetail>, ApiError> {
    let Path(plant_id) = plant_id?;

    let plant = state.controller.get_detail(plant_id).await?;
    Ok(Json(plant))
}

/*********************************************************************/
/******************************* TESTS *******************************/
/*********************************************************************/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::API_KEY_HEADER;
    use crate::testing::{Call, SpyController, TOKEN};
    use crate::{app, StaticKeys};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use hyper::header;
    use tower::ServiceExt; // for `oneshot` and `ready`

    fn spy_app() -> (Arc<SpyController>, Router) {
        let spy = Arc::new(SpyController::default());
        let app = app(spy.clone(), Arc::new(StaticKeys::new([TOKEN])));
        (spy, app)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(API_KEY_HEADER, TOKEN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn post(app: &Router, uri: &str, body: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(API_KEY_HEADER, TOKEN)
                    .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_of<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// `/plants/{plant_id}` -> does it capture `/plants/curating`?
    fn captures(pattern: &str, path: &str) -> bool {
        let pattern: Vec<&str> = pattern.split('/').collect();
        let path: Vec<&str> = path.split('/').collect();
        pattern.len() == path.len()
            && pattern
                .iter()
                .zip(path.iter())
                .all(|(p, s)| p.starts_with('{') || p == s)
    }

    #[test]
    fn test_param_routes_come_after_literal_siblings() {
        for (i, earlier) in ROUTES.iter().enumerate() {
            for later in &ROUTES[i + 1..] {
                assert!(
                    earlier.verb != later.verb || !captures(earlier.path, later.path),
                    "{} shadows {}",
                    earlier.path,
                    later.path
                );
            }
        }
        assert_eq!(ROUTES.last().map(|r| r.endpoint), Some(Endpoint::DetailPlant));
    }

    #[tokio::test]
    async fn test_list_forwards_order() {
        let (spy, app) = spy_app();

        let response = get(&app, "/plants?order=view").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            mime::APPLICATION_JSON.as_ref()
        );
        let plants: Vec<PlantSummary> = body_of(response).await;
        assert_eq!(plants.len(), 2);

        let response = get(&app, "/plants?order=recent").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(&app, "/plants").await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            spy.calls(),
            vec![
                Call::ListPlants(Some(Order::View)),
                Call::ListPlants(Some(Order::Recent)),
                Call::ListPlants(None),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_order() {
        let (spy, app) = spy_app();

        let response = get(&app, "/plants?order=random").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = body_of(response).await;
        assert!(!body.message.is_empty());
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_curating_is_not_a_plant_id() {
        let (spy, app) = spy_app();

        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("result", "몬스테라")
            .finish();
        let response = get(&app, &format!("/plants/curating?{}", query)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let result: CuratingResult = body_of(response).await;
        assert_eq!(result.plant.name, "몬스테라");

        assert_eq!(
            spy.calls(),
            vec![Call::CuratingResult("몬스테라".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_curating_requires_result() {
        let (spy, app) = spy_app();

        let response = get(&app, "/plants/curating").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_keyword_search() {
        let (spy, app) = spy_app();

        let response = post(
            &app,
            "/plants/encyclopedia/keyword",
            r#"{"keyword":"몬스테라"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let plants: Vec<PlantSummary> = body_of(response).await;
        assert_eq!(plants[0].name, "몬스테라");
        assert_eq!(spy.calls(), vec![Call::SearchByName("몬스테라".to_owned())]);
    }

    #[tokio::test]
    async fn test_tag_search_forwards_raw_tags() {
        let (spy, app) = spy_app();

        let response = post(&app, "/plants/encyclopedia/tag", r##"{"tags":"#꽃,#열매"}"##).await;
        assert_eq!(response.status(), StatusCode::OK);

        let plants: Vec<PlantSummary> = body_of(response).await;
        assert!(plants.is_empty());
        assert_eq!(spy.calls(), vec![Call::SearchByTag("#꽃,#열매".to_owned())]);
    }

    #[tokio::test]
    async fn test_search_rejects_malformed_body() {
        let (spy, app) = spy_app();

        let response = post(&app, "/plants/encyclopedia/keyword", r#"{"word":"x"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = post(&app, "/plants/encyclopedia/tag", "not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_detail() {
        let (spy, app) = spy_app();

        let response = get(&app, "/plants/42").await;
        assert_eq!(response.status(), StatusCode::OK);

        let plant: PlantDetail = body_of(response).await;
        assert_eq!(plant.id, 42);
        assert_eq!(spy.calls(), vec![Call::GetDetail(42)]);
    }

    #[tokio::test]
    async fn test_detail_rejects_non_integer_id() {
        let (spy, app) = spy_app();

        let response = get(&app, "/plants/monstera").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = body_of(response).await;
        assert!(!body.message.is_empty());
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_detail_not_found_passes_through() {
        let (spy, app) = spy_app();

        let response = get(&app, "/plants/404").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = body_of(response).await;
        assert_eq!(body.message, "plant 404 not found");
        assert_eq!(spy.calls(), vec![Call::GetDetail(404)]);
    }
}
