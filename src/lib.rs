// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Plant information service.
//!
//! [`app`] builds the HTTP router over any [`PlantController`] and
//! [`KeyValidator`]; [`frontend`] holds the client-side route table the
//! single-page app navigates with.

use axum::{middleware, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub mod api;
pub mod auth;
pub mod controller;
pub mod error;
pub mod frontend;
pub mod import;

pub use auth::{KeyValidator, StaticKeys};
pub use controller::PlantController;

pub struct AppState {
    pub controller: Arc<dyn PlantController>,
    pub keys: Arc<dyn KeyValidator>,
}

pub fn app(controller: Arc<dyn PlantController>, keys: Arc<dyn KeyValidator>) -> Router {
    let state = Arc::new(AppState { controller, keys });

    let router = crate::api::configure(state.clone());

    // routes added after route_layer are served without an api key
    router
        .route_layer(middleware::from_fn_with_state(state, auth::auth))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(api::docs::ApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::controller::{
        ControllerError, CuratingResult, Order, PlantController, PlantDetail, PlantID,
        PlantSummary,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub const TOKEN: &str = "28308fa3aca32470631c27377bbc3f43";

    /// What a handler forwarded to the controller.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        ListPlants(Option<Order>),
        CuratingResult(String),
        SearchByName(String),
        SearchByTag(String),
        GetDetail(PlantID),
    }

    /// Records every call and answers with canned plants.
    #[derive(Default)]
    pub struct SpyController {
        calls: Mutex<Vec<Call>>,
    }

    impl SpyController {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    pub fn detail(id: PlantID, name: &str) -> PlantDetail {
        PlantDetail {
            id,
            name: name.to_owned(),
            scientific_name: None,
            description: None,
            image_url: None,
            water: None,
            light: None,
            difficulty: None,
            tags: vec!["잎".to_owned()],
            view_count: 0,
            created_at: "2025-01-01T00:00:00+00:00".to_owned(),
        }
    }

    pub fn summary(id: PlantID, name: &str) -> PlantSummary {
        PlantSummary {
            id,
            name: name.to_owned(),
            image_url: None,
            tags: vec![],
            view_count: 0,
            created_at: "2025-01-01T00:00:00+00:00".to_owned(),
        }
    }

    #[async_trait]
    impl PlantController for SpyController {
        async fn list_plants(
            &self,
            order: Option<Order>,
        ) -> Result<Vec<PlantSummary>, ControllerError> {
            self.record(Call::ListPlants(order));
            Ok(vec![summary(1, "몬스테라"), summary(2, "스킨답서스")])
        }

        async fn curating_result(&self, result: &str) -> Result<CuratingResult, ControllerError> {
            self.record(Call::CuratingResult(result.to_owned()));
            Ok(CuratingResult {
                plant: detail(1, result),
                curation: Some("curated".to_owned()),
            })
        }

        async fn search_by_name(&self, keyword: &str) -> Result<Vec<PlantSummary>, ControllerError> {
            self.record(Call::SearchByName(keyword.to_owned()));
            Ok(vec![summary(1, keyword)])
        }

        async fn search_by_tag(&self, tags: &str) -> Result<Vec<PlantSummary>, ControllerError> {
            self.record(Call::SearchByTag(tags.to_owned()));
            Ok(vec![])
        }

        async fn get_detail(&self, plant_id: PlantID) -> Result<PlantDetail, ControllerError> {
            self.record(Call::GetDetail(plant_id));
            if plant_id == 404 {
                return Err(ControllerError::NotFound(format!("plant {}", plant_id)));
            }
            Ok(detail(plant_id, "몬스테라"))
        }
    }
}
