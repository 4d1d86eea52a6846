// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Business operations behind the plant routes.
//!
//! The HTTP layer only knows [`PlantController`]; anything implementing it can
//! be handed to [`crate::app`], which is how tests swap in a spy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod sqlite;

pub type PlantID = i64;

/// Sort order accepted by the plant listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Newest first.
    Recent,
    /// Most viewed first.
    View,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PlantSummary {
    pub id: PlantID,
    pub name: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub view_count: i64,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PlantDetail {
    pub id: PlantID,
    pub name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub water: Option<String>,
    pub light: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub view_count: i64,
    pub created_at: String,
}

/// Curated content attached to the plant a quiz ended on.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct CuratingResult {
    pub plant: PlantDetail,
    pub curation: Option<String>,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[async_trait]
pub trait PlantController: Send + Sync {
    async fn list_plants(&self, order: Option<Order>) -> Result<Vec<PlantSummary>, ControllerError>;

    /// `result` is the plant name the curating quiz produced.
    async fn curating_result(&self, result: &str) -> Result<CuratingResult, ControllerError>;

    async fn search_by_name(&self, keyword: &str) -> Result<Vec<PlantSummary>, ControllerError>;

    /// `tags` is the raw comma-delimited list, e.g. `#flower,#fruit`.
    async fn search_by_tag(&self, tags: &str) -> Result<Vec<PlantSummary>, ControllerError>;

    async fn get_detail(&self, plant_id: PlantID) -> Result<PlantDetail, ControllerError>;
}
