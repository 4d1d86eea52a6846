// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::api::handlers::plants::{self, KeywordSearch, TagSearch};
use crate::controller::{CuratingResult, Order, PlantDetail, PlantSummary};
use crate::error::ErrorBody;
use utoipa::OpenApi;

/// OpenAPI document for the plant routes, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        plants::list_plants,
        plants::curating_result,
        plants::search_by_name,
        plants::search_by_tag,
        plants::detail_plant,
    ),
    components(schemas(
        PlantSummary,
        PlantDetail,
        CuratingResult,
        KeywordSearch,
        TagSearch,
        ErrorBody,
        Order,
    )),
    tags(
        (name = "plants", description = "Plant listings, encyclopedia search and curating results"),
    )
)]
pub struct ApiDoc;
