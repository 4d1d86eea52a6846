// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::error::ApiError;
use crate::AppState;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::error;

pub const API_KEY_HEADER: &str = "api-key";

#[async_trait]
pub trait KeyValidator: Send + Sync {
    async fn is_valid(&self, key: &str) -> bool;
}

/// Accepts a fixed set of keys, read from the environment at start up.
#[derive(Debug, Default)]
pub struct StaticKeys {
    keys: HashSet<String>,
}

impl StaticKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticKeys {
            keys: keys
                .into_iter()
                .map(Into::into)
                .filter(|key: &String| !key.is_empty())
                .collect(),
        }
    }

    /// Parses a comma-separated list such as `PLANTDEX_API_KEYS`.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyValidator for StaticKeys {
    async fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

pub(crate) async fn auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let Some(key) = key else {
        error!("No api key on {} {}", req.method(), req.uri().path());
        return Err(ApiError::Unauthorized);
    };

    if state.keys.is_valid(&key).await {
        Ok(next.run(req).await)
    } else {
        error!("Invalid api key on {} {}", req.method(), req.uri().path());
        Err(ApiError::Unauthorized)
    }
}
