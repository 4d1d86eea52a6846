// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{error, info};

use crate::controller::sqlite::{NewPlant, SqliteController};

/// Seeds the store from a JSON array of plants. Returns how many were added.
///
/// A plant that fails to insert (usually a duplicate name) is reported and
/// skipped; the rest of the file is still imported.
pub async fn import(path: impl AsRef<Path>, store: &SqliteController) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let plants: Vec<NewPlant> = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut success = 0;
    let mut failed = vec![];
    for plant in plants {
        let name = plant.name.clone();
        match store.add_plant(plant).await {
            Ok(_id) => success += 1,
            Err(err) => {
                error!("Failed to import {}: {}", name, err);
                failed.push(name);
            }
        };
    }

    info!("Imported {} plants", success);

    if !failed.is_empty() {
        error!("Failed to import:\n{}", failed.join("\n"));
    }

    Ok(success)
}
