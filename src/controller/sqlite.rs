// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{
    ControllerError, CuratingResult, Order, PlantController, PlantDetail, PlantID, PlantSummary,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::fs;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{env, path::Path};
use tracing::{debug, info};

const SELECT_PLANTS: &str = r#"
    SELECT plants.*, GROUP_CONCAT(tags.name) AS tag_names
        FROM plants
        LEFT OUTER JOIN plant_tag ON (plants.id = plant_tag.plant_id)
        LEFT OUTER JOIN tags ON (tags.id = plant_tag.tag_id)
"#;

#[derive(sqlx::FromRow, Debug)]
struct PlantDb {
    id: PlantID,
    name: String,
    scientific_name: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    water: Option<String>,
    light: Option<String>,
    difficulty: Option<String>,
    curation: Option<String>,
    view_count: i64,
    date_added: i64,
    tag_names: Option<String>,
}

impl PlantDb {
    fn tags(&self) -> Vec<String> {
        match &self.tag_names {
            Some(names) => names.split(',').map(String::from).collect(),
            None => vec![],
        }
    }

    fn created_at(&self) -> String {
        Utc.timestamp_opt(self.date_added, 0)
            .single()
            .map(|added| added.to_rfc3339())
            .unwrap_or_default()
    }
}

impl From<PlantDb> for PlantSummary {
    fn from(val: PlantDb) -> Self {
        PlantSummary {
            tags: val.tags(),
            created_at: val.created_at(),
            id: val.id,
            name: val.name,
            image_url: val.image_url,
            view_count: val.view_count,
        }
    }
}

impl From<PlantDb> for PlantDetail {
    fn from(val: PlantDb) -> Self {
        PlantDetail {
            tags: val.tags(),
            created_at: val.created_at(),
            id: val.id,
            name: val.name,
            scientific_name: val.scientific_name,
            description: val.description,
            image_url: val.image_url,
            water: val.water,
            light: val.light,
            difficulty: val.difficulty,
            view_count: val.view_count,
        }
    }
}

/// A plant as it is imported into the store.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewPlant {
    pub name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub water: Option<String>,
    pub light: Option<String>,
    pub difficulty: Option<String>,
    pub curation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub view_count: Option<i64>,
    pub date_added: Option<i64>,
}

impl From<sqlx::Error> for ControllerError {
    fn from(err: sqlx::Error) -> Self {
        ControllerError::Internal(err.into())
    }
}

/// Tag names are stored without the leading `#` used by the search form.
pub(crate) fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|tag| tag.trim().trim_start_matches('#').trim())
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Makes `%`, `_` and `\` match literally in a `LIKE ... ESCAPE '\'`.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn database_url() -> anyhow::Result<String> {
    if let Ok(env_db) = env::var("PLANTDEX_DB") {
        if let Some(dir) = Path::new(&env_db).parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory for {}", env_db))?;
        }
        return Ok(format!("sqlite://{}?mode=rwc", env_db));
    }

    let url = match ProjectDirs::from("", "", "plantdex") {
        Some(base_dirs) => {
            let dir = base_dirs.data_dir();
            match fs::create_dir_all(dir) {
                Ok(_) => format!(
                    "sqlite://{}/plantdex.db?mode=rwc",
                    dir.to_string_lossy().into_owned()
                ),
                Err(_) => "sqlite://plantdex.db?mode=rwc".to_owned(),
            }
        }
        None => "sqlite://plantdex.db?mode=rwc".to_owned(),
    };
    Ok(url)
}

/// Plant store backed by SQLite.
///
/// Keyword search is a substring match on the common and scientific name.
/// Tag search returns plants carrying any of the given tags. Looking up a
/// plant's detail counts as a view, which is what `order=view` sorts on.
#[derive(Clone)]
pub struct SqliteController {
    pool: SqlitePool,
}

impl SqliteController {
    pub async fn open(memory: bool) -> anyhow::Result<Self> {
        let db_path = if memory {
            "sqlite::memory:".to_owned()
        } else {
            database_url()?
        };

        info!("Using database: {}", db_path);

        let options = SqliteConnectOptions::from_str(&db_path)
            .context("Failed to parse database string")?
            .create_if_missing(true)
            .foreign_keys(true)
            .log_statements(tracing::log::LevelFilter::Debug);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let controller = SqliteController { pool };
        controller.create_schema().await?;
        Ok(controller)
    }

    async fn create_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
                CREATE TABLE IF NOT EXISTS plants (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    scientific_name TEXT,
                    description TEXT,
                    image_url TEXT,
                    water TEXT,
                    light TEXT,
                    difficulty TEXT,
                    curation TEXT,
                    view_count INTEGER NOT NULL DEFAULT 0,
                    date_added INTEGER NOT NULL
                );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create plants table")?;

        sqlx::query(
            r#"
                CREATE TABLE IF NOT EXISTS tags (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE
                );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create tags table")?;

        sqlx::query(
            r#"
                CREATE TABLE IF NOT EXISTS plant_tag (
                    plant_id INTEGER NOT NULL,
                    tag_id INTEGER NOT NULL,
                    UNIQUE(plant_id, tag_id),
                    FOREIGN KEY(plant_id) REFERENCES plants(id) ON DELETE CASCADE,
                    FOREIGN KEY(tag_id) REFERENCES tags(id) ON DELETE CASCADE
                );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create plant_tag table")?;

        Ok(())
    }

    pub async fn add_plant(&self, plant: NewPlant) -> Result<PlantID, ControllerError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
                INSERT INTO plants
                    (name, scientific_name, description, image_url, water, light, difficulty,
                     curation, view_count, date_added)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&plant.name)
        .bind(&plant.scientific_name)
        .bind(&plant.description)
        .bind(&plant.image_url)
        .bind(&plant.water)
        .bind(&plant.light)
        .bind(&plant.difficulty)
        .bind(&plant.curation)
        .bind(plant.view_count.unwrap_or_default())
        .bind(plant.date_added.unwrap_or_else(now))
        .execute(&mut *tx)
        .await?;

        let plant_id = inserted.last_insert_rowid() as PlantID;

        for tag in plant.tags.iter().flat_map(|tag| parse_tags(tag)) {
            sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
                .bind(&tag)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                r#"
                    INSERT OR IGNORE INTO plant_tag (plant_id, tag_id)
                        SELECT ?, id FROM tags WHERE name = ?
                "#,
            )
            .bind(plant_id)
            .bind(&tag)
            .execute(&mut *tx)
            .await?;
            debug!("tagged plant {} with {}", plant_id, tag);
        }

        tx.commit().await?;
        Ok(plant_id)
    }

    async fn fetch_by_id(&self, plant_id: PlantID) -> Result<Option<PlantDb>, ControllerError> {
        let sql = format!("{SELECT_PLANTS} WHERE plants.id = ? GROUP BY plants.id");
        let row = sqlx::query_as::<_, PlantDb>(&sql)
            .bind(plant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl PlantController for SqliteController {
    async fn list_plants(&self, order: Option<Order>) -> Result<Vec<PlantSummary>, ControllerError> {
        let order_by = match order {
            Some(Order::Recent) => "plants.date_added DESC, plants.id DESC",
            Some(Order::View) => "plants.view_count DESC, plants.id DESC",
            None => "plants.id ASC",
        };
        let sql = format!("{SELECT_PLANTS} GROUP BY plants.id ORDER BY {order_by}");

        let rows = sqlx::query_as::<_, PlantDb>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PlantSummary::from).collect())
    }

    async fn curating_result(&self, result: &str) -> Result<CuratingResult, ControllerError> {
        let sql = format!("{SELECT_PLANTS} WHERE plants.name = ? GROUP BY plants.id");
        let row = sqlx::query_as::<_, PlantDb>(&sql)
            .bind(result)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ControllerError::NotFound(format!("curating result {}", result)))?;

        let curation = row.curation.clone();
        Ok(CuratingResult {
            plant: row.into(),
            curation,
        })
    }

    async fn search_by_name(&self, keyword: &str) -> Result<Vec<PlantSummary>, ControllerError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(vec![]);
        }

        let sql = format!(
            r#"{SELECT_PLANTS}
                WHERE plants.name LIKE '%' || ?1 || '%' ESCAPE '\'
                    OR plants.scientific_name LIKE '%' || ?1 || '%' ESCAPE '\'
                GROUP BY plants.id
                ORDER BY plants.name ASC"#
        );
        let rows = sqlx::query_as::<_, PlantDb>(&sql)
            .bind(escape_like(keyword))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PlantSummary::from).collect())
    }

    async fn search_by_tag(&self, tags: &str) -> Result<Vec<PlantSummary>, ControllerError> {
        let tags = parse_tags(tags);
        if tags.is_empty() {
            return Ok(vec![]);
        }

        let placeholders = vec!["?"; tags.len()].join(", ");
        let sql = format!(
            r#"{SELECT_PLANTS}
                WHERE plants.id IN (
                    SELECT plant_id
                        FROM plant_tag
                        WHERE tag_id IN (
                            SELECT id FROM tags WHERE name IN ({placeholders})
                        )
                )
                GROUP BY plants.id
                ORDER BY plants.id ASC"#
        );

        let mut query = sqlx::query_as::<_, PlantDb>(&sql);
        for tag in &tags {
            query = query.bind(tag.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(PlantSummary::from).collect())
    }

    async fn get_detail(&self, plant_id: PlantID) -> Result<PlantDetail, ControllerError> {
        let updated = sqlx::query("UPDATE plants SET view_count = view_count + 1 WHERE id = ?")
            .bind(plant_id)
            .execute(&self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(ControllerError::NotFound(format!("plant {}", plant_id)));
        }

        match self.fetch_by_id(plant_id).await? {
            Some(row) => Ok(row.into()),
            None => Err(ControllerError::NotFound(format!("plant {}", plant_id))),
        }
    }
}
