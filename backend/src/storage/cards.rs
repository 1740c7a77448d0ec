//! # Saved Cards
//!
//! Cards saved from the single-card flow are kept in the `cards` table of a SQLite
//! database. The rendered image, when one is supplied, is written as a blob under
//! `<asset_dir>/<owner>/<id>.png` and the row keeps the durable
//! `/assets/<owner>/<id>.png` reference instead of the bytes.
//!
//! The owner string is the namespace of the caller. It is reduced to
//! alphanumerics, `-` and `_` before it touches the filesystem.

use crate::error::BulkError;
use crate::media::decode_data_url;
use common::model::card::SavedCard;
use common::model::design::CardConfig;
use common::requests::SaveCardRequest;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cards (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    config TEXT NOT NULL,
    image_url TEXT,
    updated_at TEXT NOT NULL
)";

/// Keep ASCII alphanumerics, `-` and `_`.
pub fn sanitize_owner(owner: &str) -> String {
    owner
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

type CardRow = (String, String, String, Option<String>, String);

fn row_to_card(row: CardRow) -> Result<SavedCard, BulkError> {
    let (id, owner, config, image_url, updated_at) = row;
    let config: CardConfig = serde_json::from_str(&config)?;
    Ok(SavedCard {
        id,
        owner,
        config,
        image_url,
        updated_at,
    })
}

pub struct CardRepository {
    conn: Mutex<Connection>,
    asset_dir: PathBuf,
}

impl CardRepository {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path, asset_dir: PathBuf) -> Result<Self, BulkError> {
        let conn = Connection::open(path)?;
        info!("Saved-card database at {}", path.display());
        Self::with_connection(conn, asset_dir)
    }

    pub fn in_memory(asset_dir: PathBuf) -> Result<Self, BulkError> {
        Self::with_connection(Connection::open_in_memory()?, asset_dir)
    }

    fn with_connection(conn: Connection, asset_dir: PathBuf) -> Result<Self, BulkError> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
            asset_dir,
        })
    }

    /// Insert or replace a card. A supplied image replaces the stored blob; without
    /// one the previous image reference is kept.
    pub fn save(&self, request: SaveCardRequest) -> Result<SavedCard, BulkError> {
        let owner = sanitize_owner(&request.owner);
        if owner.is_empty() {
            return Err(BulkError::BadRequest("owner must not be empty".to_string()));
        }
        let id = match request.id.filter(|id| !id.trim().is_empty()) {
            Some(id) if sanitize_owner(&id) != id => {
                return Err(BulkError::BadRequest(format!("invalid card id '{id}'")));
            }
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };

        let image_url = match request.image {
            Some(image) => Some(self.write_image(&owner, &id, &image)?),
            None => self.find(&id)?.and_then(|card| card.image_url),
        };

        let card = SavedCard {
            id,
            owner,
            config: request.config,
            image_url,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        let config = serde_json::to_string(&card.config)?;

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT OR REPLACE INTO cards (id, owner, config, image_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![card.id, card.owner, config, card.image_url, card.updated_at],
        )?;
        info!("Saved card {} for {}", card.id, card.owner);
        Ok(card)
    }

    fn write_image(&self, owner: &str, id: &str, image: &str) -> Result<String, BulkError> {
        let bytes = match decode_data_url(image) {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                return Err(BulkError::BadRequest(format!("image is not valid base64: {e}")))
            }
            None => {
                return Err(BulkError::BadRequest(
                    "image must be a base64 data URL".to_string(),
                ))
            }
        };
        let dir = self.asset_dir.join(owner);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{id}.png"));
        fs::write(&path, bytes)?;
        debug!("Wrote card image {}", path.display());
        Ok(format!("/assets/{owner}/{id}.png"))
    }

    fn find(&self, id: &str) -> Result<Option<SavedCard>, BulkError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let row: Option<CardRow> = conn
            .query_row(
                "SELECT id, owner, config, image_url, updated_at FROM cards WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;
        row.map(row_to_card).transpose()
    }

    pub fn get(&self, id: &str) -> Result<SavedCard, BulkError> {
        self.find(id)?
            .ok_or_else(|| BulkError::NotFound(format!("Card {id}")))
    }

    /// Cards of one owner, most recently updated first.
    pub fn list_for_owner(&self, owner: &str) -> Result<Vec<SavedCard>, BulkError> {
        let owner = sanitize_owner(owner);
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT id, owner, config, image_url, updated_at FROM cards
             WHERE owner = ?1 ORDER BY updated_at DESC",
        )?;
        let rows = stmt
            .query_map(params![owner], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<Result<Vec<CardRow>, _>>()?;
        rows.into_iter().map(row_to_card).collect()
    }

    /// Resolve `/assets/<owner>/<file>` to a blob path, refusing anything that
    /// would leave the asset directory.
    pub fn asset_path(&self, owner: &str, file_name: &str) -> Option<PathBuf> {
        let stem = file_name.strip_suffix(".png")?;
        if owner.is_empty() || sanitize_owner(owner) != owner || sanitize_owner(stem) != stem {
            return None;
        }
        Some(self.asset_dir.join(owner).join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::to_data_url;
    use common::model::design::DesignSettings;
    use common::model::field::Category;

    fn config(name: &str) -> CardConfig {
        let mut fields = Category::Corporate.default_fields();
        fields[0].value = name.to_string();
        CardConfig {
            design: DesignSettings::default(),
            fields,
            photo: None,
        }
    }

    fn request(id: Option<&str>, owner: &str, image: Option<String>) -> SaveCardRequest {
        SaveCardRequest {
            id: id.map(str::to_string),
            owner: owner.to_string(),
            config: config("Asha"),
            image,
        }
    }

    #[test]
    fn test_save_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CardRepository::in_memory(dir.path().to_path_buf()).unwrap();
        let saved = repo.save(request(None, "user-1", None)).unwrap();
        assert!(!saved.id.is_empty());
        assert!(saved.image_url.is_none());

        let loaded = repo.get(&saved.id).unwrap();
        assert_eq!(loaded.config, saved.config);
        assert_eq!(loaded.owner, "user-1");
    }

    #[test]
    fn test_image_is_written_under_owner() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CardRepository::in_memory(dir.path().to_path_buf()).unwrap();
        let image = to_data_url("image/png", b"\x89PNG fake");
        let saved = repo
            .save(request(Some("card1"), "../al ice", Some(image)))
            .unwrap();

        assert_eq!(saved.owner, "alice");
        assert_eq!(saved.image_url.as_deref(), Some("/assets/alice/card1.png"));
        let blob = fs::read(dir.path().join("alice").join("card1.png")).unwrap();
        assert_eq!(blob, b"\x89PNG fake");
    }

    #[test]
    fn test_resave_without_image_keeps_reference() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CardRepository::in_memory(dir.path().to_path_buf()).unwrap();
        let image = to_data_url("image/png", b"png");
        repo.save(request(Some("c1"), "bob", Some(image))).unwrap();

        let mut again = request(Some("c1"), "bob", None);
        again.config = config("Asha Rao");
        let saved = repo.save(again).unwrap();
        assert_eq!(saved.image_url.as_deref(), Some("/assets/bob/c1.png"));
        assert_eq!(repo.get("c1").unwrap().config.fields[0].value, "Asha Rao");
    }

    #[test]
    fn test_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CardRepository::in_memory(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            repo.save(request(None, "///", None)),
            Err(BulkError::BadRequest(_))
        ));
        assert!(matches!(
            repo.save(request(Some("../x"), "bob", None)),
            Err(BulkError::BadRequest(_))
        ));
        assert!(matches!(
            repo.save(request(None, "bob", Some("https://x/y.png".into()))),
            Err(BulkError::BadRequest(_))
        ));
        assert!(matches!(repo.get("missing"), Err(BulkError::NotFound(_))));
    }

    #[test]
    fn test_list_for_owner() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CardRepository::in_memory(dir.path().to_path_buf()).unwrap();
        repo.save(request(Some("a"), "bob", None)).unwrap();
        repo.save(request(Some("b"), "bob", None)).unwrap();
        repo.save(request(Some("c"), "eve", None)).unwrap();
        let mut ids: Vec<String> = repo
            .list_for_owner("bob")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_asset_path_stays_inside_asset_dir() {
        let repo = CardRepository::in_memory(PathBuf::from("assets")).unwrap();
        assert_eq!(
            repo.asset_path("bob", "c1.png"),
            Some(PathBuf::from("assets/bob/c1.png"))
        );
        assert!(repo.asset_path("..", "c1.png").is_none());
        assert!(repo.asset_path("bob", "../c1.png").is_none());
        assert!(repo.asset_path("bob", "c1.txt").is_none());
    }
}
