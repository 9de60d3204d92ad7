use crate::domain::model::{Interaction, Item, ItemId, TitleMatch, UserId};
use crate::domain::ports::CatalogStore;
use crate::utils::error::{RecError, Result};
use crate::utils::validation::validate_image_url;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// One row of the merged ratings/books CSV. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "User-ID")]
    user_id: String,
    #[serde(rename = "ISBN")]
    isbn: String,
    #[serde(rename = "Book-Rating", default, deserialize_with = "csv::invalid_option")]
    rating: Option<f64>,
    #[serde(rename = "Book-Title", default)]
    title: String,
    #[serde(rename = "Book-Author", default)]
    author: String,
    #[serde(rename = "Year-Of-Publication", default, deserialize_with = "csv::invalid_option")]
    year: Option<u16>,
    #[serde(rename = "Image-URL-M", default)]
    image_url: Option<String>,
}

/// Catalog and interaction history held in memory for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: HashMap<ItemId, Item>,
    item_order: Vec<ItemId>,
    user_order: Vec<UserId>,
    consumed: HashMap<UserId, HashSet<ItemId>>,
    rows: Vec<Interaction>,
    lowered_titles: HashMap<ItemId, String>,
}

impl InMemoryCatalog {
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut catalog = Self::default();
        let mut skipped = 0usize;
        for record in csv_reader.deserialize::<CatalogRow>() {
            let row = record?;
            if row.user_id.is_empty() || row.isbn.is_empty() {
                skipped += 1;
                continue;
            }
            catalog.push_row(row);
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} catalog rows without a user id or ISBN", skipped);
        }
        if catalog.item_order.is_empty() {
            return Err(RecError::AssetError {
                asset: "catalog".to_string(),
                message: "catalog contains no usable rows".to_string(),
            });
        }

        catalog.finish();
        tracing::info!(
            "Loaded catalog: {} rows, {} books, {} users",
            catalog.rows.len(),
            catalog.item_order.len(),
            catalog.user_order.len()
        );
        Ok(catalog)
    }

    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        Self::from_csv_reader(data)
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.rows
    }

    fn push_row(&mut self, row: CatalogRow) {
        // 同一 ISBN 以第一筆資料的書籍資訊為準
        if !self.items.contains_key(&row.isbn) {
            let image_url = row
                .image_url
                .as_deref()
                .filter(|raw| !raw.is_empty())
                .and_then(|raw| match validate_image_url("Image-URL-M", raw) {
                    Ok(_) => Some(raw.to_string()),
                    Err(e) => {
                        tracing::debug!("Dropping image reference for {}: {}", row.isbn, e);
                        None
                    }
                });

            let item = Item {
                id: row.isbn.clone(),
                title: row.title.clone(),
                author: row.author.clone(),
                year: row.year.filter(|year| *year > 0),
                image_url,
            };
            self.lowered_titles.insert(row.isbn.clone(), row.title.to_lowercase());
            self.item_order.push(row.isbn.clone());
            self.items.insert(row.isbn.clone(), item);
        }

        self.consumed
            .entry(row.user_id.clone())
            .or_default()
            .insert(row.isbn.clone());
        self.rows.push(Interaction {
            user_id: row.user_id,
            item_id: row.isbn,
            rating: row.rating.filter(|rating| rating.is_finite()),
        });
    }

    fn finish(&mut self) {
        let mut users: Vec<UserId> = self.consumed.keys().cloned().collect();
        users.sort_by(|a, b| compare_user_ids(a, b));
        self.user_order = users;
    }
}

/// Numeric ids compare numerically; anything else falls back to text order.
fn compare_user_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl CatalogStore for InMemoryCatalog {
    fn get_item(&self, item_id: &str) -> Option<&Item> {
        self.items.get(item_id)
    }

    fn all_item_ids(&self) -> &[ItemId] {
        &self.item_order
    }

    fn all_user_ids(&self) -> &[UserId] {
        &self.user_order
    }

    fn contains_user(&self, user_id: &str) -> bool {
        self.consumed.contains_key(user_id)
    }

    fn consumed_items(&self, user_id: &str) -> Option<&HashSet<ItemId>> {
        self.consumed.get(user_id)
    }

    fn find_titles_containing(&self, text: &str) -> Vec<TitleMatch<'_>> {
        let needle = text.to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                self.lowered_titles
                    .get(&row.item_id)
                    .is_some_and(|title| title.contains(&needle))
            })
            .filter_map(|row| {
                self.items.get(&row.item_id).map(|item| TitleMatch {
                    item,
                    owner: &row.user_id,
                })
            })
            .collect()
    }
}
