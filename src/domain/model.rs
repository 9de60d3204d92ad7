use serde::{Deserialize, Serialize};

pub type ItemId = String;
pub type UserId = String;

/// Shown in place of a missing cover image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/120x180";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub author: String,
    pub year: Option<u16>,
    pub image_url: Option<String>,
}

impl Item {
    pub fn image_or_placeholder(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE_URL)
    }
}

/// One row of the interaction history. `rating` is `None` when the row
/// records a consumption without a usable rating.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub item_id: ItemId,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(item_id: impl Into<ItemId>, score: f64) -> Self {
        Self {
            item_id: item_id.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    User { user_id: UserId, top_n: usize },
    Title { text: String, top_n: usize },
}

impl Query {
    pub fn top_n(&self) -> usize {
        match self {
            Query::User { top_n, .. } | Query::Title { top_n, .. } => *top_n,
        }
    }
}

/// A catalog row whose title matched a free-text query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleMatch<'a> {
    pub item: &'a Item,
    pub owner: &'a UserId,
}

/// The resolved anchor of a similar-books query.
///
/// `anchor_user` is the user who owns the matched row; similarity is scored
/// as "what would this user also enjoy".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    pub item: Item,
    pub anchor_user: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item: Item,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarBooks {
    pub reference: Reference,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryOutcome {
    ForUser {
        user_id: UserId,
        recommendations: Vec<Recommendation>,
    },
    Similar(SimilarBooks),
}

impl QueryOutcome {
    pub fn recommendations(&self) -> &[Recommendation] {
        match self {
            QueryOutcome::ForUser { recommendations, .. } => recommendations,
            QueryOutcome::Similar(similar) => &similar.recommendations,
        }
    }
}

/// Everything produced by the one-time load step.
pub struct LoadedAssets<C, A, B> {
    pub catalog: C,
    pub predictor_a: A,
    pub predictor_b: B,
}
