//! Attribute layouts of the study-content collections.
//!
//! Field names follow the stored attribute names; serialized arrays go through
//! [`json_string`](super::json_string).

use serde::{Deserialize, Serialize};

use crate::generation::models::{Flashcard, QuizQuestion, StoryboardBoards};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub space_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSetRecord {
    pub chapter_id: String,
    pub title: String,
    #[serde(with = "super::json_string")]
    pub cards: Vec<Flashcard>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "super::json_string")]
    pub questions: Vec<QuizQuestion>,
    pub space_id: String,
    pub chapter_id: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub url: String,
    pub space_id: String,
    pub chapter_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudiobookRecord {
    pub chapter_id: String,
    pub title: String,
    pub file_url: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardRecord {
    pub chapter_id: String,
    pub space_id: String,
    #[serde(default)]
    pub user_id: String,
    pub title: String,
    #[serde(with = "super::json_string")]
    pub boards: StoryboardBoards,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub created_at: String,
}

impl StoryboardRecord {
    /// Image to display: the one inside `boards`, else the top-level `image`.
    pub fn image_url(&self) -> Option<&str> {
        [self.boards.image_url.as_str(), self.image.as_str()]
            .into_iter()
            .find(|u| !u.is_empty())
    }
}

/// Web notes keep the generation service's snake_case field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebNoteRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub detailed_summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(rename = "sourceUrl", default)]
    pub source_url: String,
}
