//! Typed shapes of generated content, plus the small input/output clean-ups
//! done around generation calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::GenerationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryboardScene {
    pub scene_number: u32,
    #[serde(default)]
    pub supporting_text: String,
    #[serde(default)]
    pub image_prompt: String,
}

/// Payload stored in a storyboard document's `boards` attribute.
///
/// Older documents stored the bare scene array with no image URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoardsPayload")]
pub struct StoryboardBoards {
    pub image_url: String,
    pub storyboards: Vec<StoryboardScene>,
    pub total_boards: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoardsPayload {
    Scenes(Vec<StoryboardScene>),
    Full {
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        storyboards: Vec<StoryboardScene>,
        #[serde(default)]
        total_boards: Option<usize>,
    },
}

impl From<BoardsPayload> for StoryboardBoards {
    fn from(payload: BoardsPayload) -> Self {
        match payload {
            BoardsPayload::Scenes(storyboards) => StoryboardBoards {
                image_url: String::new(),
                total_boards: storyboards.len(),
                storyboards,
            },
            BoardsPayload::Full {
                image_url,
                storyboards,
                total_boards,
            } => StoryboardBoards {
                image_url: image_url.unwrap_or_default(),
                total_boards: total_boards.unwrap_or(storyboards.len()),
                storyboards,
            },
        }
    }
}

impl StoryboardBoards {
    pub fn new(image_url: String, storyboards: Vec<StoryboardScene>) -> Self {
        Self {
            image_url,
            total_boards: storyboards.len(),
            storyboards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notes {
    pub title: String,
    #[serde(default)]
    pub detailed_summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Trims a user-entered URL and adds `https://` when no scheme is given.
pub fn normalize_source_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

/// Keeps the well-formed cards from `data.flashcards`.
pub fn extract_flashcards(data: &Value) -> Result<Vec<Flashcard>, GenerationError> {
    let cards = data
        .get("flashcards")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GenerationError::InvalidResponse("Invalid response format from server".to_string())
        })?;

    let valid: Vec<Flashcard> = cards
        .iter()
        .filter_map(|card| serde_json::from_value::<Flashcard>(card.clone()).ok())
        .collect();

    if valid.is_empty() {
        return Err(GenerationError::InvalidResponse(
            "No valid flashcards found in the response".to_string(),
        ));
    }
    Ok(valid)
}

/// Reads `data.quiz.questions`.
pub fn extract_quiz_questions(data: &Value) -> Result<Vec<QuizQuestion>, GenerationError> {
    let questions = data
        .pointer("/quiz/questions")
        .cloned()
        .ok_or_else(|| GenerationError::InvalidResponse("Invalid quiz data structure".to_string()))?;
    Ok(serde_json::from_value(questions)?)
}

/// Reads the generated scenes and shared image from `data`.
pub fn extract_storyboards(data: &Value) -> Result<StoryboardBoards, GenerationError> {
    if !data.get("storyboards").is_some_and(Value::is_array) {
        return Err(GenerationError::InvalidResponse(
            "Invalid storyboard data structure".to_string(),
        ));
    }
    Ok(serde_json::from_value(data.clone())?)
}

/// Storyboard description with the optional image type and art style
/// appended, e.g. `Water cycle (cartoon style, watercolor)`.
pub fn storyboard_prompt(description: &str, image_type: Option<&str>, art_style: Option<&str>) -> String {
    fn present(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }
    let description = description.trim();
    let extras: Vec<String> = [
        present(image_type).map(|t| format!("{t} style")),
        present(art_style).map(String::from),
    ]
    .into_iter()
    .flatten()
    .collect();
    if extras.is_empty() {
        description.to_string()
    } else {
        format!("{description} ({})", extras.join(", "))
    }
}

/// Returns true for values a JSON client would treat as present: not null,
/// not false, not zero, not an empty string.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
