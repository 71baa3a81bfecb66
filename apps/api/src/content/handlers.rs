use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Caller;
use crate::baas::models::Document;
use crate::content::chapters::{self, ChapterContent};
use crate::content::flashcards::{self, FlashcardSetView};
use crate::content::quizzes::{self, NewQuiz, QuizScore, QuizView};
use crate::content::storyboards::{self, NewStoryboard, SceneCursor, StoryboardView};
use crate::content::{audiobooks, summaries, webnotes};
use crate::errors::AppError;
use crate::generation::models::{
    extract_flashcards, extract_quiz_questions, extract_storyboards, normalize_source_url,
    storyboard_prompt, Flashcard, Notes, QuizQuestion, StoryboardBoards, StoryboardScene,
};
use crate::generation::Endpoint;
use crate::models::content::{
    AudiobookRecord, ChapterRecord, SummaryRecord, WebNoteRecord,
};
use crate::state::AppState;

type Created<T> = (StatusCode, Json<T>);

fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

// Chapters

#[derive(Debug, Deserialize)]
pub struct ChapterRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// GET /api/v1/spaces/:id/chapters
pub async fn handle_list_chapters(
    caller: Caller,
    Path(space_id): Path<String>,
) -> Result<Json<Vec<Document<ChapterRecord>>>, AppError> {
    Ok(Json(chapters::list_chapters(&caller.baas, &space_id).await?))
}

/// POST /api/v1/spaces/:id/chapters
pub async fn handle_create_chapter(
    caller: Caller,
    Path(space_id): Path<String>,
    Json(req): Json<ChapterRequest>,
) -> Result<Created<Document<ChapterRecord>>, AppError> {
    let chapter = chapters::create_chapter(
        &caller.baas,
        &caller.user.id,
        &space_id,
        &req.name,
        &req.description,
    )
    .await?;
    Ok(created(chapter))
}

/// GET /api/v1/chapters/:id
pub async fn handle_get_chapter(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<Json<Document<ChapterRecord>>, AppError> {
    Ok(Json(chapters::get_chapter(&caller.baas, &chapter_id).await?))
}

/// PATCH /api/v1/chapters/:id
pub async fn handle_update_chapter(
    caller: Caller,
    Path(chapter_id): Path<String>,
    Json(req): Json<ChapterRequest>,
) -> Result<Json<Document<ChapterRecord>>, AppError> {
    let chapter =
        chapters::update_chapter(&caller.baas, &chapter_id, &req.name, &req.description).await?;
    Ok(Json(chapter))
}

/// DELETE /api/v1/chapters/:id
pub async fn handle_delete_chapter(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<StatusCode, AppError> {
    chapters::delete_chapter(&caller.baas, &chapter_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/chapters/:id/content
pub async fn handle_chapter_content(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<Json<ChapterContent>, AppError> {
    let chapter = chapters::get_chapter(&caller.baas, &chapter_id).await?;
    let content =
        chapters::chapter_content(&caller.baas, &chapter_id, &chapter.data.space_id).await;
    Ok(Json(content))
}

// Flashcards

#[derive(Debug, Deserialize)]
pub struct GenerateFromUrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveFlashcardsRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

/// POST /api/v1/flashcards/generate
///
/// Generates cards for a page without storing them.
pub async fn handle_generate_flashcards(
    State(state): State<AppState>,
    Json(req): Json<GenerateFromUrlRequest>,
) -> Result<Json<Value>, AppError> {
    let url = normalize_source_url(&req.url)
        .ok_or_else(|| AppError::Validation("Please enter a URL".to_string()))?;
    let data = state
        .generation
        .call(Endpoint::Flashcards, &json!({ "url": url }))
        .await?;
    let cards = extract_flashcards(&data)?;
    Ok(Json(json!({ "flashcards": cards })))
}

/// GET /api/v1/chapters/:id/flashcards
pub async fn handle_list_flashcards(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<Json<Vec<FlashcardSetView>>, AppError> {
    Ok(Json(flashcards::list_sets(&caller.baas, &chapter_id).await?))
}

/// POST /api/v1/chapters/:id/flashcards
pub async fn handle_save_flashcards(
    caller: Caller,
    Path(chapter_id): Path<String>,
    Json(req): Json<SaveFlashcardsRequest>,
) -> Result<Created<FlashcardSetView>, AppError> {
    let set = flashcards::save_set(
        &caller.baas,
        &caller.user.id,
        &chapter_id,
        req.title.as_deref(),
        req.cards,
    )
    .await?;
    Ok(created(set))
}

/// PATCH /api/v1/flashcards/:id
pub async fn handle_rename_flashcards(
    caller: Caller,
    Path(set_id): Path<String>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<FlashcardSetView>, AppError> {
    Ok(Json(flashcards::rename_set(&caller.baas, &set_id, &req.title).await?))
}

/// DELETE /api/v1/flashcards/:id
pub async fn handle_delete_flashcards(
    caller: Caller,
    Path(set_id): Path<String>,
) -> Result<StatusCode, AppError> {
    flashcards::delete_set(&caller.baas, &set_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/flashcards/:id/cards/:index
pub async fn handle_update_card(
    caller: Caller,
    Path((set_id, index)): Path<(String, usize)>,
    Json(card): Json<Flashcard>,
) -> Result<Json<FlashcardSetView>, AppError> {
    Ok(Json(
        flashcards::update_card(&caller.baas, &set_id, index, card).await?,
    ))
}

/// DELETE /api/v1/flashcards/:id/cards/:index
pub async fn handle_delete_card(
    caller: Caller,
    Path((set_id, index)): Path<(String, usize)>,
) -> Result<Json<FlashcardSetView>, AppError> {
    Ok(Json(flashcards::delete_card(&caller.baas, &set_id, index).await?))
}

// Quizzes

#[derive(Debug, Deserialize)]
pub struct SaveQuizRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub answers: Vec<Option<String>>,
}

/// POST /api/v1/quizzes/generate
///
/// The body is sent to the quiz generator as-is.
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let data = state.generation.call(Endpoint::Quiz, &body).await?;
    let questions = extract_quiz_questions(&data)?;
    Ok(Json(json!({ "questions": questions })))
}

/// GET /api/v1/chapters/:id/quizzes
pub async fn handle_list_quizzes(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<Json<Vec<QuizView>>, AppError> {
    let chapter = chapters::get_chapter(&caller.baas, &chapter_id).await?;
    let list = quizzes::list_quizzes(&caller.baas, &chapter_id, &chapter.data.space_id).await?;
    Ok(Json(list))
}

/// POST /api/v1/chapters/:id/quizzes
pub async fn handle_save_quiz(
    caller: Caller,
    Path(chapter_id): Path<String>,
    Json(req): Json<SaveQuizRequest>,
) -> Result<Created<QuizView>, AppError> {
    let chapter = chapters::get_chapter(&caller.baas, &chapter_id).await?;
    let quiz = quizzes::save_quiz(
        &caller.baas,
        NewQuiz {
            user_id: &caller.user.id,
            chapter_id: &chapter_id,
            space_id: &chapter.data.space_id,
            title: req.title.as_deref(),
            description: req.description.as_deref(),
            questions: req.questions,
        },
    )
    .await?;
    Ok(created(quiz))
}

/// PATCH /api/v1/quizzes/:id
pub async fn handle_rename_quiz(
    caller: Caller,
    Path(quiz_id): Path<String>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<QuizView>, AppError> {
    Ok(Json(quizzes::rename_quiz(&caller.baas, &quiz_id, &req.title).await?))
}

/// DELETE /api/v1/quizzes/:id
pub async fn handle_delete_quiz(
    caller: Caller,
    Path(quiz_id): Path<String>,
) -> Result<StatusCode, AppError> {
    quizzes::delete_quiz(&caller.baas, &quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/quizzes/:id/score
pub async fn handle_score_quiz(
    caller: Caller,
    Path(quiz_id): Path<String>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<QuizScore>, AppError> {
    let quiz = quizzes::get_quiz(&caller.baas, &quiz_id).await?;
    Ok(Json(quizzes::score(&quiz.questions, &req.answers)))
}

// Summaries

#[derive(Debug, Deserialize)]
pub struct SaveSummaryRequest {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub url: String,
}

/// GET /api/v1/chapters/:id/summaries
pub async fn handle_list_summaries(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<Json<Vec<Document<SummaryRecord>>>, AppError> {
    let chapter = chapters::get_chapter(&caller.baas, &chapter_id).await?;
    let list =
        summaries::list_summaries(&caller.baas, &chapter_id, &chapter.data.space_id).await?;
    Ok(Json(list))
}

/// POST /api/v1/chapters/:id/summaries
pub async fn handle_save_summary(
    caller: Caller,
    Path(chapter_id): Path<String>,
    Json(req): Json<SaveSummaryRequest>,
) -> Result<Created<Document<SummaryRecord>>, AppError> {
    let chapter = chapters::get_chapter(&caller.baas, &chapter_id).await?;
    let summary = summaries::save_summary(
        &caller.baas,
        &caller.user.id,
        &chapter_id,
        &chapter.data.space_id,
        &req.title,
        &req.summary,
        &req.url,
    )
    .await?;
    Ok(created(summary))
}

/// DELETE /api/v1/summaries/:id
pub async fn handle_delete_summary(
    caller: Caller,
    Path(summary_id): Path<String>,
) -> Result<StatusCode, AppError> {
    summaries::delete_summary(&caller.baas, &summary_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Storyboards

#[derive(Debug, Deserialize)]
pub struct GenerateStoryboardRequest {
    pub description: String,
    pub number_of_boards: u32,
    #[serde(default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub art_style: Option<String>,
}

/// POST /api/v1/storyboards/generate
///
/// Generates scenes and an image without storing them.
pub async fn handle_generate_storyboard(
    State(state): State<AppState>,
    Json(req): Json<GenerateStoryboardRequest>,
) -> Result<Json<StoryboardBoards>, AppError> {
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("Description is required".to_string()));
    }
    if req.number_of_boards == 0 {
        return Err(AppError::Validation("Number of boards is required".to_string()));
    }
    let description = storyboard_prompt(
        &req.description,
        req.image_type.as_deref(),
        req.art_style.as_deref(),
    );
    let data = state
        .generation
        .call(
            Endpoint::Storyboards,
            &json!({ "description": description, "number_of_boards": req.number_of_boards }),
        )
        .await?;
    Ok(Json(extract_storyboards(&data)?))
}

#[derive(Debug, Deserialize)]
pub struct SaveStoryboardRequest {
    pub description: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub storyboards: Vec<StoryboardScene>,
}

/// GET /api/v1/chapters/:id/storyboards
pub async fn handle_list_storyboards(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<Json<Vec<StoryboardView>>, AppError> {
    Ok(Json(
        storyboards::list_storyboards(&caller.baas, &chapter_id).await?,
    ))
}

/// POST /api/v1/chapters/:id/storyboards
pub async fn handle_save_storyboard(
    State(state): State<AppState>,
    caller: Caller,
    Path(chapter_id): Path<String>,
    Json(req): Json<SaveStoryboardRequest>,
) -> Result<Created<StoryboardView>, AppError> {
    let chapter = chapters::get_chapter(&caller.baas, &chapter_id).await?;
    let storyboard = storyboards::save_storyboard(
        &caller.baas,
        &caller.baas,
        &state.generation,
        NewStoryboard {
            user_id: &caller.user.id,
            chapter_id: &chapter_id,
            space_id: &chapter.data.space_id,
            description: &req.description,
            image_url: &req.image_url,
            scenes: req.storyboards,
        },
    )
    .await?;
    Ok(created(storyboard))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneStep {
    Next,
    Previous,
    #[default]
    Stay,
}

#[derive(Debug, Deserialize)]
pub struct SceneQuery {
    #[serde(default)]
    pub step: SceneStep,
}

/// GET /api/v1/storyboards/:id/scenes/:index[?step=next|previous]
///
/// Out-of-range indexes land on the nearest scene; stepping past either end
/// stays on the first or last scene.
pub async fn handle_storyboard_scene(
    caller: Caller,
    Path((storyboard_id, index)): Path<(String, usize)>,
    Query(query): Query<SceneQuery>,
) -> Result<Json<Value>, AppError> {
    let storyboard = storyboards::get_storyboard(&caller.baas, &storyboard_id).await?;
    let mut cursor = SceneCursor::at(storyboard.boards.len(), index);
    match query.step {
        SceneStep::Next => {
            cursor.next();
        }
        SceneStep::Previous => {
            cursor.previous();
        }
        SceneStep::Stay => {}
    }
    let scene = storyboard
        .boards
        .get(cursor.index())
        .ok_or_else(|| AppError::NotFound("Storyboard has no scenes".to_string()))?;
    Ok(Json(json!({
        "index": cursor.index(),
        "scene": scene,
        "hasNext": cursor.has_next(),
        "hasPrevious": cursor.has_previous(),
        "imageUrl": storyboard.image_url,
    })))
}

/// DELETE /api/v1/storyboards/:id
pub async fn handle_delete_storyboard(
    caller: Caller,
    Path(storyboard_id): Path<String>,
) -> Result<StatusCode, AppError> {
    storyboards::delete_storyboard(&caller.baas, &caller.baas, &storyboard_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Audiobooks

#[derive(Debug, Deserialize)]
pub struct SaveAudiobookRequest {
    pub title: String,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(default)]
    pub script: String,
}

/// GET /api/v1/chapters/:id/audiobooks
pub async fn handle_list_audiobooks(
    caller: Caller,
    Path(chapter_id): Path<String>,
) -> Result<Json<Vec<Document<AudiobookRecord>>>, AppError> {
    Ok(Json(
        audiobooks::list_audiobooks(&caller.baas, &chapter_id).await?,
    ))
}

/// POST /api/v1/chapters/:id/audiobooks
pub async fn handle_save_audiobook(
    caller: Caller,
    Path(chapter_id): Path<String>,
    Json(req): Json<SaveAudiobookRequest>,
) -> Result<Created<Document<AudiobookRecord>>, AppError> {
    let audiobook = audiobooks::save_audiobook(
        &caller.baas,
        &chapter_id,
        &req.title,
        &req.file_url,
        &req.script,
    )
    .await?;
    Ok(created(audiobook))
}

/// DELETE /api/v1/audiobooks/:id
pub async fn handle_delete_audiobook(
    caller: Caller,
    Path(audiobook_id): Path<String>,
) -> Result<StatusCode, AppError> {
    audiobooks::delete_audiobook(&caller.baas, &audiobook_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Web notes

#[derive(Debug, Deserialize)]
pub struct SaveWebNoteRequest {
    pub notes: Notes,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
}

/// GET /api/v1/webnotes
pub async fn handle_list_webnotes(
    caller: Caller,
) -> Result<Json<Vec<Document<WebNoteRecord>>>, AppError> {
    Ok(Json(
        webnotes::list_webnotes(&caller.baas, &caller.user.id).await?,
    ))
}

/// POST /api/v1/webnotes
pub async fn handle_save_webnote(
    caller: Caller,
    Json(req): Json<SaveWebNoteRequest>,
) -> Result<Created<Document<WebNoteRecord>>, AppError> {
    let note =
        webnotes::save_webnote(&caller.baas, &caller.user.id, req.notes, &req.source_url).await?;
    Ok(created(note))
}

/// DELETE /api/v1/webnotes/:id
pub async fn handle_delete_webnote(
    caller: Caller,
    Path(note_id): Path<String>,
) -> Result<StatusCode, AppError> {
    webnotes::delete_webnote(&caller.baas, &note_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
