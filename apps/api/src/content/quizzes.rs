use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::baas::models::Document;
use crate::baas::{Collection, DocumentStore, Query};
use crate::errors::AppError;
use crate::generation::models::QuizQuestion;
use crate::models::content::QuizRecord;
use crate::models::{self, now_iso};

pub const DEFAULT_QUIZ_TITLE: &str = "Generated Quiz";
pub const DEFAULT_QUIZ_DESCRIPTION: &str = "Quiz generated from content";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    #[serde(rename = "$id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<QuizQuestion>,
    pub space_id: String,
    pub chapter_id: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<Document<QuizRecord>> for QuizView {
    fn from(doc: Document<QuizRecord>) -> Self {
        let QuizRecord {
            title,
            description,
            questions,
            space_id,
            chapter_id,
            created_by,
            created_at,
        } = doc.data;
        Self {
            id: doc.id,
            title,
            description,
            questions,
            space_id,
            chapter_id,
            created_by,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
}

/// Counts answers equal to the question's `correct_answer`. `answers[i]`
/// belongs to question `i`; unanswered questions count as wrong.
pub fn score(questions: &[QuizQuestion], answers: &[Option<String>]) -> QuizScore {
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| a.as_deref() == Some(q.correct_answer.as_str()))
        .count();
    QuizScore {
        correct,
        total: questions.len(),
    }
}

fn quizzes(store: &dyn DocumentStore) -> Collection<'_, QuizRecord> {
    Collection::new(store, models::QUIZZES)
}

/// Quizzes of a chapter within a space, newest first.
pub async fn list_quizzes(
    store: &dyn DocumentStore,
    chapter_id: &str,
    space_id: &str,
) -> Result<Vec<QuizView>, AppError> {
    let docs = quizzes(store)
        .list(&[
            Query::equal("chapterId", chapter_id),
            Query::equal("spaceId", space_id),
            Query::order_desc("createdAt"),
        ])
        .await?;
    Ok(docs.into_iter().map(QuizView::from).collect())
}

pub async fn get_quiz(store: &dyn DocumentStore, quiz_id: &str) -> Result<QuizView, AppError> {
    Ok(quizzes(store).get(quiz_id).await?.into())
}

pub struct NewQuiz<'a> {
    pub user_id: &'a str,
    pub chapter_id: &'a str,
    pub space_id: &'a str,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub questions: Vec<QuizQuestion>,
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

pub async fn save_quiz(store: &dyn DocumentStore, quiz: NewQuiz<'_>) -> Result<QuizView, AppError> {
    if quiz.questions.is_empty() {
        return Err(AppError::Validation("No quiz questions to save".to_string()));
    }
    let record = QuizRecord {
        title: or_default(quiz.title, DEFAULT_QUIZ_TITLE),
        description: or_default(quiz.description, DEFAULT_QUIZ_DESCRIPTION),
        questions: quiz.questions,
        space_id: quiz.space_id.to_string(),
        chapter_id: quiz.chapter_id.to_string(),
        created_by: quiz.user_id.to_string(),
        created_at: now_iso(),
    };
    Ok(quizzes(store).create(&record, &[]).await?.into())
}

pub async fn rename_quiz(
    store: &dyn DocumentStore,
    quiz_id: &str,
    title: &str,
) -> Result<QuizView, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    Ok(quizzes(store)
        .update(quiz_id, json!({ "title": title }))
        .await?
        .into())
}

pub async fn delete_quiz(store: &dyn DocumentStore, quiz_id: &str) -> Result<(), AppError> {
    quizzes(store).delete(quiz_id).await?;
    Ok(())
}
