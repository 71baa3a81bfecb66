pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::content::handlers as content;
use crate::generation::{handlers as proxy, import};
use crate::spaces::handlers as spaces;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation proxies
        .route("/api/flashcards", post(proxy::handle_flashcards))
        .route("/api/quiz", post(proxy::handle_quiz))
        .route("/api/storyboards", post(proxy::handle_storyboards))
        .route("/api/audiobook", post(proxy::handle_audiobook))
        .route("/api/notes", post(proxy::handle_notes))
        .route("/api/sitemap", post(proxy::handle_sitemap))
        .route("/api/search", post(proxy::handle_search))
        .route("/api/download-image", post(proxy::handle_download_image))
        // Auth
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/me", get(auth::handle_me))
        // Spaces
        .route(
            "/api/v1/spaces",
            get(spaces::handle_list_spaces).post(spaces::handle_create_space),
        )
        .route("/api/v1/spaces/join", post(spaces::handle_join_space))
        .route(
            "/api/v1/spaces/:id",
            get(spaces::handle_get_space)
                .patch(spaces::handle_rename_space)
                .delete(spaces::handle_delete_space),
        )
        .route("/api/v1/spaces/:id/members", get(spaces::handle_list_members))
        .route("/api/v1/spaces/:id/overview", get(spaces::handle_space_overview))
        .route(
            "/api/v1/spaces/:id/chapters",
            get(content::handle_list_chapters).post(content::handle_create_chapter),
        )
        // Chapters
        .route(
            "/api/v1/chapters/:id",
            get(content::handle_get_chapter)
                .patch(content::handle_update_chapter)
                .delete(content::handle_delete_chapter),
        )
        .route("/api/v1/chapters/:id/content", get(content::handle_chapter_content))
        .route(
            "/api/v1/chapters/:id/flashcards",
            get(content::handle_list_flashcards).post(content::handle_save_flashcards),
        )
        .route(
            "/api/v1/chapters/:id/quizzes",
            get(content::handle_list_quizzes).post(content::handle_save_quiz),
        )
        .route(
            "/api/v1/chapters/:id/summaries",
            get(content::handle_list_summaries).post(content::handle_save_summary),
        )
        .route(
            "/api/v1/chapters/:id/storyboards",
            get(content::handle_list_storyboards).post(content::handle_save_storyboard),
        )
        .route(
            "/api/v1/chapters/:id/audiobooks",
            get(content::handle_list_audiobooks).post(content::handle_save_audiobook),
        )
        // Flashcards
        .route(
            "/api/v1/flashcards/generate",
            post(content::handle_generate_flashcards),
        )
        .route(
            "/api/v1/flashcards/:id",
            patch(content::handle_rename_flashcards).delete(content::handle_delete_flashcards),
        )
        .route(
            "/api/v1/flashcards/:id/cards/:index",
            put(content::handle_update_card).delete(content::handle_delete_card),
        )
        // Quizzes
        .route("/api/v1/quizzes/generate", post(content::handle_generate_quiz))
        .route(
            "/api/v1/quizzes/:id",
            patch(content::handle_rename_quiz).delete(content::handle_delete_quiz),
        )
        .route("/api/v1/quizzes/:id/score", post(content::handle_score_quiz))
        // Other content
        .route("/api/v1/summaries/:id", delete(content::handle_delete_summary))
        .route(
            "/api/v1/storyboards/generate",
            post(content::handle_generate_storyboard),
        )
        .route("/api/v1/storyboards/:id", delete(content::handle_delete_storyboard))
        .route(
            "/api/v1/storyboards/:id/scenes/:index",
            get(content::handle_storyboard_scene),
        )
        .route("/api/v1/audiobooks/:id", delete(content::handle_delete_audiobook))
        .route(
            "/api/v1/webnotes",
            get(content::handle_list_webnotes).post(content::handle_save_webnote),
        )
        .route("/api/v1/webnotes/:id", delete(content::handle_delete_webnote))
        // Website import
        .route("/api/v1/import/pages", post(import::handle_import_pages))
        .route("/api/v1/import/notes", post(import::handle_import_notes))
        .with_state(state)
}
