use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::baas::models::{Membership, Team, TeamPrefs, User};
use crate::baas::{BaasClient, Collection, DocumentStore, Query};
use crate::errors::AppError;
use crate::models::content::{ChapterRecord, FlashcardSetRecord, QuizRecord, StoryboardRecord, SummaryRecord};
use crate::models::{self, now_iso};
use crate::spaces::join_code::generate_join_code;

/// A space together with its member list, as seen by one user.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceView {
    #[serde(flatten)]
    pub team: Team,
    pub memberships: Vec<Membership>,
    #[serde(rename = "isOwner")]
    pub is_owner: bool,
    #[serde(rename = "isMember")]
    pub is_member: bool,
}

impl SpaceView {
    fn new(team: Team, memberships: Vec<Membership>, viewer_id: &str) -> Self {
        Self {
            is_owner: is_owner(&memberships, viewer_id),
            is_member: is_member(&memberships, viewer_id),
            team,
            memberships,
        }
    }
}

/// Dashboard counters for one space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpaceOverview {
    pub chapters: usize,
    pub flashcards: usize,
    pub storyboards: usize,
    pub quizzes: usize,
    pub summaries: usize,
}

pub fn is_owner(memberships: &[Membership], user_id: &str) -> bool {
    memberships
        .iter()
        .any(|m| m.user_id == user_id && m.is_owner())
}

pub fn is_member(memberships: &[Membership], user_id: &str) -> bool {
    memberships.iter().any(|m| m.user_id == user_id)
}

fn require_teacher(user: &User) -> Result<(), AppError> {
    if user.is_teacher() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn space_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Space name is required".to_string()));
    }
    Ok(name)
}

/// Lists the caller's spaces with memberships fetched concurrently.
/// A team whose memberships cannot be read gets an empty member list.
pub async fn list_spaces(baas: &BaasClient, viewer_id: &str) -> Result<Vec<SpaceView>, AppError> {
    let teams = baas.list_teams().await?.teams;

    let memberships = join_all(teams.iter().map(|team| baas.list_memberships(&team.id))).await;

    Ok(teams
        .into_iter()
        .zip(memberships)
        .map(|(team, result)| {
            let memberships = match result {
                Ok(list) => list.memberships,
                Err(e) => {
                    warn!("Could not list memberships of {}: {e}", team.id);
                    Vec::new()
                }
            };
            SpaceView::new(team, memberships, viewer_id)
        })
        .collect())
}

pub async fn get_space(
    baas: &BaasClient,
    viewer_id: &str,
    space_id: &str,
) -> Result<SpaceView, AppError> {
    let team = baas.get_team(space_id).await?;
    let memberships = baas.list_memberships(space_id).await?.memberships;
    Ok(SpaceView::new(team, memberships, viewer_id))
}

pub async fn list_members(baas: &BaasClient, space_id: &str) -> Result<Vec<Membership>, AppError> {
    Ok(baas.list_memberships(space_id).await?.memberships)
}

/// Creates a space whose id is a fresh join code, then records the code
/// and creation time in the team prefs.
pub async fn create_space(baas: &BaasClient, user: &User, name: &str) -> Result<Team, AppError> {
    require_teacher(user)?;
    let name = space_name(name)?;

    let join_code = generate_join_code();
    let mut team = baas.create_team(&join_code, name).await?;
    let prefs = TeamPrefs {
        join_code: Some(join_code),
        created_at: Some(now_iso()),
    };
    team.prefs = baas.update_team_prefs(&team.id, &prefs).await?;

    info!("Space '{}' ({}) created by {}", team.name, team.id, user.id);
    Ok(team)
}

pub async fn rename_space(
    baas: &BaasClient,
    user: &User,
    space_id: &str,
    name: &str,
) -> Result<Team, AppError> {
    require_teacher(user)?;
    let name = space_name(name)?;
    Ok(baas.update_team_name(space_id, name).await?)
}

pub async fn delete_space(baas: &BaasClient, user: &User, space_id: &str) -> Result<(), AppError> {
    require_teacher(user)?;
    baas.delete_team(space_id).await?;
    info!("Space {space_id} deleted by {}", user.id);
    Ok(())
}

/// Counts a space's chapters and the content across them. Every list that
/// fails to load counts as zero.
pub async fn space_overview(store: &dyn DocumentStore, space_id: &str) -> SpaceOverview {
    let chapters = Collection::<ChapterRecord>::new(store, models::CHAPTERS);
    let chapter_ids: Vec<String> = match chapters.list(&[Query::equal("spaceId", space_id)]).await {
        Ok(docs) => docs.into_iter().map(|d| d.id).collect(),
        Err(e) => {
            warn!("Could not list chapters of space {space_id}: {e}");
            return SpaceOverview::default();
        }
    };

    let per_chapter = join_all(chapter_ids.iter().map(|chapter_id| async move {
        let by_chapter = [Query::equal("chapterId", chapter_id.as_str())];
        let by_chapter_and_space = [
            Query::equal("chapterId", chapter_id.as_str()),
            Query::equal("spaceId", space_id),
        ];
        let flashcard_sets = Collection::<FlashcardSetRecord>::new(store, models::FLASHCARDS);
        let storyboard_sets = Collection::<StoryboardRecord>::new(store, models::STORYBOARDS);
        let quiz_sets = Collection::<QuizRecord>::new(store, models::QUIZZES);
        let summary_sets = Collection::<SummaryRecord>::new(store, models::SUMMARIES);
        let (flashcards, storyboards, quizzes, summaries) = tokio::join!(
            flashcard_sets.count(&by_chapter),
            storyboard_sets.count(&by_chapter),
            quiz_sets.count(&by_chapter_and_space),
            summary_sets.count(&by_chapter_and_space),
        );
        [flashcards, storyboards, quizzes, summaries].map(|r| r.unwrap_or(0))
    }))
    .await;

    per_chapter.into_iter().fold(
        SpaceOverview {
            chapters: chapter_ids.len(),
            ..SpaceOverview::default()
        },
        |mut acc, [flashcards, storyboards, quizzes, summaries]| {
            acc.flashcards += flashcards;
            acc.storyboards += storyboards;
            acc.quizzes += quizzes;
            acc.summaries += summaries;
            acc
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::memory::MemoryStore;
    use crate::baas::models::UserPrefs;
    use crate::test_util::spawn_upstream;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    fn membership(user_id: &str, roles: &[&str]) -> Membership {
        Membership {
            id: format!("m-{user_id}"),
            user_id: user_id.to_string(),
            user_name: String::new(),
            user_email: String::new(),
            team_id: "t1".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn user(role: Option<&str>) -> User {
        User {
            id: "u1".to_string(),
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
            prefs: UserPrefs {
                role: role.map(String::from),
            },
        }
    }

    #[test]
    fn test_role_helpers() {
        let members = vec![membership("teacher", &["owner"]), membership("kid", &[])];
        assert!(is_owner(&members, "teacher"));
        assert!(!is_owner(&members, "kid"));
        assert!(is_member(&members, "kid"));
        assert!(!is_member(&members, "stranger"));
    }

    async fn seed(store: &MemoryStore, collection: &str, data: serde_json::Value) -> String {
        store.create_document(collection, data, &[]).await.unwrap()["$id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_overview_counts_across_chapters() {
        let store = MemoryStore::default();
        let c1 = seed(&store, models::CHAPTERS, json!({"name": "A", "spaceId": "s1"})).await;
        let c2 = seed(&store, models::CHAPTERS, json!({"name": "B", "spaceId": "s1"})).await;
        seed(&store, models::CHAPTERS, json!({"name": "Other", "spaceId": "s2"})).await;

        for chapter in [&c1, &c1, &c2] {
            seed(&store, models::FLASHCARDS, json!({"chapterId": chapter})).await;
        }
        seed(&store, models::QUIZZES, json!({"chapterId": c2, "spaceId": "s1"})).await;
        // Same chapter id but filed under another space.
        seed(&store, models::SUMMARIES, json!({"chapterId": c1, "spaceId": "s9"})).await;
        seed(&store, models::SUMMARIES, json!({"chapterId": c1, "spaceId": "s1"})).await;

        let overview = space_overview(&store, "s1").await;
        assert_eq!(
            overview,
            SpaceOverview {
                chapters: 2,
                flashcards: 3,
                storyboards: 0,
                quizzes: 1,
                summaries: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_overview_counts_past_one_page() {
        let store = MemoryStore::default();
        let c1 = seed(&store, models::CHAPTERS, json!({"name": "A", "spaceId": "s1"})).await;
        for _ in 0..150 {
            seed(&store, models::FLASHCARDS, json!({"chapterId": c1})).await;
        }

        let overview = space_overview(&store, "s1").await;
        assert_eq!(overview.flashcards, 150);
    }

    #[tokio::test]
    async fn test_overview_failed_lists_count_as_zero() {
        let store = MemoryStore::default();
        let c1 = seed(&store, models::CHAPTERS, json!({"name": "A", "spaceId": "s1"})).await;
        seed(&store, models::FLASHCARDS, json!({"chapterId": c1})).await;
        seed(&store, models::QUIZZES, json!({"chapterId": c1, "spaceId": "s1"})).await;
        store.fail_collection(models::FLASHCARDS);

        let overview = space_overview(&store, "s1").await;
        assert_eq!(overview.chapters, 1);
        assert_eq!(overview.flashcards, 0);
        assert_eq!(overview.quizzes, 1);

        store.fail_collection(models::CHAPTERS);
        assert_eq!(space_overview(&store, "s1").await, SpaceOverview::default());
    }

    #[tokio::test]
    async fn test_list_spaces_tolerates_membership_failure() {
        let upstream = spawn_upstream(
            Router::new()
                .route(
                    "/teams",
                    get(|| async {
                        Json(json!({"total": 2, "teams": [
                            {"$id": "111111", "name": "Biology", "total": 1, "prefs": {"joinCode": "111111"}},
                            {"$id": "222222", "name": "History", "total": 0, "prefs": {}}
                        ]}))
                    }),
                )
                .route(
                    "/teams/:id/memberships",
                    get(|Path(id): Path<String>| async move {
                        if id == "111111" {
                            (
                                StatusCode::OK,
                                Json(json!({"total": 1, "memberships": [
                                    {"$id": "m1", "userId": "u1", "teamId": "111111", "roles": ["owner"]}
                                ]})),
                            )
                        } else {
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({"message": "boom", "type": "general_unknown", "code": 500})),
                            )
                        }
                    }),
                ),
        )
        .await;
        let baas = BaasClient::new(&upstream, "p", None, "learning_spaces", "files");

        let spaces = list_spaces(&baas, "u1").await.unwrap();
        assert_eq!(spaces.len(), 2);
        assert!(spaces[0].is_owner && spaces[0].is_member);
        assert!(!spaces[1].is_member);
        assert_eq!(spaces[0].team.prefs.join_code.as_deref(), Some("111111"));
        assert!(spaces[1].memberships.is_empty());
    }

    #[tokio::test]
    async fn test_create_space_requires_teacher_before_any_call() {
        // Nothing listens here; a call would surface as a storage error.
        let baas = BaasClient::new(crate::test_util::UNREACHABLE, "p", None, "db", "files");
        let err = create_space(&baas, &user(Some("student")), "Physics").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = create_space(&baas, &user(Some("teacher")), "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_space_uses_join_code_as_team_id() {
        let upstream = spawn_upstream(
            Router::new()
                .route(
                    "/teams",
                    axum::routing::post(|Json(body): Json<serde_json::Value>| async move {
                        Json(json!({"$id": body["teamId"], "name": body["name"], "total": 1}))
                    }),
                )
                .route(
                    "/teams/:id/prefs",
                    axum::routing::put(|Json(body): Json<serde_json::Value>| async move {
                        Json(body["prefs"].clone())
                    }),
                ),
        )
        .await;
        let baas = BaasClient::new(&upstream, "p", None, "db", "files");

        let team = create_space(&baas, &user(Some("teacher")), "  Physics ").await.unwrap();
        assert_eq!(team.name, "Physics");
        assert_eq!(team.prefs.join_code.as_deref(), Some(team.id.as_str()));
        assert!(team.prefs.created_at.is_some());
    }
}
