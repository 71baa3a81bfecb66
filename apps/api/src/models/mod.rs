pub mod content;
pub mod json_string;

use chrono::{SecondsFormat, Utc};

pub const CHAPTERS: &str = "chapters";
pub const FLASHCARDS: &str = "flashcards";
pub const QUIZZES: &str = "quizzes";
pub const SUMMARIES: &str = "summaries";
pub const AUDIOBOOKS: &str = "audiobooks";
pub const STORYBOARDS: &str = "storyboards";
pub const WEBNOTES: &str = "webnotes";

/// Current time as an ISO-8601 UTC string with millisecond precision,
/// the format stored in every `createdAt` attribute.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_iso_shape() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
