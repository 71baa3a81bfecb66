//! Chapter-scoped study content stored as BaaS documents.
//!
//! Every operation takes the document store as `&dyn DocumentStore`; handlers
//! pass the caller's session-scoped client.

pub mod audiobooks;
pub mod chapters;
pub mod flashcards;
pub mod handlers;
pub mod quizzes;
pub mod storyboards;
pub mod summaries;
pub mod webnotes;
