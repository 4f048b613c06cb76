// Subscription and note operations
// Role-scoped queries and mutations over the identities attached by the
// auth gateway

pub mod handlers;
pub mod models;
pub mod repository;

pub use models::{CreateNoteRequest, EditNoteRequest, Note};
