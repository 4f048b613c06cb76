// Authentication module
// JWT-based authentication with role-scoped guards for doctors and patients

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{AuthDoctor, AuthPatient, AuthUser};
pub use models::{Doctor, Identity, Patient, Role};
pub use token::TokenService;
