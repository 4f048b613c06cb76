mod auth;
mod db;
mod error;
mod notify;
mod users;
mod validation;

use axum::{
    extract::FromRef,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use notify::Mailer;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::doctor_signup,
        auth::handlers::patient_signup,
        auth::handlers::login,
        users::handlers::get_doctors,
        users::handlers::get_your_doctors,
        users::handlers::subscribe,
        users::handlers::unsubscribe,
        users::handlers::get_patient,
        users::handlers::get_my_patients,
        users::handlers::get_doctor,
        users::handlers::add_note,
        users::handlers::get_notes,
        users::handlers::delete_note,
        users::handlers::edit_note,
    ),
    components(
        schemas(
            auth::models::DoctorSignupRequest,
            auth::models::PatientSignupRequest,
            auth::models::LoginRequest,
            auth::models::AuthResponse,
            auth::models::DoctorResponse,
            auth::models::PatientResponse,
            users::models::Note,
            users::models::CreateNoteRequest,
            users::models::EditNoteRequest,
        )
    ),
    tags(
        (name = "auth", description = "Signup and login flows"),
        (name = "users", description = "Doctor/patient profiles and subscriptions"),
        (name = "notes", description = "Care notes written by doctors")
    ),
    info(
        title = "Care Notes API",
        version = "1.0.0",
        description = "Backend for a doctor-patient care-notes application"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub mailer: Mailer,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.db.clone()
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool, mailer: Mailer) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let state = AppState { db, mailer };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Account flows
        .route("/api/auth/doctor/signup", post(auth::handlers::doctor_signup))
        .route("/api/auth/patient/signup", post(auth::handlers::patient_signup))
        .route("/api/auth/login", post(auth::handlers::login))
        // Profiles and subscriptions
        .route("/api/users/doctors", get(users::handlers::get_doctors))
        .route("/api/users/yourdoctors", get(users::handlers::get_your_doctors))
        .route("/api/users/subscribe/:doctorId", patch(users::handlers::subscribe))
        .route("/api/users/unsubscribe/:doctorId", patch(users::handlers::unsubscribe))
        .route("/api/users/patient/:patientId", get(users::handlers::get_patient))
        .route("/api/users/mypatients", get(users::handlers::get_my_patients))
        .route("/api/users/doctor/:doctorId", get(users::handlers::get_doctor))
        // Notes
        .route("/api/users/note", post(users::handlers::add_note))
        .route("/api/users/notes/:patientId", get(users::handlers::get_notes))
        .route("/api/users/note/delete/:noteId", delete(users::handlers::delete_note))
        .route("/api/users/note/edit/:noteId", patch(users::handlers::edit_note))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Care Notes API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "4000".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let mailer = Mailer::from_env();

    // Create the application router
    let app = create_router(db_pool, mailer);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Care Notes API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
