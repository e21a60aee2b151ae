use std::str::FromStr;

use actix_files::Files;
use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::http::StatusCode;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, ResponseError};
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io;
use thiserror::Error;
use ulid::Ulid;

use certificate_verify_backend::adapters::{
    DiskFileStore, HttpClassifier, LogNotifier, UsersRepositoryImpl, VerificationsRepositoryImpl,
};
use certificate_verify_backend::app_config::{AppConfig, SessionConfig};
use certificate_verify_backend::commands::account_command::{self, AccountError, RegisterInput};
use certificate_verify_backend::commands::verification_command::{
    PipelineError, VerificationPipeline,
};
use certificate_verify_backend::entities;
use certificate_verify_backend::queries::account_query::{self, AccountQueryError};
use certificate_verify_backend::queries::verification_query::{self, VerificationQueryError};

type PgVerifications = VerificationsRepositoryImpl<PgPool>;
type PgUsers = UsersRepositoryImpl<PgPool>;
type AppPipeline = VerificationPipeline<PgVerifications, DiskFileStore, HttpClassifier>;

#[derive(Clone)]
struct AppState {
    pipeline: AppPipeline,
    verifications: PgVerifications,
    users: PgUsers,
    notifier: LogNotifier,
    /// Set when sessions run in dummy mode; every request acts as this user.
    dummy_user: Option<entities::UserId>,
}

// ---------------------------------------------------------------------------
// Response envelope and error mapping

#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    message: String,
    data: Option<T>,
}

fn ok_response<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        success: true,
        message: message.to_string(),
        data: Some(data),
    })
}

#[derive(Error, Debug)]
enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Internal(err) = self {
            log::error!("internal error: {:#}", err);
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::<()> {
            success: false,
            message: self.to_string(),
            data: None,
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken => Self::Conflict(err.to_string()),
            AccountError::InvalidCredentials => Self::Unauthorized,
            AccountError::InvalidEmail
            | AccountError::WeakPassword
            | AccountError::InvalidCode => Self::BadRequest(err.to_string()),
            AccountError::Other(err) => Self::Internal(err),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound => Self::NotFound(err.to_string()),
            PipelineError::Other(err) => Self::Internal(err),
        }
    }
}

impl From<AccountQueryError> for ApiError {
    fn from(err: AccountQueryError) -> Self {
        match err {
            AccountQueryError::NotFound => Self::NotFound(err.to_string()),
            AccountQueryError::Other(err) => Self::Internal(err),
        }
    }
}

impl From<VerificationQueryError> for ApiError {
    fn from(err: VerificationQueryError) -> Self {
        match err {
            VerificationQueryError::NotFound => Self::NotFound(err.to_string()),
            VerificationQueryError::Other(err) => Self::Internal(err),
        }
    }
}

fn current_user(state: &AppState, session: &Session) -> Result<entities::UserId, ApiError> {
    if let Some(user_id) = &state.dummy_user {
        return Ok(user_id.clone());
    }
    let user_id = session.get::<String>("user_id").unwrap_or_else(|err| {
        log::warn!("session decode error: {}", err);
        None
    });
    user_id
        .map(entities::UserId::from)
        .ok_or(ApiError::Unauthorized)
}

fn parse_verification_id(raw: &str) -> Result<entities::VerificationId, ApiError> {
    // An unparsable id cannot exist; indistinguishable from a missing one.
    Ulid::from_str(raw)
        .map(entities::VerificationId::from)
        .map_err(|_| ApiError::NotFound("Verification not found".to_string()))
}

// ---------------------------------------------------------------------------
// DTOs

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerificationDto {
    id: String,
    user_id: String,
    certificate_type: &'static str,
    file_name: String,
    file_url: String,
    file_size: i64,
    file_mime_type: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis_result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<entities::Verification> for VerificationDto {
    fn from(v: entities::Verification) -> Self {
        let confidence_score = v.analysis.as_ref().map(|a| a.confidence.value());
        let analysis_result = v.analysis.map(|a| {
            serde_json::json!({
                "confidence": a.confidence.value(),
                "details": a.details,
                "timestamp": a.analyzed_at.to_rfc3339(),
            })
        });
        Self {
            id: Ulid::from(v.id).to_string(),
            user_id: String::from(v.user_id),
            certificate_type: v.certificate_type.as_str(),
            file_name: v.file_name,
            file_url: v.file_path,
            file_size: i64::from(v.file_size),
            file_mime_type: v.mime_type.value().to_string(),
            status: v.status.as_str(),
            confidence_score,
            analysis_result,
            processing_time: v.processing_time_ms,
            error_message: v.error_message,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    email: String,
    full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    institution_name: Option<String>,
    role: &'static str,
    email_verified: bool,
    created_at: DateTime<Utc>,
}

impl From<entities::User> for UserDto {
    fn from(u: entities::User) -> Self {
        Self {
            id: u.id.as_str().to_string(),
            email: u.email,
            full_name: u.full_name,
            institution_name: u.institution_name,
            role: u.role.as_str(),
            email_verified: u.email_verified,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationDto {
    page: u32,
    page_size: u32,
    total: u64,
    total_pages: u64,
}

#[derive(Serialize)]
struct HistoryDto {
    verifications: Vec<VerificationDto>,
    pagination: PaginationDto,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardStatsDto {
    total_verified: u64,
    authentic: u64,
    suspicious: u64,
    forged: u64,
    pending: u64,
    recent_verifications: Vec<VerificationDto>,
}

// ---------------------------------------------------------------------------
// Auth handlers

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    password: String,
    full_name: String,
    institution_name: Option<String>,
    role: String,
}

async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let role = entities::UserRole::try_from(body.role.as_str())
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let mut users = state.users.clone();
    let user = account_command::register(
        &mut users,
        &state.notifier,
        Utc::now(),
        RegisterInput {
            email: body.email,
            password: body.password,
            full_name: body.full_name,
            institution_name: body.institution_name,
            role,
        },
    )
    .await?;

    Ok(ok_response(
        "Registration successful. Please check your email for the verification code.",
        UserDto::from(user),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    state: web::Data<AppState>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut users = state.users.clone();
    let user = account_command::login(&mut users, &body.email, &body.password).await?;

    session.renew();
    session
        .insert("user_id", user.id.as_str())
        .map_err(|err| ApiError::Internal(anyhow!("session insert: {}", err)))?;

    Ok(ok_response("Login successful", UserDto::from(user)))
}

async fn logout(session: Session) -> HttpResponse {
    session.purge();
    ok_response("Logged out", ())
}

async fn me(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&state, &session)?;
    let mut users = state.users.clone();
    let user = account_query::profile(&mut users, &user_id).await?;
    Ok(ok_response("Profile retrieved successfully", UserDto::from(user)))
}

#[derive(Deserialize)]
struct VerifyEmailRequest {
    code: String,
}

async fn verify_email(
    state: web::Data<AppState>,
    body: web::Json<VerifyEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut users = state.users.clone();
    let user = account_command::verify_email(&mut users, Utc::now(), &body.code).await?;
    Ok(ok_response("Email verified successfully", UserDto::from(user)))
}

#[derive(Deserialize)]
struct ForgotPasswordRequest {
    email: String,
}

async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut users = state.users.clone();
    account_command::request_password_reset(&mut users, &state.notifier, Utc::now(), &body.email)
        .await?;
    Ok(ok_response(
        "If the email is registered, a reset code has been sent.",
        (),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest {
    code: String,
    new_password: String,
}

async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut users = state.users.clone();
    account_command::reset_password(&mut users, Utc::now(), &body.code, &body.new_password)
        .await?;
    Ok(ok_response("Password reset successfully", ()))
}

// ---------------------------------------------------------------------------
// Verification handlers

#[derive(Debug, MultipartForm)]
struct UploadForm {
    #[multipart(limit = "10MiB")]
    file: TempFile,
    #[multipart(rename = "certificateType")]
    certificate_type: Text<String>,
}

async fn upload_certificate(
    state: web::Data<AppState>,
    session: Session,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&state, &session)?;

    let certificate_type = entities::CertificateType::try_from(form.certificate_type.as_str())
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let mime_value = form
        .file
        .content_type
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_default();
    let mime_type = entities::MimeType::try_from(mime_value)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let size = i64::try_from(form.file.size)
        .ok()
        .and_then(|s| entities::FileSize::try_from(s).ok())
        .ok_or_else(|| ApiError::BadRequest("File size exceeds the 10 MB limit".to_string()))?;
    let file_name = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload".to_string());

    let verification = state
        .pipeline
        .intake(
            user_id,
            certificate_type,
            file_name,
            mime_type,
            size,
            form.file.file.path(),
        )
        .await?;

    Ok(ok_response(
        "Certificate uploaded successfully",
        VerificationDto::from(verification),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn history(
    state: web::Data<AppState>,
    session: Session,
    params: web::Query<HistoryParams>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&state, &session)?;
    let page = entities::PageRequest::new(params.page, params.page_size)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let mut repo = state.verifications.clone();
    let result = verification_query::history(&mut repo, &user_id, page).await?;

    Ok(ok_response(
        "Verification history retrieved successfully",
        HistoryDto {
            verifications: result
                .verifications
                .into_iter()
                .map(VerificationDto::from)
                .collect(),
            pagination: PaginationDto {
                page: result.page,
                page_size: result.page_size,
                total: result.total,
                total_pages: result.total_pages,
            },
        },
    ))
}

async fn dashboard_stats(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&state, &session)?;

    let mut repo = state.verifications.clone();
    let stats = verification_query::dashboard_stats(&mut repo, &user_id).await?;

    Ok(ok_response(
        "Dashboard statistics retrieved successfully",
        DashboardStatsDto {
            total_verified: stats.total_verified,
            authentic: stats.authentic,
            suspicious: stats.suspicious,
            forged: stats.forged,
            pending: stats.pending,
            recent_verifications: stats.recent.into_iter().map(VerificationDto::from).collect(),
        },
    ))
}

async fn get_verification(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&state, &session)?;
    let id = parse_verification_id(&path)?;

    let mut repo = state.verifications.clone();
    let verification = verification_query::get_by_id(&mut repo, &user_id, id).await?;

    Ok(ok_response(
        "Verification retrieved successfully",
        VerificationDto::from(verification),
    ))
}

async fn delete_verification(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&state, &session)?;
    let id = parse_verification_id(&path)?;

    state.pipeline.delete(&user_id, id).await?;

    Ok(ok_response("Verification deleted successfully", ()))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Certificate verification API",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

// ---------------------------------------------------------------------------

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let config = AppConfig::from_env().map_err(|err| io::Error::other(err.to_string()))?;

    let pool = PgPoolOptions::new()
        .connect(&config.database_url)
        .await
        .map_err(|err| io::Error::other(err.to_string()))?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|err| io::Error::other(err.to_string()))?;

    let store =
        DiskFileStore::new(config.uploads_dir.clone()).map_err(|err| io::Error::other(err.to_string()))?;
    let classifier =
        HttpClassifier::new(&config.classifier).map_err(|err| io::Error::other(err.to_string()))?;
    let dummy_user = match &config.session {
        SessionConfig::Dummy { user_id } => {
            log::warn!("dummy sessions enabled; every request acts as {}", user_id);
            Some(entities::UserId::from(user_id.clone()))
        }
        _ => None,
    };
    let verifications = VerificationsRepositoryImpl::new(pool.clone());
    let state = AppState {
        pipeline: VerificationPipeline::new(verifications.clone(), store, classifier),
        verifications,
        users: UsersRepositoryImpl::new(pool),
        notifier: LogNotifier,
        dummy_user,
    };

    let secret_key = match &config.session {
        SessionConfig::Cookie { crypto_key } => Key::from(crypto_key.as_slice()),
        SessionConfig::Ephemeral | SessionConfig::Dummy { .. } => {
            if matches!(config.session, SessionConfig::Ephemeral) {
                log::warn!("SESSION_CRYPTO_KEY unset; sessions will not survive a restart");
            }
            Key::generate()
        }
    };

    let host = config.host.clone();
    let port = config.port;
    let uploads_dir = config.uploads_dir.clone();
    let tasks = state.pipeline.tasks().clone();
    let state = web::Data::new(state);
    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                secret_key.clone(),
            ))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health))
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(register))
                            .route("/login", web::post().to(login))
                            .route("/logout", web::post().to(logout))
                            .route("/me", web::get().to(me))
                            .route("/verify-email", web::post().to(verify_email))
                            .route("/forgot-password", web::post().to(forgot_password))
                            .route("/reset-password", web::post().to(reset_password)),
                    )
                    .service(
                        web::scope("/verification")
                            .route("/upload", web::post().to(upload_certificate))
                            .route("/history", web::get().to(history))
                            .route("/dashboard/stats", web::get().to(dashboard_stats))
                            .route("/{id}", web::get().to(get_verification))
                            .route("/{id}", web::delete().to(delete_verification)),
                    ),
            )
            .service(Files::new("/uploads", uploads_dir.clone()))
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    // The workers are gone; stop any reconciliation still in flight.
    tasks.abort_all();
    result
}
