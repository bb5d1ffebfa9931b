pub mod auth;
pub mod catalog;
pub mod response;
pub mod syllabi;

use crate::application::{
    AuthSettings, AuthUseCase, CatalogUseCase, FileIngestionUseCase, SearchUseCase, UploadUseCase,
};
use crate::infrastructure::config::{AppConfig, ServerConfig};
use crate::infrastructure::db::syllabi::SyllabusRepository;
use crate::infrastructure::db::users::UserRepository;
use crate::infrastructure::mail::Mailer;
use crate::infrastructure::security::password::PasswordService;
use crate::infrastructure::security::token::TokenSigner;
use crate::infrastructure::storage::ObjectStorage;
use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::middleware::Logger;
use actix_web::{dev::Server, web, App, HttpRequest, HttpResponse, HttpServer};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

pub struct HttpState {
    pub search_use_case: SearchUseCase,
    pub upload_use_case: UploadUseCase,
    pub file_ingestion_use_case: FileIngestionUseCase,
    pub catalog_use_case: CatalogUseCase,
    pub auth_use_case: AuthUseCase,
    pub cookie: CookieSettings,
    pub max_json_bytes: usize,
}

impl HttpState {
    pub fn build(
        pool: SqlitePool,
        config: &AppConfig,
        storage: Arc<dyn ObjectStorage>,
        mailer: Arc<dyn Mailer>,
        passwords: PasswordService,
    ) -> Self {
        let syllabi = Arc::new(SyllabusRepository::new(pool.clone()));
        let users = Arc::new(UserRepository::new(pool));

        Self {
            search_use_case: SearchUseCase::new(syllabi.clone()),
            upload_use_case: UploadUseCase::new(syllabi.clone()),
            file_ingestion_use_case: FileIngestionUseCase::new(
                storage,
                config.server.max_upload_bytes,
            ),
            catalog_use_case: CatalogUseCase::new(syllabi),
            auth_use_case: AuthUseCase::new(
                users,
                passwords,
                TokenSigner::new(&config.auth.token_secret),
                mailer,
                AuthSettings {
                    session_ttl_secs: config.auth.session_ttl_secs,
                    reset_ttl_secs: config.auth.reset_ttl_secs,
                    app_url: config.server.app_url.clone(),
                },
            ),
            cookie: CookieSettings {
                name: config.auth.cookie_name.clone(),
                secure: config.auth.cookie_secure,
            },
            max_json_bytes: config.server.max_json_bytes,
        }
    }
}

/// Registers state, extractor limits and every `/api` route.
pub fn routes(cfg: &mut web::ServiceConfig, state: &web::Data<HttpState>) {
    let max_upload = state.file_ingestion_use_case.max_bytes();
    let json_config = web::JsonConfig::default()
        .limit(state.max_json_bytes)
        .error_handler(json_error);
    let multipart_config = MultipartFormConfig::default()
        .total_limit(max_upload)
        .memory_limit(max_upload)
        .error_handler(syllabi::multipart_error);

    cfg.app_data(state.clone())
        .app_data(json_config)
        .app_data(multipart_config)
        .service(
            web::scope("/api")
                .service(syllabi::search)
                .service(syllabi::upload)
                .service(syllabi::upload_file)
                .service(catalog::list_schools)
                .service(catalog::list_professors)
                .service(catalog::list_courses)
                .service(
                    web::scope("/auth")
                        .service(auth::signup)
                        .service(auth::login)
                        .service(auth::logout)
                        .service(auth::me)
                        .service(auth::forgot_password)
                        .service(auth::reset_password)
                        .service(auth::update_profile),
                ),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(response::failure_body("Invalid request body", None));
    InternalError::from_response(err, response).into()
}

fn cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

pub fn start_server(state: web::Data<HttpState>, config: &ServerConfig) -> std::io::Result<Server> {
    let allowed_origins = config.cors_allowed_origins.clone();

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .configure(move |cfg| routes(cfg, &state))
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    info!(host = %config.host, port = config.port, "HTTP server listening");
    Ok(server)
}
