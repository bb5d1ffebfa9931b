use super::response::{failure, success_message};
use super::HttpState;
use crate::application::AuthSession;
use crate::domain::user::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, UpdateProfileRequest,
    FORGOT_PASSWORD_MESSAGE, PASSWORD_RESET_MESSAGE,
};
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use tracing::error;

#[post("/signup")]
async fn signup(data: web::Data<HttpState>, req: web::Json<SignupRequest>) -> impl Responder {
    match data.auth_use_case.signup(req.into_inner()).await {
        Ok(session) => session_response(&data, session),
        Err(e) => failure(&e, "Failed to create account"),
    }
}

#[post("/login")]
async fn login(data: web::Data<HttpState>, req: web::Json<LoginRequest>) -> impl Responder {
    match data.auth_use_case.login(req.into_inner()).await {
        Ok(session) => session_response(&data, session),
        Err(e) => failure(&e, "Failed to login"),
    }
}

#[post("/logout")]
async fn logout(data: web::Data<HttpState>) -> impl Responder {
    let mut cookie = Cookie::build(data.cookie.name.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "success": true }))
}

#[get("/me")]
async fn me(data: web::Data<HttpState>, http: HttpRequest) -> impl Responder {
    let token = session_token(&data, &http);
    match data.auth_use_case.current_user(token.as_deref()).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => {
            error!(error = %e, "Failed to resolve current user");
            HttpResponse::Ok().json(serde_json::Value::Null)
        }
    }
}

#[post("/forgot-password")]
async fn forgot_password(
    data: web::Data<HttpState>,
    req: web::Json<ForgotPasswordRequest>,
) -> impl Responder {
    match data.auth_use_case.forgot_password(req.into_inner()).await {
        Ok(()) => success_message(FORGOT_PASSWORD_MESSAGE),
        Err(e) => failure(&e, "Failed to process request"),
    }
}

#[post("/reset-password")]
async fn reset_password(
    data: web::Data<HttpState>,
    req: web::Json<ResetPasswordRequest>,
) -> impl Responder {
    match data.auth_use_case.reset_password(req.into_inner()).await {
        Ok(()) => success_message(PASSWORD_RESET_MESSAGE),
        Err(e) => failure(&e, "Failed to reset password"),
    }
}

#[put("/update-profile")]
async fn update_profile(
    data: web::Data<HttpState>,
    http: HttpRequest,
    req: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    let token = session_token(&data, &http);
    match data
        .auth_use_case
        .update_profile(token.as_deref(), req.into_inner())
        .await
    {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => failure(&e, "Failed to update profile"),
    }
}

fn session_token(data: &HttpState, http: &HttpRequest) -> Option<String> {
    http.cookie(&data.cookie.name)
        .map(|cookie| cookie.value().to_string())
}

fn session_response(data: &HttpState, session: AuthSession) -> HttpResponse {
    let cookie = Cookie::build(data.cookie.name.clone(), session.token)
        .path("/")
        .http_only(true)
        .secure(data.cookie.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(data.auth_use_case.session_ttl_secs()))
        .finish();
    HttpResponse::Ok().cookie(cookie).json(session.user)
}
