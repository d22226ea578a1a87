//! Signup, login, logout and admin account creation.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use faqdesk_core::models::User;
use faqdesk_core::{FaqError, StoreId, UserId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::extract::ApiJson;
use super::views::{Message, UserView};
use crate::error::{Result, clear_sentry_user};
use crate::middleware::{OptionalAuth, clear_session_header};
use crate::services::AuthService;
use crate::services::session::{IssuedToken, session_cookie};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupCustomerInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupMerchantInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub store_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    pub store_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerSignupResponse {
    message: &'static str,
    customer_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct MerchantSignupResponse {
    message: &'static str,
    merchant_id: UserId,
    store_id: StoreId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    message: &'static str,
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    message: &'static str,
    user: UserView,
}

/// Sign a token for `user` and the cookie carrying it.
fn start_session(state: &AppState, user: &User) -> Result<(IssuedToken, HeaderValue)> {
    let issued = state
        .sessions()
        .tokens()
        .issue(user)
        .map_err(FaqError::internal)?;
    let cookie = session_cookie(&issued, state.config().secure_cookies());
    let header = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| FaqError::internal(format!("session cookie header: {e}")))?;
    Ok((issued, header))
}

/// Register a customer and start their session.
#[instrument(skip_all)]
pub async fn signup_customer(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupCustomerInput>,
) -> Result<Response> {
    let user = AuthService::new(state.repos().users.as_ref())
        .register_customer(&input.email, &input.password)
        .await?;
    let (_, cookie) = start_session(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(CustomerSignupResponse {
            message: "customer created successfully",
            customer_id: user.id,
        }),
    )
        .into_response())
}

/// Register a merchant with their store and start their session.
#[instrument(skip_all)]
pub async fn signup_merchant(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupMerchantInput>,
) -> Result<Response> {
    let (user, store) = AuthService::new(state.repos().users.as_ref())
        .register_merchant(&input.email, &input.password, &input.store_name)
        .await?;
    let (_, cookie) = start_session(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(MerchantSignupResponse {
            message: "merchant created successfully",
            merchant_id: user.id,
            store_id: store.id,
        }),
    )
        .into_response())
}

/// Exchange credentials for a session.
///
/// The token is also returned in the body for clients that send it as a
/// bearer header instead of a cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Response> {
    let user = AuthService::new(state.repos().users.as_ref())
        .login(&input.email, &input.password)
        .await?;
    let (issued, cookie) = start_session(&state, &user)?;
    tracing::info!(user_id = %user.id, "logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "logged in successfully",
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    )
        .into_response())
}

/// Clear the session cookie. Tokens are stateless, so this only affects the
/// calling client.
pub async fn logout(State(state): State<AppState>) -> Result<Response> {
    clear_sentry_user();
    let clear = clear_session_header(state.config().secure_cookies())?;
    Ok((
        [(header::SET_COOKIE, clear)],
        Json(Message::new("logged out successfully")),
    )
        .into_response())
}

/// Admin creates an account of any role.
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    OptionalAuth(actor): OptionalAuth,
    ApiJson(input): ApiJson<CreateUserInput>,
) -> Result<(StatusCode, Json<CreateUserResponse>)> {
    let user = AuthService::new(state.repos().users.as_ref())
        .create_account(
            actor.as_ref(),
            &input.email,
            &input.password,
            &input.role,
            input.store_name.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "user created successfully",
            user: UserView::from(&user),
        }),
    ))
}
