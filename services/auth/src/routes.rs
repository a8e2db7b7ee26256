//! Authentication service routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    AppState,
    error::AuthError,
    models::{ChangePassword, LoginRequest, RefreshTokenRequest, RegisterRequest},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token));

    let forgot_password_routes = Router::new()
        .route("/verifyMail/:email", post(verify_mail))
        .route("/verifyOtp/:otp/:email", post(verify_otp))
        .route("/changePassword/:email", post(change_password));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/forgotPassword", forgot_password_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Registration request for: {}", payload.email);
    let response = state.auth_service.register(payload).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for user: {}", payload.email);
    let response = state.auth_service.login(payload).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");
    let response = state.auth_service.refresh(payload).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Send a reset code to the account's email
pub async fn verify_mail(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AuthError> {
    state.forgot_password_service.verify_email(&email).await?;
    Ok((StatusCode::OK, "Email sent for verification"))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Path((otp, email)): Path<(i32, String)>,
) -> Result<impl IntoResponse, AuthError> {
    state.forgot_password_service.verify_otp(otp, &email).await?;
    Ok((StatusCode::OK, "OTP Verified"))
}

pub async fn change_password(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<ChangePassword>,
) -> Result<impl IntoResponse, AuthError> {
    state
        .forgot_password_service
        .change_password(&email, payload)
        .await?;
    Ok((StatusCode::OK, "Password has been changed!"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth_service::AuthService,
        email::RecordingEmailSender,
        forgot_password::ForgotPasswordService,
        models::AuthResponse,
        repositories::memory::{InMemoryForgotPasswordRepository, InMemoryUserRepository},
    };
    use axum::{
        body::Body,
        http::{Method, Request, Response, header},
    };
    use common::token::{JwtConfig, JwtService};
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        otps: Arc<InMemoryForgotPasswordRepository>,
        mailer: Arc<RecordingEmailSender>,
    }

    fn test_app() -> TestApp {
        let users = Arc::new(InMemoryUserRepository::new());
        let otps = Arc::new(InMemoryForgotPasswordRepository::new());
        let mailer = Arc::new(RecordingEmailSender::default());
        let jwt_service = JwtService::new(JwtConfig {
            secret: "route-test-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        })
        .unwrap();

        let state = AppState {
            auth_service: AuthService::new(users.clone(), jwt_service),
            forgot_password_service: ForgotPasswordService::new(
                users,
                otps.clone(),
                mailer.clone(),
            ),
        };
        TestApp {
            router: create_router(state),
            otps,
            mailer,
        }
    }

    async fn send(app: &TestApp, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn register(app: &TestApp) -> AuthResponse {
        let response = send(
            app,
            "/api/v1/auth/register",
            Some(json!({
                "name": "Neo",
                "email": "neo@matrix.io",
                "password": "Sup3r$ecret"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn health_check_works() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_login_refresh() {
        let app = test_app();
        let registered = register(&app).await;
        assert_eq!(registered.name, "Neo");

        let duplicate = send(
            &app,
            "/api/v1/auth/register",
            Some(json!({
                "name": "Neo",
                "email": "neo@matrix.io",
                "password": "Sup3r$ecret"
            })),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let login = send(
            &app,
            "/api/v1/auth/login",
            Some(json!({ "email": "neo@matrix.io", "password": "Sup3r$ecret" })),
        )
        .await;
        assert_eq!(login.status(), StatusCode::OK);

        let bad_login = send(
            &app,
            "/api/v1/auth/login",
            Some(json!({ "email": "neo@matrix.io", "password": "nope" })),
        )
        .await;
        assert_eq!(bad_login.status(), StatusCode::UNAUTHORIZED);

        let refreshed = send(
            &app,
            "/api/v1/auth/refresh",
            Some(json!({ "refreshToken": registered.refresh_token })),
        )
        .await;
        assert_eq!(refreshed.status(), StatusCode::OK);
        let refreshed: AuthResponse = serde_json::from_str(&body_text(refreshed).await).unwrap();
        assert_eq!(refreshed.refresh_token, registered.refresh_token);
    }

    #[tokio::test]
    async fn forgot_password_flow() {
        let app = test_app();
        register(&app).await;

        let response = send(&app, "/forgotPassword/verifyMail/neo@matrix.io", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Email sent for verification");
        assert_eq!(app.mailer.sent().len(), 1);

        let early = send(
            &app,
            "/forgotPassword/changePassword/neo@matrix.io",
            Some(json!({ "password": "N3w$ecret!", "repeatPassword": "N3w$ecret!" })),
        )
        .await;
        assert_eq!(early.status(), StatusCode::FORBIDDEN);

        let otp = app.otps.records()[0].otp;
        let response = send(
            &app,
            &format!("/forgotPassword/verifyOtp/{}/neo@matrix.io", otp),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OTP Verified");

        let mismatch = send(
            &app,
            "/forgotPassword/changePassword/neo@matrix.io",
            Some(json!({ "password": "N3w$ecret!", "repeatPassword": "other" })),
        )
        .await;
        assert_eq!(mismatch.status(), StatusCode::EXPECTATION_FAILED);

        let response = send(
            &app,
            "/forgotPassword/changePassword/neo@matrix.io",
            Some(json!({ "password": "N3w$ecret!", "repeatPassword": "N3w$ecret!" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Password has been changed!");

        let login = send(
            &app,
            "/api/v1/auth/login",
            Some(json!({ "email": "neo@matrix.io", "password": "N3w$ecret!" })),
        )
        .await;
        assert_eq!(login.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn expired_otp_is_417() {
        let app = test_app();
        register(&app).await;
        send(&app, "/forgotPassword/verifyMail/neo@matrix.io", None).await;
        let record = app.otps.records()[0].clone();
        app.otps.expire_all(record.user_id);

        let uri = format!("/forgotPassword/verifyOtp/{}/neo@matrix.io", record.otp);
        let response = send(&app, &uri, None).await;
        assert_eq!(response.status(), StatusCode::EXPECTATION_FAILED);
        assert!(body_text(response).await.contains("OTP has expired!"));

        let again = send(&app, &uri, None).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_email_is_404() {
        let app = test_app();
        let response = send(&app, "/forgotPassword/verifyMail/ghost@matrix.io", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
