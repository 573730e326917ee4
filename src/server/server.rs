use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::job::JobManager;
use crate::user::auth::AuthTokenValue;
use crate::user::{Permission, UserManager};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::jobs_routes::make_jobs_routes;
use super::metrics::{self, metrics_handler};
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize)]
struct LoginBody {
    pub user_handle: String,
    pub password: String,
}

impl std::fmt::Debug for LoginBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginBody")
            .field("user_handle", &self.user_handle)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Serialize)]
struct SessionInfoResponse {
    user_id: usize,
    user_handle: String,
    permissions: Vec<Permission>,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: state.version.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((COOKIE_SESSION_TOKEN_KEY, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    debug!("login() called with {:?}", body);
    let start = Instant::now();
    let locked_manager = match user_manager.lock() {
        Ok(manager) => manager,
        Err(_) => {
            error!("User manager lock poisoned");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match locked_manager.login(&body.user_handle, &body.password) {
        Ok(Some(auth_token)) => {
            metrics::record_login_attempt("success", start.elapsed());
            let cookie = session_cookie(auth_token.value.0.clone());
            (
                StatusCode::CREATED,
                [(header::SET_COOKIE, cookie.to_string())],
                Json(LoginSuccessResponse {
                    token: auth_token.value.0,
                }),
            )
                .into_response()
        }
        Ok(None) => {
            metrics::record_login_attempt("failure", start.elapsed());
            StatusCode::UNAUTHORIZED.into_response()
        }
        Err(err) => {
            metrics::record_login_attempt("error", start.elapsed());
            error!("Error while logging in {}: {:#}", body.user_handle, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    let locked_manager = match user_manager.lock() {
        Ok(manager) => manager,
        Err(_) => {
            error!("User manager lock poisoned");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    match locked_manager.delete_auth_token(session.user_id, &AuthTokenValue(session.token)) {
        Ok(()) => {
            let mut cookie = session_cookie(String::new());
            // expired in the past so the browser drops it
            cookie.set_expires(time::OffsetDateTime::now_utc() - time::Duration::days(1));
            (StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]).into_response()
        }
        Err(err) => {
            debug!("Logout of user {} failed: {:#}", session.user_id, err);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

async fn session_info(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    let handle = match user_manager.lock() {
        Ok(manager) => manager.get_user_handle(session.user_id),
        Err(_) => {
            error!("User manager lock poisoned");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    match handle {
        Ok(Some(user_handle)) => Json(SessionInfoResponse {
            user_id: session.user_id,
            user_handle,
            permissions: session.permissions,
        })
        .into_response(),
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(err) => {
            error!("Failed to load handle of user {}: {:#}", session.user_id, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Handles of every registered user, for sessions with `ManageUsers`.
async fn list_users(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    if let Err(err) = session.require(Permission::ManageUsers) {
        debug!("User {} cannot list users", session.user_id);
        return err.into_response();
    }
    let handles = match user_manager.lock() {
        Ok(manager) => manager.get_all_user_handles(),
        Err(_) => {
            error!("User manager lock poisoned");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    match handles {
        Ok(handles) => Json(handles).into_response(),
        Err(err) => {
            error!("Failed to list user handles: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    job_manager: JobManager,
    user_manager: UserManager,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), job_manager, user_manager);

    let auth_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/session", get(session_info))
        .route("/users", get(list_users))
        .with_state(state.clone());

    let jobs_routes = make_jobs_routes(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/jobs", jobs_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    job_manager: JobManager,
    user_manager: UserManager,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, job_manager, user_manager)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Could not bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
