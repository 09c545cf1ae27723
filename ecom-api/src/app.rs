/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use ecom_api::{app::AppState, config::Config};
/// use ecom_shared::{db, store::postgres::PgStore};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = db::connect(config.pool_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = ecom_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use ecom_shared::{
    auth::{
        authorization::{require_admin, resolve_user},
        jwt::TokenService,
        middleware::{bearer_token, AuthContext},
    },
    store::Store,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Data access
    pub store: Arc<dyn Store>,

    /// Issues and validates bearer tokens
    pub tokens: Arc<TokenService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state, building the token service from the JWT settings
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let tokens = TokenService::with_ttl(&config.jwt.secret, config.jwt.ttl());

        Self {
            store,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET    /health                 public
/// ├── POST   /token                  public (form login)
/// ├── POST   /users                  public (registration)
/// ├── GET    /users/me               bearer
/// ├── GET    /users/:id              public
/// ├── POST   /admin/users            admin
/// ├── DELETE /admin/users/:id        admin
/// ├── POST   /products               admin
/// ├── GET    /products/:id           public
/// ├── PATCH  /products/:id           admin
/// ├── DELETE /products/:id           admin
/// ├── POST   /addresses              bearer
/// ├── GET    /addresses/:id          bearer (owner or admin)
/// ├── POST   /orders                 bearer
/// └── GET    /orders/:id             bearer (owner or admin)
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication and the admin check (per route)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/token", post(routes::auth::login))
        .route("/users", post(routes::users::register))
        .route("/users/:id", get(routes::users::get_user));

    let authenticated_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .route("/addresses", post(routes::addresses::create_address))
        .route("/addresses/:id", get(routes::addresses::get_address))
        .route("/orders", post(routes::orders::place_order))
        .route("/orders/:id", get(routes::orders::get_order))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let admin_routes = Router::new()
        .route("/admin/users", post(routes::admin::create_user))
        .route("/admin/users/:id", delete(routes::admin::delete_user))
        .route("/products", post(routes::products::create_product))
        .route_layer(from_fn(admin_layer))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    // Reads are public, writes need an admin on the same path
    let product_routes = Router::new().route(
        "/products/:id",
        patch(routes::products::update_product)
            .delete(routes::products::delete_product)
            .route_layer(from_fn(admin_layer))
            .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer))
            .get(routes::products::get_product),
    );

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .merge(product_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication layer
///
/// Resolves the caller from `Authorization: Bearer <token>` and injects an
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?.to_owned();
    let user = resolve_user(&state.tokens, &*state.store, &token).await?;

    req.extensions_mut().insert(AuthContext { user });

    Ok(next.run(req).await)
}

/// Admin check, runs after `jwt_auth_layer`
async fn admin_layer(
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthContext>()
        .map(|auth| auth.user.clone())
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    require_admin(user)?;

    Ok(next.run(req).await)
}
