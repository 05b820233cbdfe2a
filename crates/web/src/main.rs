mod handlers;

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{ConnectInfo, FromRef},
    http::{Method, Request, StatusCode, header},
};
use og_image_core::{
    config::Config, content::load_posts, models::RouteProps, paths::static_paths,
};
use og_image_images::OgRenderer;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    ServiceBuilderExt,
    cors::{self, CorsLayer},
    normalize_path::NormalizePathLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, MakeSpan, TraceLayer},
};
use tracing::{Level, Span};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::handlers::build_router;

/// Route props keyed by slug.
pub type Routes = HashMap<String, RouteProps>;

#[derive(Clone, FromRef)]
pub struct AppState {
    renderer: Arc<OgRenderer>,
    routes: Arc<Routes>,
}

impl AppState {
    fn new(config: &Config) -> Result<Self> {
        let posts = load_posts(&config.content)?;
        let routes = static_paths(&posts)
            .into_iter()
            .map(|route| (route.params.slug, route.props))
            .collect::<Routes>();
        let renderer = OgRenderer::from_config(config)?;
        tracing::info!(routes = routes.len(), "Prepared image routes");
        Ok(Self { renderer: Arc::new(renderer), routes: Arc::new(routes) })
    }
}

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config = Config::load("config.yml").expect("Failed to load config");
    let state = AppState::new(&config).expect("Failed to prepare routes");

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
    let listener = TcpListener::bind(addr).await.expect("bind error");
    tracing::info!("Web server: Listening on {}", addr);

    let router = app(state).into_make_service_with_connect_info::<SocketAddr>();
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error");
    if let Err(e) = result {
        tracing::error!("{e:?}");
    }
    tracing::info!("Shut down gracefully");
}

fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(RequestSpan { level: Level::INFO })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(60),
        ))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(CorsLayer::new().allow_methods([Method::GET]).allow_origin(cors::Any))
        .compression();
    build_router().with_state(state).layer(middleware)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let Ok(mut sigterm) = signal::unix::signal(signal::unix::SignalKind::terminate()) else {
            tracing::warn!("Failed to install SIGTERM handler");
            let _ = signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}

#[derive(Debug, Clone)]
pub struct RequestSpan {
    level: Level,
}

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let cf_connecting_ip = request.headers().get("CF-Connecting-IP");
        let ip = if let Some(v) = cf_connecting_ip {
            str::from_utf8(v.as_bytes()).ok().and_then(|s| IpAddr::from_str(s).ok())
        } else if let Some(ConnectInfo(socket_addr)) =
            request.extensions().get::<ConnectInfo<SocketAddr>>()
        {
            Some(socket_addr.ip())
        } else {
            None
        };
        let ip = ip.unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("[unknown]");
        macro_rules! make_span {
            ($level:expr) => {
                tracing::span!(
                    $level,
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    ip = %ip,
                    user_agent = %user_agent,
                )
            }
        }
        match self.level {
            Level::ERROR => make_span!(Level::ERROR),
            Level::WARN => make_span!(Level::WARN),
            Level::INFO => make_span!(Level::INFO),
            Level::DEBUG => make_span!(Level::DEBUG),
            Level::TRACE => make_span!(Level::TRACE),
        }
    }
}
