//! Gateway HTTP server: Axum-based chat and agent-listing API

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures_util::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use waypoint_a2a::{RoutingAgent, active_agent_state};
use waypoint_core::{Content, Event, Runner, SessionService};

use crate::assets;
use crate::protocol::{
    APP_NAME, AgentListResponse, ChatRequest, DEFAULT_SESSION, DEFAULT_USER, ErrorResponse,
};

/// Shared state for all requests
#[derive(Clone)]
pub struct GatewayState {
    pub routing: Arc<RoutingAgent>,
    pub runner: Arc<dyn Runner>,
    pub sessions: Arc<SessionService>,
}

/// The gateway server
pub struct GatewayServer {
    state: GatewayState,
    bind: SocketAddr,
    static_dir: Option<PathBuf>,
}

impl GatewayServer {
    /// Create a new gateway server over an already-initialized routing agent
    pub fn new(bind: SocketAddr, routing: Arc<RoutingAgent>, runner: Arc<dyn Runner>) -> Self {
        let state = GatewayState {
            routing,
            runner,
            sessions: Arc::new(SessionService::new()),
        };
        Self {
            state,
            bind,
            static_dir: None,
        }
    }

    /// Serve files from `dir` for every path the API does not handle
    pub fn with_static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = Some(dir);
        self
    }

    pub fn sessions(&self) -> &Arc<SessionService> {
        &self.state.sessions
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        let mut router: Router<GatewayState> = Router::new()
            .route("/api/chat", post(chat_handler))
            .route("/api/agents", get(agents_handler));

        if let Some(dir) = &self.static_dir {
            router = router.fallback_service(assets::static_service(dir));
        }

        router
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("Gateway listening on {}", self.bind);
        if let Some(dir) = &self.static_dir {
            info!("Serving static files from {}", dir.display());
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway stopped");
        Ok(())
    }
}

// ── HTTP Handlers ──

async fn agents_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    axum::Json(AgentListResponse {
        agents: state.routing.list_remote_agents(),
    })
}

async fn chat_handler(State(state): State<GatewayState>, body: Bytes) -> Response {
    let req: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            debug!("Rejected chat request: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid request").into_response();
        }
    };

    state
        .sessions
        .create_session(APP_NAME, DEFAULT_USER, DEFAULT_SESSION)
        .await;

    match req.target_agent() {
        Some(agent_name) => delegate(&state, agent_name, &req.message).await,
        None => stream_events(&state, req.message),
    }
}

async fn delegate(state: &GatewayState, agent_name: &str, message: &str) -> Response {
    let agent_state = active_agent_state(agent_name);
    match state
        .routing
        .send_message(agent_name, message, &agent_state)
        .await
    {
        Ok(event) => axum::Json(event).into_response(),
        Err(e) => {
            warn!("Delegation to '{}' failed: {}", agent_name, e);
            (
                StatusCode::BAD_REQUEST,
                axum::Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Stream runner events as newline-delimited JSON, one chunk per event.
///
/// The body owns the event receiver, so a client disconnect drops it and the
/// producer stops.
fn stream_events(state: &GatewayState, message: String) -> Response {
    let rx = state
        .runner
        .run_async(DEFAULT_USER, DEFAULT_SESSION, Content::text(message));

    let lines = ReceiverStream::new(rx).map(|event| encode_line(&event));

    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(lines),
    )
        .into_response()
}

fn encode_line(event: &Event) -> Result<Vec<u8>, serde_json::Error> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;
    use waypoint_a2a::{
        AgentCard, AgentClient, AgentRegistry, JsonRpcResponse, MessageSendParams,
        RemoteAgentConnection,
    };
    use waypoint_core::{MockRunner, Part};

    struct StubClient;

    #[async_trait]
    impl AgentClient for StubClient {
        async fn send_message(&self, _params: MessageSendParams) -> Result<JsonRpcResponse> {
            Ok(JsonRpcResponse::ok(json!("1"), json!({"id": "task-42"})))
        }
    }

    fn weather_card() -> AgentCard {
        AgentCard {
            name: "weather-svc".to_string(),
            description: "Weather forecasts".to_string(),
            url: "http://weather.local".to_string(),
            version: None,
            capabilities: None,
            skills: vec![],
        }
    }

    fn routing(with_weather: bool) -> Arc<RoutingAgent> {
        let mut registry = AgentRegistry::new();
        if with_weather {
            registry.insert(RemoteAgentConnection {
                card: weather_card(),
                address: "http://weather.local".to_string(),
                client: Arc::new(StubClient),
            });
        }
        Arc::new(RoutingAgent::new(registry))
    }

    fn server_with(runner: Arc<dyn Runner>, with_weather: bool) -> GatewayServer {
        GatewayServer::new(
            "127.0.0.1:0".parse().unwrap(),
            routing(with_weather),
            runner,
        )
    }

    fn server() -> GatewayServer {
        server_with(
            Arc::new(MockRunner::with_delay(Duration::from_millis(5))),
            true,
        )
    }

    fn chat(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_agents_lists_registered_agent() {
        let app = server().router();
        let resp = app
            .oneshot(Request::get("/api/agents").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(
            body,
            json!({"agents": [{"name": "weather-svc", "description": "Weather forecasts"}]})
        );
    }

    #[tokio::test]
    async fn test_agents_empty_registry() {
        let app = server_with(Arc::new(MockRunner::new()), false).router();
        let resp = app
            .oneshot(Request::get("/api/agents").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(resp).await, r#"{"agents":[]}"#);
    }

    #[tokio::test]
    async fn test_chat_streams_mock_events() {
        let app = server().router();
        let resp = app.oneshot(chat(r#"{"message":"hi"}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = body_string(resp).await;
        let events: Vec<Event> = body
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 3);

        let first = &events[0].content.as_ref().unwrap().parts[0];
        assert!(matches!(first, Part::FunctionCall(_)));
        let second = &events[1].content.as_ref().unwrap().parts[0];
        assert!(matches!(second, Part::FunctionResponse(_)));
        assert!(events[2].text_content().unwrap().contains("sunny"));
    }

    #[tokio::test]
    async fn test_chat_pushes_events_as_produced() {
        // Long gaps between events: the first one must arrive well before the rest
        let runner = Arc::new(MockRunner::with_delay(Duration::from_secs(30)));
        let app = server_with(runner.clone(), true).router();
        let resp = app.oneshot(chat(r#"{"message":"hi"}"#)).await.unwrap();

        let mut chunks = resp.into_body().into_data_stream();
        let first = tokio::time::timeout(Duration::from_secs(2), chunks.next())
            .await
            .expect("first event was not flushed")
            .unwrap()
            .unwrap();
        let event: Event = serde_json::from_slice(&first).unwrap();
        assert!(matches!(
            event.content.unwrap().parts[0],
            Part::FunctionCall(_)
        ));

        // Client goes away mid-stream: the producer stops instead of finishing
        drop(chunks);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runner.emitted(), 1);
    }

    #[tokio::test]
    async fn test_chat_delegates_to_named_agent() {
        let app = server().router();
        let resp = app
            .oneshot(chat(r#"{"message":"weather?","agent_name":"weather-svc"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let event: Event = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(
            event.text_content().as_deref(),
            Some("Agent weather-svc result: task-42")
        );
    }

    #[tokio::test]
    async fn test_chat_unknown_agent_is_bad_request() {
        let app = server().router();
        let resp = app
            .oneshot(chat(r#"{"message":"x","agent_name":"missing"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(
            body,
            json!({"error": "agent missing not found or not initialized"})
        );
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let app = server().router();
        let resp = app.oneshot(chat("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Invalid request");
    }

    #[tokio::test]
    async fn test_chat_records_session() {
        let server = server();
        let sessions = server.sessions().clone();
        let app = server.router();

        let resp = app
            .clone()
            .oneshot(chat(r#"{"message":"x","agent_name":"missing"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = app.oneshot(chat(r#"{"message":"hi"}"#)).await.unwrap();
        let _ = body_string(resp).await;

        assert_eq!(sessions.count().await, 1);
        let session = sessions
            .get(APP_NAME, DEFAULT_USER, DEFAULT_SESSION)
            .await
            .unwrap();
        assert_eq!(session.message_count, 2);
    }

    #[tokio::test]
    async fn test_static_files_served_as_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>waypoint</html>").unwrap();

        let app = server().with_static_dir(dir.path().to_path_buf()).router();
        let resp = app
            .clone()
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "<html>waypoint</html>");

        let resp = app
            .oneshot(Request::get("/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_without_static_dir() {
        let app = server().router();
        let resp = app
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_encode_line_is_newline_terminated() {
        let line = encode_line(&Event::text("hi")).unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(
            std::str::from_utf8(&line).unwrap(),
            "{\"Content\":{\"Parts\":[{\"Text\":\"hi\"}]}}\n"
        );
    }
}
