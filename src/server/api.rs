use crate::llm::chat::ChatClient;
use crate::models::inference::{ ErrorBody, InferenceRequest, InferenceResponse };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::{
    body::Bytes,
    routing::post,
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::{ header::CONTENT_TYPE, Method, StatusCode },
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn, error };
use uuid::Uuid;

pub const NOT_CONFIGURED_REPLY: &str =
    "Извините, система ИИ настраивается. Пожалуйста, позвоните нам: +7 (495) 123-45-67";
pub const UPSTREAM_FAILURE_REPLY: &str =
    "Извините, произошла ошибка. Пожалуйста, позвоните нам: +7 (495) 123-45-67";

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured.
    pub chat_client: Option<Arc<dyn ChatClient>>,
    pub system_prompt: Arc<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE);

    Router::new()
        .route(
            "/chat",
            post(chat_handler).options(preflight_handler).fallback(method_not_allowed_handler)
        )
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    http_port: u16,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", http_port).parse::<SocketAddr>()?;
    info!("Starting inference HTTP server on: http://{}", addr);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
        e
    })?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("HTTP server started");
    Ok(())
}

async fn preflight_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn method_not_allowed_handler() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, Json(ErrorBody {
        error: "Method not allowed".into(),
    }))
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.is_empty() {
        InferenceRequest::default()
    } else {
        match serde_json::from_slice::<InferenceRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                warn!("Unreadable chat request body: {}", e);
                InferenceRequest::default()
            }
        }
    };

    if request.message.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(ErrorBody {
            error: "Message is required".into(),
        })).into_response();
    }

    let client = match &state.chat_client {
        Some(c) => c,
        None => {
            warn!("Chat request received but no API key is configured");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(InferenceResponse {
                response: NOT_CONFIGURED_REPLY.into(),
                request_id: None,
            })).into_response();
        }
    };

    let request_id = Uuid::new_v4().to_string();
    match client.complete(&state.system_prompt, &request.message).await {
        Ok(completion) => {
            info!("Answered chat request {}", request_id);
            (StatusCode::OK, Json(InferenceResponse {
                response: completion.response,
                request_id: Some(request_id),
            })).into_response()
        }
        Err(e) => {
            error!("Chat completion failed for request {}: {}", request_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(InferenceResponse {
                response: UPSTREAM_FAILURE_REPLY.into(),
                request_id: None,
            })).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::CompletionResponse;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use axum::body::{ to_bytes, Body };
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::{ json, Value as JsonValue };
    use std::sync::Mutex;
    use tower::ServiceExt;

    enum Behaviour {
        Answer(&'static str),
        Fail,
    }

    struct StubChatClient {
        behaviour: Behaviour,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl StubChatClient {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self { behaviour, seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl ChatClient for StubChatClient {
        async fn complete(
            &self,
            system_prompt: &str,
            user_message: &str
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push((system_prompt.to_string(), user_message.to_string()));
            match self.behaviour {
                Behaviour::Answer(text) => Ok(CompletionResponse { response: text.to_string() }),
                Behaviour::Fail => Err(LlmError::EmptyResponse),
            }
        }

        fn get_model(&self) -> String {
            "stub".into()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    fn state_with(client: Option<Arc<dyn ChatClient>>) -> AppState {
        AppState {
            chat_client: client,
            system_prompt: Arc::new("Ты ассистент.".to_string()),
        }
    }

    async fn call(state: AppState, method: Method, body: &str) -> (StatusCode, JsonValue) {
        let request = Request::builder()
            .method(method)
            .uri("/chat")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn answers_with_the_model_reply() {
        let stub = StubChatClient::new(Behaviour::Answer("Ждём вас на трассе!"));
        let (status, body) = call(
            state_with(Some(stub.clone() as Arc<dyn ChatClient>)),
            Method::POST,
            r#"{"message":"Привет"}"#
        ).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Ждём вас на трассе!");
        assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(
            stub.seen.lock().unwrap().clone(),
            vec![("Ты ассистент.".to_string(), "Привет".to_string())]
        );
    }

    #[tokio::test]
    async fn missing_message_is_a_bad_request() {
        let stub = StubChatClient::new(Behaviour::Answer("unused"));
        for body in ["", "{}", r#"{"message":""}"#, "not json"] {
            let (status, json) = call(state_with(Some(stub.clone() as Arc<dyn ChatClient>)), Method::POST, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {:?}", body);
            assert_eq!(json, json!({ "error": "Message is required" }));
        }
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_returns_the_phone_fallback() {
        let (status, body) = call(state_with(None), Method::POST, r#"{"message":"Привет"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "response": NOT_CONFIGURED_REPLY }));
    }

    #[tokio::test]
    async fn upstream_failure_hides_the_error_detail() {
        let stub = StubChatClient::new(Behaviour::Fail);
        let (status, body) = call(
            state_with(Some(stub as Arc<dyn ChatClient>)),
            Method::POST,
            r#"{"message":"Привет"}"#
        ).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "response": UPSTREAM_FAILURE_REPLY }));
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let (status, body) = call(state_with(None), Method::GET, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }

    #[tokio::test]
    async fn preflight_allows_cross_origin_posts() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat")
            .header("origin", "https://racetrack.pro")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = router(state_with(None)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-max-age"], "86400");
    }
}
