use async_trait::async_trait;
use log::{ debug, error, warn };
use reqwest::Client as HttpClient;
use serde_json::Value as JsonValue;

use super::{ Resolver, ResolverError, ResolverKind };
use crate::models::inference::InferenceRequest;

/// Reply used when the endpoint cannot be reached or answers with an error.
pub const UNAVAILABLE_REPLY: &str =
    "Извините, сервис поддержки временно недоступен. Пожалуйста, позвоните нам: +7 (495) 123-45-67";

/// Reply used when the endpoint answers but carries no usable `response`.
pub const RETRY_REPLY: &str = "Не удалось получить ответ. Пожалуйста, попробуйте ещё раз.";

/// Forwards each message to the hosted inference endpoint.
///
/// One attempt per message, no retries and no timeout beyond the HTTP
/// client's default.
#[derive(Debug, Clone)]
pub struct RemoteResolver {
    http: HttpClient,
    endpoint: String,
}

impl RemoteResolver {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ResolverError> {
        let http = HttpClient::builder().build().map_err(ResolverError::Transport)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `text` and returns the answer, or `None` when the body has no
    /// non-empty `response` string.
    pub async fn request(&self, text: &str) -> Result<Option<String>, ResolverError> {
        let req = InferenceRequest {
            message: text.to_string(),
        };
        let resp = self.http
            .post(&self.endpoint)
            .json(&req)
            .send().await
            .map_err(ResolverError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResolverError::Status(status));
        }

        let body = resp.json::<JsonValue>().await.map_err(ResolverError::Decode)?;
        let answer = body
            .get("response")
            .and_then(JsonValue::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        Ok(answer)
    }
}

#[async_trait]
impl Resolver for RemoteResolver {
    async fn resolve(&self, text: &str) -> String {
        match self.request(text).await {
            Ok(Some(answer)) => {
                debug!("Remote resolver answered ({} chars)", answer.chars().count());
                answer
            }
            Ok(None) => {
                warn!("Inference endpoint {} returned no response text", self.endpoint);
                RETRY_REPLY.to_string()
            }
            Err(e) => {
                error!("Remote resolver failed: {}", e);
                UNAVAILABLE_REPLY.to_string()
            }
        }
    }

    fn kind(&self) -> ResolverKind {
        ResolverKind::Remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::{
        matchers::{ body_json, header, method, path },
        Mock,
        MockServer,
        ResponseTemplate,
    };

    fn resolver_for(server: &MockServer) -> RemoteResolver {
        RemoteResolver::new(format!("{}/chat", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn returns_the_endpoint_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "message": "Какие цены?" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    json!({ "response": "От 4000₽/час", "request_id": "abc" })
                )
            )
            .expect(1)
            .mount(&server).await;

        let reply = resolver_for(&server).resolve("Какие цены?").await;
        assert_eq!(reply, "От 4000₽/час");
    }

    #[tokio::test]
    async fn empty_or_missing_response_asks_to_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "" })))
            .up_to_n_times(1)
            .mount(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": 42 })))
            .up_to_n_times(1)
            .mount(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": 7 })))
            .mount(&server).await;

        let resolver = resolver_for(&server);
        assert_eq!(resolver.resolve("раз").await, RETRY_REPLY);
        assert_eq!(resolver.resolve("два").await, RETRY_REPLY);
        assert_eq!(resolver.resolve("три").await, RETRY_REPLY);
    }

    #[tokio::test]
    async fn server_error_yields_the_fallback_after_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "response": "internal details" }))
            )
            .expect(1)
            .mount(&server).await;

        let reply = resolver_for(&server).resolve("Привет").await;
        assert_eq!(reply, UNAVAILABLE_REPLY);
    }

    #[tokio::test]
    async fn unparsable_body_yields_the_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server).await;

        let resolver = resolver_for(&server);
        assert!(matches!(resolver.request("Привет").await, Err(ResolverError::Decode(_))));
        assert_eq!(resolver.resolve("Привет").await, UNAVAILABLE_REPLY);
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_the_fallback() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/chat", listener.local_addr().unwrap());
        drop(listener);

        let resolver = RemoteResolver::new(endpoint).unwrap();
        assert!(matches!(resolver.request("Привет").await, Err(ResolverError::Transport(_))));
        assert_eq!(resolver.resolve("Привет").await, UNAVAILABLE_REPLY);
    }

    #[test]
    fn fallback_mentions_the_support_phone() {
        assert!(UNAVAILABLE_REPLY.contains("+7 (495) 123-45-67"));
    }
}
