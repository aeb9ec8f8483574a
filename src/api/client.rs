use std::future::Future;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ApiError, Question, Result};
use crate::telemetry::record_api_call;

/// Operations the admin UI needs from the quiz API.
///
/// Every call takes a [`CancellationToken`]; once it fires the call resolves
/// to [`ApiError::Cancelled`] and whatever the API answers is dropped.
#[async_trait]
pub trait QuestionApi: Send + Sync {
    /// Exchange admin credentials for a bearer token.
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
        cancel: &CancellationToken,
    ) -> Result<SecretString>;

    /// All questions, in the order the API returns them.
    async fn list(&self, token: &SecretString, cancel: &CancellationToken)
        -> Result<Vec<Question>>;

    /// Store a new question and return it with its assigned id.
    async fn create(
        &self,
        token: &SecretString,
        question: &Question,
        cancel: &CancellationToken,
    ) -> Result<Question>;

    async fn delete(&self, token: &SecretString, id: &str, cancel: &CancellationToken)
        -> Result<()>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// [`QuestionApi`] over HTTP. Single attempt per call, no retries.
pub struct QuestionClient {
    client: Client,
    base: Url,
}

impl QuestionClient {
    /// `base` has to be an http(s) URL; paths are appended to it segment by
    /// segment.
    pub fn new(base: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("quiz-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder, token: &SecretString) -> RequestBuilder {
        request.bearer_auth(token.expose_secret())
    }

    async fn send(operation: &'static str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.inspect_err(|e| {
            warn!("{operation}: transport error: {e}");
        })?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            status if !status.is_success() => Err(ApiError::Status(status)),
            _ => Ok(response),
        }
    }
}

/// Runs `call` until it resolves or `cancel` fires, and records the outcome.
async fn tracked<T>(
    operation: &'static str,
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = call => result,
    };
    let outcome = match &result {
        Ok(_) => "ok",
        Err(ApiError::Transport(_)) => "transport",
        Err(ApiError::Unauthorized) => "unauthorized",
        Err(ApiError::Status(_)) => "status",
        Err(ApiError::Cancelled) => "cancelled",
    };
    record_api_call(operation, outcome);
    debug!("{operation}: {outcome}");
    result
}

#[async_trait]
impl QuestionApi for QuestionClient {
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
        cancel: &CancellationToken,
    ) -> Result<SecretString> {
        tracked("login", cancel, async {
            let body = LoginRequest {
                username,
                password: password.expose_secret(),
            };
            let request = self.client.post(self.url(&["login"])).json(&body);
            let response: LoginResponse = Self::send("login", request).await?.json().await?;
            Ok(SecretString::from(response.token))
        })
        .await
    }

    async fn list(
        &self,
        token: &SecretString,
        cancel: &CancellationToken,
    ) -> Result<Vec<Question>> {
        tracked("list", cancel, async {
            let request = self.authorized(self.client.get(self.url(&["questions"])), token);
            Ok(Self::send("list", request).await?.json().await?)
        })
        .await
    }

    async fn create(
        &self,
        token: &SecretString,
        question: &Question,
        cancel: &CancellationToken,
    ) -> Result<Question> {
        tracked("create", cancel, async {
            let request = self
                .authorized(self.client.post(self.url(&["update"])), token)
                .json(question);
            Ok(Self::send("create", request).await?.json().await?)
        })
        .await
    }

    async fn delete(
        &self,
        token: &SecretString,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        tracked("delete", cancel, async {
            let url = self.url(&["questions", id]);
            let request = self.authorized(self.client.delete(url), token);
            Self::send("delete", request).await?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Category;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{delete, get, post},
        Json, Router,
    };
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn bearer_ok(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer good")
    }

    fn sample(id: Option<&str>) -> Question {
        Question {
            id: id.map(str::to_owned),
            category: Category::Water,
            question: "Is water wet?".to_owned(),
            options: vec!["Yes".into(), "No".into(), "Maybe".into(), "Unknown".into()],
            correct_answer: "Yes".to_owned(),
        }
    }

    async fn spawn_api() -> Url {
        let api = Router::new()
            .route(
                "/api/admin/login",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["username"] == "admin" && body["password"] == "hunter2" {
                        Ok(Json(serde_json::json!({ "token": "good" })))
                    } else {
                        Err(StatusCode::UNAUTHORIZED)
                    }
                }),
            )
            .route(
                "/api/admin/questions",
                get(|headers: HeaderMap| async move {
                    if !bearer_ok(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    Ok(Json(vec![sample(Some("1")), sample(Some("2"))]))
                }),
            )
            .route(
                "/api/admin/update",
                post(|headers: HeaderMap, Json(mut q): Json<Question>| async move {
                    if !bearer_ok(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    if q.id.is_some() {
                        return Err(StatusCode::BAD_REQUEST);
                    }
                    q.id = Some("42".to_owned());
                    Ok(Json(q))
                }),
            )
            .route(
                "/api/admin/questions/{id}",
                delete(|headers: HeaderMap, Path(id): Path<String>| async move {
                    if !bearer_ok(&headers) {
                        return StatusCode::UNAUTHORIZED;
                    }
                    match id.as_str() {
                        "missing" => StatusCode::NOT_FOUND,
                        _ => StatusCode::NO_CONTENT,
                    }
                }),
            )
            .route(
                "/api/admin/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    StatusCode::OK
                }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, api).await.unwrap() });
        Url::parse(&format!("http://{addr}/api/admin/")).unwrap()
    }

    fn token(value: &str) -> SecretString {
        SecretString::from(value.to_owned())
    }

    #[tokio::test]
    async fn login_returns_token() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        let cancel = CancellationToken::new();
        let issued = client
            .login("admin", &token("hunter2"), &cancel)
            .await
            .unwrap();
        assert_eq!(issued.expose_secret(), "good");

        let rejected = client.login("admin", &token("wrong"), &cancel).await;
        assert!(matches!(rejected, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn list_keeps_api_order() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        let questions = client
            .list(&token("good"), &CancellationToken::new())
            .await
            .unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("1"), Some("2")]);
    }

    #[tokio::test]
    async fn bad_token_maps_to_unauthorized() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        let result = client
            .list(&token("stale"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn create_returns_server_record() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        let created = client
            .create(&token("good"), &sample(None), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(created, sample(Some("42")));
    }

    #[tokio::test]
    async fn delete_reports_status_errors() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        let cancel = CancellationToken::new();
        client.delete(&token("good"), "7", &cancel).await.unwrap();
        let missing = client.delete(&token("good"), "missing", &cancel).await;
        assert!(matches!(
            missing,
            Err(ApiError::Status(StatusCode::NOT_FOUND))
        ));
    }

    #[tokio::test]
    async fn delete_keeps_id_in_one_path_segment() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        client
            .delete(&token("good"), "a/b?c#d", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            client.url(&["questions", "a/b?c#d"]).path(),
            "/api/admin/questions/a%2Fb%3Fc%23d"
        );
    }

    #[tokio::test]
    async fn cancelled_call_resolves_immediately() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = client.list(&token("good"), &cancel).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn cancellation_interrupts_in_flight_request() {
        let client = QuestionClient::new(spawn_api().await).unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let result = tracked("slow", &cancel, async {
            QuestionClient::send("slow", client.client.get(client.url(&["slow"]))).await?;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
