use crate::error::ServiceError;
use crate::models::{AnswerSet, QuizListing, QuizPayload, SubmitReceipt};
use crate::service::QuizDataService;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Serialize)]
struct SubmissionBody<'a> {
    answers: &'a AnswerSet,
}

/// JSON-over-HTTP quiz backend.
#[derive(Debug, Clone)]
pub struct HttpQuizService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpQuizService {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_token))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_token,
        }
    }

    /// Appends `segments` to the base url. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay inside their segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let invalid = || ServiceError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        info!("HttpQuizService GET {}", url);
        let response = self.authorize(self.client.get(url)).send().await?;
        decode(check_status(response).await?).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ServiceError> {
        info!("HttpQuizService POST {}", url);
        let response = self
            .authorize(self.client.post(url))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or("No body".into());
    error!("HttpQuizService request failed: {} - {}", status, body);
    Err(ServiceError::Api(status, body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl QuizDataService for HttpQuizService {
    async fn list_quizzes(&self) -> Result<Vec<QuizListing>, ServiceError> {
        self.get_json(self.endpoint(&["quizzes"])?).await
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizPayload, ServiceError> {
        self.get_json(self.endpoint(&["quizzes", quiz_id])?).await
    }

    async fn submit_answers(
        &self,
        quiz_id: &str,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, ServiceError> {
        let body = SubmissionBody { answers };
        self.post_json(self.endpoint(&["quizzes", quiz_id, "submissions"])?, &body)
            .await
    }

    fn describe(&self) -> String {
        format!("Remote: {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn service(base: &str) -> HttpQuizService {
        HttpQuizService::with_client(Client::new(), base, None)
    }

    /// Reads one request, headers plus `content-length` bytes of body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Local server answering a single request with `status` and `body`.
    /// The handle resolves to the raw request it received.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (base, handle)
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let s = service("https://api.example.com/v1/");
        assert_eq!(
            s.endpoint(&["quizzes", "7"]).unwrap().as_str(),
            "https://api.example.com/v1/quizzes/7"
        );
        assert_eq!(
            service("http://localhost:8080")
                .endpoint(&["quizzes"])
                .unwrap()
                .as_str(),
            "http://localhost:8080/quizzes"
        );
    }

    #[test]
    fn test_endpoint_escapes_quiz_id() {
        let url = service("http://localhost:8080")
            .endpoint(&["quizzes", "a/b?c#d", "submissions"])
            .unwrap();
        assert_eq!(url.path(), "/quizzes/a%2Fb%3Fc%23d/submissions");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_endpoint_rejects_bad_base() {
        let err = service("not a url").endpoint(&["quizzes"]).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUrl(_)));
    }

    #[test]
    fn test_describe_names_base_url() {
        assert_eq!(
            service("http://localhost:8080").describe(),
            "Remote: http://localhost:8080"
        );
    }

    #[test]
    fn test_submission_body_shape() {
        let answers: AnswerSet = [(1, "B"), (2, "D")].into_iter().collect();
        let body = serde_json::to_value(SubmissionBody { answers: &answers }).unwrap();
        assert_eq!(body, serde_json::json!({ "answers": { "1": "B", "2": "D" } }));
    }

    #[tokio::test]
    async fn test_fetch_quiz_decodes_payload() {
        let body = r#"{"name":"Geography","durationSeconds":60,"questions":[{"prompt":"Capital of France?","options":["Paris","Rome"],"correctAnswer":"Paris"}]}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let payload = service(&base).fetch_quiz("geo").await.unwrap();
        assert_eq!(payload.name.as_deref(), Some("Geography"));
        assert_eq!(payload.duration_seconds, Some(60));
        assert_eq!(payload.questions.unwrap()[0].correct_answer, "Paris");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /quizzes/geo HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_list_quizzes_decodes_listings() {
        let body = r#"[{"id":"geo","name":"Geography","durationSeconds":60,"questionCount":4}]"#;
        let (base, server) = serve_once("200 OK", body).await;

        let listings = service(&base).list_quizzes().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "geo");
        assert_eq!(listings[0].question_count, Some(4));
        assert!(server.await.unwrap().starts_with("GET /quizzes HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_submit_answers_posts_body_with_token() {
        let (base, server) = serve_once("200 OK", r#"{"accepted":true}"#).await;
        let s = HttpQuizService::with_client(Client::new(), base, Some("tok".to_string()));
        let answers: AnswerSet = [(1, "Paris")].into_iter().collect();

        let receipt = s.submit_answers("geo", &answers).await.unwrap();
        assert!(receipt.accepted);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /quizzes/geo/submissions HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: bearer tok"));
        assert!(request.ends_with(r#"{"answers":{"1":"Paris"}}"#));
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let (base, _server) = serve_once("404 Not Found", "no such quiz").await;

        let err = service(&base).fetch_quiz("missing").await.unwrap_err();
        match err {
            ServiceError::Api(status, body) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "no such quiz");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let (base, _server) = serve_once("200 OK", "{ not json").await;

        let err = service(&base).fetch_quiz("geo").await.unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_escaped_id_reaches_server_as_one_segment() {
        let (base, server) = serve_once("404 Not Found", "").await;

        let _ = service(&base).fetch_quiz("a/b?c").await;
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /quizzes/a%2Fb%3Fc HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let s = HttpQuizService::new("http://127.0.0.1:9", None, Duration::from_millis(200))
            .unwrap();
        let err = s.fetch_quiz("any").await.unwrap_err();
        assert!(matches!(err, ServiceError::Http(_)));
    }
}
