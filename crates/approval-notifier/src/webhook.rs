//! JSON webhook transport.

use crate::error::{NotifyError, NotifyResult};
use crate::{ApprovalNotice, Notifier};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    to: &'a str,
    subject: String,
    text: String,
    subject_id: &'a str,
    approval_link: &'a str,
}

/// Posts each notice as JSON to a mail relay or chat webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    http_client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>) -> NotifyResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> NotifyResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notice: &ApprovalNotice) -> NotifyResult<()> {
        let payload = WebhookPayload {
            to: &notice.operator_address,
            subject: notice.subject_line(),
            text: notice.body_text(),
            subject_id: &notice.subject_id,
            approval_link: &notice.approval_link,
        };

        debug!(subject_id = %notice.subject_id, "dispatching approval notice");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(subject_id = %notice.subject_id, "approval notice delivered");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        error!(status = %status, message = %message, "approval notice rejected");
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    fn notice() -> ApprovalNotice {
        ApprovalNotice {
            operator_address: "ops@example.com".to_string(),
            subject_id: "ledger.pdf".to_string(),
            approval_link: "http://files.test/approve/t0k3n".to_string(),
        }
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/hook", addr)
    }

    #[tokio::test]
    async fn posts_notice_as_json() {
        let received: Arc<Mutex<Vec<serde_json::Value>>> = Arc::default();
        let sink = received.clone();
        let router = Router::new().route(
            "/hook",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(body);
                    StatusCode::OK
                }
            }),
        );
        let endpoint = spawn(router).await;

        WebhookNotifier::new(endpoint)
            .unwrap()
            .send(&notice())
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["to"], "ops@example.com");
        assert_eq!(received[0]["subjectId"], "ledger.pdf");
        assert_eq!(received[0]["approvalLink"], "http://files.test/approve/t0k3n");
        assert_eq!(received[0]["subject"], "Access request for ledger.pdf");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let router = Router::new().route(
            "/hook",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "relay down") }),
        );
        let endpoint = spawn(router).await;

        let err = WebhookNotifier::new(endpoint)
            .unwrap()
            .send(&notice())
            .await
            .unwrap_err();

        match err {
            NotifyError::Rejected { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "relay down");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = WebhookNotifier::with_timeout(
            format!("http://{}/hook", addr),
            Duration::from_secs(2),
        )
        .unwrap()
        .send(&notice())
        .await
        .unwrap_err();

        assert!(matches!(err, NotifyError::Http(_)));
    }
}
