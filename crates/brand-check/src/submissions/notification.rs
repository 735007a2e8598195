use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use super::domain::{Submission, SubmissionId};
use crate::config::NotificationConfig;

/// Summary sent to the site owner when a survey arrives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyNotification {
    pub result_id: SubmissionId,
    pub company_name: String,
    pub respondent_name: String,
    pub respondent_email: String,
    pub industry: Option<String>,
    pub revenue_scale: Option<String>,
    pub business_phase: String,
    pub avg_score: String,
}

impl From<&Submission> for SurveyNotification {
    fn from(submission: &Submission) -> Self {
        Self {
            result_id: submission.id,
            company_name: submission.company_name.clone(),
            respondent_name: submission.respondent_name.clone(),
            respondent_email: submission.respondent_email.clone(),
            industry: submission.industry.clone(),
            revenue_scale: submission.revenue_scale.clone(),
            business_phase: submission.business_phase.clone(),
            avg_score: submission.scores.average_display(),
        }
    }
}

/// Outbound notification hook. Callers treat failures as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: SurveyNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification rejected with {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Sends the admin e-mail through the Resend REST API.
#[derive(Clone)]
pub struct ResendNotifier {
    http: Client,
    config: NotificationConfig,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

impl ResendNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn result_url(&self, id: &SubmissionId) -> String {
        format!(
            "{}/results/{id}",
            self.config.result_base_url.trim_end_matches('/')
        )
    }
}

pub fn email_subject(notification: &SurveyNotification) -> String {
    format!("新しいブランドチェック回答: {}", notification.company_name)
}

pub fn email_html(notification: &SurveyNotification, result_url: &str) -> String {
    let rows = [
        ("企業名", notification.company_name.as_str()),
        ("回答者", notification.respondent_name.as_str()),
        ("メール", non_empty(&notification.respondent_email)),
        (
            "業種",
            notification.industry.as_deref().unwrap_or("未入力"),
        ),
        ("事業フェーズ", notification.business_phase.as_str()),
    ];

    let mut html = String::from(
        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2>新しいブランドチェック回答が届きました</h2><div>",
    );
    for (label, value) in rows {
        html.push_str(&format!(
            "<p><strong>{label}:</strong> {}</p>",
            escape_html(value)
        ));
    }
    html.push_str(&format!(
        "<p><strong>平均スコア:</strong> {} / 5.0</p></div>",
        notification.avg_score
    ));
    html.push_str(&format!(
        "<p><a href=\"{}\">結果を確認する</a></p></div>",
        escape_html(result_url)
    ));
    html
}

fn non_empty(value: &str) -> &str {
    if value.trim().is_empty() {
        "未入力"
    } else {
        value
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn notify(&self, notification: SurveyNotification) -> Result<(), NotificationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(NotificationError::NotConfigured("RESEND_API_KEY is not set"))?;
        let admin_email = self
            .config
            .admin_email
            .as_deref()
            .ok_or(NotificationError::NotConfigured("ADMIN_EMAIL is not set"))?;

        let result_url = self.result_url(&notification.result_id);
        let request = EmailRequest {
            from: &self.config.from_address,
            to: [admin_email],
            subject: email_subject(&notification),
            html: email_html(&notification, &result_url),
        };

        let response = self
            .http
            .post(format!(
                "{}/emails",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .map_err(|err| NotificationError::Transport(err.to_string()))?;
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(result_id = %notification.result_id, "survey notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn notification() -> SurveyNotification {
        SurveyNotification {
            result_id: SubmissionId(Uuid::nil()),
            company_name: "A&B <Studio>".to_string(),
            respondent_name: "佐藤".to_string(),
            respondent_email: String::new(),
            industry: None,
            revenue_scale: None,
            business_phase: "売り出し中".to_string(),
            avg_score: "3.5".to_string(),
        }
    }

    fn config(base_url: String) -> NotificationConfig {
        NotificationConfig {
            api_key: Some("re_test".to_string()),
            base_url,
            admin_email: Some("admin@example.com".to_string()),
            from_address: "delivered@resend.dev".to_string(),
            result_base_url: "https://brand-check.example/".to_string(),
        }
    }

    #[test]
    fn html_escapes_and_fills_placeholders() {
        let html = email_html(&notification(), "https://brand-check.example/results/x");
        assert!(html.contains("A&amp;B &lt;Studio&gt;"));
        assert!(html.contains("<strong>メール:</strong> 未入力"));
        assert!(html.contains("<strong>業種:</strong> 未入力"));
        assert!(html.contains("3.5 / 5.0"));
        assert_eq!(
            email_subject(&notification()),
            "新しいブランドチェック回答: A&B <Studio>"
        );
    }

    #[tokio::test]
    async fn posts_email_to_admin() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer re_test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "from": "delivered@resend.dev",
                "to": ["admin@example.com"]
            })))
            .with_status(200)
            .with_body(r#"{"id":"email-1"}"#)
            .create_async()
            .await;

        let notifier = ResendNotifier::new(config(server.url()));
        notifier
            .notify(notification())
            .await
            .expect("notification sent");
        mock.assert_async().await;

        assert_eq!(
            notifier.result_url(&SubmissionId(Uuid::nil())),
            "https://brand-check.example/results/00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    async fn rejected_requests_surface_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/emails")
            .with_status(422)
            .with_body("invalid from address")
            .create_async()
            .await;

        let notifier = ResendNotifier::new(config(server.url()));
        match notifier.notify(notification()).await {
            Err(NotificationError::Rejected { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid from address");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_rejection_body_is_a_transport_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\nconnection: close\r\n\r\npartial")
                .await
                .expect("write");
        });

        let notifier = ResendNotifier::new(config(format!("http://{addr}")));
        let result = notifier.notify(notification()).await;
        server.await.expect("server task");

        assert!(
            matches!(result, Err(NotificationError::Transport(_))),
            "expected transport error, got {result:?}"
        );
    }

    #[tokio::test]
    async fn missing_admin_address_is_not_configured() {
        let mut config = config("http://127.0.0.1:9".to_string());
        config.admin_email = None;
        let notifier = ResendNotifier::new(config);
        assert!(matches!(
            notifier.notify(notification()).await,
            Err(NotificationError::NotConfigured(_))
        ));
    }
}
