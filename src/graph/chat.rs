//! 1:1 Teams chat messaging.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ChatMessenger, GraphClient, GraphError};

impl GraphClient {
    /// Create (or re-open) the 1:1 chat between the signed-in user and the
    /// recipient. Graph returns the existing chat when one is already there.
    async fn ensure_chat(&self, recipient_id: &str) -> anyhow::Result<String> {
        let body = json!({
            "chatType": "oneOnOne",
            "members": [
                member_bind(self.self_user_id()),
                member_bind(recipient_id),
            ],
        });

        let chat = self.post("/chats", &body).await?;
        chat.pointer("/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GraphError::Shape("chat creation response missing id".to_string()).into())
    }

    async fn post_message(
        &self,
        recipient_id: &str,
        content_type: &str,
        content: &str,
    ) -> anyhow::Result<String> {
        let chat_id = self.ensure_chat(recipient_id).await?;
        let message = self
            .post(
                &format!("/chats/{}/messages", chat_id),
                &json!({
                    "body": { "contentType": content_type, "content": content }
                }),
            )
            .await?;

        Ok(message
            .pointer("/id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

#[async_trait]
impl ChatMessenger for GraphClient {
    async fn send_html(&self, recipient_id: &str, html: &str) -> anyhow::Result<String> {
        self.post_message(recipient_id, "html", html).await
    }

    async fn send_text(&self, recipient_id: &str, text: &str) -> anyhow::Result<()> {
        self.post_message(recipient_id, "text", text).await?;
        Ok(())
    }
}

fn member_bind(user_id: &str) -> Value {
    json!({
        "@odata.type": "#microsoft.graph.aadUserConversationMember",
        "roles": ["owner"],
        "user@odata.bind": format!("https://graph.microsoft.com/v1.0/users/{}", user_id),
    })
}
