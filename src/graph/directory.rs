//! Directory user search.

use async_trait::async_trait;
use serde_json::Value;

use super::{DirectorySearch, GraphClient, Identity};

#[async_trait]
impl DirectorySearch for GraphClient {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<Identity>> {
        let Some(sanitized) = sanitize_query(query) else {
            return Ok(Vec::new());
        };

        let filter = format!(
            "startswith(displayName,'{0}') or startswith(mail,'{0}')",
            sanitized
        );
        let path = format!(
            "/users?$filter={}&$select=id,displayName,mail,userPrincipalName&$top=10",
            urlencoding::encode(&filter)
        );

        let result = self.get(&path).await?;
        let users = result
            .pointer("/value")
            .and_then(Value::as_array)
            .map(|users| users.iter().map(identity_from_user).collect())
            .unwrap_or_default();

        Ok(users)
    }
}

/// Trim and escape a search term for an OData string literal. Returns `None`
/// for an effectively empty query.
fn sanitize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replace('\'', "''"))
}

fn identity_from_user(user: &Value) -> Identity {
    let upn = user
        .pointer("/userPrincipalName")
        .and_then(Value::as_str)
        .unwrap_or_default();
    // Some accounts have no mail attribute; the UPN is the usable address.
    let email = user
        .pointer("/mail")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(upn);

    Identity {
        id: user
            .pointer("/id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        display_name: user
            .pointer("/displayName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        email: email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_odata_quotes() {
        assert_eq!(sanitize_query("O'Brien"), Some("O''Brien".to_string()));
        assert_eq!(sanitize_query("  Jane  "), Some("Jane".to_string()));
        assert_eq!(sanitize_query("   "), None);
        assert_eq!(sanitize_query(""), None);
    }

    #[test]
    fn falls_back_to_upn_when_mail_missing() {
        let user = json!({
            "id": "u1",
            "displayName": "Jane Doe",
            "mail": null,
            "userPrincipalName": "jane@example.com"
        });
        let identity = identity_from_user(&user);
        assert_eq!(identity.email, "jane@example.com");
    }

    #[test]
    fn prefers_mail_over_upn() {
        let user = json!({
            "id": "u1",
            "displayName": "Jane Doe",
            "mail": "jane.doe@example.com",
            "userPrincipalName": "jane@example.onmicrosoft.com"
        });
        let identity = identity_from_user(&user);
        assert_eq!(identity.email, "jane.doe@example.com");
    }
}
