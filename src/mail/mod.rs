use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

pub const INVITE_SUBJECT: &str = "You have been invited to a circle";
pub const INVITE_TEXT: &str = include_str!("templates/invite.txt");
pub const INVITE_HTML: &str = include_str!("templates/invite.html");

pub const VERIFY_SUBJECT: &str = "Confirm your email address";
pub const VERIFY_TEXT: &str = include_str!("templates/verify_email.txt");
pub const VERIFY_HTML: &str = include_str!("templates/verify_email.html");

pub const RESET_SUBJECT: &str = "Reset your password";
pub const RESET_TEXT: &str = include_str!("templates/reset_password.txt");
pub const RESET_HTML: &str = include_str!("templates/reset_password.html");

/// Outbound email. Delivery is an external concern; the application only
/// depends on this interface.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> anyhow::Result<()>;
}

/// Writes outgoing mail to the log. Used where delivery is relayed
/// off-process (the log stream is the handover point).
pub struct LogMailer {
    pub from: String,
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, text: &str, _html: &str) -> anyhow::Result<()> {
        info!(from = %self.from, to = %to, subject = %subject, body = %text, "outgoing mail");
        Ok(())
    }
}

/// Convenience for building a value map from a `json!` object literal.
pub fn values(object: Value) -> Map<String, Value> {
    object.as_object().cloned().unwrap_or_default()
}

pub fn link_to(base_url: &str, path_and_query: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path_and_query)
}

/// Substitute `#key#` placeholders in a template. Only string and number
/// values are substituted; placeholders whose value is any other JSON type
/// are left untouched.
pub fn render(template: &str, values: &Map<String, Value>) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        let replacement = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        out = out.replace(&format!("#{key}#"), &replacement);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_to_handles_trailing_slash() {
        assert_eq!(
            link_to("http://app.local/", "verifyEmail?hash=x"),
            "http://app.local/verifyEmail?hash=x"
        );
        assert_eq!(
            link_to("http://app.local", "verifyEmail?hash=x"),
            "http://app.local/verifyEmail?hash=x"
        );
    }

    #[test]
    fn render_substitutes_strings_and_numbers() {
        let out = render(
            "circle #circleName# has #memberCount# members",
            &values(json!({"circleName": "Family", "memberCount": 4})),
        );
        assert_eq!(out, "circle Family has 4 members");
    }

    #[test]
    fn render_leaves_non_scalar_values_untouched() {
        let out = render(
            "a #flag# b #list# c #missing#",
            &values(json!({"flag": true, "list": [1, 2]})),
        );
        assert_eq!(out, "a #flag# b #list# c #missing#");
    }

    #[test]
    fn render_replaces_every_occurrence() {
        let out = render("#name# and #name#", &values(json!({"name": "Ana"})));
        assert_eq!(out, "Ana and Ana");
    }

    #[test]
    fn invite_template_carries_circle_name_placeholder() {
        assert!(INVITE_TEXT.contains("#circleName#"));
        assert!(INVITE_HTML.contains("#circleName#"));
        let out = render(INVITE_TEXT, &values(json!({"circleName": "Hiking crew"})));
        assert!(out.contains("Hiking crew"));
        assert!(!out.contains("#circleName#"));
    }
}
