use minijinja::Environment;
use serde::Serialize;

use super::MailError;

/// Notification emails. Each has a `.subject.txt` and an `.html` template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    Welcome,
    SignupAlert,
    PasswordChanged,
    BlogApproved,
    BlogRejected,
    BlogPublished,
}

impl MailTemplate {
    fn name(&self) -> &'static str {
        match self {
            MailTemplate::Welcome => "welcome",
            MailTemplate::SignupAlert => "signup_alert",
            MailTemplate::PasswordChanged => "password_changed",
            MailTemplate::BlogApproved => "blog_approved",
            MailTemplate::BlogRejected => "blog_rejected",
            MailTemplate::BlogPublished => "blog_published",
        }
    }
}

const TEMPLATES: &[(&str, &str)] = &[
    ("welcome.subject.txt", "Welcome to NATAWO, {{ name }}"),
    (
        "welcome.html",
        "<p>Vanakkam {{ name }},</p>\
         <p>Thank you for joining the NATAWO writers' community. \
         You can now read, comment on and rate our writers' work and register for events.</p>\
         <p><a href=\"{{ site_url|safe }}\">Visit NATAWO</a></p>",
    ),
    ("signup_alert.subject.txt", "New NATAWO member: {{ name }}"),
    (
        "signup_alert.html",
        "<p>A new member has signed up.</p>\
         <ul><li>Name: {{ name }}</li><li>Email: {{ email }}</li></ul>\
         <p><a href=\"{{ site_url|safe }}/admin/users\">Manage users</a></p>",
    ),
    ("password_changed.subject.txt", "Your NATAWO password was changed"),
    (
        "password_changed.html",
        "<p>Hello {{ name }},</p>\
         <p>The password of your NATAWO account was changed. \
         If this was not you, reset your password immediately and contact us.</p>",
    ),
    ("blog_approved.subject.txt", "Your blog \"{{ title }}\" was approved"),
    (
        "blog_approved.html",
        "<p>Hello {{ name }},</p>\
         <p>Your blog <strong>{{ title }}</strong> was approved and will be published soon.</p>",
    ),
    ("blog_rejected.subject.txt", "Your blog \"{{ title }}\" needs changes"),
    (
        "blog_rejected.html",
        "<p>Hello {{ name }},</p>\
         <p>Your blog <strong>{{ title }}</strong> was not approved.</p>\
         {% if reason %}<p>Reviewer notes: {{ reason }}</p>{% endif %}\
         <p>You can revise it from your <a href=\"{{ site_url|safe }}/dashboard\">dashboard</a> and submit it again.</p>",
    ),
    ("blog_published.subject.txt", "Your blog \"{{ title }}\" is live"),
    (
        "blog_published.html",
        "<p>Hello {{ name }},</p>\
         <p>Your blog <strong>{{ title }}</strong> is now published.</p>\
         <p><a href=\"{{ site_url|safe }}/blogs/{{ blog_id }}\">Read it online</a></p>",
    ),
];

/// Compiled notification templates. HTML bodies are auto-escaped except
/// `site_url`, which comes from configuration and is marked `safe`.
pub struct MailTemplates {
    env: Environment<'static>,
}

impl MailTemplates {
    pub fn new() -> Result<Self, MailError> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| MailError::Template(format!("{}: {}", name, e)))?;
        }
        Ok(Self { env })
    }

    /// Render `(subject, html)` for a template
    pub fn render<S: Serialize>(
        &self,
        template: MailTemplate,
        ctx: S,
    ) -> Result<(String, String), MailError> {
        let ctx = minijinja::Value::from_serialize(&ctx);
        let render = |suffix: &str| {
            let name = format!("{}.{}", template.name(), suffix);
            self.env
                .get_template(&name)
                .and_then(|t| t.render(&ctx))
                .map_err(|e| MailError::Template(format!("{}: {}", name, e)))
        };

        Ok((render("subject.txt")?, render("html")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_templates_compile() {
        assert!(MailTemplates::new().is_ok());
    }

    #[test]
    fn test_render_subject_and_body() {
        let templates = MailTemplates::new().unwrap();
        let (subject, html) = templates
            .render(
                MailTemplate::BlogRejected,
                json!({"name": "Kavya", "title": "Monsoon", "reason": "Too short", "site_url": "https://natawo.org"}),
            )
            .unwrap();

        assert_eq!(subject, "Your blog \"Monsoon\" needs changes");
        assert!(html.contains("Reviewer notes: Too short"));
        assert!(html.contains("https://natawo.org/dashboard"));
    }

    #[test]
    fn test_links_keep_literal_urls() {
        let templates = MailTemplates::new().unwrap();
        let (_, html) = templates
            .render(
                MailTemplate::BlogPublished,
                json!({
                    "name": "Kavya",
                    "title": "Monsoon",
                    "blog_id": "8d0c4c8e-2f7a-4a55-9d49-0d3c4f1f6a10",
                    "site_url": "https://natawo.org"
                }),
            )
            .unwrap();

        assert!(html.contains(
            "href=\"https://natawo.org/blogs/8d0c4c8e-2f7a-4a55-9d49-0d3c4f1f6a10\""
        ));
        assert!(!html.contains("&#x2f;"));
    }

    #[test]
    fn test_html_body_is_escaped() {
        let templates = MailTemplates::new().unwrap();
        let (_, html) = templates
            .render(
                MailTemplate::Welcome,
                json!({"name": "<script>x</script>", "site_url": "https://natawo.org"}),
            )
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
