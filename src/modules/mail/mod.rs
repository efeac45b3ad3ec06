//! Transactional mail
//!
//! An HTTP mail API client (`{"from","to","subject","html"}` with a bearer
//! key) and the minijinja templates for notification emails.

mod mailer;
mod templates;

pub use mailer::{HttpMailer, MailError, MailMessage, Mailer};
pub use templates::{MailTemplate, MailTemplates};
