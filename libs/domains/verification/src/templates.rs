//! Verification email rendering.
//!
//! Handlebars-based rendering of the two body styles the revisions
//! ship: an HTML + plain-text pair with a clickable link, or a single
//! plain-text notice stating how soon the link expires.

use crate::error::{NotificationError, NotificationResult};
use handlebars::Handlebars;
use serde_json::json;

/// Fixed subject line for every verification email.
pub const VERIFICATION_SUBJECT: &str = "Verify Your Email Address";

/// How long an activation link stays valid, in minutes.
pub const LINK_EXPIRY_MINUTES: i64 = 2;

const LINK_PAIR_TEXT_TEMPLATE: &str = "Dear User,\n\n\
Please click on the following link to verify your email address.\n\
{{{activation_link}}}\n\n\
Thanks";

const LINK_PAIR_HTML_TEMPLATE: &str = "<p>Dear User,</p>\
<p>Please click on the following link to verify your email address.</p>\
<a href=\"{{{activation_link}}}\">Verify Email</a>\
<p>Thanks</p>";

const EXPIRY_NOTICE_TEXT_TEMPLATE: &str = "Please click on the following link to verify \
your email address. This link will expire in {{expiry_minutes}} minutes.\n\
{{{activation_link}}}";

/// Which body variant to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    /// HTML and plain text with a clickable link, greeting and sign-off.
    LinkPair,
    /// Single plain-text sentence with the expiry window. No HTML part.
    ExpiryNotice,
}

/// A rendered email body.
#[derive(Debug, Clone)]
pub struct RenderedBody {
    pub text: String,
    pub html: Option<String>,
}

/// Template engine with all verification templates registered.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();

        for (name, template) in [
            ("link_pair_text", LINK_PAIR_TEXT_TEMPLATE),
            ("link_pair_html", LINK_PAIR_HTML_TEMPLATE),
            ("expiry_notice_text", EXPIRY_NOTICE_TEXT_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| {
                    NotificationError::Template(format!("failed to register {name}: {e}"))
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Render the verification body for the given activation link.
    pub fn render_verification(
        &self,
        style: BodyStyle,
        activation_link: &str,
    ) -> NotificationResult<RenderedBody> {
        let data = json!({
            "activation_link": activation_link,
            "expiry_minutes": LINK_EXPIRY_MINUTES,
        });

        match style {
            BodyStyle::LinkPair => Ok(RenderedBody {
                text: self.handlebars.render("link_pair_text", &data)?,
                html: Some(self.handlebars.render("link_pair_html", &data)?),
            }),
            BodyStyle::ExpiryNotice => Ok(RenderedBody {
                text: self.handlebars.render("expiry_notice_text", &data)?,
                html: None,
            }),
        }
    }
}
