//! Request-scoped form objects decoded from POST bodies.
//!
//! Each form owns a [`Validator`] holding its diagnostics, so a failed
//! submission can be re-rendered with both the user's input and the errors.

use serde::{Deserialize, Deserializer};

use crate::validator::{self, EMAIL_RX, Validator};

/// Expiry periods (days) a snippet may be created with.
pub const EXPIRY_CHOICES: [i64; 3] = [1, 7, 365];

const BLANK: &str = "This field cannot be blank";
const BAD_EMAIL: &str = "This field must be a valid email address";

#[derive(Debug, Clone, Deserialize)]
pub struct SnippetCreateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "empty_as_zero")]
    pub expires: i64,
    #[serde(skip)]
    pub validator: Validator,
}

/// An empty field decodes as `0` and so fails validation rather than
/// decoding; anything else must be an integer.
fn empty_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(serde::de::Error::custom)
}

impl Default for SnippetCreateForm {
    /// The blank form offered on the create page defaults to one year.
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: 365,
            validator: Validator::default(),
        }
    }
}

impl SnippetCreateForm {
    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(validator::not_blank(&self.title), "title", BLANK);
        v.check_field(
            validator::max_chars(&self.title, 100),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(validator::not_blank(&self.content), "content", BLANK);
        v.check_field(
            validator::allowed_value(&self.expires, &EXPIRY_CHOICES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip)]
    pub validator: Validator,
}

impl UserSignupForm {
    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(validator::not_blank(&self.name), "name", BLANK);
        v.check_field(
            validator::max_chars(&self.name, 255),
            "name",
            "This field cannot be more than 255 characters long",
        );
        v.check_field(validator::not_blank(&self.email), "email", BLANK);
        v.check_field(validator::matches(&self.email, &EMAIL_RX), "email", BAD_EMAIL);
        v.check_field(validator::not_blank(&self.password), "password", BLANK);
        v.check_field(
            validator::min_chars(&self.password, 8),
            "password",
            "This field must be at least 8 characters long",
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserLoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip)]
    pub validator: Validator,
}

impl UserLoginForm {
    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(validator::not_blank(&self.email), "email", BLANK);
        v.check_field(validator::matches(&self.email, &EMAIL_RX), "email", BAD_EMAIL);
        v.check_field(validator::not_blank(&self.password), "password", BLANK);
    }
}
