//! Notification envelope shared by the bus and the push service.
//!
//! The JSON form matches the ntfy publish-as-JSON body, so a decoded
//! envelope can be posted as is.

use serde::{Deserialize, Serialize};

/// Severity marker rendered by ntfy as a red circle emoji
pub const TAG_RED_CIRCLE: &str = "red_circle";

/// Tag attached to every error envelope.
///
/// ntfy turns tags that match an emoji short code into the emoji, so this is
/// written `red_circle` rather than `red circle`.
pub const ERROR_SEVERITY_TAG: &str = TAG_RED_CIRCLE;

/// ntfy message priority (1 = min, 5 = max)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Min,
    Low,
    Default,
    High,
    Max,
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Min),
            2 => Ok(Priority::Low),
            3 => Ok(Priority::Default),
            4 => Ok(Priority::High),
            5 => Ok(Priority::Max),
            other => Err(format!("priority must be between 1 and 5, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Min => 1,
            Priority::Low => 2,
            Priority::Default => 3,
            Priority::High => 4,
            Priority::Max => 5,
        }
    }
}

/// A push notification moved across the bridge.
///
/// Fields are read-only once built. `topic` must be non-empty before the
/// envelope is eligible for delivery; the other fields may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    topic: String,

    #[serde(default)]
    title: String,

    #[serde(default)]
    message: String,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    click: Option<String>,
}

impl Envelope {
    pub fn new(
        topic: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            title: title.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// URL opened when the notification is tapped
    pub fn with_click(mut self, click: impl Into<String>) -> Self {
        self.click = Some(click.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn click(&self) -> Option<&str> {
        self.click.as_deref()
    }

    /// Whether the envelope can be handed to the push service
    pub fn has_topic(&self) -> bool {
        !self.topic.is_empty()
    }

    /// Serialized wire form
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
