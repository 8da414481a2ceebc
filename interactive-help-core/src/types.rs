use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Default symbols ──────────────────────────────────────────

/// Reaction that ends a session from any page.
pub const DEFAULT_EXIT_TRIGGER: &str = "❌";

/// Reaction used by parent shortcuts.
pub const DEFAULT_PARENT_TRIGGER: &str = "🔙";

/// Reaction used by root shortcuts.
pub const DEFAULT_ROOT_TRIGGER: &str = "🔝";

/// Keycap digits handed out, in order, to links created without a trigger.
pub const DEFAULT_LINK_TRIGGERS: [&str; 9] = [
    "1\u{20e3}",
    "2\u{20e3}",
    "3\u{20e3}",
    "4\u{20e3}",
    "5\u{20e3}",
    "6\u{20e3}",
    "7\u{20e3}",
    "8\u{20e3}",
    "9\u{20e3}",
];

// ─── Identifiers ──────────────────────────────────────────────

/// Index of a page inside a [`HelpGraph`](crate::graph::HelpGraph) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub(crate) u32);

impl PageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page#{}", self.0)
    }
}

/// Index of an entry link (a trigger-less link that starts a session).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub(crate) u32);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// Transport-level identity of a chat user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Triggers ─────────────────────────────────────────────────

/// What makes a link fire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// A reaction symbol on the displayed message.
    Reaction(String),
    /// Any text message typed by the user.
    FreeText,
}

impl Trigger {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Trigger::Reaction(symbol) => Some(symbol),
            Trigger::FreeText => None,
        }
    }
}

/// Role of a link on its owning page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Regular,
    FreeText,
    Parent,
    Root,
    Entry,
}

// ─── Presentation ─────────────────────────────────────────────

/// How a rendered page should be shown by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Presentation {
    /// Plain chat message.
    Plain,
    /// Rich card. `title` and `colour` are passed through untouched.
    Embed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        colour: Option<u32>,
    },
}

impl Default for Presentation {
    fn default() -> Self {
        Presentation::embed()
    }
}

impl Presentation {
    pub fn embed() -> Self {
        Presentation::Embed {
            title: None,
            colour: None,
        }
    }
}

/// Output of [`Page::render`](crate::page::Page::render), ready for a gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub text: String,
    pub presentation: Presentation,
}

// ─── Transport handles & events ───────────────────────────────

/// Private one-to-one channel between the bot and a user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelHandle {
    pub channel_id: String,
}

/// A message the bot sent and may later delete.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub message_id: String,
    pub channel_id: String,
}

/// A reaction added by a user, with the transport's raw payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub symbol: String,
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl ReactionEvent {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            raw: serde_json::Value::Null,
        }
    }
}

/// A text message typed by a user, with the transport's raw payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextEvent {
    pub text: String,
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl TextEvent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            raw: serde_json::Value::Null,
        }
    }
}
