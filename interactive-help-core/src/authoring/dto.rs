use crate::types::Presentation;
use serde::{Deserialize, Serialize};

// ── Helper defaults for serde ──

fn default_true() -> bool {
    true
}

fn is_false(v: &bool) -> bool {
    !v
}

fn is_true(v: &bool) -> bool {
    *v
}

// ── Top-level DTO ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpTreeDto {
    pub id: String,
    /// Page shown first.
    pub entry: String,
    pub pages: Vec<PageDto>,
    #[serde(default)]
    pub links: Vec<LinkDto>,
    #[serde(default)]
    pub shortcuts: Vec<ShortcutDto>,
}

// ── Page ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDto {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Presentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_separator: Option<String>,
}

// ── Link ──

/// A single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn as_slice(&self) -> &[String] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDto {
    pub from: String,
    pub to: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub free_text: bool,
    /// Make `from` the parent of every target.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub backlink: bool,
}

// ── Shortcut group ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutKind {
    Parent,
    Root,
}

/// Parent or root shortcut from every page in `pages` to `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutDto {
    pub kind: ShortcutKind,
    pub target: String,
    pub pages: Vec<String>,
    /// One symbol for all pages or one per page; configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
