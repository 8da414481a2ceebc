//! Interactive Help - reaction-driven help navigation for chat bots
//!
//! A help flow is a graph of pages. Each page is shown to the user as one
//! message; the user picks an option by reacting with a symbol or by typing
//! a message, and the navigator moves on to the next page until the user
//! reacts with the exit trigger.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Authoring: GraphBuilder API  /  YAML (parse → validate → build)│
//! └─────────────────────────────────────────────────────────────────┘
//!                               │ build()
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 HelpGraph (immutable, Arc-shared)               │
//! │          pages[PageId] ── links ──► targets[PageId]             │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │             Navigator (one task per session)                    │
//! │   SessionContext: current page, inputs, content overrides       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    MessagingGateway                             │
//! │       MemoryGateway (tests)  /  console  /  chat client         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use interactive_help::{GraphBuilder, LinkSpec, MemoryGateway, Navigator, Page, UserId};
//!
//! let mut builder = GraphBuilder::default();
//! let home = builder.add_page(Page::new("How can I help?"));
//! let faq = builder.add_page(Page::new("Frequently asked questions"));
//! builder.add_link(home, LinkSpec::new(faq).description("FAQ"))?;
//!
//! let graph = Arc::new(builder.build()?);
//! let navigator = Arc::new(Navigator::new(Arc::new(MemoryGateway::new()), graph));
//! let report = navigator.spawn_session(UserId::new("ana"), home).await??;
//! ```

pub mod authoring;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod graph;
pub mod link;
pub mod memory;
pub mod navigator;
pub mod page;
pub mod session;
pub mod types;

// Re-export main types
pub use config::{HelpConfig, LayoutConfig, TriggerConfig};
pub use error::{ConfigError, GraphError, NavError};
pub use events::SessionEvent;
pub use gateway::{InputQueue, MessagingGateway, UserInput};
pub use graph::{GraphBuilder, HelpGraph, Shortcut, ShortcutTriggers};
pub use link::{Callback, CallbackContext, HookOutcome, Link, LinkHook, LinkSpec, Targets};
pub use memory::{MemoryGateway, SentMessage};
pub use navigator::Navigator;
pub use page::{Page, PageContent};
pub use session::{SessionContext, SessionReport, SessionState};
pub use types::{
    ChannelHandle, EntryId, LinkKind, MessageHandle, PageId, Presentation, ReactionEvent,
    RenderedPage, TextEvent, Trigger, UserId, DEFAULT_EXIT_TRIGGER, DEFAULT_LINK_TRIGGERS,
    DEFAULT_PARENT_TRIGGER, DEFAULT_ROOT_TRIGGER,
};
