use crate::types::{EntryId, LinkKind, PageId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit trail of one user's traversal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Started {
        session_id: Uuid,
        user: UserId,
    },
    EntryLinkTaken {
        entry: EntryId,
        to: PageId,
    },
    Displayed {
        page: PageId,
        message_id: String,
    },
    /// A reaction that matches no link on the page. The prompt stays active.
    InputIgnored {
        page: PageId,
        symbol: String,
    },
    TextCaptured {
        page: PageId,
        /// Index of the input in the session history.
        position: usize,
    },
    LinkTaken {
        from: PageId,
        kind: LinkKind,
        /// Reaction symbol, `None` for free-text links.
        symbol: Option<String>,
        to: PageId,
    },
    Terminated {
        page: PageId,
    },
}
