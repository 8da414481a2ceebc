//! Links: the edges of the help graph.
//!
//! A link owns its pre-display callbacks and references one or more target
//! pages by id. Callbacks never touch the graph; their effects land in the
//! [`SessionContext`] of the session that took the link.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::NavError;
use crate::session::SessionContext;
use crate::types::{LinkKind, PageId, Trigger, UserId};

/// What a callback sees while a link is being taken.
pub struct CallbackContext<'a> {
    pub user: &'a UserId,
    /// Free-text inputs of this session, oldest first.
    pub inputs: &'a [String],
    pub link: &'a Link,
    /// Target index currently selected (0 unless an earlier callback changed it).
    pub selected: usize,
}

impl CallbackContext<'_> {
    /// `n`-th input counted from the most recent one (`1` = last).
    pub fn input_from_end(&self, n: usize) -> Option<&str> {
        if n == 0 || n > self.inputs.len() {
            return None;
        }
        Some(self.inputs[self.inputs.len() - n].as_str())
    }
}

/// Effect of one callback on the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    /// Follow `targets[index]` instead.
    Select(usize),
    /// Replace the content of the currently selected target for this session.
    SetContent(String),
}

/// Async side effect run before a link resolves (database writes, lookups).
///
/// Hooks that keep state between steps must key it by [`UserId`]; the session
/// only carries the free-text history.
#[async_trait]
pub trait LinkHook: Send + Sync {
    async fn call(&self, ctx: &CallbackContext<'_>) -> anyhow::Result<HookOutcome>;
}

pub type SelectorFn = Arc<dyn Fn(&CallbackContext<'_>) -> usize + Send + Sync>;
pub type ContentFn = Arc<dyn Fn(&CallbackContext<'_>) -> Option<String> + Send + Sync>;

/// Pre-display behaviour attached to a link.
#[derive(Clone)]
pub enum Callback {
    /// Choose the target index.
    Select(SelectorFn),
    /// Compute content for the selected target; `None` keeps the current one.
    ComputeContent(ContentFn),
    Hook(Arc<dyn LinkHook>),
}

impl Callback {
    pub fn select(f: impl Fn(&CallbackContext<'_>) -> usize + Send + Sync + 'static) -> Self {
        Callback::Select(Arc::new(f))
    }

    pub fn compute_content(
        f: impl Fn(&CallbackContext<'_>) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Callback::ComputeContent(Arc::new(f))
    }

    pub fn hook(hook: impl LinkHook + 'static) -> Self {
        Callback::Hook(Arc::new(hook))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Select(_) => f.write_str("Callback::Select"),
            Callback::ComputeContent(_) => f.write_str("Callback::ComputeContent"),
            Callback::Hook(_) => f.write_str("Callback::Hook"),
        }
    }
}

// ─── Targets ──────────────────────────────────────────────────

/// One or more candidate pages. A single page converts into a one-element list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Targets(pub Vec<PageId>);

impl From<PageId> for Targets {
    fn from(page: PageId) -> Self {
        Targets(vec![page])
    }
}

impl From<Vec<PageId>> for Targets {
    fn from(pages: Vec<PageId>) -> Self {
        Targets(pages)
    }
}

impl From<&[PageId]> for Targets {
    fn from(pages: &[PageId]) -> Self {
        Targets(pages.to_vec())
    }
}

impl<const N: usize> From<[PageId; N]> for Targets {
    fn from(pages: [PageId; N]) -> Self {
        Targets(pages.to_vec())
    }
}

// ─── Link ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Link {
    pub(crate) kind: LinkKind,
    pub(crate) trigger: Trigger,
    pub(crate) targets: Vec<PageId>,
    pub(crate) description: Option<String>,
    pub(crate) callbacks: Vec<Callback>,
}

impl Link {
    pub(crate) fn shortcut(
        kind: LinkKind,
        symbol: String,
        target: PageId,
        description: Option<String>,
    ) -> Self {
        Self {
            kind,
            trigger: Trigger::Reaction(symbol),
            targets: vec![target],
            description,
            callbacks: Vec::new(),
        }
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn targets(&self) -> &[PageId] {
        &self.targets
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Line shown under the page content, `None` for undescribed links.
    pub fn display_line(&self) -> Option<String> {
        let description = self.description.as_deref()?;
        Some(match &self.trigger {
            Trigger::Reaction(symbol) => format!("{symbol} {description}"),
            Trigger::FreeText => description.to_string(),
        })
    }

    fn target(&self, index: usize) -> Result<PageId, NavError> {
        self.targets
            .get(index)
            .copied()
            .ok_or(NavError::SelectionOutOfRange {
                index,
                len: self.targets.len(),
            })
    }

    /// Run every callback in order, then return the selected target.
    ///
    /// Selection starts at 0 on every traversal. An index outside `targets`
    /// fails the step instead of being clamped.
    pub async fn run_callbacks_and_select(
        &self,
        session: &mut SessionContext,
    ) -> Result<PageId, NavError> {
        let mut selected = 0usize;

        for callback in &self.callbacks {
            let outcome = {
                let ctx = CallbackContext {
                    user: session.user(),
                    inputs: session.input_history(),
                    link: self,
                    selected,
                };
                match callback {
                    Callback::Select(f) => HookOutcome::Select(f(&ctx)),
                    Callback::ComputeContent(f) => match f(&ctx) {
                        Some(text) => HookOutcome::SetContent(text),
                        None => HookOutcome::Continue,
                    },
                    Callback::Hook(hook) => hook.call(&ctx).await.map_err(NavError::Callback)?,
                }
            };

            match outcome {
                HookOutcome::Continue => {}
                HookOutcome::Select(index) => selected = index,
                HookOutcome::SetContent(text) => {
                    let target = self.target(selected)?;
                    session.override_content(target, text);
                }
            }
        }

        self.target(selected)
    }
}

// ─── LinkSpec (builder input) ─────────────────────────────────

/// Description of a link to add with [`GraphBuilder::add_link`](crate::graph::GraphBuilder::add_link).
#[derive(Clone, Debug)]
pub struct LinkSpec {
    pub(crate) targets: Vec<PageId>,
    pub(crate) trigger: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) callbacks: Vec<Callback>,
    pub(crate) free_text: bool,
    pub(crate) backlink: bool,
    pub(crate) backlink_shortcut: Option<crate::graph::Shortcut>,
}

impl LinkSpec {
    pub fn new(targets: impl Into<Targets>) -> Self {
        Self {
            targets: targets.into().0,
            trigger: None,
            description: None,
            callbacks: Vec::new(),
            free_text: false,
            backlink: true,
            backlink_shortcut: None,
        }
    }

    /// Reaction symbol. Without one the page hands out the next default trigger.
    pub fn trigger(mut self, symbol: impl Into<String>) -> Self {
        self.trigger = Some(symbol.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callbacks.push(callback);
        self
    }

    pub fn callbacks(mut self, callbacks: impl IntoIterator<Item = Callback>) -> Self {
        self.callbacks.extend(callbacks);
        self
    }

    /// Take this link when the user types a message instead of reacting.
    pub fn free_text(mut self) -> Self {
        self.free_text = true;
        self
    }

    /// Whether the linking page becomes the parent of every target (default `true`).
    pub fn backlink(mut self, enabled: bool) -> Self {
        self.backlink = enabled;
        self
    }

    /// Triggers used for the parent shortcuts created by the backlink.
    pub fn backlink_shortcut(mut self, shortcut: crate::graph::Shortcut) -> Self {
        self.backlink_shortcut = Some(shortcut);
        self
    }
}
