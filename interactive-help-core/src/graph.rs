//! Help graph arena and its builder.
//!
//! Pages live in a flat arena addressed by [`PageId`]; links reference pages
//! by id, so diamonds and back edges (parent/root shortcuts) need no shared
//! ownership. The graph is frozen by [`GraphBuilder::build`] and shared
//! read-only by every session afterwards.

use std::collections::HashSet;

use tracing::debug;

use crate::config::HelpConfig;
use crate::error::GraphError;
use crate::link::{Link, LinkSpec};
use crate::page::Page;
use crate::types::{EntryId, LinkKind, PageId, Trigger};

// ─── Shortcuts ────────────────────────────────────────────────

/// Symbols for a batch of parent/root shortcuts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ShortcutTriggers {
    /// The configured parent or root symbol.
    #[default]
    Default,
    /// One symbol for every page.
    Same(String),
    /// One symbol per page, in the same order as the pages.
    PerPage(Vec<String>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shortcut {
    pub triggers: ShortcutTriggers,
    pub description: Option<String>,
}

impl Shortcut {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            triggers: ShortcutTriggers::Same(symbol.into()),
            description: None,
        }
    }

    pub fn per_page(symbols: Vec<String>) -> Self {
        Self {
            triggers: ShortcutTriggers::PerPage(symbols),
            description: None,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ─── HelpGraph ────────────────────────────────────────────────

/// Immutable navigation graph.
#[derive(Debug)]
pub struct HelpGraph {
    config: HelpConfig,
    pages: Vec<Page>,
    entries: Vec<Link>,
}

impl HelpGraph {
    pub fn config(&self) -> &HelpConfig {
        &self.config
    }

    pub fn exit_trigger(&self) -> &str {
        &self.config.triggers.exit
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id.index())
    }

    pub fn entry(&self, id: EntryId) -> Option<&Link> {
        self.entries.get(id.0 as usize)
    }

    pub fn page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        (0..self.pages.len()).map(|i| PageId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

// ─── GraphBuilder ─────────────────────────────────────────────

/// Builds a [`HelpGraph`]. Every method validates eagerly and leaves the
/// builder unchanged when it returns an error.
#[derive(Debug)]
pub struct GraphBuilder {
    config: HelpConfig,
    pages: Vec<Page>,
    entries: Vec<Link>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(HelpConfig::default())
    }
}

impl GraphBuilder {
    pub fn new(config: HelpConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn config(&self) -> &HelpConfig {
        &self.config
    }

    /// Add a page, filling unset layout fields from the configuration.
    pub fn add_page(&mut self, mut page: Page) -> PageId {
        let layout = &self.config.layout;
        page.separator.get_or_insert_with(|| layout.separator.clone());
        page.link_separator.get_or_insert_with(|| layout.link_separator.clone());
        page.presentation.get_or_insert_with(|| layout.presentation.clone());

        let id = PageId(self.pages.len() as u32);
        self.pages.push(page);
        id
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id.index())
    }

    fn check_page(&self, id: PageId) -> Result<(), GraphError> {
        if id.index() < self.pages.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownPage(id))
        }
    }

    fn check_targets(&self, targets: &[PageId]) -> Result<(), GraphError> {
        if targets.is_empty() {
            return Err(GraphError::EmptyTargets);
        }
        targets.iter().try_for_each(|t| self.check_page(*t))
    }

    /// Add an outgoing link to `from` and return the trigger it listens on.
    ///
    /// Unless [`LinkSpec::backlink`] turns it off, `from` also becomes the
    /// parent of every target.
    pub fn add_link(&mut self, from: PageId, spec: LinkSpec) -> Result<Trigger, GraphError> {
        self.check_page(from)?;
        self.check_targets(&spec.targets)?;

        let exit = self.config.triggers.exit.clone();
        let page = &self.pages[from.index()];

        let (kind, trigger) = if spec.free_text {
            if page.needs_free_text_input() {
                return Err(GraphError::DuplicateFreeTextLink { page: from });
            }
            (LinkKind::FreeText, Trigger::FreeText)
        } else {
            let symbol = match spec.trigger {
                Some(symbol) => {
                    page.check_trigger(from, &symbol, &exit, None)?;
                    symbol
                }
                None => self
                    .config
                    .triggers
                    .defaults
                    .iter()
                    .find(|s| page.check_trigger(from, s, &exit, None).is_ok())
                    .cloned()
                    .ok_or(GraphError::DefaultTriggersExhausted {
                        page: from,
                        pool_size: self.config.triggers.defaults.len(),
                    })?,
            };
            (LinkKind::Regular, Trigger::Reaction(symbol))
        };

        let link = Link {
            kind,
            trigger: trigger.clone(),
            targets: spec.targets.clone(),
            description: spec.description,
            callbacks: spec.callbacks,
        };

        let page = &mut self.pages[from.index()];
        match kind {
            LinkKind::FreeText => page.free_text = Some(link),
            _ => page.links.push(link),
        }

        if spec.backlink {
            let shortcut = spec.backlink_shortcut.unwrap_or_default();
            if let Err(err) = self.mark_shortcuts(LinkKind::Parent, from, &spec.targets, shortcut)
            {
                let page = &mut self.pages[from.index()];
                match kind {
                    LinkKind::FreeText => page.free_text = None,
                    _ => {
                        page.links.pop();
                    }
                }
                return Err(err);
            }
        }

        debug!(page = %from, ?trigger, targets = spec.targets.len(), "link added");
        Ok(trigger)
    }

    /// Register a trigger-less link that can start a session.
    pub fn entry_link(&mut self, spec: LinkSpec) -> Result<EntryId, GraphError> {
        self.check_targets(&spec.targets)?;
        let id = EntryId(self.entries.len() as u32);
        self.entries.push(Link {
            kind: LinkKind::Entry,
            trigger: Trigger::FreeText,
            targets: spec.targets,
            description: None,
            callbacks: spec.callbacks,
        });
        Ok(id)
    }

    /// Give each of `pages` a shortcut back to `parent`.
    pub fn mark_as_parent_of(
        &mut self,
        parent: PageId,
        pages: &[PageId],
        shortcut: Shortcut,
    ) -> Result<(), GraphError> {
        self.mark_shortcuts(LinkKind::Parent, parent, pages, shortcut)
    }

    /// Give each of `pages` a shortcut to `root`.
    pub fn mark_as_root_of(
        &mut self,
        root: PageId,
        pages: &[PageId],
        shortcut: Shortcut,
    ) -> Result<(), GraphError> {
        self.mark_shortcuts(LinkKind::Root, root, pages, shortcut)
    }

    fn mark_shortcuts(
        &mut self,
        kind: LinkKind,
        target: PageId,
        pages: &[PageId],
        shortcut: Shortcut,
    ) -> Result<(), GraphError> {
        self.check_page(target)?;
        pages.iter().try_for_each(|p| self.check_page(*p))?;

        let symbols: Vec<String> = match shortcut.triggers {
            ShortcutTriggers::Default => {
                let symbol = match kind {
                    LinkKind::Root => &self.config.triggers.root,
                    _ => &self.config.triggers.parent,
                };
                vec![symbol.clone(); pages.len()]
            }
            ShortcutTriggers::Same(symbol) => vec![symbol; pages.len()],
            ShortcutTriggers::PerPage(symbols) => {
                if symbols.len() != pages.len() {
                    return Err(GraphError::ShortcutCountMismatch {
                        pages: pages.len(),
                        count: symbols.len(),
                    });
                }
                symbols
            }
        };

        let exit = &self.config.triggers.exit;
        for (page, symbol) in pages.iter().zip(&symbols) {
            self.pages[page.index()].check_trigger(*page, symbol, exit, Some(kind))?;
        }

        for (page, symbol) in pages.iter().zip(symbols) {
            let link = Link::shortcut(kind, symbol, target, shortcut.description.clone());
            self.pages[page.index()].set_shortcut(link);
        }
        Ok(())
    }

    /// Freeze the graph.
    pub fn build(self) -> Result<HelpGraph, GraphError> {
        let exit = &self.config.triggers.exit;
        for (index, page) in self.pages.iter().enumerate() {
            let id = PageId(index as u32);
            let mut seen = HashSet::new();
            for symbol in page.trigger_list() {
                if symbol == exit.as_str() {
                    return Err(GraphError::ReservedTrigger {
                        page: id,
                        trigger: symbol.to_string(),
                    });
                }
                if !seen.insert(symbol) {
                    return Err(GraphError::DuplicateTrigger {
                        page: id,
                        trigger: symbol.to_string(),
                    });
                }
            }
        }

        debug!(
            pages = self.pages.len(),
            entries = self.entries.len(),
            "help graph built"
        );
        Ok(HelpGraph {
            config: self.config,
            pages: self.pages,
            entries: self.entries,
        })
    }
}
