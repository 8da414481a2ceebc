//! Pages: the nodes of the help graph.

use std::fmt;
use std::sync::Arc;

use crate::error::GraphError;
use crate::link::Link;
use crate::types::{LinkKind, PageId, Presentation, RenderedPage, Trigger};

pub type InputContentFn = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Body of a page.
#[derive(Clone)]
pub enum PageContent {
    Static(String),
    /// Built from the session's free-text inputs each time the page is shown.
    Computed(InputContentFn),
}

impl PageContent {
    pub fn resolve(&self, inputs: &[String]) -> String {
        match self {
            PageContent::Static(text) => text.clone(),
            PageContent::Computed(f) => f(inputs),
        }
    }
}

impl fmt::Debug for PageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageContent::Static(text) => f.debug_tuple("Static").field(text).finish(),
            PageContent::Computed(_) => f.write_str("Computed"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Page {
    pub(crate) content: PageContent,
    pub(crate) presentation: Option<Presentation>,
    pub(crate) separator: Option<String>,
    pub(crate) link_separator: Option<String>,
    pub(crate) links: Vec<Link>,
    pub(crate) free_text: Option<Link>,
    pub(crate) parent: Option<Link>,
    pub(crate) root: Option<Link>,
}

impl Page {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_content(PageContent::Static(text.into()))
    }

    /// Page whose body is computed from the session's free-text inputs.
    pub fn computed(f: impl Fn(&[String]) -> String + Send + Sync + 'static) -> Self {
        Self::with_content(PageContent::Computed(Arc::new(f)))
    }

    fn with_content(content: PageContent) -> Self {
        Self {
            content,
            presentation: None,
            separator: None,
            link_separator: None,
            links: Vec::new(),
            free_text: None,
            parent: None,
            root: None,
        }
    }

    pub fn presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = Some(presentation);
        self
    }

    pub fn plain(self) -> Self {
        self.presentation(Presentation::Plain)
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn link_separator(mut self, separator: impl Into<String>) -> Self {
        self.link_separator = Some(separator.into());
        self
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn free_text_link(&self) -> Option<&Link> {
        self.free_text.as_ref()
    }

    pub fn parent_link(&self) -> Option<&Link> {
        self.parent.as_ref()
    }

    pub fn root_link(&self) -> Option<&Link> {
        self.root.as_ref()
    }

    /// Reaction links in display order: regular, parent, root.
    fn reaction_links(&self) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .chain(self.parent.as_ref())
            .chain(self.root.as_ref())
    }

    /// Symbols the user may react with, in display order.
    pub fn trigger_list(&self) -> Vec<&str> {
        self.reaction_links()
            .filter_map(|link| link.trigger.symbol())
            .collect()
    }

    pub fn needs_free_text_input(&self) -> bool {
        self.free_text.is_some()
    }

    /// Link for a reaction, or the free-text link when `trigger` is `None`.
    ///
    /// `None` means the choice is not valid on this page.
    pub fn resolve(&self, trigger: Option<&str>) -> Option<&Link> {
        match trigger {
            None => self.free_text.as_ref(),
            Some(symbol) => self
                .reaction_links()
                .find(|link| link.trigger.symbol() == Some(symbol)),
        }
    }

    /// Content followed by one line per described link.
    ///
    /// `content_override` comes from the session and wins over the page body.
    pub fn render(&self, content_override: Option<&str>, inputs: &[String]) -> RenderedPage {
        let mut text = match content_override {
            Some(text) => text.to_string(),
            None => self.content.resolve(inputs),
        };

        let lines: Vec<String> = self
            .links
            .iter()
            .chain(self.free_text.as_ref())
            .chain(self.parent.as_ref())
            .chain(self.root.as_ref())
            .filter_map(Link::display_line)
            .collect();

        if !lines.is_empty() {
            text.push_str(self.separator.as_deref().unwrap_or("\n\n"));
            text.push_str(&lines.join(self.link_separator.as_deref().unwrap_or("\n")));
        }

        RenderedPage {
            text,
            presentation: self.presentation.clone().unwrap_or_default(),
        }
    }

    // ── Construction helpers (used by GraphBuilder) ──

    /// Check that `symbol` can be added as a reaction trigger on this page.
    ///
    /// `replacing` names a shortcut slot about to be overwritten, whose own
    /// trigger does not count as a conflict.
    pub(crate) fn check_trigger(
        &self,
        id: PageId,
        symbol: &str,
        exit: &str,
        replacing: Option<LinkKind>,
    ) -> Result<(), GraphError> {
        if symbol == exit {
            return Err(GraphError::ReservedTrigger {
                page: id,
                trigger: symbol.to_string(),
            });
        }
        let taken = self
            .reaction_links()
            .filter(|link| Some(link.kind) != replacing)
            .any(|link| link.trigger == Trigger::Reaction(symbol.to_string()));
        if taken {
            return Err(GraphError::DuplicateTrigger {
                page: id,
                trigger: symbol.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn set_shortcut(&mut self, link: Link) {
        match link.kind {
            LinkKind::Parent => self.parent = Some(link),
            LinkKind::Root => self.root = Some(link),
            _ => self.links.push(link),
        }
    }
}
