use super::dto::*;
use super::validate::validate_dto;
use super::yaml::parse_help_yaml;
use crate::config::HelpConfig;
use crate::graph::{GraphBuilder, HelpGraph, Shortcut, ShortcutTriggers};
use crate::link::LinkSpec;
use crate::page::Page;
use crate::types::PageId;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;

/// A graph built from a help tree, with its authored page names.
#[derive(Debug)]
pub struct AuthoredHelp {
    pub id: String,
    pub graph: HelpGraph,
    pub entry: PageId,
    pub pages: HashMap<String, PageId>,
}

impl AuthoredHelp {
    pub fn page_id(&self, name: &str) -> Option<PageId> {
        self.pages.get(name).copied()
    }
}

/// Convert a HelpTreeDto to a frozen [`HelpGraph`].
///
/// Validates first and reports every problem at once; builder errors
/// (trigger conflicts, exhausted default pool) are reported for the first
/// offending link.
pub fn dto_to_graph(dto: &HelpTreeDto, config: HelpConfig) -> Result<AuthoredHelp> {
    // 1. Validate
    let errors = validate_dto(dto);
    if !errors.is_empty() {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(anyhow!("Help tree validation failed:\n{}", msgs.join("\n")));
    }

    let mut builder = GraphBuilder::new(config);
    let mut pages: HashMap<String, PageId> = HashMap::new();

    // 2. Pages, in declaration order
    for page in &dto.pages {
        let mut built = Page::new(page.content.clone());
        if let Some(presentation) = &page.presentation {
            built = built.presentation(presentation.clone());
        }
        if let Some(separator) = &page.separator {
            built = built.separator(separator.clone());
        }
        if let Some(separator) = &page.link_separator {
            built = built.link_separator(separator.clone());
        }
        pages.insert(page.id.clone(), builder.add_page(built));
    }

    let lookup = |name: &str| -> Result<PageId> {
        pages
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown page '{}'", name))
    };

    // 3. Links, in declaration order (display order on each page)
    for (i, link) in dto.links.iter().enumerate() {
        let from = lookup(&link.from)?;
        let targets = link
            .to
            .as_slice()
            .iter()
            .map(|t| lookup(t))
            .collect::<Result<Vec<_>>>()?;

        let mut spec = LinkSpec::new(targets).backlink(link.backlink);
        if let Some(trigger) = &link.trigger {
            spec = spec.trigger(trigger.clone());
        }
        if let Some(description) = &link.description {
            spec = spec.description(description.clone());
        }
        if link.free_text {
            spec = spec.free_text();
        }
        builder
            .add_link(from, spec)
            .with_context(|| format!("links[{}] from '{}'", i, link.from))?;
    }

    // 4. Shortcut groups, applied after links so they override backlinks
    for (i, shortcut) in dto.shortcuts.iter().enumerate() {
        let target = lookup(&shortcut.target)?;
        let members = shortcut
            .pages
            .iter()
            .map(|p| lookup(p))
            .collect::<Result<Vec<_>>>()?;
        let triggers = match &shortcut.triggers {
            None => ShortcutTriggers::Default,
            Some(OneOrMany::One(symbol)) => ShortcutTriggers::Same(symbol.clone()),
            Some(OneOrMany::Many(symbols)) => ShortcutTriggers::PerPage(symbols.clone()),
        };
        let spec = Shortcut {
            triggers,
            description: shortcut.description.clone(),
        };
        let result = match shortcut.kind {
            ShortcutKind::Parent => builder.mark_as_parent_of(target, &members, spec),
            ShortcutKind::Root => builder.mark_as_root_of(target, &members, spec),
        };
        result.with_context(|| format!("shortcuts[{}] to '{}'", i, shortcut.target))?;
    }

    let entry = lookup(&dto.entry)?;
    let graph = builder
        .build()
        .with_context(|| format!("help tree '{}'", dto.id))?;

    Ok(AuthoredHelp {
        id: dto.id.clone(),
        graph,
        entry,
        pages,
    })
}

/// Parse, validate and build a help tree in one step.
pub fn compile_help_yaml(yaml_str: &str, config: HelpConfig) -> Result<AuthoredHelp> {
    let dto = parse_help_yaml(yaml_str)?;
    dto_to_graph(&dto, config)
}
