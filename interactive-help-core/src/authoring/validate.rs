use super::dto::*;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub rule: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

fn push(errors: &mut Vec<ValidationError>, rule: &str, message: String) {
    errors.push(ValidationError {
        rule: rule.to_string(),
        message,
    });
}

/// Validate a HelpTreeDto before building the graph. Returns all errors found.
///
/// Trigger conflicts are left to the graph builder, which knows the
/// configured symbols.
pub fn validate_dto(dto: &HelpTreeDto) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut page_ids: HashSet<&str> = HashSet::new();

    // H1: At least one page
    if dto.pages.is_empty() {
        push(&mut errors, "H1", "Help tree has no pages".to_string());
    }

    // H2: Page ids must be unique and non-empty
    for page in &dto.pages {
        if page.id.is_empty() {
            push(&mut errors, "H2", "Page with empty id".to_string());
        } else if !page_ids.insert(page.id.as_str()) {
            push(&mut errors, "H2", format!("Duplicate page id: {}", page.id));
        }
    }

    // H3: Entry references a page
    if !page_ids.contains(dto.entry.as_str()) {
        push(
            &mut errors,
            "H3",
            format!("Entry page '{}' does not exist", dto.entry),
        );
    }

    let check_ref = |errors: &mut Vec<ValidationError>, rule: &str, what: &str, id: &str| {
        if !page_ids.contains(id) {
            push(errors, rule, format!("{} references unknown page '{}'", what, id));
        }
    };

    // H4: Link endpoints reference pages, at least one target
    for (i, link) in dto.links.iter().enumerate() {
        let what = format!("links[{}]", i);
        check_ref(&mut errors, "H4", &what, &link.from);
        if link.to.as_slice().is_empty() {
            push(&mut errors, "H4", format!("{} has no target", what));
        }
        for target in link.to.as_slice() {
            check_ref(&mut errors, "H4", &what, target);
        }
    }

    // H5: Free-text links carry no trigger, at most one per page
    let mut free_text_per_page: HashMap<&str, usize> = HashMap::new();
    for (i, link) in dto.links.iter().enumerate() {
        if !link.free_text {
            continue;
        }
        if link.trigger.is_some() {
            push(
                &mut errors,
                "H5",
                format!("links[{}]: free-text link cannot have a trigger", i),
            );
        }
        *free_text_per_page.entry(link.from.as_str()).or_default() += 1;
    }
    let mut crowded: Vec<_> = free_text_per_page
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    crowded.sort();
    for (page, count) in crowded {
        push(
            &mut errors,
            "H5",
            format!("Page {} has {} free-text links, at most one allowed", page, count),
        );
    }

    // H6: Shortcut groups reference pages and match trigger counts
    for (i, shortcut) in dto.shortcuts.iter().enumerate() {
        let what = format!("shortcuts[{}]", i);
        check_ref(&mut errors, "H6", &what, &shortcut.target);
        for page in &shortcut.pages {
            check_ref(&mut errors, "H6", &what, page);
        }
        if let Some(OneOrMany::Many(triggers)) = &shortcut.triggers {
            if triggers.len() != shortcut.pages.len() {
                push(
                    &mut errors,
                    "H6",
                    format!(
                        "{}: {} triggers given for {} pages",
                        what,
                        triggers.len(),
                        shortcut.pages.len()
                    ),
                );
            }
        }
    }

    errors
}
