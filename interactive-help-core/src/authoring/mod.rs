//! Declarative help trees.
//!
//! YAML → [`HelpTreeDto`] → [`validate_dto`] → [`dto_to_graph`] → `HelpGraph`.
//! Pages are referenced by name in the document; the built graph keeps the
//! name → `PageId` map. Callbacks cannot be expressed in YAML and are added
//! through the builder API.

pub mod dto;
pub mod dto_to_graph;
pub mod validate;
pub mod yaml;

pub use dto::{HelpTreeDto, LinkDto, OneOrMany, PageDto, ShortcutDto, ShortcutKind};
pub use dto_to_graph::{compile_help_yaml, dto_to_graph, AuthoredHelp};
pub use validate::{validate_dto, ValidationError};
pub use yaml::parse_help_yaml;
