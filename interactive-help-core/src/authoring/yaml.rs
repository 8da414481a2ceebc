use super::dto::HelpTreeDto;
use anyhow::Result;

/// Parse a YAML string into a HelpTreeDto.
///
/// Validation is NOT performed here. Call `validate_dto()` or go through
/// `dto_to_graph()` / `compile_help_yaml()`, which validate before building.
pub fn parse_help_yaml(yaml_str: &str) -> Result<HelpTreeDto> {
    let dto: HelpTreeDto = serde_yaml::from_str(yaml_str)?;
    Ok(dto)
}
