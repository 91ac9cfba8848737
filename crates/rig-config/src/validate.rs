//! Configuration validation logic.

use std::collections::HashSet;

use crate::schema::{DEFAULT_KEY, RigConfig};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate entry: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing entry: {id} in {context}")]
    MissingEntry { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Structural checks only. Unknown name tokens are deliberately accepted here;
/// they fail when a node is actually named with them.
pub fn validate_config(config: &RigConfig) -> Result<(), ValidationError> {
    let naming = &config.naming;

    if naming.separator.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "naming.separator".to_string(),
            value: String::new(),
            reason: "the separator must not be empty".to_string(),
        });
    }

    if naming.locations.is_empty() {
        return Err(ValidationError::MissingEntry {
            id: "locations".to_string(),
            context: "naming".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for location in &naming.locations {
        if location.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "naming.locations".to_string(),
                value: String::new(),
                reason: "location codes must not be empty".to_string(),
            });
        }
        if !seen.insert(location) {
            return Err(ValidationError::DuplicateId {
                id: location.clone(),
                context: "naming.locations".to_string(),
            });
        }
    }

    for (from, to) in &naming.mirror_map {
        for code in [from, to] {
            if !naming.is_valid_location(code) {
                return Err(ValidationError::MissingEntry {
                    id: code.clone(),
                    context: "naming.mirror_map".to_string(),
                });
            }
        }
    }

    if !naming.formats.contains_key(DEFAULT_KEY) {
        return Err(ValidationError::MissingEntry {
            id: DEFAULT_KEY.to_string(),
            context: "naming.formats".to_string(),
        });
    }

    for (kind, format) in &naming.formats {
        if format.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("naming.formats.{}", kind),
                value: "[]".to_string(),
                reason: "a format needs at least one token".to_string(),
            });
        }
    }

    for (name, color) in config.palette.iter() {
        if !(1..=31).contains(&color.index) {
            return Err(ValidationError::InvalidValue {
                field: format!("palette.{}.index", name),
                value: color.index.to_string(),
                reason: "host colour indices range from 1 to 31".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteColor;

    #[test]
    fn default_config_is_valid() {
        validate_config(&RigConfig::default()).unwrap();
    }

    #[test]
    fn missing_default_format() {
        let mut config = RigConfig::default();
        config.naming.formats.remove(DEFAULT_KEY);
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::MissingEntry { .. })
        ));
    }

    #[test]
    fn duplicate_location() {
        let mut config = RigConfig::default();
        config.naming.locations.push("L".to_string());
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn empty_separator() {
        let mut config = RigConfig::default();
        config.naming.separator = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { field, .. }) if field == "naming.separator"
        ));
    }

    #[test]
    fn palette_index_out_of_range() {
        let mut config = RigConfig::default();
        config.palette.insert(
            "ultraviolet",
            PaletteColor {
                index: 40,
                rgb: [0.5, 0.0, 1.0],
            },
        );
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
