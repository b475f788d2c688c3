//! List numbering management
//!
//! Every outermost list allocates one numbering definition. Nested lists
//! reuse the definition of their outermost ancestor and only move to a
//! deeper level, so each definition carries all nine levels up front.

use ecow::{EcoString, eco_format};

use crate::output::{Alignment, ListStyle, NumberingDefinition, NumberingLevel};

/// The number of levels of a numbering definition.
pub const LEVELS: usize = 9;

/// Registry of numbering definitions created during one serialization.
#[derive(Debug, Clone, Default)]
pub struct NumberingRegistry {
    definitions: Vec<NumberingDefinition>,
}

impl NumberingRegistry {
    /// Create a new numbering registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the definition for a list with the given style.
    pub fn register(&mut self, reference: EcoString, style: ListStyle) -> &NumberingDefinition {
        let levels = match style {
            ListStyle::Numbered => Self::numbered_levels(),
            ListStyle::Bullets => Self::bullet_levels(),
        };

        self.definitions.push(NumberingDefinition {
            reference,
            style,
            levels,
        });
        &self.definitions[self.definitions.len() - 1]
    }

    /// Looks up a definition by its reference.
    pub fn get(&self, reference: &str) -> Option<&NumberingDefinition> {
        self.definitions.iter().find(|def| def.reference == reference)
    }

    /// Consumes the registry.
    pub fn into_definitions(self) -> Vec<NumberingDefinition> {
        self.definitions
    }

    /// Create a list level with the specified parameters
    fn create_list_level(level: usize, format: &str, text: &str, is_bullet: bool) -> NumberingLevel {
        let indent = 720 * (level as u32 + 1);
        let hanging = if is_bullet { 360 } else { 420 };

        NumberingLevel {
            level,
            format: format.into(),
            text: text.into(),
            alignment: Alignment::Left,
            indent,
            hanging,
        }
    }

    fn numbered_levels() -> Vec<NumberingLevel> {
        (0..LEVELS)
            .map(|i| {
                let number_format = match i % 3 {
                    0 => "decimal",
                    1 => "lowerLetter",
                    _ => "lowerRoman",
                };
                let level_text = eco_format!("%{}.", i + 1);

                Self::create_list_level(i, number_format, &level_text, false)
            })
            .collect()
    }

    fn bullet_levels() -> Vec<NumberingLevel> {
        (0..LEVELS)
            .map(|i| {
                let bullet_text = match i % 3 {
                    0 => "\u{25CF}",
                    1 => "\u{25CB}",
                    _ => "\u{25A0}",
                };

                Self::create_list_level(i, "bullet", bullet_text, true)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_definition_has_all_levels() {
        let mut registry = NumberingRegistry::new();
        let def = registry.register("num-1".into(), ListStyle::Numbered);

        assert_eq!(def.levels.len(), LEVELS);
        assert_eq!(def.levels[0].format, "decimal");
        assert_eq!(def.levels[1].format, "lowerLetter");
        assert_eq!(def.levels[1].text, "%2.");
        assert_eq!(def.levels[2].indent, 2160);
    }

    #[test]
    fn bullet_definition_uses_bullet_format() {
        let mut registry = NumberingRegistry::new();
        registry.register("num-1".into(), ListStyle::Bullets);

        let def = registry.get("num-1").unwrap();
        assert!(def.levels.iter().all(|level| level.format == "bullet"));
        assert_eq!(def.levels[0].hanging, 360);
    }
}
