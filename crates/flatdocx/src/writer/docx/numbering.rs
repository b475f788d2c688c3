//! List numbering management for DOCX output

use std::collections::HashMap;

use docx_rs::*;
use ecow::EcoString;

use crate::output::{ListStyle, NumberingDefinition, NumberingLevel};

/// Maps numbering references onto DOCX numbering ids.
#[derive(Clone, Debug)]
pub struct DocxNumbering {
    ids: HashMap<EcoString, usize>,
    next_id: usize,
}

impl DocxNumbering {
    /// Create a new numbering manager
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a list level from its description
    fn create_list_level(level: &NumberingLevel, restart: bool) -> Level {
        let level_def = Level::new(
            level.level,
            Start::new(1),
            NumberFormat::new(level.format.as_str()),
            LevelText::new(level.text.as_str()),
            LevelJc::new(level.alignment.to_string()),
        )
        .indent(
            Some(level.indent as i32),
            Some(SpecialIndentType::Hanging(level.hanging as i32)),
            None,
            None,
        );

        if restart {
            level_def.level_restart(0_u32)
        } else {
            level_def
        }
    }

    /// Adds one abstract numbering and one numbering instance per
    /// definition.
    pub fn add_definitions(&mut self, mut docx: Docx, definitions: &[NumberingDefinition]) -> Docx {
        for definition in definitions {
            let id = self.next_id;
            self.next_id += 1;

            let restart = definition.style == ListStyle::Numbered;
            let mut abstract_numbering = AbstractNumbering::new(id);
            for level in &definition.levels {
                let level = Self::create_list_level(level, restart && level.level > 0);
                abstract_numbering = abstract_numbering.add_level(level);
            }

            docx = docx
                .add_abstract_numbering(abstract_numbering)
                .add_numbering(Numbering::new(id, id));
            self.ids.insert(definition.reference.clone(), id);
        }

        docx
    }

    /// The numbering id registered for `reference`.
    pub fn id(&self, reference: &str) -> Option<usize> {
        self.ids.get(reference).copied()
    }
}
