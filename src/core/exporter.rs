use tracing::debug;

use crate::error::Result;
use super::{MindMapDocument, ModelMap, OutlineNode, TreeBuilder};

/// Counts reported after an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub modules: usize,
    pub classes: usize,
}

/// Writes the model outline into a mind-map document and persists it
pub struct Exporter {
    builder: TreeBuilder,
}

impl Exporter {
    pub fn new(builder: TreeBuilder) -> Self {
        Self { builder }
    }

    /// Attach the outline under the root of `sheet`, then persist the document once
    pub fn export<D: MindMapDocument + ?Sized>(
        &self,
        document: &mut D,
        sheet: usize,
        models: &ModelMap,
    ) -> Result<ExportSummary> {
        let outline = self.builder.build(models);
        self.attach_tree(document, sheet, None, outline)?;
        document.persist()?;

        Ok(ExportSummary {
            modules: models.len(),
            classes: models.class_count(),
        })
    }

    fn attach_tree<D: MindMapDocument + ?Sized>(
        &self,
        document: &mut D,
        sheet: usize,
        parent: Option<&[usize]>,
        node: OutlineNode,
    ) -> Result<()> {
        let OutlineNode { label, note, children } = node;
        debug!("Attaching '{}' under {:?}", label, parent.unwrap_or(&[]));

        let path = document.attach(sheet, parent, OutlineNode::new(label).with_note(note))?;
        for child in children {
            self.attach_tree(document, sheet, Some(path.as_slice()), child)?;
        }

        Ok(())
    }
}
