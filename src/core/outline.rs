use serde::{Deserialize, Serialize};

use super::ModelMap;

/// A labelled node that owns its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            note: None,
            children: Vec::new(),
        }
    }

    /// Attach an optional note; empty notes are dropped
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.is_empty());
        self
    }

    pub fn push(&mut self, child: OutlineNode) {
        self.children.push(child);
    }

    /// Number of nodes in this subtree, including this one
    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::node_count).sum::<usize>()
    }

    /// Indented plain-text rendering, two spaces per level
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.label);
        if let Some(note) = &self.note {
            out.push_str(&format!(" ({})", note));
        }
        out.push('\n');

        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

/// Turns a [`ModelMap`] into the root → module → class hierarchy
pub struct TreeBuilder {
    root_label: String,
    base_notes: bool,
}

impl TreeBuilder {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self {
            root_label: root_label.into(),
            base_notes: false,
        }
    }

    /// Carry each class's base expression into its node's note
    pub fn base_notes(mut self, enabled: bool) -> Self {
        self.base_notes = enabled;
        self
    }

    pub fn build(&self, models: &ModelMap) -> OutlineNode {
        let mut root = OutlineNode::new(&self.root_label);

        for (module, records) in models.iter() {
            let mut module_node = OutlineNode::new(module);

            for record in records {
                let note = self.base_notes.then(|| record.base.clone());
                module_node.push(OutlineNode::new(&record.name).with_note(note));
            }

            root.push(module_node);
        }

        root
    }
}
