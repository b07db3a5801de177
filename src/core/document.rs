//! Output document for the generated mind map.
//!
//! [`MindMapDocument`] is the small protocol the exporter writes through.
//! [`Workbook`] implements it as a JSON file laid out like an XMind
//! `content.json`: a list of sheets, each with a root topic whose children
//! hang off `children.attached`.

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{ModelMindError, Result};
use super::OutlineNode;

/// Position of a topic below its sheet's root, as child indices
pub type TopicPath = Vec<usize>;

pub trait MindMapDocument {
    /// Titles of the existing sheets, in order
    fn sheet_titles(&self) -> Vec<String>;

    fn remove_sheet(&mut self, index: usize) -> Result<()>;

    /// Append a blank sheet and return its index
    fn create_sheet(&mut self, title: &str) -> usize;

    fn set_root_title(&mut self, sheet: usize, title: &str) -> Result<()>;

    /// Attach `node` under the topic at `parent`, or under the sheet root when
    /// `parent` is `None`. Returns the new topic's path.
    fn attach(&mut self, sheet: usize, parent: Option<&[usize]>, node: OutlineNode) -> Result<TopicPath>;

    /// Write the whole document back to its backing store
    fn persist(&mut self) -> Result<()>;

    /// Drop every sheet and start over with one blank sheet
    fn reset(&mut self, sheet_title: &str, root_title: &str) -> Result<usize> {
        for index in (0..self.sheet_titles().len()).rev() {
            self.remove_sheet(index)?;
        }

        let sheet = self.create_sheet(sheet_title);
        self.set_root_title(sheet, root_title)?;
        Ok(sheet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    pub title: String,
    pub root_topic: Topic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Children>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notes {
    pub plain: PlainNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainNote {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Children {
    pub attached: Vec<Topic>,
}

impl Topic {
    fn new(id: String, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            notes: None,
            children: None,
        }
    }

    #[cfg(test)]
    pub fn note(&self) -> Option<&str> {
        self.notes.as_ref().map(|n| n.plain.content.as_str())
    }

    #[cfg(test)]
    pub fn attached(&self) -> &[Topic] {
        self.children.as_ref().map(|c| c.attached.as_slice()).unwrap_or(&[])
    }

    fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Topic> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => self
                .children
                .as_mut()
                .and_then(|c| c.attached.get_mut(index))
                .and_then(|child| child.descend_mut(rest)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkbookFile {
    created: DateTime<Utc>,
    sheets: Vec<Sheet>,
}

/// JSON-backed mind-map workbook
#[derive(Debug)]
pub struct Workbook {
    path: PathBuf,
    created: DateTime<Utc>,
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Open the document at `path`, or start an empty one if it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            debug!("Creating new workbook for {}", path.display());
            return Ok(Self {
                path,
                created: Utc::now(),
                sheets: Vec::new(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let file: WorkbookFile = serde_json::from_str(&content)
            .map_err(|e| ModelMindError::Document(format!("{}: {}", path.display(), e)))?;

        debug!("Loaded workbook {} with {} sheet(s)", path.display(), file.sheets.len());
        Ok(Self {
            path,
            created: file.created,
            sheets: file.sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    fn sheet_mut(&mut self, sheet: usize) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(sheet)
            .ok_or_else(|| ModelMindError::Document(format!("no sheet at index {}", sheet)))
    }
}

impl MindMapDocument for Workbook {
    fn sheet_titles(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.title.clone()).collect()
    }

    fn remove_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(ModelMindError::Document(format!("no sheet at index {}", index)));
        }
        let removed = self.sheets.remove(index);
        debug!("Removed sheet '{}'", removed.title);
        Ok(())
    }

    fn create_sheet(&mut self, title: &str) -> usize {
        let index = self.sheets.len();
        let id = stable_id(&format!("sheet:{}", index), title);
        let root_id = stable_id(&id, "root");

        self.sheets.push(Sheet {
            id,
            title: title.to_string(),
            root_topic: Topic::new(root_id, title),
        });
        index
    }

    fn set_root_title(&mut self, sheet: usize, title: &str) -> Result<()> {
        self.sheet_mut(sheet)?.root_topic.title = title.to_string();
        Ok(())
    }

    fn attach(&mut self, sheet: usize, parent: Option<&[usize]>, node: OutlineNode) -> Result<TopicPath> {
        let parent_path = parent.unwrap_or(&[]);
        let parent_topic = self
            .sheet_mut(sheet)?
            .root_topic
            .descend_mut(parent_path)
            .ok_or_else(|| ModelMindError::Document(format!("no topic at {:?}", parent_path)))?;

        let parent_id = parent_topic.id.clone();
        let children = parent_topic.children.get_or_insert_with(Children::default);
        let index = children.attached.len();
        children.attached.push(to_topic(&parent_id, index, node));

        let mut path = parent_path.to_vec();
        path.push(index);
        Ok(path)
    }

    fn persist(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let file = WorkbookFile {
            created: self.created,
            sheets: self.sheets.clone(),
        };
        let mut content = serde_json::to_string_pretty(&file)?;
        content.push('\n');
        std::fs::write(&self.path, content)?;

        info!("💾 Saved mind map to {}", self.path.display());
        Ok(())
    }
}

/// Convert an outline subtree into topics with ids derived from position and title
fn to_topic(parent_id: &str, index: usize, node: OutlineNode) -> Topic {
    let id = stable_id(&format!("{}/{}", parent_id, index), &node.label);
    let mut topic = Topic::new(id, &node.label);

    if let Some(content) = node.note {
        topic.notes = Some(Notes {
            plain: PlainNote { content },
        });
    }

    if !node.children.is_empty() {
        let attached = node
            .children
            .into_iter()
            .enumerate()
            .map(|(i, child)| to_topic(&topic.id, i, child))
            .collect();
        topic.children = Some(Children { attached });
    }

    topic
}

fn stable_id(scope: &str, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(scope.as_bytes());
    hasher.update([0u8]);
    hasher.update(title.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    hash[..26].to_string()
}
