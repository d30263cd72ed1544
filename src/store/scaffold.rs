//! Writer paths: atomic saves and record scaffolding.
//!
//! Everything here touches watched files, so every operation ends by
//! invalidating the cache; the next read is guaranteed fresh even before the
//! watcher's debounced notification lands.

use super::ConfigStore;
use crate::document::{self, Document};
use crate::error::DeckError;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

impl ConfigStore {
    /// Atomically replace `path` with `content`.
    ///
    /// Parent directories are created as needed. An existing file is first
    /// copied to `<name>.backup`; the new contents go to `<name>.tmp` and are
    /// renamed over the target, so readers never observe a partial write.
    pub fn save_document(&self, path: &Path, content: &str) -> Result<(), DeckError> {
        if path.is_dir() {
            return Err(DeckError::NotAFile(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            fs::copy(path, sibling_with_suffix(path, ".backup"))?;
        }

        let tmp = sibling_with_suffix(path, ".tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        debug!("saved {}", path.display());

        self.invalidate_cache();
        Ok(())
    }

    /// Create a new agent record at `agents/<id>.md`.
    ///
    /// Returns the created path. Fails with [`DeckError::InvalidName`] for
    /// unsafe ids and [`DeckError::AlreadyExists`] for duplicates.
    pub fn create_agent(&self, id: &str, name: &str) -> Result<PathBuf, DeckError> {
        validate_record_id(id)?;
        let path = self.root().join("agents").join(format!("{id}.md"));
        if path.exists() {
            return Err(DeckError::AlreadyExists(path));
        }

        let mut metadata = Mapping::new();
        metadata.insert("name".into(), Value::String(name.to_string()));
        metadata.insert("description".into(), "New agent".into());
        let content = document::serialize(&Document {
            metadata,
            body: "Agent description here.\n".to_string(),
        });

        self.save_document(&path, &content)?;
        Ok(path)
    }

    /// Scaffold a new skill at `skills/<name>/SKILL.md`.
    pub fn create_skill(&self, name: &str, description: &str) -> Result<PathBuf, DeckError> {
        validate_record_id(name)?;
        let skill_dir = self.root().join("skills").join(name);
        if skill_dir.exists() {
            return Err(DeckError::AlreadyExists(skill_dir));
        }

        let mut metadata = Mapping::new();
        metadata.insert("name".into(), Value::String(name.to_string()));
        metadata.insert("description".into(), Value::String(description.to_string()));
        metadata.insert("version".into(), "0.1.0".into());
        let body = format!(
            "# {}\n\n## Usage\n\n[Describe when to reach for this skill.]\n",
            humanize_record_name(name)
        );
        let content = document::serialize(&Document { metadata, body });

        let path = skill_dir.join("SKILL.md");
        self.save_document(&path, &content)?;
        Ok(path)
    }

    /// Rewrite an agent document's `skills` metadata list in place,
    /// preserving every other metadata key and the body.
    pub fn assign_skills(&self, agent_path: &Path, skills: &[String]) -> Result<(), DeckError> {
        let content = fs::read_to_string(agent_path)?;
        let list = Value::Sequence(skills.iter().map(|s| Value::String(s.clone())).collect());
        let updated = document::update(&content, [("skills".to_string(), list)]);
        self.save_document(agent_path, &updated)
    }
}

fn validate_record_id(id: &str) -> Result<(), DeckError> {
    let safe = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if !safe {
        return Err(DeckError::InvalidName(id.to_string()));
    }
    Ok(())
}

/// `agents/foo.md` -> `agents/foo.md.backup` (suffix appended, extension kept).
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// `git-commit` -> `Git Commit`, for scaffold headings.
fn humanize_record_name(name: &str) -> String {
    let mut humanized = String::with_capacity(name.len());
    for part in name.split(['-', '_']).filter(|part| !part.is_empty()) {
        if !humanized.is_empty() {
            humanized.push(' ');
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            humanized.extend(first.to_uppercase());
            humanized.push_str(chars.as_str());
        }
    }
    humanized
}
