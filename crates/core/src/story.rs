use crate::scan::{collect_files, has_extension, is_hidden, sort_newest_first, FileEntry};
use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StoryFile {
    pub path: PathBuf,
    pub name: String,
    pub modified: DateTime<Local>,
}

impl From<FileEntry> for StoryFile {
    fn from(entry: FileEntry) -> Self {
        Self {
            path: entry.path,
            name: entry.name,
            modified: entry.modified,
        }
    }
}

#[derive(Deserialize)]
struct StoryHeader {
    title: Option<String>,
}

impl StoryFile {
    /// Top-level `"title"` of the story document, if it parses.
    pub fn title(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str::<StoryHeader>(&raw)
            .ok()?
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn modified_label(&self) -> String {
        format_file_time(&self.modified)
    }
}

/// Stories in `dir`, newest first, dotfiles excluded. A missing directory
/// holds no stories.
pub fn list_stories(dir: &Path, extension: &str) -> Result<Vec<StoryFile>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "stories directory missing");
        return Ok(Vec::new());
    }

    let mut entries = collect_files(dir, |name| {
        !is_hidden(name) && has_extension(name, &[extension])
    })?;
    sort_newest_first(&mut entries);
    Ok(entries.into_iter().map(StoryFile::from).collect())
}

pub fn find_latest_story(dir: &Path, extension: &str) -> Result<Option<StoryFile>> {
    Ok(list_stories(dir, extension)?.into_iter().next())
}

/// Drops the oldest story from a newest-first list unless it is the only one.
pub fn selectable_stories(mut stories: Vec<StoryFile>) -> Vec<StoryFile> {
    if stories.len() > 1 {
        stories.pop();
    }
    stories
}

/// `position` is 1-based within the newest-first list.
pub fn age_label(position: usize) -> String {
    if position == 1 {
        "Latest".to_string()
    } else {
        format!("{position} newest")
    }
}

pub fn format_file_time(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
