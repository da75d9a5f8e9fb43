use crate::scan::{collect_files, has_extension, is_hidden, sort_newest_first};
use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
pub const OUTPUT_EXTENSION: &str = "jpg";
pub const RANK_WIDTH: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub rank: usize,
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub modified: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlanStats {
    pub scanned_images: usize,
    pub skipped_hidden: usize,
    pub already_renamed: usize,
    pub candidates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub root: PathBuf,
    pub candidates: Vec<RenameCandidate>,
    pub stats: PlanStats,
}

impl RenamePlan {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Ranks the images in `root` newest first and assigns `NNNN.jpg` names.
///
/// Dotfiles such as `._IMG_0001.jpg` sidecars are never ranked. Files already
/// carrying a sequence name are left out so repeated runs do not pick up
/// their own output. Nothing on disk is touched.
pub fn generate_plan(root: &Path) -> Result<RenamePlan> {
    let mut stats = PlanStats::default();
    let images = collect_files(root, |name| {
        if !has_extension(name, IMAGE_EXTENSIONS) {
            return false;
        }
        if is_hidden(name) {
            stats.skipped_hidden += 1;
            return false;
        }
        true
    })?;
    stats.scanned_images = images.len();

    let mut pending: Vec<_> = images
        .into_iter()
        .filter(|entry| !is_sequence_name(&entry.name))
        .collect();
    stats.already_renamed = stats.scanned_images - pending.len();

    sort_newest_first(&mut pending);

    let candidates: Vec<RenameCandidate> = pending
        .into_iter()
        .enumerate()
        .map(|(rank, entry)| RenameCandidate {
            rank,
            target_path: root.join(target_name(rank)),
            original_path: entry.path,
            modified: entry.modified,
        })
        .collect();
    stats.candidates = candidates.len();

    tracing::debug!(
        root = %root.display(),
        scanned = stats.scanned_images,
        skipped_hidden = stats.skipped_hidden,
        already_renamed = stats.already_renamed,
        candidates = stats.candidates,
        "rename plan generated"
    );

    Ok(RenamePlan {
        root: root.to_path_buf(),
        candidates,
        stats,
    })
}

pub fn target_name(rank: usize) -> String {
    format!("{:0width$}.{}", rank, OUTPUT_EXTENSION, width = RANK_WIDTH)
}

/// True for exactly four ASCII digits followed by `.jpg` in any case.
pub fn is_sequence_name(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    stem.len() == RANK_WIDTH
        && stem.bytes().all(|b| b.is_ascii_digit())
        && ext.eq_ignore_ascii_case(OUTPUT_EXTENSION)
}
