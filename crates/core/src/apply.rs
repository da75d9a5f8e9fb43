use crate::planner::{RenameCandidate, RenamePlan};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenameOutcome {
    Renamed,
    SkippedTargetExists,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameEntry {
    pub from: PathBuf,
    pub to: PathBuf,
    pub outcome: RenameOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyReport {
    pub entries: Vec<RenameEntry>,
    pub considered: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Renames every candidate in rank order.
///
/// An existing target is never overwritten; that candidate is skipped. A
/// failed rename is recorded and the pass moves on. Completed renames stay
/// in place whatever happens later in the pass.
pub fn apply_plan(plan: &RenamePlan) -> ApplyReport {
    let mut report = ApplyReport {
        considered: plan.candidates.len(),
        ..ApplyReport::default()
    };

    for candidate in &plan.candidates {
        let outcome = rename_one(candidate);
        match &outcome {
            RenameOutcome::Renamed => report.renamed += 1,
            RenameOutcome::SkippedTargetExists => {
                tracing::warn!(
                    source = %candidate.original_path.display(),
                    target = %candidate.target_path.display(),
                    "target exists, rename skipped"
                );
                report.skipped += 1;
            }
            RenameOutcome::Failed { error } => {
                tracing::warn!(
                    source = %candidate.original_path.display(),
                    %error,
                    "rename failed"
                );
                report.failed += 1;
            }
        }
        report.entries.push(RenameEntry {
            from: candidate.original_path.clone(),
            to: candidate.target_path.clone(),
            outcome,
        });
    }

    report
}

fn rename_one(candidate: &RenameCandidate) -> RenameOutcome {
    // symlink_metadata also catches dangling links sitting on the target name
    if fs::symlink_metadata(&candidate.target_path).is_ok() {
        return RenameOutcome::SkippedTargetExists;
    }

    match fs::rename(&candidate.original_path, &candidate.target_path) {
        Ok(()) => {
            tracing::debug!(
                from = %candidate.original_path.display(),
                to = %candidate.target_path.display(),
                "renamed"
            );
            RenameOutcome::Renamed
        }
        Err(err) => RenameOutcome::Failed {
            error: err.to_string(),
        },
    }
}
