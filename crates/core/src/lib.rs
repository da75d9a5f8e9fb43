mod apply;
mod config;
mod error;
mod generator;
mod launcher;
mod planner;
mod scan;
mod session;
mod spinner;
mod story;

pub use apply::{apply_plan, ApplyReport, RenameEntry, RenameOutcome};
pub use config::{
    app_paths, load_config, resolve_config_path, save_config, AppConfig, AppPaths,
    LauncherConfig, DEFAULT_STORY_PAGES,
};
pub use error::LaunchError;
pub use generator::{generate_story, render_driver_script, resolve_pages, TEMP_SCRIPT_NAME};
pub use launcher::{display_command, ensure_required_files, exit_code_of, Interpreter};
pub use planner::{
    generate_plan, is_sequence_name, target_name, PlanStats, RenameCandidate, RenamePlan,
};
pub use scan::FileEntry;
pub use session::{
    begin_pause, end_pause, interrupt, mark_interrupted, should_pause, was_interrupted,
    PausePolicy,
};
pub use spinner::Spinner;
pub use story::{
    age_label, find_latest_story, format_file_time, list_stories, selectable_stories, StoryFile,
};
