use std::path::PathBuf;
use thiserror::Error;

/// Failures of the story launchers that end the process with a status code.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{interpreter} is required but not found")]
    InterpreterMissing { interpreter: String },

    #[error("Missing required files: {}", .0.join(", "))]
    MissingFiles(Vec<String>),

    #[error("No story files found in {} directory", .0.display())]
    NoStories(PathBuf),

    #[error("Story file '{}' not found", .0.display())]
    StoryNotFound(PathBuf),

    #[error("Story generation failed with exit code: {0}")]
    GenerationFailed(i32),

    #[error("interrupted by user")]
    Interrupted,
}

impl LaunchError {
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::Interrupted => 130,
            _ => 1,
        }
    }
}
