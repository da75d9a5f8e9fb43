use crate::config::LauncherConfig;
use crate::error::LaunchError;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// The external runtime that executes story scripts.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: String,
    version_args: Vec<String>,
    #[cfg_attr(not(windows), allow(dead_code))]
    suppress_window: bool,
}

impl Interpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            version_args: vec!["--version".to_string()],
            suppress_window: false,
        }
    }

    pub fn from_config(config: &LauncherConfig) -> Self {
        Self {
            program: config.interpreter.clone(),
            version_args: config.version_args.clone(),
            suppress_window: config.suppress_console_window,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the version check with captured output and returns what it printed.
    pub fn ensure_available(&self) -> Result<String, LaunchError> {
        let missing = || LaunchError::InterpreterMissing {
            interpreter: self.program.clone(),
        };

        let output = self
            .background_command()
            .args(&self.version_args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                tracing::debug!(
                    program = %self.program,
                    %err,
                    "interpreter version check did not start"
                );
                missing()
            })?;

        if !output.status.success() {
            tracing::debug!(
                program = %self.program,
                status = %output.status,
                "interpreter version check failed"
            );
            return Err(missing());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Runs the interpreter in the foreground, sharing this process's console.
    pub fn run<I, S>(&self, cwd: &Path, args: I) -> Result<ExitStatus>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!(?command, "launching interpreter");
        let status = command
            .status()
            .with_context(|| format!("failed to start {}", self.program))?;
        tracing::debug!(%status, "interpreter exited");
        Ok(status)
    }

    /// Command for helper invocations that must not pop up a console window.
    fn background_command(&self) -> Command {
        #[allow(unused_mut)]
        let mut command = Command::new(&self.program);
        #[cfg(windows)]
        if self.suppress_window {
            command.creation_flags(CREATE_NO_WINDOW);
        }
        command
    }
}

/// Fails with every name under `root` that is absent, in the given order.
pub fn ensure_required_files(root: &Path, names: &[&str]) -> Result<(), LaunchError> {
    let missing: Vec<String> = names
        .iter()
        .filter(|name| !root.join(name).exists())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LaunchError::MissingFiles(missing))
    }
}

/// Exit status as a process exit code; signal deaths count as generic failure.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

pub fn display_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{display_command, ensure_required_files, Interpreter};
    use crate::error::LaunchError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn required_files_report_all_missing_names() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("run_story.js"), b"").expect("write runner");

        let err = ensure_required_files(
            temp.path(),
            &["run_story.js", "StorySystem.js", "StoryGenerator.js"],
        )
        .expect_err("two files are missing");
        match err {
            LaunchError::MissingFiles(names) => {
                assert_eq!(names, vec!["StorySystem.js", "StoryGenerator.js"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn required_files_pass_when_present() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("run_story.js"), b"").expect("write runner");
        ensure_required_files(temp.path(), &["run_story.js"]).expect("present");
    }

    #[test]
    fn unknown_interpreter_is_reported_missing() {
        let interpreter = Interpreter::new("storyrun-no-such-interpreter-7f3a");
        let err = interpreter.ensure_available().expect_err("should be missing");
        assert_eq!(
            err.to_string(),
            "storyrun-no-such-interpreter-7f3a is required but not found"
        );
    }

    #[cfg(unix)]
    #[test]
    fn run_relays_exit_status() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("story.sh"), "exit 7\n").expect("write script");

        let status = Interpreter::new("sh")
            .run(temp.path(), ["story.sh"])
            .expect("sh should start");
        assert_eq!(super::exit_code_of(status), 7);
    }

    #[test]
    fn display_command_joins_with_spaces() {
        assert_eq!(
            display_command("node", &["run_story.js", "stories/a.json"]),
            "node run_story.js stories/a.json"
        );
    }
}
