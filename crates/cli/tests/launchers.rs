//! Story launchers driven through `sh` standing in for the real interpreter.

mod common;

use common::TestContext;
use predicates::prelude::*;

fn project_with_runner(ctx: &TestContext, runner: &str) {
    ctx.use_shell_interpreter();
    ctx.write("run_story.js", runner);
    ctx.write("StorySystem.js", "");
}

#[test]
fn missing_interpreter_fails_with_message() {
    let ctx = TestContext::new();
    ctx.write_config(
        "[launcher]\ninterpreter = \"storyrun-no-such-interpreter-7f3a\"\npause_on_exit = \"never\"\n",
    );

    ctx.cli()
        .arg("play")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "storyrun-no-such-interpreter-7f3a is required but not found",
        ));
}

#[cfg(unix)]
#[test]
fn missing_companion_files_are_listed() {
    let ctx = TestContext::new();
    ctx.use_shell_interpreter();

    ctx.cli()
        .arg("play")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Missing required files: run_story.js, StorySystem.js",
        ));
}

#[cfg(unix)]
#[test]
fn play_without_stories_fails() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "exit 0\n");

    ctx.cli()
        .arg("play")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No story files found"));
}

#[cfg(unix)]
#[test]
fn play_runs_latest_story_and_relays_exit_code() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "echo \"playing $1\"\nexit 3\n");
    ctx.touch_at("stories/old.json", 0);
    ctx.touch_at("stories/new.json", 9);

    ctx.cli()
        .arg("latest")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Using latest story: stories/new.json"))
        .stdout(predicate::str::contains("playing stories/new.json"))
        .stdout(predicate::str::contains("Game session ended."));
}

#[cfg(unix)]
#[test]
fn play_accepts_explicit_story() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "echo \"playing $1\"\n");
    ctx.touch_at("stories/newest.json", 9);
    ctx.touch_at("saved/pick.json", 0);

    ctx.cli()
        .args(["play", "saved/pick.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("playing saved/pick.json"));
}

#[cfg(unix)]
#[test]
fn play_rejects_unknown_story() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "exit 0\n");

    ctx.cli()
        .args(["play", "stories/ghost.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Story file 'stories/ghost.json' not found"));
}

#[cfg(unix)]
#[test]
fn interrupt_during_story_prints_farewell_and_exits_130() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "kill -INT $PPID\nsleep 0.3\nexit 0\n");
    ctx.touch_at("stories/tale.json", 0);

    ctx.cli()
        .arg("play")
        .assert()
        .code(130)
        .stdout(predicate::str::contains("Story interrupted by user. Goodbye!"))
        .stdout(predicate::str::contains("Game session ended.").not());
}

#[cfg(unix)]
#[test]
fn choose_reads_selection_from_piped_stdin() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "echo \"playing $1\"\n");
    ctx.touch_at("stories/oldest.json", 0);
    ctx.touch_at("stories/middle.json", 5);
    ctx.write("stories/newest.json", r#"{"title": "Neon Rain"}"#);

    ctx.cli()
        .arg("choose")
        .write_stdin("7\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 stories"))
        .stdout(predicate::str::contains("Title: Neon Rain"))
        .stdout(predicate::str::contains("oldest.json").not())
        .stdout(predicate::str::contains("Please enter a number between 1 and 2"))
        .stdout(predicate::str::contains("playing stories/middle.json"));
}

#[cfg(unix)]
#[test]
fn choose_exits_cleanly_on_eof() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "echo should-not-run\n");
    ctx.touch_at("stories/only.json", 0);

    ctx.cli()
        .arg("choose")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Goodbye!"))
        .stdout(predicate::str::contains("should-not-run").not());
}

#[cfg(unix)]
#[test]
fn generate_requires_generator_module() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "exit 0\n");

    ctx.cli()
        .arg("generate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required files: StoryGenerator.js"));
}

#[cfg(unix)]
#[test]
fn generate_reports_failed_run_and_removes_driver() {
    let ctx = TestContext::new();
    project_with_runner(&ctx, "exit 0\n");
    ctx.write("StoryGenerator.js", "");

    ctx.cli()
        .args(["generate", "--pages", "5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Story generation failed with exit code"));

    assert!(!ctx.exists("temp_generator.js"));
}

#[test]
fn config_init_then_show() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    ctx.cli()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    ctx.cli()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interpreter = \"node\""))
        .stdout(predicate::str::contains("pause_on_exit = \"auto\""));
}
