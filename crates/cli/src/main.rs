use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dialoguer::Select;
use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};
use std::sync::Once;
use storyrun_core::{
    age_label, apply_plan, begin_pause, display_command, end_pause, ensure_required_files,
    exit_code_of, find_latest_story, generate_plan, generate_story, interrupt, list_stories,
    load_config, resolve_config_path, resolve_pages, save_config, selectable_stories,
    should_pause, was_interrupted, AppConfig, ApplyReport, Interpreter, LaunchError,
    LauncherConfig, RenameOutcome, RenamePlan, StoryFile,
};
use tracing_subscriber::EnvFilter;

const RULE_WIDTH: usize = 50;

#[derive(Debug, Parser)]
#[command(name = "storyrun-cli")]
#[command(about = "Renames photos by age and launches generated stories")]
struct Cli {
    /// Config file to use instead of the OS default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rename JPG files to 0000.jpg, 0001.jpg, ... newest first
    RenameByAge(RenameArgs),
    /// Play a story file, or the latest one when none is given
    #[command(visible_alias = "latest")]
    Play(PlayArgs),
    /// Pick a story from a list and play it
    Choose,
    /// Generate a new story
    Generate(GenerateArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(default_value = ".")]
    dir: PathBuf,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct PlayArgs {
    story: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Minimum page count; zero or negative uses the configured default
    #[arg(long, short = 'p', allow_negative_numbers = true)]
    pages: Option<i64>,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Write a config file with default values
    Init {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => report_error(&err),
    };
    ExitCode::from(code)
}

/// Filter used when `RUST_LOG` is unset. Warnings already reach the console as
/// plain output, so the quiet default only lets errors through.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "error"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    let config_path = resolve_config_path(cli.config.as_deref())?;

    match cli.command {
        Commands::RenameByAge(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(&config_path),
            ConfigAction::Init { force } => cmd_config_init(&config_path, force),
        },
        Commands::Play(args) => {
            let config = load_config(&config_path)?;
            Ok(with_session(&config.launcher, |launcher, dir| {
                cmd_play(launcher, dir, args.story)
            }))
        }
        Commands::Choose => {
            let config = load_config(&config_path)?;
            Ok(with_session(&config.launcher, cmd_choose))
        }
        Commands::Generate(args) => {
            let config = load_config(&config_path)?;
            Ok(with_session(&config.launcher, |launcher, dir| {
                cmd_generate(launcher, dir, args.pages)
            }))
        }
    }
}

fn report_error(err: &anyhow::Error) -> u8 {
    let launch = err.downcast_ref::<LaunchError>();
    match launch {
        Some(LaunchError::Interrupted) => println!("\n\n👋 Story interrupted by user. Goodbye!"),
        _ => {
            eprintln!("❌ Error: {err:#}");
            if let Some(hint) = launch.and_then(hint_for) {
                eprintln!("{hint}");
            }
        }
    }
    launch.map(LaunchError::exit_code).unwrap_or(1)
}

fn hint_for(err: &LaunchError) -> Option<String> {
    match err {
        LaunchError::InterpreterMissing { interpreter } if interpreter == "node" => {
            Some("Please install Node.js: https://nodejs.org/".to_string())
        }
        LaunchError::NoStories(_) => {
            Some("Generate a story first or provide a story file path".to_string())
        }
        _ => None,
    }
}

/// Runs a launcher command in the current directory, reports its failure and
/// holds the console open afterwards when the pause policy asks for it.
fn with_session<F>(launcher: &LauncherConfig, command: F) -> u8
where
    F: FnOnce(&LauncherConfig, &Path) -> Result<u8>,
{
    let outcome = env::current_dir()
        .context("failed to resolve the working directory")
        .and_then(|dir| command(launcher, &dir));

    let code = match outcome {
        Ok(code) => code,
        Err(err) if matches!(err.downcast_ref::<LaunchError>(), Some(LaunchError::Interrupted)) => {
            return report_error(&err);
        }
        Err(err) => report_error(&err),
    };

    let stdin_is_terminal = io::stdin().is_terminal();
    let hold_open = should_pause(launcher.pause_on_exit, cfg!(windows), stdin_is_terminal);
    if hold_open && !was_interrupted() {
        pause("Press Enter to close...", code);
    }
    code
}

fn cmd_rename(args: RenameArgs) -> Result<u8> {
    let plan = generate_plan(&args.dir)?;

    if plan.is_empty() {
        match args.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            OutputFormat::Table if plan.stats.scanned_images == 0 => {
                println!("No JPG files found in {}", args.dir.display());
            }
            OutputFormat::Table => {
                println!("No files to rename (all files already renamed)");
            }
        }
        return Ok(0);
    }

    if args.dry_run {
        match args.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            OutputFormat::Table => print_plan(&plan),
        }
        eprintln!("dry-run: no files were changed. Run without --dry-run to rename.");
        return Ok(0);
    }

    let report = apply_plan(&plan);
    match args.output {
        OutputFormat::Json => {
            let body = serde_json::json!({ "stats": plan.stats, "report": report });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table => print_report(&report),
    }

    if report.failed > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_plan(plan: &RenamePlan) {
    for candidate in &plan.candidates {
        println!(
            "{} -> {} ({})",
            display_name(&candidate.original_path),
            display_name(&candidate.target_path),
            candidate.modified.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!(
        "\nSummary: images={} hidden={} already_renamed={} planned={}",
        plan.stats.scanned_images,
        plan.stats.skipped_hidden,
        plan.stats.already_renamed,
        plan.stats.candidates
    );
}

fn print_report(report: &ApplyReport) {
    for entry in &report.entries {
        let from = display_name(&entry.from);
        let to = display_name(&entry.to);
        match &entry.outcome {
            RenameOutcome::Renamed => println!("Renamed: {from} -> {to}"),
            RenameOutcome::SkippedTargetExists => {
                println!("⚠️  Warning: {to} already exists, skipping {from}")
            }
            RenameOutcome::Failed { error } => println!("❌ Error renaming {from}: {error}"),
        }
    }
    println!(
        "\nConsidered {} files: renamed {}, skipped {}, failed {}",
        report.considered, report.renamed, report.skipped, report.failed
    );
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_play(launcher: &LauncherConfig, dir: &Path, story: Option<PathBuf>) -> Result<u8> {
    let interpreter = ready_interpreter(launcher)?;
    ensure_required_files(
        dir,
        &[
            launcher.runner_script.as_str(),
            launcher.system_module.as_str(),
        ],
    )?;

    let story_path = match story {
        Some(path) => {
            if !dir.join(&path).exists() {
                return Err(LaunchError::StoryNotFound(path).into());
            }
            path
        }
        None => {
            let stories_dir = dir.join(&launcher.stories_dir);
            let latest = find_latest_story(&stories_dir, &launcher.story_extension)?
                .ok_or_else(|| LaunchError::NoStories(launcher.stories_dir.clone()))?;
            let relative = launcher.stories_dir.join(&latest.name);
            println!("🎮 Using latest story: {}", relative.display());
            relative
        }
    };

    play_story(&interpreter, launcher, dir, &story_path)
}

fn cmd_choose(launcher: &LauncherConfig, dir: &Path) -> Result<u8> {
    println!("🎮 STORY SELECTOR");
    println!("{}", rule('='));

    let interpreter = ready_interpreter(launcher)?;
    ensure_required_files(
        dir,
        &[
            launcher.runner_script.as_str(),
            launcher.system_module.as_str(),
        ],
    )?;

    let stories = list_stories(&dir.join(&launcher.stories_dir), &launcher.story_extension)?;
    if stories.is_empty() {
        return Err(LaunchError::NoStories(launcher.stories_dir.clone()).into());
    }

    println!("\n📚 Found {} stories:", stories.len());
    println!("{}", rule('-'));

    let available = selectable_stories(stories);
    for (index, story) in available.iter().enumerate() {
        print_story_option(index + 1, story);
    }

    let Some(choice) = prompt_choice(&available)? else {
        println!("\n👋 Goodbye!");
        return Ok(0);
    };
    let selected = &available[choice];

    println!("\n🎮 Playing: {}", selected.name);
    println!("{}", rule('='));
    println!();

    let relative = launcher.stories_dir.join(&selected.name);
    play_story(&interpreter, launcher, dir, &relative)
}

fn print_story_option(position: usize, story: &StoryFile) {
    println!("[{position}] {}", story.name);
    if let Some(title) = story.title() {
        println!("    Title: {title}");
    }
    println!(
        "    Created: {} ({})",
        story.modified_label(),
        age_label(position)
    );
    println!();
}

/// Zero-based index of the chosen story, or `None` when the user backs out.
fn prompt_choice(stories: &[StoryFile]) -> Result<Option<usize>> {
    let prompt = format!("📝 Choose story (1-{})", stories.len());

    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        let labels: Vec<String> = stories.iter().map(|s| s.name.clone()).collect();
        return match Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()
        {
            Ok(choice) => Ok(choice),
            Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(anyhow::Error::new(err).context("story selection failed")),
        };
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    read_choice(&mut stdin.lock(), &mut stdout, &prompt, stories.len())
        .context("failed to read story choice")
}

/// Reads 1-based choices until one is in range; EOF yields `None`.
fn read_choice<R, W>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    count: usize,
) -> io::Result<Option<usize>>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{prompt}: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match line.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            Ok(_) => writeln!(output, "❌ Please enter a number between 1 and {count}")?,
            Err(_) => writeln!(output, "❌ Please enter a valid number")?,
        }
    }
}

fn cmd_generate(launcher: &LauncherConfig, dir: &Path, pages: Option<i64>) -> Result<u8> {
    let interpreter = ready_interpreter(launcher)?;
    ensure_required_files(
        dir,
        &[
            launcher.generator_module.as_str(),
            launcher.system_module.as_str(),
        ],
    )?;

    let min_pages = resolve_pages(pages, launcher.default_pages);
    watch_interrupts();
    let generated = generate_story(&interpreter, launcher, dir, min_pages);
    if was_interrupted() {
        return Err(LaunchError::Interrupted.into());
    }
    generated?;

    println!("✅ Story generation completed successfully!");
    println!("\n{}", rule('='));
    println!("✅ Story generation complete!");
    println!("{}", rule('='));
    println!("🎮 To play the story, run one of these:");
    println!("   • storyrun-cli play");
    println!("   • storyrun-cli choose");
    println!("{}", rule('='));
    Ok(0)
}

fn ready_interpreter(launcher: &LauncherConfig) -> Result<Interpreter> {
    let interpreter = Interpreter::from_config(launcher);
    let version = interpreter.ensure_available()?;
    if version.is_empty() {
        println!("✅ {} is ready", interpreter.program());
    } else {
        println!("✅ {} is ready ({version})", interpreter.program());
    }
    Ok(interpreter)
}

fn play_story(
    interpreter: &Interpreter,
    launcher: &LauncherConfig,
    dir: &Path,
    story: &Path,
) -> Result<u8> {
    let args = [
        launcher.runner_script.clone(),
        story.to_string_lossy().to_string(),
    ];
    println!("🚀 Running: {}", display_command(interpreter.program(), &args));
    println!("{}", rule('='));
    println!();

    watch_interrupts();
    let status = interpreter.run(dir, &args)?;
    if was_interrupted() {
        return Err(LaunchError::Interrupted.into());
    }

    println!("\n{}", rule('='));
    println!("🎮 Game session ended.");

    Ok(u8::try_from(exit_code_of(status)).unwrap_or(1))
}

/// From here on Ctrl-C only flags the interrupt; the child on the same
/// console receives it and exits on its own. At the exit pause it closes the
/// console with the session's exit code.
fn watch_interrupts() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let handler = || {
            if let Some(code) = interrupt() {
                println!();
                process::exit(i32::from(code));
            }
        };
        if let Err(err) = ctrlc::set_handler(handler) {
            tracing::warn!(%err, "could not install Ctrl-C handler");
        }
    });
}

fn pause(message: &str, code: u8) {
    begin_pause(code);
    print!("\n{message}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
    end_pause();
}

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

fn cmd_config_show(path: &Path) -> Result<u8> {
    let config = load_config(path)?;
    println!("Config file: {}", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(0)
}

fn cmd_config_init(path: &Path, force: bool) -> Result<u8> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    save_config(path, &AppConfig::default())?;
    println!("Wrote default config: {}", path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::{default_filter, read_choice, rule};
    use std::io::Cursor;

    fn choose(input: &str, count: usize) -> (Option<usize>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let choice = read_choice(&mut reader, &mut out, "Choose", count).expect("read");
        (choice, String::from_utf8(out).expect("utf-8"))
    }

    #[test]
    fn read_choice_accepts_one_based_index() {
        let (choice, _) = choose("2\n", 3);
        assert_eq!(choice, Some(1));
    }

    #[test]
    fn read_choice_reprompts_on_invalid_input() {
        let (choice, out) = choose("abc\n9\n 1 \n", 3);
        assert_eq!(choice, Some(0));
        assert!(out.contains("Please enter a valid number"));
        assert!(out.contains("Please enter a number between 1 and 3"));
        assert_eq!(out.matches("Choose: ").count(), 3);
    }

    #[test]
    fn read_choice_returns_none_on_eof() {
        let (choice, _) = choose("", 3);
        assert_eq!(choice, None);
    }

    #[test]
    fn default_filter_is_quiet_unless_verbose() {
        assert_eq!(default_filter(false), "error");
        assert_eq!(default_filter(true), "debug");
    }

    #[test]
    fn rule_has_fixed_width() {
        assert_eq!(rule('=').chars().count(), 50);
    }
}
