use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::launcher::{exit_code_of, Interpreter};
use crate::spinner::Spinner;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const TEMP_SCRIPT_NAME: &str = "temp_generator.js";

const THEMES: &[&str] = &[
    "Epic fantasy quest with dragons and ancient magic",
    "Cyberpunk detective mystery in a neon city",
    "Space exploration adventure with alien encounters",
    "Medieval kingdom under siege by dark forces",
    "Post-apocalyptic survival with mutant creatures",
    "Pirate treasure hunt on mysterious islands",
    "Steampunk adventure with mechanical contraptions",
    "Horror mystery in a haunted mansion",
    "Wild west gunslinger adventure",
    "Underwater exploration with sea monsters",
];

const DRIVER_TEMPLATE: &str = r#"import { ClaudeStoryGenerator } from './@GENERATOR@';
import { StorySystem } from './@SYSTEM@';

async function generateStory() {
    const storySystem = new StorySystem();
    const generator = new ClaudeStoryGenerator(storySystem);

    const themes = @THEMES@;

    const theme = themes[Math.floor(Math.random() * themes.length)];
    console.log(`🎨 Theme: ${theme}`);

    try {
        const story = await generator.generateLongStory(theme, @PAGES@);
        if (story) {
            console.log(`✅ Story generated: "${story.title}"`);
            console.log(`📄 Pages: ${Object.keys(story.pages).length}`);
            return story;
        } else {
            console.log("❌ Story generation failed");
            return null;
        }
    } catch (error) {
        console.error("❌ Generation error:", error.message);
        return null;
    }
}

generateStory().then(story => {
    if (story) {
        console.log(`🏆 New story ready to play!`);
        process.exit(0);
    } else {
        process.exit(1);
    }
});
"#;

/// Page count to request; absent or non-positive values fall back to `default`.
pub fn resolve_pages(requested: Option<i64>, default: u32) -> u32 {
    match requested {
        Some(pages) if pages > 0 => u32::try_from(pages).unwrap_or(u32::MAX),
        _ => default,
    }
}

pub fn render_driver_script(config: &LauncherConfig, min_pages: u32) -> String {
    let themes = serde_json::to_string_pretty(THEMES).unwrap_or_else(|_| "[]".to_string());
    DRIVER_TEMPLATE
        .replace("@GENERATOR@", &config.generator_module)
        .replace("@SYSTEM@", &config.system_module)
        .replace("@THEMES@", &themes.replace('\n', "\n    "))
        .replace("@PAGES@", &min_pages.to_string())
}

/// Driver script on disk for the lifetime of the value.
struct TempScript {
    path: PathBuf,
}

impl TempScript {
    fn write(dir: &Path, body: &str) -> Result<Self> {
        let path = dir.join(TEMP_SCRIPT_NAME);
        fs::write(&path, body)
            .with_context(|| format!("failed to write generator script: {}", path.display()))?;
        Ok(Self { path })
    }
}

impl Drop for TempScript {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), %err, "failed to remove generator script");
        }
    }
}

/// Generates a new story of at least `min_pages` pages in `project_dir`.
///
/// The interpreter shares the console; a spinner runs alongside it.
pub fn generate_story(
    interpreter: &Interpreter,
    config: &LauncherConfig,
    project_dir: &Path,
    min_pages: u32,
) -> Result<()> {
    let script = TempScript::write(project_dir, &render_driver_script(config, min_pages))?;

    let mut spinner = Spinner::start(format!(
        "🎮 Generating new RPG story with minimum {min_pages} pages"
    ));
    println!("🚀 Running story generator...");
    let status = interpreter.run(project_dir, [TEMP_SCRIPT_NAME]);
    spinner.stop();
    drop(script);

    let status = status?;
    if !status.success() {
        return Err(LaunchError::GenerationFailed(exit_code_of(status)).into());
    }
    Ok(())
}
