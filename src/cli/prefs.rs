//! Sidebar, theme and reset commands.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::prefs::Theme;

use super::Session;

#[derive(serde::Serialize)]
struct SidebarOutput {
    show_sidebar: bool,
}

#[derive(serde::Serialize)]
struct ThemeOutput {
    theme: Theme,
    changed: bool,
}

#[derive(serde::Serialize)]
struct ResetOutput {
    dir: PathBuf,
    cleared: bool,
}

pub fn run_sidebar(state: &str, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let show = match state.to_lowercase().as_str() {
        "show" => true,
        "hide" => false,
        _ => {
            return Err(Error::InvalidArgument(format!(
                "invalid sidebar state '{state}': must be show or hide"
            )))
        }
    };

    let session = Session::open(dir)?;
    session.prefs.set_show_sidebar(show)?;

    let human = HumanOutput::new(if show { "Sidebar shown" } else { "Sidebar hidden" });
    emit_success(
        output,
        "sidebar",
        &SidebarOutput { show_sidebar: show },
        Some(&human),
    )
}

pub fn run_theme(theme: Option<&str>, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let requested = theme.map(str::parse::<Theme>).transpose()?;
    let session = Session::open(dir)?;

    let (theme, changed) = match requested {
        Some(theme) => {
            session.prefs.set_theme(theme)?;
            (theme, true)
        }
        None => (session.prefs.theme()?, false),
    };

    let name = match theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };
    let mut human = HumanOutput::new(if changed { "Theme set" } else { "Current theme" });
    human.push_summary("Theme", name);

    emit_success(output, "theme", &ThemeOutput { theme, changed }, Some(&human))
}

pub fn run_reset(force: bool, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    if !force {
        return Err(Error::InvalidArgument(
            "reset removes every task and preference; pass --force to confirm".to_string(),
        ));
    }

    let session = Session::open(dir)?;
    session.repo.storage().reset()?;

    let mut human = HumanOutput::new("Store cleared");
    human.push_summary("dir", session.dir.display().to_string());
    human.push_next_step("kanban init");

    emit_success(
        output,
        "reset",
        &ResetOutput {
            dir: session.dir.clone(),
            cleared: true,
        },
        Some(&human),
    )
}
