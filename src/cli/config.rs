use anyhow::Result;
use clap::{Args, Subcommand};
use futon_widgets::settings::{MAX_RETRIES_KEY, RELOAD_RANGE_KEY, WAIT_DELAY_KEY};
use futon_widgets::Settings;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the resolved settings
    Show,

    /// Validate the settings sources
    Validate,
}

/// Settings as they are keyed in files and printed to users.
#[derive(Debug, Serialize)]
pub struct SettingsView {
    #[serde(rename = "max.retries")]
    pub max_retries: u32,
    #[serde(rename = "reload.range")]
    pub reload_range: u32,
    #[serde(rename = "wait.delay.ms")]
    pub wait_delay_ms: u64,
    pub source: String,
}

impl SettingsView {
    pub fn new(settings: &Settings, ctx: &CliContext) -> Self {
        Self {
            max_retries: settings.policy.max_retries.get(),
            reload_range: settings.policy.reload_every.get(),
            wait_delay_ms: settings.wait_delay_ms,
            source: describe_source(ctx),
        }
    }
}

pub fn cmd_config(args: ConfigArgs, ctx: &CliContext, format: OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let view = SettingsView::new(ctx.settings(), ctx);
            print_structured(&format, &view, |view| {
                println!("Current settings ({}):", view.source);
                println!("  {} = {}", MAX_RETRIES_KEY, view.max_retries);
                println!("  {} = {}", RELOAD_RANGE_KEY, view.reload_range);
                println!("  {} = {}", WAIT_DELAY_KEY, view.wait_delay_ms);
            })?;
        }
        ConfigAction::Validate => {
            // Loading already validated every source before dispatch.
            println!("Settings from {} are valid", describe_source(ctx));
        }
    }

    Ok(())
}

fn describe_source(ctx: &CliContext) -> String {
    match ctx.config_path() {
        Some(path) => format!("{} + environment", path.display()),
        None => "defaults + environment".to_string(),
    }
}
