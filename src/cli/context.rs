use std::path::{Path, PathBuf};

use futon_widgets::Settings;

pub struct CliContext {
    settings: Settings,
    config_path: Option<PathBuf>,
}

impl CliContext {
    pub fn new(settings: Settings, config_path: Option<PathBuf>) -> Self {
        Self {
            settings,
            config_path,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings file given on the command line, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
