use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::inclusion::DefaultInclusionModel;
use crate::item::Item;

const APP_DATA_DIR_NAME: &str = "commit-review";
const STATE_FILE_NAME: &str = "state.toml";

/// What the panel remembers about one repository between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelState {
    pub commit_message: Option<String>,
    pub included_paths: Vec<String>,
}

impl PanelState {
    pub fn capture(commit_message: &str, included: &[Item]) -> Self {
        let commit_message = Some(commit_message.trim_end())
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string);
        Self {
            commit_message,
            included_paths: included.iter().map(|item| item.path().to_string()).collect(),
        }
    }

    /// Rebuilds the saved selection over what the tree currently displays.
    /// Paths that are no longer displayed are dropped.
    pub fn inclusion_model(&self, displayed: &[Item]) -> DefaultInclusionModel {
        let saved = self
            .included_paths
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>();
        DefaultInclusionModel::with_items(
            displayed
                .iter()
                .filter(|item| saved.contains(item.path()))
                .cloned(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    pub repositories: BTreeMap<String, PanelState>,
}

#[derive(Debug, Clone)]
pub struct PanelStateStore {
    path: PathBuf,
}

impl PanelStateStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow!("failed to resolve app data directory"))?;
        Ok(Self {
            path: base_dir.join(APP_DATA_DIR_NAME).join(STATE_FILE_NAME),
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_default(&self) -> Result<StateFile> {
        if !self.path.exists() {
            return Ok(StateFile::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state file at {}", self.path.display()))?;
        toml::from_str::<StateFile>(&raw)
            .with_context(|| format!("failed to parse TOML state file at {}", self.path.display()))
    }

    pub fn load_for(&self, repo_root: &Path) -> Result<Option<PanelState>> {
        let mut file = self.load_or_default()?;
        Ok(file.repositories.remove(&repo_key(repo_root)))
    }

    pub fn save_for(&self, repo_root: &Path, state: PanelState) -> Result<()> {
        let mut file = self.load_or_default()?;
        file.repositories.insert(repo_key(repo_root), state);
        self.save(&file)
    }

    pub fn save(&self, state: &StateFile) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("state path has no parent: {}", self.path.display()))?;

        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory {}", parent.display()))?;

        let contents =
            toml::to_string_pretty(state).context("failed to serialize panel state to TOML")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("failed to write state file at {}", self.path.display()))?;
        Ok(())
    }
}

fn repo_key(repo_root: &Path) -> String {
    repo_root.to_string_lossy().into_owned()
}
