use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{Repository, Status, StatusEntry, StatusOptions};

use crate::item::{FileStatus, Item};

#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    pub root: PathBuf,
    pub items: Vec<Item>,
}

pub fn load_snapshot(cwd: &Path) -> Result<RepoSnapshot> {
    let repo = Repository::discover(cwd).context("failed to discover git repository")?;
    let root = repo_root(&repo)?;

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true)
        .renames_index_to_workdir(true)
        .include_unmodified(false);

    let statuses = repo
        .statuses(Some(&mut options))
        .context("failed to load repository status")?;

    let mut items = statuses
        .iter()
        .filter_map(|entry| {
            let path = entry_path(&entry)?;
            Some(item_for_status(normalize_path(&path), entry.status()))
        })
        .filter(|item| !item.path().is_empty())
        .collect::<Vec<_>>();

    items.sort_by(|a, b| a.path().cmp(b.path()));
    items.dedup_by(|a, b| a.path() == b.path());

    Ok(RepoSnapshot { root, items })
}

fn repo_root(repo: &Repository) -> Result<PathBuf> {
    if let Some(workdir) = repo.workdir() {
        return Ok(workdir.to_path_buf());
    }

    repo.path()
        .parent()
        .map(|path| path.to_path_buf())
        .context("failed to resolve repository root")
}

/// Renames report their destination. Paths that are not valid UTF-8 are skipped.
fn entry_path(entry: &StatusEntry<'_>) -> Option<String> {
    let status = entry.status();
    let renamed = if status.is_wt_renamed() {
        entry.index_to_workdir()
    } else if status.is_index_renamed() {
        entry.head_to_index()
    } else {
        None
    };

    renamed
        .and_then(|delta| delta.new_file().path().and_then(Path::to_str).map(str::to_string))
        .or_else(|| entry.path().map(str::to_string))
}

fn item_for_status(path: String, status: Status) -> Item {
    if status.is_wt_new() && !status.is_conflicted() {
        return Item::untracked(path);
    }
    Item::change(path, map_status(status))
}

fn map_status(status: Status) -> FileStatus {
    if status.is_conflicted() {
        return FileStatus::Conflicted;
    }

    if status.is_index_new() {
        return FileStatus::Added;
    }

    if status.is_wt_deleted() || status.is_index_deleted() {
        return FileStatus::Deleted;
    }

    if status.is_wt_renamed() || status.is_index_renamed() {
        return FileStatus::Renamed;
    }

    if status.is_wt_typechange() || status.is_index_typechange() {
        return FileStatus::TypeChange;
    }

    if status.is_wt_modified() || status.is_index_modified() {
        return FileStatus::Modified;
    }

    FileStatus::Unknown
}

fn normalize_path(path: &str) -> String {
    path.trim().trim_end_matches('/').to_string()
}
