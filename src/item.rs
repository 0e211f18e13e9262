use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    TypeChange,
    Conflicted,
    Unknown,
}

impl FileStatus {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Added => "A",
            Self::Modified => "M",
            Self::Deleted => "D",
            Self::Renamed => "R",
            Self::TypeChange => "T",
            Self::Conflicted => "!",
            Self::Unknown => "-",
        }
    }
}

/// A tracked modification reported by the version control backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Change {
    pub path: String,
    pub status: FileStatus,
}

impl Change {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Change,
    UntrackedFile,
}

/// One row that can be included in a commit.
///
/// Identity is the value itself, never the row it is displayed at. Items are
/// produced by whoever feeds the changes tree; the panel only compares them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Item {
    Change(Change),
    Untracked(String),
}

impl Item {
    pub fn change(path: impl Into<String>, status: FileStatus) -> Self {
        Self::Change(Change::new(path, status))
    }

    pub fn untracked(path: impl Into<String>) -> Self {
        Self::Untracked(path.into())
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Change(_) => ItemKind::Change,
            Self::Untracked(_) => ItemKind::UntrackedFile,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Change(change) => change.path.as_str(),
            Self::Untracked(path) => path.as_str(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Change(change) => change.status.tag(),
            Self::Untracked(_) => "U",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag(), self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map(|(ix, _)| ix)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of an already submitted commit that the panel is amending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedCommit {
    pub id: CommitId,
    pub subject: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl CommitAuthor {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for CommitAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

impl FromStr for CommitAuthor {
    type Err = anyhow::Error;

    /// Parses the `Name <email>` form used by `git commit --author`.
    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let open = raw
            .find('<')
            .ok_or_else(|| anyhow!("author `{raw}` is missing `<email>`"))?;
        let close = raw
            .rfind('>')
            .filter(|close| *close > open && *close == raw.len() - 1)
            .ok_or_else(|| anyhow!("author `{raw}` must end with `>`"))?;

        let name = raw[..open].trim();
        let email = raw[open + 1..close].trim();
        if name.is_empty() {
            return Err(anyhow!("author `{raw}` has an empty name"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(anyhow!("author `{raw}` has an invalid email"));
        }

        Ok(Self::new(name, email))
    }
}
