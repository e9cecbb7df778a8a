//! Commit identity extracted from an artifact revision.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::Serialize;

use crate::error::RelayError;
use crate::models::status::CommitState;

static SHA_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").unwrap());
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

/// An `owner/name` repository on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parse an `owner/name` pair, tolerating a trailing `.git`.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.trim_matches('/').split_once('/')?;
        Self::from_parts(owner, name)
    }

    fn from_parts(owner: &str, name: &str) -> Option<Self> {
        let name = name.strip_suffix(".git").unwrap_or(name);
        if !NAME_REGEX.is_match(owner) || !NAME_REGEX.is_match(name) {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Identify the repository a revision URL points at.
    ///
    /// Understands plain commit URLs (`/<owner>/<repo>/commit/<sha>`) and
    /// CodeStar connection redirects carrying `FullRepositoryId`.
    pub fn from_revision_url(url: &Url) -> Option<Self> {
        if let Some((_, full)) = url.query_pairs().find(|(k, _)| k == "FullRepositoryId") {
            return Self::parse(&full);
        }

        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let name = segments.next()?;
        match (segments.next(), segments.next()) {
            (Some("commit"), Some(_)) => Self::from_parts(owner, name),
            _ => None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// What the source artifact says about the commit, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub sha: String,
    pub summary: Option<String>,
    pub raw_url: Option<String>,
    /// `None` when the artifact carries no URL or an unparsable one.
    pub revision_url: Option<Url>,
    pub state: CommitState,
}

/// A commit the relay can post a status against.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitTarget {
    pub repository: Repository,
    pub sha: String,
    pub state: CommitState,
}

impl TryFrom<CommitInfo> for CommitTarget {
    type Error = RelayError;

    fn try_from(info: CommitInfo) -> Result<Self, Self::Error> {
        if !SHA_REGEX.is_match(&info.sha) {
            return Err(RelayError::InvalidCommit(info.sha));
        }

        let raw_url = info.raw_url.unwrap_or_default();
        let repository = info
            .revision_url
            .as_ref()
            .and_then(Repository::from_revision_url)
            .ok_or(RelayError::InvalidRevisionUrl(raw_url))?;

        Ok(Self {
            repository,
            sha: info.sha,
            state: info.state,
        })
    }
}
