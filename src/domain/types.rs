//! Shared domain enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two collections the site persists. Each kind is stored as one JSON
/// array at its own path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Projects,
    Blogs,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Projects, ContentKind::Blogs];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Projects => "projects",
            ContentKind::Blogs => "blogs",
        }
    }

    /// Singular label used in notifications and commit messages.
    pub fn entity_label(self) -> &'static str {
        match self {
            ContentKind::Projects => "project",
            ContentKind::Blogs => "blog post",
        }
    }

    pub fn default_path(self) -> &'static str {
        match self {
            ContentKind::Projects => "data/projects.json",
            ContentKind::Blogs => "data/blogs.json",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "projects" | "project" => Ok(ContentKind::Projects),
            "blogs" | "blog" | "posts" => Ok(ContentKind::Blogs),
            other => Err(format!("unknown content kind `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_singular_and_plural() {
        assert_eq!("project".parse::<ContentKind>(), Ok(ContentKind::Projects));
        assert_eq!(" Blogs ".parse::<ContentKind>(), Ok(ContentKind::Blogs));
        assert!("pages".parse::<ContentKind>().is_err());
    }

    #[test]
    fn default_paths_live_under_data() {
        assert_eq!(ContentKind::Projects.default_path(), "data/projects.json");
        assert_eq!(ContentKind::Blogs.default_path(), "data/blogs.json");
    }
}
