//! Content records as they appear in the site's JSON collections.

use std::fmt::Debug;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::types::ContentKind;

/// Behaviour shared by every record kind persisted as a collection.
pub trait ContentEntity:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ContentKind;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);
}

/// A portfolio project card.
///
/// Fields the site does not model are kept in `extra` so that rewriting the
/// collection never drops them. Older records carry the picture as
/// `imageUrl`; both keys are kept as read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Picture to show, preferring `image` over the older `imageUrl`.
    pub fn picture(&self) -> Option<&str> {
        self.image.as_deref().or(self.image_url.as_deref())
    }
}

impl ContentEntity for Project {
    const KIND: ContentKind = ContentKind::Projects;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// A blog post teaser linking out to the full article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub medium_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentEntity for BlogPost {
    const KIND: ContentKind = ContentKind::Blogs;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}
