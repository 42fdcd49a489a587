//! Editor forms: raw field input validated into a complete entity.

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::entities::{BlogPost, Project};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn require(&mut self, value: &str, field: &'static str) {
        if value.trim().is_empty() {
            self.0.push(FieldError {
                field,
                message: format!("{field} is required"),
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.0.iter().map(|error| error.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

/// Result of validating a form. `Valid` always carries a fully populated entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome<E> {
    Valid(E),
    Invalid(FieldErrors),
}

impl<E> FormOutcome<E> {
    fn from_errors(errors: FieldErrors, build: impl FnOnce() -> E) -> Self {
        if errors.is_empty() {
            FormOutcome::Valid(build())
        } else {
            FormOutcome::Invalid(errors)
        }
    }
}

/// Append `raw` (trimmed) unless it is blank or already present.
fn push_unique(list: &mut Vec<String>, raw: &str) -> bool {
    let value = raw.trim();
    if value.is_empty() || list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    /// 0 while the project has not been saved yet.
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub url: String,
    /// Picture; written back under `imageUrl` when the record only had that key.
    pub image: String,
    pub date: String,
    pub featured: bool,
    tags: Vec<String>,
    image_in_url_key: bool,
    /// `imageUrl` carried unchanged alongside an `image` value.
    image_url: Option<String>,
    extra: Map<String, Value>,
}

impl ProjectForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_entity(project: &Project) -> Self {
        let image_in_url_key = project.image.is_none() && project.image_url.is_some();
        let mut form = Self {
            id: project.id,
            title: project.title.clone(),
            description: project.description.clone(),
            category: project.category.clone(),
            url: project.url.clone(),
            image: project.picture().unwrap_or_default().to_string(),
            date: project.date.clone().unwrap_or_default(),
            featured: project.featured,
            tags: Vec::new(),
            image_in_url_key,
            image_url: if image_in_url_key {
                None
            } else {
                project.image_url.clone()
            },
            extra: project.extra.clone(),
        };
        for tag in &project.tags {
            form.add_tag(tag);
        }
        form
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        push_unique(&mut self.tags, tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag.trim());
        self.tags.len() != before
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    pub fn validate(&self) -> FormOutcome<Project> {
        let mut errors = FieldErrors::default();
        errors.require(&self.title, "title");
        errors.require(&self.description, "description");
        errors.require(&self.category, "category");
        errors.require(&self.url, "url");

        let (image, image_url) = if self.image_in_url_key {
            (None, optional(&self.image))
        } else {
            (optional(&self.image), self.image_url.clone())
        };
        FormOutcome::from_errors(errors, || Project {
            id: self.id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            url: self.url.trim().to_string(),
            tags: self.tags.clone(),
            image,
            image_url,
            date: optional(&self.date),
            featured: self.featured,
            extra: self.extra.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogPostForm {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    pub medium_url: String,
    pub date: String,
    pub read_time: String,
    pub image_url: String,
    categories: Vec<String>,
    extra: Map<String, Value>,
}

impl BlogPostForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_entity(post: &BlogPost) -> Self {
        let mut form = Self {
            id: post.id,
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            medium_url: post.medium_url.clone(),
            date: post.date.clone().unwrap_or_default(),
            read_time: post.read_time.clone().unwrap_or_default(),
            image_url: post.image_url.clone().unwrap_or_default(),
            categories: Vec::new(),
            extra: post.extra.clone(),
        };
        for category in &post.categories {
            form.add_category(category);
        }
        form
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn add_category(&mut self, category: &str) -> bool {
        push_unique(&mut self.categories, category)
    }

    pub fn remove_category(&mut self, category: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|existing| existing != category.trim());
        self.categories.len() != before
    }

    pub fn clear_categories(&mut self) {
        self.categories.clear();
    }

    pub fn validate(&self) -> FormOutcome<BlogPost> {
        let mut errors = FieldErrors::default();
        errors.require(&self.title, "title");
        errors.require(&self.excerpt, "excerpt");
        errors.require(&self.medium_url, "mediumUrl");

        FormOutcome::from_errors(errors, || BlogPost {
            id: self.id,
            title: self.title.trim().to_string(),
            excerpt: self.excerpt.trim().to_string(),
            medium_url: self.medium_url.trim().to_string(),
            date: optional(&self.date),
            read_time: optional(&self.read_time),
            image_url: optional(&self.image_url),
            categories: self.categories.clone(),
            extra: self.extra.clone(),
        })
    }
}
