//! Read-only glossary and blog content.
//!
//! Handlers depend on [`ContentRepository`] rather than on the data itself,
//! so the bundled content can be swapped for files on disk.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const EMBEDDED_GLOSSARY: &str = include_str!("../../content/glossary.json");
const EMBEDDED_BLOG: &str = include_str!("../../content/blog.json");

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate {what} slug {slug:?}")]
    DuplicateSlug { what: &'static str, slug: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerm {
    pub slug: String,
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub related: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub author: String,
    /// ISO-8601 date, e.g. `2024-03-18`.
    pub published: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub read_minutes: u32,
}

pub trait ContentRepository: Send + Sync {
    fn glossary(&self) -> Vec<GlossaryTerm>;
    fn find_term(&self, slug: &str) -> Option<GlossaryTerm>;
    fn search_terms(&self, query: &str) -> Vec<GlossaryTerm>;
    fn blog_posts(&self, tag: Option<&str>) -> Vec<BlogPost>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    glossary: Vec<GlossaryTerm>,
    posts: Vec<BlogPost>,
}

impl InMemoryContent {
    /// Glossary is kept alphabetical by term, posts newest first.
    pub fn new(
        mut glossary: Vec<GlossaryTerm>,
        mut posts: Vec<BlogPost>,
    ) -> Result<Self, ContentError> {
        ensure_unique_slugs("glossary", glossary.iter().map(|t| t.slug.as_str()))?;
        ensure_unique_slugs("blog", posts.iter().map(|p| p.slug.as_str()))?;

        glossary.sort_by_key(|t| t.term.to_lowercase());
        posts.sort_by(|a, b| b.published.cmp(&a.published));
        Ok(Self { glossary, posts })
    }

    pub fn from_json(glossary_json: &str, blog_json: &str) -> Result<Self, ContentError> {
        let glossary = serde_json::from_str(glossary_json).map_err(|source| ContentError::Json {
            what: "glossary",
            source,
        })?;
        let posts = serde_json::from_str(blog_json).map_err(|source| ContentError::Json {
            what: "blog",
            source,
        })?;
        Self::new(glossary, posts)
    }

    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_json(EMBEDDED_GLOSSARY, EMBEDDED_BLOG)
    }

    /// Loads `glossary.json` and `blog.json` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, ContentError> {
        let glossary = read_file(&dir.join("glossary.json"))?;
        let blog = read_file(&dir.join("blog.json"))?;
        Self::from_json(&glossary, &blog)
    }
}

fn read_file(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn ensure_unique_slugs<'a>(
    what: &'static str,
    slugs: impl Iterator<Item = &'a str>,
) -> Result<(), ContentError> {
    let mut seen = std::collections::HashSet::new();
    for slug in slugs {
        if !seen.insert(slug) {
            return Err(ContentError::DuplicateSlug {
                what,
                slug: slug.to_string(),
            });
        }
    }
    Ok(())
}

impl ContentRepository for InMemoryContent {
    fn glossary(&self) -> Vec<GlossaryTerm> {
        self.glossary.clone()
    }

    fn find_term(&self, slug: &str) -> Option<GlossaryTerm> {
        self.glossary.iter().find(|t| t.slug == slug).cloned()
    }

    fn search_terms(&self, query: &str) -> Vec<GlossaryTerm> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.glossary();
        }
        self.glossary
            .iter()
            .filter(|t| {
                t.term.to_lowercase().contains(&needle)
                    || t.definition.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    fn blog_posts(&self, tag: Option<&str>) -> Vec<BlogPost> {
        match tag {
            Some(tag) => self
                .posts
                .iter()
                .filter(|p| p.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
                .cloned()
                .collect(),
            None => self.posts.clone(),
        }
    }
}
