use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Editorial weight of a post. Only used for ordering, never shown as a number.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Maximum,
    High,
    #[default]
    Normal,
}

impl Priority {
    /// Rank used by the priority sort; values found in storage outside the
    /// enum rank after all of these.
    pub const UNKNOWN_RANK: u8 = 4;

    pub fn rank(self) -> u8 {
        match self {
            Priority::Maximum => 1,
            Priority::High => 2,
            Priority::Normal => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Maximum => "maximum",
            Priority::High => "high",
            Priority::Normal => "normal",
        }
    }

    /// Rank for a raw stored value, tolerating unknown strings.
    pub fn rank_of(raw: &str) -> u8 {
        raw.parse::<Priority>().map(Priority::rank).unwrap_or(Self::UNKNOWN_RANK)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl fmt::Display for UnknownPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority '{}'", self.0)
    }
}

impl std::error::Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maximum" => Ok(Priority::Maximum),
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            other => Err(UnknownPriority(other.to_string())),
        }
    }
}

/// A validated submission, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub url_keyword: String,
    pub meta_description: Option<String>,
    pub focus_keyword: Option<String>,
    pub topic: Option<String>,
    pub service: Option<String>,
    pub industry: Option<String>,
    pub priority: Priority,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub meta_description: Option<String>,
    pub focus_keyword: Option<String>,
    pub url_keyword: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub topic: Option<String>,
    pub service: Option<String>,
    pub industry: Option<String>,
    /// Stored value as-is; rows written by older clients may carry values
    /// outside `Priority`.
    pub priority: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JSON-LD block returned alongside a single post.
#[derive(Debug, Serialize, PartialEq)]
pub struct SeoData {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub schema_type: &'static str,
    pub headline: String,
    pub keywords: Option<String>,
    pub image: Option<String>,
    pub url: String,
}

#[derive(Serialize)]
pub struct PostWithSeo {
    pub blog: Post,
    #[serde(rename = "seoData")]
    pub seo_data: SeoData,
    pub canonical: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPosts {
    pub posts: Vec<Post>,
    pub total_posts: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(Serialize)]
pub struct CreatedPost {
    pub message: &'static str,
    pub url: String,
    pub id: i64,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SitemapUrl {
    pub loc: String,
    pub changefreq: &'static str,
    pub priority: String,
}

#[derive(Debug, Serialize)]
#[serde(rename = "urlset")]
pub struct Sitemap {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    #[serde(rename = "url")]
    pub urls: Vec<SitemapUrl>,
}

pub mod db_operations;
