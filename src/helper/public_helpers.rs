use crate::errors::ApiError;
use crate::helper::form_helpers::SubmittedForm;
use crate::helper::upload_helpers::{self, StoredImage};
use crate::helper::validation_helpers;
use crate::models::db_operations::posts_db_operations;
use crate::models::{CreatedPost, PaginatedPosts, Post, PostWithSeo, SeoData, Sitemap, SitemapUrl};
use crate::DbPool;
use std::path::Path;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const SITEMAP_CHANGEFREQ: &str = "weekly";
const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Page/size pair after defaults have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Missing, unparsable or non-positive values fall back to the defaults.
    pub fn from_raw(page: Option<&str>, page_size: Option<&str>) -> Self {
        fn positive(raw: Option<&str>) -> Option<u64> {
            raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n >= 1)
        }
        PageRequest {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            page_size: positive(page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total_posts: u64) -> u64 {
        total_posts.div_ceil(self.page_size)
    }
}

pub fn canonical_url(url_keyword: &str) -> String {
    format!("/blog/{}", url_keyword)
}

pub fn build_seo_data(post: &Post) -> SeoData {
    SeoData {
        context: "https://schema.org",
        schema_type: "BlogPosting",
        headline: post.title.clone(),
        keywords: post.focus_keyword.clone(),
        image: post.image.clone(),
        url: canonical_url(&post.url_keyword),
    }
}

pub fn build_sitemap(entries: Vec<(String, String)>) -> Sitemap {
    Sitemap {
        xmlns: SITEMAP_NAMESPACE,
        urls: entries
            .into_iter()
            .map(|(url_keyword, priority)| SitemapUrl {
                loc: canonical_url(&url_keyword),
                changefreq: SITEMAP_CHANGEFREQ,
                priority,
            })
            .collect(),
    }
}

pub fn render_sitemap_xml(sitemap: &Sitemap) -> Result<String, quick_xml::DeError> {
    let body = quick_xml::se::to_string(sitemap)?;
    Ok(format!("{}{}", XML_DECLARATION, body))
}

/// Validates, stores the optional image and inserts the post. The stored image
/// is removed again if the insert fails.
pub async fn create_post(
    pool: &DbPool,
    upload_dir: &Path,
    form: SubmittedForm,
) -> Result<CreatedPost, ApiError> {
    let mut conn = pool.get()?;
    let new_post = validation_helpers::validate_post(&conn, &form)?;

    let stored: Option<StoredImage> = upload_helpers::save_image(upload_dir, form.image).await?;
    let image_path = stored.as_ref().map(|s| s.relative_path.clone());

    let id = match posts_db_operations::insert_post(&mut conn, &new_post, image_path.as_deref()) {
        Ok(id) => id,
        Err(e) => {
            if let Some(image) = stored {
                upload_helpers::remove_stored_image(image).await;
            }
            return Err(e.into());
        }
    };

    log::info!("Created blog post {} ('{}')", id, new_post.url_keyword);
    Ok(CreatedPost {
        message: "Blog post created successfully",
        url: canonical_url(&new_post.url_keyword),
        id,
        image: image_path,
        tags: new_post.tags,
    })
}

pub fn fetch_post_with_seo(pool: &DbPool, url_keyword: &str) -> Result<PostWithSeo, ApiError> {
    let conn = pool.get()?;
    let post = posts_db_operations::read_post_by_url_keyword(&conn, url_keyword)?;
    let seo_data = build_seo_data(&post);
    let canonical = canonical_url(&post.url_keyword);
    Ok(PostWithSeo { blog: post, seo_data, canonical })
}

pub fn fetch_posts_page(
    pool: &DbPool,
    request: PageRequest,
    sort_by_priority: bool,
) -> Result<PaginatedPosts, ApiError> {
    let conn = pool.get()?;
    let total_posts = posts_db_operations::count_posts(&conn)?;
    let posts = posts_db_operations::read_posts_paginated(
        &conn,
        request.page_size,
        request.offset(),
        sort_by_priority,
    )?;

    Ok(PaginatedPosts {
        posts,
        total_posts,
        page: request.page,
        page_size: request.page_size,
        total_pages: request.total_pages(total_posts),
    })
}

pub fn generate_sitemap(pool: &DbPool) -> Result<String, ApiError> {
    let conn = pool.get()?;
    let entries = posts_db_operations::read_sitemap_entries(&conn)?;
    Ok(render_sitemap_xml(&build_sitemap(entries))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn page_request_applies_defaults_and_floors() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest { page: 1, page_size: 10 });
        assert_eq!(
            PageRequest::from_raw(Some("0"), Some("-5")),
            PageRequest { page: 1, page_size: 10 }
        );
        assert_eq!(
            PageRequest::from_raw(Some("abc"), Some("3")),
            PageRequest { page: 1, page_size: 3 }
        );
        assert_eq!(PageRequest::from_raw(Some("4"), Some("25")).offset(), 75);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest { page: 1, page_size: 10 };
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
        let req = PageRequest { page: 1, page_size: 3 };
        assert_eq!(req.total_pages(7), 3);
    }

    #[test]
    fn seo_data_uses_title_and_focus_keyword() {
        let now = Utc::now();
        let post = Post {
            id: 1,
            title: "Hello".to_string(),
            meta_description: None,
            focus_keyword: Some("greeting".to_string()),
            url_keyword: "hello-world".to_string(),
            image: Some("uploads/a.png".to_string()),
            tags: vec![],
            topic: None,
            service: None,
            industry: None,
            priority: "normal".to_string(),
            description: "World".to_string(),
            created_at: now,
            updated_at: now,
        };

        let seo = build_seo_data(&post);
        assert_eq!(seo.headline, "Hello");
        assert_eq!(seo.keywords.as_deref(), Some("greeting"));
        assert_eq!(seo.url, "/blog/hello-world");

        let json = serde_json::to_value(&seo).unwrap();
        assert_eq!(json["@context"], "https://schema.org");
        assert_eq!(json["@type"], "BlogPosting");
    }

    #[test]
    fn sitemap_lists_one_url_per_entry() {
        let sitemap = build_sitemap(vec![
            ("alpha".to_string(), "maximum".to_string()),
            ("beta".to_string(), "normal".to_string()),
        ]);
        assert_eq!(sitemap.urls.len(), 2);
        assert_eq!(sitemap.urls[0].loc, "/blog/alpha");

        let xml = render_sitemap_xml(&sitemap).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains(
            "<url><loc>/blog/alpha</loc><changefreq>weekly</changefreq><priority>maximum</priority></url>"
        ));
        assert_eq!(xml.matches("<url>").count(), 2);
    }
}
