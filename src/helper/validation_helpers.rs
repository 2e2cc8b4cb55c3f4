use crate::errors::ApiError;
use crate::helper::form_helpers::SubmittedForm;
use crate::models::db_operations::posts_db_operations;
use crate::models::{NewPost, Priority};
use rusqlite::Connection;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_META_DESCRIPTION_CHARS: usize = 160;
pub const MAX_TAG_CHARS: usize = 50;

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn is_valid_url_keyword(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Splits every submitted `tags` value on commas and flattens them in order.
pub fn collect_tags(raw_fields: &[String]) -> Result<Vec<String>, String> {
    let mut tags = Vec::new();
    for field in raw_fields {
        for tag in field.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if tag.chars().count() > MAX_TAG_CHARS {
                return Err(format!("tag length cannot exceed {} characters: {}", MAX_TAG_CHARS, tag));
            }
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

/// Checks every rule that needs no database access, in the order the API
/// reports them, and returns the first violation.
pub fn validate_fields(form: &SubmittedForm) -> Result<NewPost, String> {
    let title = form.first("title");
    if title.is_empty() {
        return Err("title is required".to_string());
    }

    let description = form.first("description");
    if description.is_empty() {
        return Err("description is required".to_string());
    }

    let url_keyword = form.first("url_keyword");
    if url_keyword.is_empty() {
        return Err("url_keyword is required".to_string());
    }
    if !is_valid_url_keyword(url_keyword) {
        return Err("url_keyword must contain only letters, numbers, and hyphens".to_string());
    }

    let priority = match form.first("priority") {
        "" => Priority::default(),
        raw => raw
            .parse::<Priority>()
            .map_err(|_| "invalid priority value: must be maximum, high, or normal".to_string())?,
    };

    let tags = collect_tags(form.all("tags"))?;

    let meta_description = form.first("meta_description");
    if meta_description.chars().count() > MAX_META_DESCRIPTION_CHARS {
        return Err(format!("meta description cannot exceed {} characters", MAX_META_DESCRIPTION_CHARS));
    }

    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(format!("title cannot exceed {} characters", MAX_TITLE_CHARS));
    }

    Ok(NewPost {
        title: title.to_string(),
        description: description.to_string(),
        url_keyword: url_keyword.to_string(),
        meta_description: optional(meta_description),
        focus_keyword: optional(form.first("focus_keyword")),
        topic: optional(form.first("topic")),
        service: optional(form.first("service")),
        industry: optional(form.first("industry")),
        priority,
        tags,
    })
}

/// Full validation: field rules first, then the slug uniqueness lookup.
pub fn validate_post(conn: &Connection, form: &SubmittedForm) -> Result<NewPost, ApiError> {
    let post = validate_fields(form).map_err(ApiError::BadRequest)?;

    if posts_db_operations::url_keyword_exists(conn, &post.url_keyword)? {
        return Err(ApiError::BadRequest("url_keyword already exists".to_string()));
    }
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::db_operations::posts_db_operations::insert_post;
    use crate::setup::db_setup;

    fn form(pairs: &[(&str, &str)]) -> SubmittedForm {
        let mut form = SubmittedForm::default();
        for (name, value) in pairs {
            form.push(name, *value);
        }
        form
    }

    fn valid_form() -> SubmittedForm {
        form(&[("title", "Hello"), ("description", "World"), ("url_keyword", "hello-world")])
    }

    #[test]
    fn minimal_submission_gets_defaults() {
        let post = validate_fields(&valid_form()).unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.priority, Priority::Normal);
        assert!(post.tags.is_empty());
        assert_eq!(post.meta_description, None);
        assert_eq!(post.topic, None);
    }

    #[test]
    fn required_fields_are_checked_in_order() {
        assert_eq!(validate_fields(&form(&[])).unwrap_err(), "title is required");
        assert_eq!(
            validate_fields(&form(&[("title", "T")])).unwrap_err(),
            "description is required"
        );
        assert_eq!(
            validate_fields(&form(&[("title", "T"), ("description", "D")])).unwrap_err(),
            "url_keyword is required"
        );
        assert_eq!(
            validate_fields(&form(&[("title", "   "), ("description", "D")])).unwrap_err(),
            "title is required"
        );
    }

    #[test]
    fn url_keyword_rejects_characters_outside_the_slug_alphabet() {
        for bad in ["hello world", "hello_world", "../etc", "héllo", "a/b"] {
            let err = validate_fields(&form(&[("title", "T"), ("description", "D"), ("url_keyword", bad)]))
                .unwrap_err();
            assert_eq!(err, "url_keyword must contain only letters, numbers, and hyphens", "{}", bad);
        }
    }

    #[test]
    fn priority_must_be_known() {
        let mut f = valid_form();
        f.push("priority", "urgent");
        assert_eq!(
            validate_fields(&f).unwrap_err(),
            "invalid priority value: must be maximum, high, or normal"
        );

        let mut f = valid_form();
        f.push("priority", " high ");
        assert_eq!(validate_fields(&f).unwrap().priority, Priority::High);
    }

    #[test]
    fn tags_are_split_and_flattened() {
        let mut f = valid_form();
        f.push("tags", "a, b");
        f.push("tags", "c");
        f.push("tags", " , ");
        assert_eq!(validate_fields(&f).unwrap().tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn long_tag_is_reported_before_long_title() {
        let long_tag = "t".repeat(51);
        let long_title = "x".repeat(101);
        let f = form(&[
            ("title", long_title.as_str()),
            ("description", "D"),
            ("url_keyword", "slug"),
            ("tags", long_tag.as_str()),
        ]);
        assert_eq!(
            validate_fields(&f).unwrap_err(),
            format!("tag length cannot exceed 50 characters: {}", long_tag)
        );
    }

    #[test]
    fn meta_description_is_checked_before_title_length() {
        let long_meta = "m".repeat(161);
        let long_title = "x".repeat(101);
        let f = form(&[
            ("title", long_title.as_str()),
            ("description", "D"),
            ("url_keyword", "slug"),
            ("meta_description", long_meta.as_str()),
        ]);
        assert_eq!(validate_fields(&f).unwrap_err(), "meta description cannot exceed 160 characters");

        let f = form(&[("title", long_title.as_str()), ("description", "D"), ("url_keyword", "slug")]);
        assert_eq!(validate_fields(&f).unwrap_err(), "title cannot exceed 100 characters");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let title = "é".repeat(100);
        let f = form(&[("title", title.as_str()), ("description", "D"), ("url_keyword", "slug")]);
        assert!(validate_fields(&f).is_ok());
    }

    #[test]
    fn duplicate_url_keyword_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::setup_posts_db(&mut conn).unwrap();

        let post = validate_post(&conn, &valid_form()).unwrap();
        insert_post(&mut conn, &post, None).unwrap();

        match validate_post(&conn, &valid_form()) {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "url_keyword already exists"),
            other => panic!("expected uniqueness rejection, got {:?}", other),
        }
    }
}
