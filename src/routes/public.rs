use crate::errors::ApiError;
use crate::helper::form_helpers;
use crate::helper::public_helpers::{self, PageRequest};
use crate::{AppState, DbPool};
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::http::header::{HeaderValue, CACHE_CONTROL};
use actix_web::{guard, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<String>,
    sort: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    // OPTIONS without CORS request headers gets past the CORS layer; answer it here.
    cfg.service(web::resource("/{any:.*}").guard(guard::Options()).to(options_handler));
    cfg.route("/", web::get().to(root_handler))
        .route("/blog", web::post().to(create_post))
        .route("/blog/{url_keyword}", web::get().to(get_post_by_url_keyword))
        .route("/blogs", web::get().to(list_posts))
        .route("/sitemap.xml", web::get().to(sitemap))
        .route("/uploads/{path:.*}", web::get().to(serve_upload));
}

async fn options_handler() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn root_handler() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

async fn create_post(
    pool: web::Data<DbPool>,
    app_state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = form_helpers::collect_multipart(payload).await.map_err(|e| {
        log::debug!("Rejected multipart submission: {}", e);
        ApiError::BadRequest("Failed to parse form data".to_string())
    })?;

    let created = public_helpers::create_post(&pool, &app_state.upload_dir, form).await?;
    Ok(HttpResponse::Created().json(created))
}

async fn get_post_by_url_keyword(
    url_keyword: web::Path<String>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let post = public_helpers::fetch_post_with_seo(&pool, &url_keyword)?;
    Ok(HttpResponse::Ok().json(post))
}

async fn list_posts(pool: web::Data<DbPool>, query: web::Query<ListQuery>) -> Result<HttpResponse, ApiError> {
    let request = PageRequest::from_raw(query.page.as_deref(), query.page_size.as_deref());
    let sort_by_priority = query.sort.as_deref() == Some("priority");

    let page = public_helpers::fetch_posts_page(&pool, request, sort_by_priority)?;
    Ok(HttpResponse::Ok().json(page))
}

async fn sitemap(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let xml = public_helpers::generate_sitemap(&pool)?;
    Ok(HttpResponse::Ok().content_type("application/xml").body(xml))
}

async fn serve_upload(
    req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let relative = path.into_inner();
    if relative.contains("..") {
        return Err(ApiError::BadRequest("Invalid path".to_string()));
    }

    let file_path = app_state.upload_dir.join(relative.trim_start_matches('/'));
    if !file_path.is_file() {
        return Err(ApiError::NotFound("File not found".to_string()));
    }
    let file = NamedFile::open_async(&file_path).await.map_err(ApiError::FileRead)?;

    let mut response = file.into_response(&req);
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=31536000"));
    Ok(response)
}
