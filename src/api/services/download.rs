use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, trace};

use crate::api::render;
use crate::api::state::AppState;
use crate::errors::HeadcountError;

/// A cached file name must be a single plain path component.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.starts_with('.')
}

/// `GET /download/{filename}`
pub async fn handle_download(
    req: HttpRequest,
    filename: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let filename = filename.into_inner();
    let base_url = state.base_url(&req);
    trace!("Download requested: {}", filename);

    if !is_safe_file_name(&filename) {
        debug!("Rejected download name {:?}", filename);
        return render::error_response(&HeadcountError::not_found(filename), &base_url);
    }

    let path = state.cache_dir.join(&filename);
    match web::block(move || std::fs::read(path)).await {
        Ok(Ok(bytes)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .body(bytes),
        Ok(Err(e)) => {
            debug!("Cached file {} unavailable: {}", filename, e);
            render::error_response(&HeadcountError::not_found(filename), &base_url)
        }
        Err(e) => render::error_response(&HeadcountError::file_operation(e.to_string()), &base_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_names() {
        assert!(is_safe_file_name("phys-20263-1700000000.csv"));
        assert!(!is_safe_file_name("search-a..b-5.csv"));
        assert!(!is_safe_file_name("../secret.csv"));
        assert!(!is_safe_file_name("a/b.csv"));
        assert!(!is_safe_file_name("a\\b.csv"));
        assert!(!is_safe_file_name(".hidden"));
        assert!(!is_safe_file_name(""));
    }
}
