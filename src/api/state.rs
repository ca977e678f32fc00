use std::path::PathBuf;

use actix_web::HttpRequest;
use chrono::{DateTime, Utc};

use super::data::CourseData;
use super::render::escape_html;
use crate::config::StaticConfig;
use crate::scrape::Urls;

/// Everything the handlers share, registered once as `web::Data`.
pub struct AppState {
    pub data: CourseData,
    pub cache_dir: PathBuf,
    /// Used for the per-course links back to the search site
    pub urls: Urls,
    /// Public URL root; derived from each request when unset
    pub base_url: Option<String>,
    pub started: DateTime<Utc>,
}

impl AppState {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            data: CourseData::open(&config.data.published_file),
            cache_dir: PathBuf::from(&config.data.cache_dir),
            urls: Urls::from_config(&config.scraper),
            base_url: config.server.base_url.clone(),
            started: Utc::now(),
        }
    }

    /// Root URL ending in `/`, escaped for use inside page markup. The Host
    /// header is client controlled.
    pub fn base_url(&self, req: &HttpRequest) -> String {
        let base = match &self.base_url {
            Some(url) => url.clone(),
            None => {
                let info = req.connection_info();
                format!("{}://{}/", info.scheme(), info.host())
            }
        };
        if base.ends_with('/') {
            escape_html(&base)
        } else {
            escape_html(&format!("{}/", base))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn state(base_url: Option<&str>) -> AppState {
        AppState {
            data: CourseData::open("/nonexistent/published.csv"),
            cache_dir: PathBuf::from("/nonexistent"),
            urls: Urls::new("https://eservices.example.edu/registration/search/", 72, 250),
            base_url: base_url.map(str::to_string),
            started: Utc::now(),
        }
    }

    #[test]
    fn test_configured_base_url_gets_trailing_slash() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(
            state(Some("https://courses.example.edu")).base_url(&req),
            "https://courses.example.edu/"
        );
    }

    #[test]
    fn test_host_header_is_escaped() {
        let req = TestRequest::default()
            .insert_header(("host", "x\"><script>"))
            .to_http_request();
        let url = state(None).base_url(&req);
        assert!(!url.contains('<'));
        assert!(!url.contains('"'));
        assert!(url.ends_with("x&quot;&gt;&lt;script&gt;/"));
    }
}
