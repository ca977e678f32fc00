//! Web service tests
//!
//! Every route runs against a small published table in a temp dir.

use std::path::Path;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::web;
use chrono::Utc;
use tempfile::TempDir;

use headcounts::api::data::CourseData;
use headcounts::api::state::AppState;
use headcounts::runtime::modes::build_app;
use headcounts::scrape::Urls;

// =============================================================================
// Test Setup
// =============================================================================

const HEADER: &str = "Term,Fiscal yrtr,ID #,Subj,#,Sec,Title,Credits,Enrolled,Size,Status,Dates,Days,Time,Instructor,Delivery Method,Loc,LASC/WI,18online,Course level,College,Tuition unit,Tuition Resident,Tuition Non-Resident,Approximate Course Fees,Book Cost,Last Updated\n";

const ROWS: &[&str] = &[
    "Fall 2025,20263,001234,PHYS,160,01,Physics I,4,38,40,Open,,,,Craig,On Campus,Hagen 101,3L,False,Undergraduate,CSHE,credit,283.13,283.13,0.0,0.0,2025-09-01T04:13:20Z\n",
    "Fall 2025,20263,001240,ENGL,101,01,Composition,3,25,25,Closed,,,,Smith,Online,,\"1A,WI\",True,Undergraduate,COAH,credit,283.13,283.13,0.0,0.0,2025-09-01T04:13:20Z\n",
    "Spring 2025,20255,000999,PHYS,160,01,Physics I,4,30,40,Open,,,,Craig,On Campus,Hagen 101,3L,False,Undergraduate,CSHE,credit,270.00,270.00,0.0,0.0,2025-02-01T04:13:20Z\n",
];

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let body: String = std::iter::once(HEADER).chain(ROWS.iter().copied()).collect();
        std::fs::write(dir.path().join("published.csv"), body).expect("write published table");
        std::fs::create_dir_all(dir.path().join("cache")).expect("create cache dir");
        Self { dir }
    }

    fn empty() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("cache")).expect("create cache dir");
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn state(&self) -> web::Data<AppState> {
        self.state_with_base_url(Some("http://localhost:8080/"))
    }

    fn state_with_base_url(&self, base_url: Option<&str>) -> web::Data<AppState> {
        web::Data::new(AppState {
            data: CourseData::open(self.dir.path().join("published.csv")),
            cache_dir: self.dir.path().join("cache"),
            urls: Urls::new("https://eservices.example.edu/registration/search/", 72, 250),
            base_url: base_url.map(str::to_string),
            started: Utc::now(),
        })
    }
}

macro_rules! app {
    ($env:expr) => {
        test::init_service(build_app($env.state())).await
    };
}

macro_rules! get_body {
    ($app:expr, $uri:expr) => {{
        let resp = test::call_service(&$app, TestRequest::get().uri($uri).to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }};
}

// =============================================================================
// Pages
// =============================================================================

#[actix_rt::test]
async fn test_index_page() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Course enrollment headcounts"));
    assert!(body.contains("http://localhost:8080/"));
}

#[actix_rt::test]
async fn test_host_header_is_escaped_in_links() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state_with_base_url(None))).await;

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/")
            .insert_header(("host", "x\"><script>"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(!body.contains("x\"><script>"));
    assert!(body.contains("x&quot;&gt;&lt;script&gt;/"));
}

#[actix_rt::test]
async fn test_favicon_is_empty_ok() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/favicon.ico");
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

// =============================================================================
// Reports
// =============================================================================

#[actix_rt::test]
async fn test_subject_report_shows_newest_term() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/phys");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("001234"));
    assert!(!body.contains("000999"));
}

#[actix_rt::test]
async fn test_trailing_slash_is_trimmed() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/phys/");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("001234"));
    assert!(!body.contains("000999"));
}

#[actix_rt::test]
async fn test_subject_report_with_term() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/phys/20255");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("000999"));
    assert!(!body.contains("001234"));
}

#[actix_rt::test]
async fn test_report_writes_download_and_serves_it() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, _) = get_body!(app, "/all");
    assert_eq!(status, StatusCode::OK);

    let cached: Vec<String> = std::fs::read_dir(env.root().join("cache"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(cached.len(), 1);
    assert!(cached[0].ends_with(".csv"));

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/download/{}", cached[0]))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body);
    assert_eq!(text.lines().count(), 1 + ROWS.len());
}

#[actix_rt::test]
async fn test_wi_report_matches_within_list() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/wi");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("001240"));
    assert!(!body.contains("001234"));
}

#[actix_rt::test]
async fn test_lasc_area_report() {
    let env = TestEnv::new();
    let app = app!(env);

    let (_, body) = get_body!(app, "/lasc/3");
    assert!(body.contains("001234"));
    assert!(!body.contains("001240"));

    let (_, body) = get_body!(app, "/lasc/1");
    assert!(body.contains("001240"));
    assert!(!body.contains("001234"));
}

#[actix_rt::test]
async fn test_no_results() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/chem");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No courses match this selection."));
}

#[actix_rt::test]
async fn test_missing_table_renders_empty_report() {
    let env = TestEnv::empty();
    let app = app!(env);

    let (status, body) = get_body!(app, "/phys");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No courses match this selection."));
}

// =============================================================================
// Search
// =============================================================================

#[actix_rt::test]
async fn test_search_form_without_filters() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/search");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form"));
    assert!(body.contains("PHYS"));
    assert!(!body.contains("alert-warning"));
}

#[actix_rt::test]
async fn test_search_with_filters() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/search?subject=PHYS&semester=Spring&year=2025");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("000999"));
    assert!(!body.contains("001234"));
}

#[actix_rt::test]
async fn test_search_rejects_terms_before_first_term() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/search?semester=Spring&year=2014");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Spring 2014 data is not available. Data starts from Fall 2014."));
}

#[actix_rt::test]
async fn test_search_rejects_out_of_range_year() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, body) = get_body!(app, "/search?semester=Fall&year=999999999");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("999999999 is not a valid year."));
    assert!(!body.contains("001234"));
}

#[actix_rt::test]
async fn test_search_class_code_needs_subject() {
    let env = TestEnv::new();
    let app = app!(env);

    let (_, body) = get_body!(app, "/search?class_code=160");
    assert!(body.contains("Select a subject when using class codes"));
}

// =============================================================================
// Downloads and health
// =============================================================================

#[actix_rt::test]
async fn test_download_missing_file_is_404() {
    let env = TestEnv::new();
    let app = app!(env);

    let (status, _) = get_body!(app, "/download/nothing-here.csv");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_download_rejects_traversal() {
    let env = TestEnv::new();
    std::fs::write(env.root().join("secret.csv"), "x").unwrap();
    let app = app!(env);

    let (status, _) = get_body!(app, "/download/..%2Fsecret.csv");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_health_reports_rows() {
    let env = TestEnv::new();
    let app = app!(env);

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["data"]["rows"], ROWS.len());
    assert_eq!(json["data"]["newest_term"], "Fall 2025");
}

#[actix_rt::test]
async fn test_health_degraded_without_data() {
    let env = TestEnv::empty();
    let app = app!(env);

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["data"]["rows"], 0);
}
