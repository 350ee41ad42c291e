pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::extension::handlers as extension;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::store::handlers as store;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users and applications
        .route("/api/users", post(store::handle_save_user))
        .route(
            "/api/users/:id/resume",
            get(store::handle_get_user_resume).post(store::handle_save_user_resume),
        )
        .route(
            "/api/applications",
            get(store::handle_list_applications).post(store::handle_save_application),
        )
        .route("/api/applications/:id", patch(store::handle_update_status))
        // Job postings, scoring and tailoring
        .route("/api/jobs/extract", post(tailoring::handle_extract_job))
        .route("/api/jobs/structure", post(tailoring::handle_structure_job))
        .route("/api/ats/score", post(tailoring::handle_ats_score))
        .route("/api/ats/guidelines", get(tailoring::handle_ats_guidelines))
        .route("/api/tailor", post(tailoring::handle_tailor))
        // Resume intake and output
        .route("/api/resumes/parse", post(resume::handle_parse_upload))
        .route("/api/resumes/validate", post(resume::handle_validate))
        .route("/api/resumes/analyze", post(resume::handle_analyze))
        .route("/api/resumes/document", post(resume::handle_document))
        // Browser extension
        .route(
            "/api/extension/messages",
            post(extension::handle_extension_message),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::testing::ScriptedCompletion;
    use crate::llm_client::TextCompletion;
    use crate::state::testing::state_with;

    fn app() -> Router {
        build_router(state_with(Arc::new(ScriptedCompletion::default())))
    }

    fn app_with(llm: Arc<dyn TextCompletion>) -> Router {
        build_router(state_with(llm))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn resume_json() -> Value {
        json!({
            "contact": {"name": "Jane Doe", "email": "jane@example.com", "phone": "555-0100"},
            "summary": "Backend engineer",
            "skills": ["python", "react"],
            "experience": [{
                "title": "Engineer",
                "company": "Initech",
                "startDate": "2019",
                "isCurrentlyWorking": true,
                "description": ["Built APIs"]
            }],
            "education": [{
                "institution": "State University",
                "degree": "BSc",
                "field": "CS",
                "graduationDate": "2018"
            }]
        })
    }

    fn application_json(user_id: &str) -> Value {
        json!({
            "userId": user_id,
            "jobTitle": "Engineer",
            "company": "Acme",
            "jobDescription": {"title": "Engineer", "company": "Acme"},
            "originalResume": resume_json(),
            "tailoredResume": resume_json(),
            "atsScore": 74,
            "matchPercentage": 67
        })
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_user_resume_round_trip_and_missing_user() {
        let app = app();

        let request = Request::get("/api/users/user_x/resume").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(
            &app,
            json_request(Method::POST, "/api/users", json!({"_id": "user_x", "email": "x@y.z"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::get("/api/users/user_x/resume").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, _) = send(
            &app,
            json_request(Method::POST, "/api/users/user_x/resume", resume_json()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::get("/api/users/user_x/resume").body(Body::empty()).unwrap();
        let (_, body) = send(&app, request).await;
        assert_eq!(body["contact"]["name"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_application_lifecycle() {
        let app = app();

        let (status, saved) = send(
            &app,
            json_request(Method::POST, "/api/applications", application_json("user_1")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = saved["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("app_"));
        assert_eq!(saved["status"], "applied");

        let (status, updated) = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/api/applications/{id}"),
                json!({"status": "offer"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "offer");
        assert_eq!(updated["jobTitle"], saved["jobTitle"]);
        assert_eq!(updated["tailoredResume"], saved["tailoredResume"]);

        let request = Request::get("/api/applications?userId=user_1").body(Body::empty()).unwrap();
        let (status, list) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["status"], "offer");
    }

    #[tokio::test]
    async fn test_application_validation_errors() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/applications", application_json("  ")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let request = Request::get("/api/applications").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request(Method::PATCH, "/api/applications/app_1", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request(Method::PATCH, "/api/applications/app_missing", json!({"status": "rejected"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_required_body_fields_are_400() {
        let app = app();

        let mut application = application_json("user_1");
        application.as_object_mut().unwrap().remove("jobDescription");
        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/applications", application),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/tailor", json!({"userId": "user_1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let request = Request::post("/api/resumes/validate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_rejected() {
        let app = app();

        for (field, value) in [("atsScore", 101), ("matchPercentage", 250)] {
            let mut application = application_json("user_1");
            application[field] = json!(value);
            let (status, body) = send(
                &app,
                json_request(Method::POST, "/api/applications", application),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }

        let request = Request::get("/api/applications?userId=user_1").body(Body::empty()).unwrap();
        let (_, list) = send(&app, request).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_job_extract_is_local() {
        let body = json!({
            "text": "Requirements:\n- Strong Python skills\n- Docker in production\nAbout us",
            "company": "Globex"
        });
        let (status, job) = send(&app(), json_request(Method::POST, "/api/jobs/extract", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["title"], "Unknown");
        assert_eq!(job["company"], "Globex");
        assert_eq!(job["requirements"], json!(["Strong Python skills", "Docker in production"]));
    }

    #[tokio::test]
    async fn test_ats_score_scenario() {
        let mut resume = resume_json();
        resume["experience"] = json!([]);
        let body = json!({
            "resume": resume,
            "jobDescription": {"title": "Engineer", "company": "Acme", "skills": ["python", "react", "aws"]}
        });
        let (status, score) = send(&app(), json_request(Method::POST, "/api/ats/score", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(score["matchPercentage"], 67);
        assert_eq!(score["keywordMatches"], json!(["python", "react"]));
        assert_eq!(score["missingKeywords"], json!(["aws"]));
    }

    #[tokio::test]
    async fn test_guidelines() {
        let request = Request::get("/api/ats/guidelines").body(Body::empty()).unwrap();
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["guidelines"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_tailor_invalid_resume_is_400() {
        let mut resume = resume_json();
        resume["skills"] = json!([]);
        resume["contact"]["phone"] = json!("");
        let body = json!({"masterResume": resume, "jobText": "Engineer wanted"});
        let (status, body) = send(&app(), json_request(Method::POST, "/api/tailor", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("Missing phone"));
        assert!(message.contains("No skills listed"));
    }

    #[tokio::test]
    async fn test_tailor_outage_is_retryable_503() {
        let app = app_with(Arc::new(ScriptedCompletion::unavailable()));
        let body = json!({"masterResume": resume_json(), "jobText": "Engineer wanted"});
        let (status, body) = send(&app, json_request(Method::POST, "/api/tailor", body)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["retryable"], true);
    }

    #[tokio::test]
    async fn test_tailor_by_user_id_reports_fallbacks() {
        let app = app_with(Arc::new(ScriptedCompletion::replying(&["not json", "still not json"])));

        let (status, _) = send(
            &app,
            json_request(Method::POST, "/api/users/user_7/resume", resume_json()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let body = json!({"userId": "user_7", "jobText": "Python engineer"});
        let (status, outcome) = send(&app, json_request(Method::POST, "/api/tailor", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["jobDescription"]["title"], "Unknown Position");
        assert_eq!(outcome["jobDescription"]["description"], "Python engineer");
        assert_eq!(
            outcome["fallbacks"],
            json!(["extract_job_requirements", "tailor_resume"])
        );
    }

    #[tokio::test]
    async fn test_structure_job_placeholder_flag() {
        let app = app_with(Arc::new(ScriptedCompletion::replying(&["no json here"])));
        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/jobs/structure", json!({"text": "Posting"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["placeholder"], true);
        assert_eq!(body["jobDescription"]["company"], "Unknown Company");
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let (status, body) = send(
            &app(),
            json_request(Method::POST, "/api/resumes/validate", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], false);
        assert_eq!(body["errors"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_analyze_endpoint() {
        let app = app_with(Arc::new(ScriptedCompletion::replying(&["Solid backend profile."])));
        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/resumes/analyze", json!({"resume": resume_json()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"], "Solid backend profile.");
    }

    #[tokio::test]
    async fn test_document_download_headers() {
        let body = json!({"resume": resume_json(), "company": "Acme", "jobTitle": "Engineer"});
        let response = app()
            .oneshot(json_request(Method::POST, "/api/resumes/document", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"Resume_Acme_Engineer_"));
        assert!(disposition.ends_with(".docx\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_document_file_name_drops_header_breaking_characters() {
        let body = json!({
            "resume": resume_json(),
            "company": "Acme\r\nSet-Cookie: x=1",
            "jobTitle": "Eng \"Lead\""
        });
        let response = app()
            .oneshot(json_request(Method::POST, "/api/resumes/document", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"Resume_Acme__Set-Cookie__x_1_Eng__Lead__"));
        assert!(!response.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_parse_upload_plain_text() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Jane Doe\njane@example.com\nSkills: Rust, Go\n\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::post("/api/resumes/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume"]["contact"]["name"], "Jane Doe");
        assert_eq!(body["resume"]["skills"], json!(["Rust", "Go"]));
        assert_eq!(body["validation"]["isValid"], false);
    }

    #[tokio::test]
    async fn test_parse_upload_rejects_images() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             not really a png\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::post("/api/resumes/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, _) = send(&app(), request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_extension_channel_round_trip() {
        let app = app();
        let body = json!({
            "installId": "install-9",
            "message": {"type": "CHECK_JOB_SITE", "data": {"url": "https://www.dice.com/jobs"}}
        });
        let (status, body) = send(&app, json_request(Method::POST, "/api/extension/messages", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"type": "JOB_SITE_CHECKED", "data": {"isJobSite": true}}));

        let body = json!({"installId": "", "message": {"type": "GET_JOB_DATA"}});
        let (status, _) = send(&app, json_request(Method::POST, "/api/extension/messages", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
