use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use chrono::Local;
use tracing::{info, warn};

use crate::application::envelope::Envelope;
use crate::application::rules::{FieldRule, FIELD_RULES};
use crate::application::validation::validate_application;
use crate::errors::AppError;
use crate::state::AppState;

/// Raw form fields from either a urlencoded or a multipart body.
///
/// A body that cannot be read yields an empty map, which then fails validation
/// on every required field instead of surfacing a transport error.
#[derive(Debug, Default)]
pub struct SubmittedFields(pub HashMap<String, String>);

#[async_trait]
impl<S> FromRequest<S> for SubmittedFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        let fields = if is_multipart {
            match Multipart::from_request(req, state).await {
                Ok(multipart) => read_multipart(multipart).await,
                Err(rejection) => {
                    warn!("Unreadable multipart body: {rejection}");
                    HashMap::new()
                }
            }
        } else {
            match Form::<HashMap<String, String>>::from_request(req, state).await {
                Ok(Form(fields)) => fields,
                Err(rejection) => {
                    warn!("Unreadable form body: {rejection}");
                    HashMap::new()
                }
            }
        };

        Ok(SubmittedFields(fields))
    }
}

async fn read_multipart(mut multipart: Multipart) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                // File parts have no place on this form.
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                match field.text().await {
                    Ok(value) => {
                        fields.insert(name, value);
                    }
                    Err(e) => {
                        warn!("Dropping unreadable multipart field '{name}': {e}");
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Multipart body ended early: {e}");
                break;
            }
        }
    }
    fields
}

/// POST /api/v1/applications
#[tracing::instrument(
    name = "submit_application",
    skip_all,
    fields(request_id = %uuid::Uuid::new_v4())
)]
pub async fn handle_submit(
    State(state): State<AppState>,
    SubmittedFields(fields): SubmittedFields,
) -> Result<Json<Envelope>, AppError> {
    let today = Local::now().date_naive();
    let cleaned = validate_application(&fields, today).map_err(AppError::Validation)?;

    let id = state.store.insert(&cleaned).await?;
    info!(id, "Application accepted");

    Ok(Json(Envelope::accepted(id)))
}

/// Any method other than POST on the submission endpoint.
pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// GET /api/v1/applications/schema
pub async fn handle_schema() -> Json<&'static [FieldRule]> {
    Json(FIELD_RULES.as_slice())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::messages;
    use crate::application::store::memory::MemoryApplicationStore;
    use crate::application::store::ApplicationStore;
    use crate::routes::build_router;
    use crate::state::AppState;

    const ENDPOINT: &str = "/api/v1/applications";

    fn encode_form(pairs: &[(&str, &str)]) -> Vec<u8> {
        let request = reqwest::Client::new()
            .post("http://localhost/")
            .form(pairs)
            .build()
            .unwrap();
        request.body().unwrap().as_bytes().unwrap().to_vec()
    }

    fn valid_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("firstName", "Anna"),
            ("lastName", "<b>Kowalska</b>"),
            ("patronymic", ""),
            ("birthDate", "1990-05-12"),
            ("email", "anna@example.com"),
            ("phone", "+375 (29) 123-45-67"),
            ("maritalStatus", "Żonaty/Zamężna"),
            ("about", "  Rust & Go  "),
        ]
    }

    fn app() -> (Router, Arc<MemoryApplicationStore>) {
        let store = Arc::new(MemoryApplicationStore::default());
        let router = build_router(AppState {
            store: store.clone(),
        });
        (router, store)
    }

    fn post_form(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(ENDPOINT)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_submission_is_stored_sanitized() {
        let (router, store) = app();
        let (status, body) = send(router, post_form(encode_form(&valid_pairs()))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], messages::SUBMISSION_SAVED);
        let id = body["id"].as_i64().unwrap();
        assert!(id > 0);

        let row = store.find(id).await.unwrap().unwrap();
        assert_eq!(row.first_name, "Anna");
        assert_eq!(row.last_name, "&lt;b&gt;Kowalska&lt;/b&gt;");
        assert_eq!(row.patronymic, "");
        assert_eq!(row.birthdate.to_string(), "1990-05-12");
        assert_eq!(row.email, "anna@example.com");
        assert_eq!(row.phone, "+375291234567");
        assert_eq!(row.marital_status, "Żonaty/Zamężna");
        assert_eq!(row.about_request, "Rust &amp; Go");
    }

    #[tokio::test]
    async fn test_identical_submissions_get_distinct_ids() {
        let (router, _store) = app();
        let (_, first) = send(router.clone(), post_form(encode_form(&valid_pairs()))).await;
        let (_, second) = send(router, post_form(encode_form(&valid_pairs()))).await;
        assert_ne!(first["id"], second["id"]);
    }

    #[tokio::test]
    async fn test_invalid_submission_returns_422_with_all_messages() {
        let (router, store) = app();
        let mut pairs = valid_pairs();
        pairs[0] = ("firstName", "");
        pairs[5] = ("phone", "+37529123456");
        pairs[6] = ("maritalStatus", "Married");

        let (status, body) = send(router, post_form(encode_form(&pairs))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["type"], messages::VALIDATION_ERROR_TYPE);
        let list = body["message"].as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list[0].as_str().unwrap().contains("Имя"));
        assert!(list[1].as_str().unwrap().contains("+375"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_is_405_without_touching_store() {
        let (router, store) = app();
        let request = Request::builder()
            .method("GET")
            .uri(ENDPOINT)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], messages::METHOD_NOT_ALLOWED);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_legacy_path_accepts_submissions() {
        let (router, _store) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/php/form.php")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(&valid_pairs())))
            .unwrap();
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_multipart_submission() {
        let (router, store) = app();
        let boundary = "XyZboundary";
        let mut body = String::new();
        for (name, value) in valid_pairs() {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        let request = Request::builder()
            .method("POST")
            .uri(ENDPOINT)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let row = store.find(body["id"].as_i64().unwrap()).await.unwrap().unwrap();
        assert_eq!(row.phone, "+375291234567");
    }

    #[tokio::test]
    async fn test_unreadable_body_is_a_validation_failure() {
        let (router, _store) = app();
        let request = Request::builder()
            .method("POST")
            .uri(ENDPOINT)
            .header("content-type", "text/plain")
            .body(Body::from("firstName=Anna"))
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let store = Arc::new(MemoryApplicationStore::failing());
        let router = build_router(AppState {
            store: store.clone(),
        });
        let (status, body) = send(router, post_form(encode_form(&valid_pairs()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], messages::SERVER_ERROR);
        assert!(!body.to_string().contains("connection refused"));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_panic_below_handler_is_generic_500() {
        let store = Arc::new(MemoryApplicationStore::panicking());
        let router = build_router(AppState { store });
        let (status, body) = send(router, post_form(encode_form(&valid_pairs()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], messages::UNEXPECTED_ERROR);
        assert!(!body.to_string().contains("row buffer"));
    }

    #[tokio::test]
    async fn test_schema_endpoint() {
        let (router, _store) = app();
        let request = Request::builder()
            .uri("/api/v1/applications/schema")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        let fields = body.as_array().unwrap();
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[5]["name"], "phone");
        assert_eq!(fields[5]["required"], true);
    }
}
