use axum::extract::State;
use axum::{Json, Router, routing::post};
use sales_assistant_core::skill::{RequestEnvelope, ResponseEnvelope};

use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/skill", post(handle_turn))
}

/// One conversational turn.
///
/// Always answers 200 with a response envelope once the body parses; dialog
/// failures are spoken as an apology.
#[utoipa::path(
    post,
    path = "/skill",
    request_body = RequestEnvelope,
    responses(
        (status = 200, description = "Spoken response for the turn", body = ResponseEnvelope),
        (status = 400, description = "Body is not a request envelope", body = sales_assistant_core::error::ApiError)
    ),
    tag = "skill"
)]
pub async fn handle_turn(
    State(state): State<AppState>,
    AppJson(envelope): AppJson<RequestEnvelope>,
) -> Json<ResponseEnvelope> {
    tracing::debug!(request = ?envelope, "skill request");
    let response = state.dialog.handle(envelope).await;
    tracing::debug!(response = ?response, "skill response");
    Json(response)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::{DialogSettings, SchemaName};
    use crate::dialog::Dialog;
    use crate::identity::SalesforceIdentity;
    use crate::session::SessionStore;
    use crate::store::postgres::PgOpportunityStore;

    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        let login_url = Url::parse("http://127.0.0.1:9").expect("url");
        let dialog = Dialog::new(
            PgOpportunityStore::new(pool.clone(), SchemaName::parse("salesforce").expect("schema")),
            SalesforceIdentity::new(&login_url).expect("identity"),
            SessionStore::new(Duration::from_secs(60)),
            DialogSettings::default(),
        );
        router().with_state(AppState {
            db: pool,
            dialog: Arc::new(dialog),
        })
    }

    async fn post(body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/skill")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = app().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let (status, body) = post("{\"version\": \"1.0\"").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn envelope_without_request_names_the_field() {
        let (status, body) = post("{\"version\": \"1.0\"}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "request");
    }

    #[tokio::test]
    async fn unlinked_user_gets_link_account_card() {
        let envelope = json!({
            "version": "1.0",
            "session": { "new": true, "sessionId": "s-1", "user": { "userId": "u-1" } },
            "request": { "type": "LaunchRequest", "requestId": "r-1" }
        });
        let (status, body) = post(&envelope.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], "1.0");
        assert_eq!(body["response"]["card"]["type"], "LinkAccount");
        assert_eq!(body["response"]["shouldEndSession"], true);
    }

    #[tokio::test]
    async fn session_end_is_acknowledged_with_empty_response() {
        let envelope = json!({
            "version": "1.0",
            "session": { "sessionId": "s-1" },
            "request": { "type": "SessionEndedRequest", "reason": "EXCEEDED_MAX_REPROMPTS" }
        });
        let (status, body) = post(&envelope.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "version": "1.0", "response": {} }));
    }
}
