//! HTTP-level tests for the hosted-backend repositories.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use advisorly_core::{AdvisorRepository, BookingRepository, DirectoryRepository};
use advisorly_domain::{AdvisorlyError, BookingStatus, CredentialBundle, NewBooking};
use advisorly_infra::storage::{
    SupabaseAdvisorRepository, SupabaseBookingRepository, SupabaseClient, SupabaseClientConfig,
    SupabaseDirectoryRepository,
};

fn client(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(SupabaseClientConfig {
        base_url: server.uri(),
        service_key: "service-key".to_string(),
        timeout: Duration::from_secs(5),
        max_attempts: 1,
    })
    .expect("client builds")
}

fn advisor_row(id: Uuid, credentials: Option<String>) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Dana Reyes",
        "email": "dana.reyes@example.com",
        "specialty": "go-to-market",
        "is_available": true,
        "calendar_email": "dana@example.com",
        "calendar_credentials": credentials,
    })
}

#[tokio::test]
async fn advisor_credentials_decode_once_at_the_boundary() {
    let server = MockServer::start().await;
    let advisor_id = Uuid::new_v4();
    let bundle = CredentialBundle::from_token_fields(
        "ya29.stored".to_string(),
        Some("1//refresh".to_string()),
        "Bearer".to_string(),
        None,
        3600,
        Some("dana@example.com".to_string()),
    );
    let serialized = serde_json::to_string(&bundle).expect("serialize");

    Mock::given(method("GET"))
        .and(path("/rest/v1/advisors"))
        .and(query_param("id", format!("eq.{advisor_id}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([advisor_row(advisor_id, Some(serialized))])),
        )
        .mount(&server)
        .await;

    let repo = SupabaseAdvisorRepository::new(client(&server));
    let loaded = repo.get_credentials(advisor_id).await.expect("read").expect("connected");

    assert_eq!(loaded.access_token, "ya29.stored");
    assert_eq!(loaded.refresh_token.as_deref(), Some("1//refresh"));
}

#[tokio::test]
async fn malformed_credential_payload_reads_as_not_connected() {
    let server = MockServer::start().await;
    let advisor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/advisors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            advisor_row(advisor_id, Some("{not json".to_string()))
        ])))
        .mount(&server)
        .await;

    let repo = SupabaseAdvisorRepository::new(client(&server));

    assert!(repo.get_credentials(advisor_id).await.expect("read succeeds").is_none());
    let advisor = repo.get_advisor(advisor_id).await.expect("read").expect("row");
    assert!(advisor.credentials.is_none(), "advisor row still loads");
}

#[tokio::test]
async fn unsupported_schema_version_reads_as_not_connected() {
    let server = MockServer::start().await;
    let advisor_id = Uuid::new_v4();
    let legacy = json!({
        "schema_version": 0,
        "access_token": "ya29.legacy",
        "token_type": "Bearer",
        "expires_at": "2024-06-10T12:00:00Z",
        "updated_at": "2024-06-10T11:00:00Z",
    })
    .to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/advisors"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([advisor_row(advisor_id, Some(legacy))])),
        )
        .mount(&server)
        .await;

    let repo = SupabaseAdvisorRepository::new(client(&server));
    assert!(repo.get_credentials(advisor_id).await.expect("read").is_none());
}

#[tokio::test]
async fn save_credentials_patches_the_advisor_row() {
    let server = MockServer::start().await;
    let advisor_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/advisors"))
        .and(query_param("id", format!("eq.{advisor_id}")))
        .and(body_partial_json(json!({"calendar_email": "dana@example.com"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let bundle = CredentialBundle::from_token_fields(
        "ya29.new".to_string(),
        Some("1//refresh".to_string()),
        "Bearer".to_string(),
        None,
        3600,
        Some("dana@example.com".to_string()),
    );

    SupabaseAdvisorRepository::new(client(&server))
        .save_credentials(advisor_id, &bundle)
        .await
        .expect("patch succeeds");
}

fn new_booking() -> NewBooking {
    NewBooking {
        company_id: Uuid::new_v4(),
        advisor_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        start_time: Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).single().expect("start"),
        end_time: Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).single().expect("end"),
        calendar_event_id: Some("evt-1".to_string()),
        created_by: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn booking_rpc_returns_the_new_booking_id() {
    let server = MockServer::start().await;
    let booking_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/create_advisory_booking"))
        .and(body_partial_json(json!({"p_calendar_event_id": "evt-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(booking_id)))
        .expect(1)
        .mount(&server)
        .await;

    let created = SupabaseBookingRepository::new(client(&server))
        .create_booking(new_booking())
        .await
        .expect("rpc succeeds");

    assert_eq!(created, booking_id);
}

#[tokio::test]
async fn exclusion_violation_maps_to_slot_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/create_advisory_booking"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23P01",
            "message": "conflicting key value violates exclusion constraint \"bookings_no_overlap\""
        })))
        .mount(&server)
        .await;

    let result = SupabaseBookingRepository::new(client(&server)).create_booking(new_booking()).await;

    assert!(matches!(result, Err(AdvisorlyError::SlotConflict(_))), "got {result:?}");
}

#[tokio::test]
async fn active_bookings_query_uses_overlap_filters() {
    let server = MockServer::start().await;
    let advisor_id = Uuid::new_v4();
    let from = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).single().expect("from");
    let to = Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).single().expect("to");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("advisor_id", format!("eq.{advisor_id}")))
        .and(query_param("status", "neq.cancelled"))
        .and(query_param("start_time", format!("lt.{}", to.to_rfc3339())))
        .and(query_param("end_time", format!("gt.{}", from.to_rfc3339())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "company_id": Uuid::new_v4(),
            "advisor_id": advisor_id,
            "session_id": Uuid::new_v4(),
            "start_time": "2024-06-10T14:00:00+00:00",
            "end_time": "2024-06-10T15:00:00+00:00",
            "calendar_event_id": null,
            "status": "scheduled",
            "created_by": Uuid::new_v4(),
            "created_at": "2024-06-01T10:00:00+00:00",
            "updated_at": "2024-06-01T10:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let bookings = SupabaseBookingRepository::new(client(&server))
        .active_bookings_in_range(advisor_id, from, to)
        .await
        .expect("query succeeds");

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status, BookingStatus::Scheduled);
}

#[tokio::test]
async fn cancellation_patches_the_status_column() {
    let server = MockServer::start().await;
    let booking_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{booking_id}")))
        .and(body_partial_json(json!({"status": "cancelled"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    SupabaseBookingRepository::new(client(&server))
        .mark_cancelled(booking_id)
        .await
        .expect("patch succeeds");
}

#[tokio::test]
async fn directory_lookups_select_reference_columns() {
    let server = MockServer::start().await;
    let company_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/companies"))
        .and(query_param("select", "id,name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": company_id, "name": "Northwind Labs"}
        ])))
        .mount(&server)
        .await;

    let company = SupabaseDirectoryRepository::new(client(&server))
        .get_company(company_id)
        .await
        .expect("query succeeds")
        .expect("company found");

    assert_eq!(company.name, "Northwind Labs");
}
