use crate::{
    auth::auth::AuthUser,
    error::AppError,
    models::{ApiResponse, CheckInPayload},
    service::attendance::{AttendanceService, CheckInRequest, CheckOutRequest},
    utils::client_ip::client_ip,
};
use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use tracing::instrument;

/// Check-in endpoint
///
/// The first call of the day creates the record, later calls refresh its
/// activity and location until the user checks out.
#[utoipa::path(
    post,
    path = "/attendance/check-in",
    request_body = CheckInPayload,
    responses(
        (status = 201, description = "Check-in recorded", body = Object, example = json!({
            "code": 201,
            "msg": "Check-in recorded",
            "err": "",
            "data": {
                "id": 1,
                "user_id": 42,
                "work_date": "2026-01-05",
                "check_in_at": "2026-01-05T01:02:03Z",
                "check_in_lat": -6.2,
                "check_in_lng": 106.8,
                "check_in_photo_url": null,
                "check_in_ip": "10.0.0.7",
                "check_out_at": null,
                "check_out_ip": null,
                "total_minutes": 0,
                "status": "PRESENT",
                "activity": "field work",
                "created_at": "2026-01-05T01:02:03Z",
                "updated_at": "2026-01-05T01:02:03Z"
            }
        })),
        (status = 200, description = "Check-in updated"),
        (status = 400, description = "Activity missing or coordinates out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already checked out today"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(user_id = auth.user_id, username = %auth.username, role = %auth.role))]
pub async fn check_in(
    auth: AuthUser,
    req: HttpRequest,
    service: web::Data<AttendanceService>,
    payload: web::Json<CheckInPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();

    let (record, created) = service
        .check_in(CheckInRequest {
            user_id: auth.user_id,
            activity: payload.activity,
            lat: payload.lat,
            lng: payload.lng,
            photo_url: payload.photo_url,
            ip: client_ip(&req),
        })
        .await?;

    if created {
        Ok(ApiResponse::success(StatusCode::CREATED, "Check-in recorded", record))
    } else {
        Ok(ApiResponse::success(StatusCode::OK, "Check-in updated", record))
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/attendance/check-out",
    responses(
        (status = 200, description = "Check-out recorded", body = Object, example = json!({
            "code": 200,
            "msg": "Check-out recorded",
            "err": "",
            "data": {
                "id": 1,
                "user_id": 42,
                "work_date": "2026-01-05",
                "check_in_at": "2026-01-05T01:02:03Z",
                "check_out_at": "2026-01-05T10:05:00Z",
                "check_out_ip": "10.0.0.7",
                "total_minutes": 542,
                "status": "PRESENT",
                "activity": "field work"
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Not checked in today, or already checked out"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(user_id = auth.user_id, username = %auth.username, role = %auth.role))]
pub async fn check_out(
    auth: AuthUser,
    req: HttpRequest,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let record = service
        .check_out(CheckOutRequest {
            user_id: auth.user_id,
            ip: client_ip(&req),
        })
        .await?;

    Ok(ApiResponse::success(StatusCode::OK, "Check-out recorded", record))
}

/// Today's attendance
///
/// Answers with an empty `ABSENT` record (id 0) when nothing was stored yet.
#[utoipa::path(
    get,
    path = "/attendance/today",
    responses(
        (status = 200, description = "Today's attendance", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(user_id = auth.user_id, username = %auth.username, role = %auth.role))]
pub async fn today(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let record = service.get_today(auth.user_id).await?;

    Ok(ApiResponse::success(StatusCode::OK, "Today's attendance", record))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestState, peer};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn full_day_flow() {
        let state = TestState::new();
        let session = state.register("budi", "s3cretpass").await;
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .set_json(json!({ "activity": "field work", "lat": -6.2, "lng": 106.8 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let first: Value = test::read_body_json(resp).await;
        assert_eq!(first["data"]["status"], "PRESENT");
        assert_eq!(first["data"]["check_in_ip"], "127.0.0.1");
        assert_eq!(first["data"]["activity"], "field work");
        assert!(first["data"]["check_in_at"].is_string());
        assert!(first["data"]["check_out_at"].is_null());

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .set_json(json!({ "activity": "client visit" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let second: Value = test::read_body_json(resp).await;
        assert_eq!(second["data"]["id"], first["data"]["id"]);
        assert_eq!(second["data"]["check_in_at"], first["data"]["check_in_at"]);
        assert_eq!(second["data"]["activity"], "client visit");
        assert_eq!(second["data"]["check_in_lat"], -6.2);

        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let closed: Value = test::read_body_json(resp).await;
        assert!(closed["data"]["check_out_at"].is_string());
        assert_eq!(closed["data"]["total_minutes"], 0);

        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["err"], "already checked out today");

        let req = test::TestRequest::get()
            .uri("/attendance/today")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let today: Value = test::read_body_json(resp).await;
        assert_eq!(today["data"]["id"], first["data"]["id"]);
        assert_eq!(today["data"]["check_out_at"], closed["data"]["check_out_at"]);
    }

    #[actix_web::test]
    async fn check_out_without_check_in_conflicts() {
        let state = TestState::new();
        let session = state.register("budi", "s3cretpass").await;
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["err"], "not checked in today");
    }

    #[actix_web::test]
    async fn today_without_check_in_is_placeholder() {
        let state = TestState::new();
        let session = state.register("budi", "s3cretpass").await;
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/attendance/today")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["id"], 0);
        assert_eq!(body["data"]["user_id"], session.user_id);
        assert_eq!(body["data"]["status"], "ABSENT");
        assert!(body["data"]["check_in_at"].is_null());
    }

    #[actix_web::test]
    async fn blank_activity_is_rejected() {
        let state = TestState::new();
        let session = state.register("budi", "s3cretpass").await;
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .peer_addr(peer())
            .insert_header(bearer(&session.access_token))
            .set_json(json!({ "activity": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.attendance_store.len(), 0);
    }

    #[actix_web::test]
    async fn protected_routes_need_access_token() {
        let state = TestState::new();
        let session = state.register("budi", "s3cretpass").await;
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/attendance/today")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 401);
        assert_eq!(body["err"], "missing bearer token");

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .peer_addr(peer())
            .insert_header(bearer(&session.refresh_token))
            .set_json(json!({ "activity": "work" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/attendance/today")
            .peer_addr(peer())
            .insert_header(bearer("not.a.jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
