//! Inbound endpoint for the M2M broker relay. The broker wraps each device
//! report in a oneM2M notification envelope; the scan payload itself sits in
//! `"m2m:sgn" > "m2m:nev" > "m2m:rep" > "m2m:cin" > "con"` as a JSON string.

use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::attendance::engine::{DeviceRejectReason, ScanOutcome};
use crate::attendance::gateway::LiveScanGateway;

/// Decoded content of one badge scan.
#[derive(Debug, PartialEq, Deserialize, ToSchema)]
pub struct ScanContent {
    #[schema(example = "04A1B2C3D4")]
    pub serial_id: String,
    #[schema(example = "GATE-01")]
    pub device_code: String,
    /// Device-local timestamp; the server clock is used when absent.
    #[serde(default)]
    #[schema(example = "2026-02-03T08:10:00", value_type = String, format = "date-time", nullable = true)]
    pub recorded_at: Option<NaiveDateTime>,
}

/// Dig the scan content out of the notification envelope.
fn extract_scan_content(envelope: &Value) -> Result<ScanContent, String> {
    let con = envelope
        .get("m2m:sgn")
        .and_then(|v| v.get("m2m:nev"))
        .and_then(|v| v.get("m2m:rep"))
        .and_then(|v| v.get("m2m:cin"))
        .and_then(|v| v.get("con"))
        .ok_or_else(|| "missing m2m:sgn.m2m:nev.m2m:rep.m2m:cin.con".to_owned())?;

    let raw = con
        .as_str()
        .ok_or_else(|| "con must be a JSON-encoded string".to_owned())?;

    serde_json::from_str::<ScanContent>(raw).map_err(|e| format!("invalid con payload: {}", e))
}

/// One deterministic acknowledgment per outcome; the relay has no retry
/// logic of its own, so nothing here may escape as an unhandled error.
pub fn scan_ack(outcome: ScanOutcome) -> HttpResponse {
    match outcome {
        ScanOutcome::CheckedIn { id, status } => HttpResponse::Created().json(json!({
            "message": "Checked in",
            "id": id,
            "status_check_in": status,
        })),
        ScanOutcome::CheckedOut { status, category } => HttpResponse::Ok().json(json!({
            "message": "Checked out",
            "status_check_out": status,
            "category": category,
        })),
        ScanOutcome::Rejected(reason) => HttpResponse::Conflict().json(json!({
            "error": reason.to_string(),
        })),
        ScanOutcome::EmployeeNotFound => HttpResponse::NotFound().json(json!({
            "error": "Employee not found",
        })),
        ScanOutcome::UnknownSerial { serial_id } => HttpResponse::Accepted().json(json!({
            "message": "Serial queued for review",
            "serial_id": serial_id,
        })),
        ScanOutcome::DeviceRejected(DeviceRejectReason::NotFound) => {
            HttpResponse::NotFound().json(json!({
                "error": "Device not registered",
            }))
        }
        ScanOutcome::DeviceRejected(DeviceRejectReason::Inactive) => {
            HttpResponse::Forbidden().json(json!({
                "error": "Device is inactive",
            }))
        }
    }
}

/// Liveness probe used by the broker subscription.
#[utoipa::path(
    get,
    path = "/monitor",
    responses(
        (status = 200, description = "Relay endpoint is up")
    ),
    tag = "Monitor"
)]
pub async fn get_monitor() -> impl Responder {
    HttpResponse::Ok().body("Monitor OK")
}

/// Scan notification relayed by the M2M broker
#[utoipa::path(
    post,
    path = "/monitor",
    request_body(
        content = Object,
        description = "oneM2M notification envelope",
        content_type = "application/json",
        example = json!({
            "m2m:sgn": { "m2m:nev": { "m2m:rep": { "m2m:cin": {
                "con": "{\"serial_id\":\"04A1B2C3D4\",\"device_code\":\"GATE-01\"}"
            } } } }
        })
    ),
    responses(
        (status = 201, description = "Checked in"),
        (status = 200, description = "Checked out"),
        (status = 202, description = "Unknown serial queued for review"),
        (status = 400, description = "Malformed envelope"),
        (status = 403, description = "Device is inactive"),
        (status = 404, description = "Device or employee not found"),
        (status = 409, description = "Scan rejected"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Monitor"
)]
pub async fn post_monitor(
    gateway: web::Data<LiveScanGateway>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let content = match extract_scan_content(&body) {
        Ok(content) => content,
        Err(reason) => {
            info!(%reason, "discarding malformed relay notification");
            return Ok(HttpResponse::BadRequest().json(json!({ "error": reason })));
        }
    };

    let outcome = gateway
        .handle_scan_event(&content.serial_id, content.recorded_at, &content.device_code)
        .await
        .map_err(|e| {
            error!(error = %e, serial_id = %content.serial_id, "scan event failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(scan_ack(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(con: &str) -> Value {
        json!({
            "m2m:sgn": { "m2m:nev": { "m2m:rep": { "m2m:cin": { "con": con } } } }
        })
    }

    #[test]
    fn extracts_scan_content_from_nested_envelope() {
        let body = envelope(r#"{"serial_id":"04A1B2C3D4","device_code":"GATE-01"}"#);

        let content = extract_scan_content(&body).unwrap();
        assert_eq!(content.serial_id, "04A1B2C3D4");
        assert_eq!(content.device_code, "GATE-01");
        assert!(content.recorded_at.is_none());
    }

    #[test]
    fn extracts_device_timestamp_when_present() {
        let body = envelope(
            r#"{"serial_id":"04A1B2C3D4","device_code":"GATE-01","recorded_at":"2026-02-03T08:10:00"}"#,
        );

        let content = extract_scan_content(&body).unwrap();
        let at = content.recorded_at.unwrap();
        assert_eq!(at.to_string(), "2026-02-03 08:10:00");
    }

    #[test]
    fn missing_notification_node_is_reported() {
        let body = json!({ "m2m:sgn": {} });

        let err = extract_scan_content(&body).unwrap_err();
        assert!(err.contains("m2m:nev"));
    }

    #[test]
    fn non_string_con_is_rejected() {
        let body = json!({
            "m2m:sgn": { "m2m:nev": { "m2m:rep": { "m2m:cin": { "con": { "serial_id": "X" } } } } }
        });

        let err = extract_scan_content(&body).unwrap_err();
        assert!(err.contains("JSON-encoded string"));
    }

    #[test]
    fn garbage_con_payload_is_rejected() {
        let body = envelope("not json at all");

        let err = extract_scan_content(&body).unwrap_err();
        assert!(err.contains("invalid con payload"));
    }
}
