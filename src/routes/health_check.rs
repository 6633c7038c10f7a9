use actix_web::HttpResponse;

/// Liveness only: neither Postgres nor the relay is touched.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "service": "lead-capture"
    }))
}
