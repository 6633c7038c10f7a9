use crate::helpers::{spawn_app, valid_lead};

const LANDING_PAGE: &str = "https://dnfocupacional.com.br";

#[tokio::test]
async fn preflight_requests_are_allowed_on_every_form_endpoint() {
    // Arrange
    let app = spawn_app().await;

    for path in ["/api/lead", "/api/proposta"] {
        // Act
        let response = app.preflight(path, LANDING_PAGE).await;

        // Assert
        assert!(
            response.status().is_success(),
            "The preflight for {} was refused with {}.",
            path,
            response.status()
        );
        let allowed_origin = response
            .headers()
            .get("access-control-allow-origin")
            .unwrap_or_else(|| panic!("No Access-Control-Allow-Origin on {}.", path));
        assert_eq!(allowed_origin, LANDING_PAGE);
        let allowed_methods = response
            .headers()
            .get("access-control-allow-methods")
            .expect("No Access-Control-Allow-Methods.")
            .to_str()
            .unwrap();
        assert!(allowed_methods.contains("POST"));
    }
}

#[tokio::test]
async fn cross_origin_posts_carry_the_allow_origin_header() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/lead", &app.address))
        .header("Origin", LANDING_PAGE)
        .json(&valid_lead())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        LANDING_PAGE
    );
    assert_eq!(app.mailer.sent().len(), 1);
}
