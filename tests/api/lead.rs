use crate::helpers::{
    spawn_app, spawn_app_with, spawn_app_with_smtp, unused_port, valid_lead, MockMailer,
    StoredLead, ATTACHMENT_BYTES,
};

#[tokio::test]
async fn capture_lead_returns_a_200_for_valid_json() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_lead(&valid_lead()).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": true, "message": "Lead capturado com sucesso!"})
    );
}

#[tokio::test]
async fn capture_lead_persists_the_new_lead() {
    let app = spawn_app().await;

    app.post_lead(&valid_lead()).await;

    let saved = app.stored_leads().await;
    assert_eq!(
        saved,
        vec![StoredLead {
            nome: "Ana Souza".into(),
            email: "ana.souza@empresa.com.br".into(),
            empresa: "Metalúrgica Souza".into(),
            recurso: "Guia NR-1".into(),
        }]
    );
}

#[tokio::test]
async fn capture_lead_sends_the_guide_to_the_new_lead() {
    let app = spawn_app().await;

    app.post_lead(&valid_lead()).await;

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, vec!["ana.souza@empresa.com.br"]);
    assert!(sent[0].raw.contains("Guia-NR1-DNF-Ocupacional.pdf"));
    assert!(sent[0].raw.contains(&base64::encode(ATTACHMENT_BYTES)));
}

#[tokio::test]
async fn capture_lead_stores_an_empty_company_when_it_is_omitted() {
    let app = spawn_app().await;

    let response = app
        .post_lead(&serde_json::json!({
            "nome": "Ana Souza",
            "email": "ana.souza@empresa.com.br"
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let saved = app.stored_leads().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].empresa, "");
}

#[tokio::test]
async fn capture_lead_returns_a_400_when_data_is_missing() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (serde_json::json!({"nome": "Ana Souza"}), "missing the email"),
        (serde_json::json!({"email": "ana@empresa.com.br"}), "missing the name"),
        (serde_json::json!({"empresa": "Souza"}), "missing both name and email"),
        (serde_json::json!({"nome": "", "email": "ana@empresa.com.br"}), "an empty name"),
        (serde_json::json!({"nome": "Ana Souza", "email": "   "}), "a blank email"),
        (serde_json::json!({"nome": null, "email": "ana@empresa.com.br"}), "a null name"),
    ];

    for (invalid_body, error_message) in test_cases {
        // Act
        let response = app.post_lead(&invalid_body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            // Additional customised error message on test failure
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Nome e email são obrigatórios");
    }

    // Nothing was stored and nothing was sent
    assert!(app.stored_leads().await.is_empty());
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn capture_lead_returns_a_400_for_a_malformed_body() {
    let app = spawn_app().await;

    let response = app.post_raw_lead(r#"{"nome": "Ana", "email": "#).await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(app.stored_leads().await.is_empty());
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn identical_submissions_are_not_deduplicated() {
    let app = spawn_app().await;

    app.post_lead(&valid_lead()).await.error_for_status().unwrap();
    app.post_lead(&valid_lead()).await.error_for_status().unwrap();

    let saved = app.stored_leads().await;
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0], saved[1]);
    assert_eq!(app.mailer.sent().len(), 2);
}

#[tokio::test]
async fn capture_lead_fails_without_emailing_if_the_store_is_unreachable() {
    // Arrange
    let app = spawn_app_with(MockMailer::default(), |c| {
        c.database.host = "127.0.0.1".into();
        c.database.port = unused_port();
    })
    .await;

    // Act
    let response = app.post_lead(&valid_lead()).await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn a_relay_rejection_keeps_the_stored_lead_and_returns_a_500() {
    // Arrange
    let app = spawn_app_with(
        MockMailer::rejecting("535 5.7.8 Username and Password not accepted"),
        |_| {},
    )
    .await;

    // Act
    let response = app.post_lead(&valid_lead()).await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"error": "535 5.7.8 Username and Password not accepted"})
    );
    // There is no rollback: the lead stays in the store
    assert_eq!(app.stored_leads().await.len(), 1);
}

#[tokio::test]
async fn an_unreachable_relay_keeps_the_stored_lead_and_returns_a_500() {
    let app = spawn_app_with_smtp(|c| {
        c.email_client.smtp_host = "127.0.0.1".into();
        c.email_client.smtp_port = unused_port();
    })
    .await;

    let response = app.post_lead(&valid_lead()).await;

    assert_eq!(500, response.status().as_u16());
    assert_eq!(app.stored_leads().await.len(), 1);
}

#[tokio::test]
async fn a_missing_attachment_keeps_the_stored_lead_and_returns_a_500() {
    let app = spawn_app_with(MockMailer::default(), |c| {
        c.email_client.attachment_path =
            std::env::temp_dir().join("does-not-exist/guia-nr1.pdf");
    })
    .await;

    let response = app.post_lead(&valid_lead()).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to read attachment"));
    assert_eq!(app.stored_leads().await.len(), 1);
    assert!(app.mailer.sent().is_empty());
}
