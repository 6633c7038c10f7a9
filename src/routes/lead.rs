use crate::domain::{LeadEmail, LeadName, NewLead};
use crate::email_client::{EmailClient, NotifyError};
use crate::lead_store::LeadStore;
use crate::utils::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Nome e email são obrigatórios";
pub const LEAD_CAPTURED_MESSAGE: &str = "Lead capturado com sucesso!";

/// The payload as the landing page sends it. Every field is optional at this stage so that a
/// missing field is reported with our own message rather than the JSON decoder's.
#[derive(serde::Deserialize)]
pub struct LeadBody {
    nome: Option<String>,
    email: Option<String>,
    empresa: Option<String>,
}

impl TryFrom<LeadBody> for NewLead {
    type Error = String;

    fn try_from(body: LeadBody) -> Result<Self, Self::Error> {
        let name = LeadName::parse(body.nome.unwrap_or_default())?;
        let email = LeadEmail::parse(body.email.unwrap_or_default())?;
        Ok(Self {
            name,
            email,
            company: body.empresa.unwrap_or_default(),
        })
    }
}

#[derive(thiserror::Error)]
pub enum LeadError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    StoreError(#[from] sqlx::Error),
    #[error(transparent)]
    NotifyError(#[from] NotifyError),
}

impl std::fmt::Debug for LeadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Store and relay failures share a status code: the body carries the underlying message and
/// nothing else, so callers cannot tell whether the lead was saved.
impl ResponseError for LeadError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeadError::ValidationError(_) => StatusCode::BAD_REQUEST,
            LeadError::StoreError(_) | LeadError::NotifyError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

/// `POST /api/lead`: validate, store, then email.
///
/// Each step only runs if the previous one succeeded:
/// * a missing or blank `nome`/`email` is a 400 with [`REQUIRED_FIELDS_MESSAGE`], and nothing is
///   stored or sent;
/// * if the lead cannot be stored, the relay is never contacted and the database error is
///   returned as a 500;
/// * if the email fails, the lead stays stored (there is no rollback or retry) and the relay's
///   message is returned as a 500.
///
/// Only when the relay has accepted the message do we answer `200` with
/// `{"success": true, "message": ...}`. Accepted values are stored verbatim, untrimmed.
#[tracing::instrument(
    name = "Capturing a new lead",
    skip(body, store, email_client),
    fields(
        lead_email = tracing::field::Empty,
        lead_name = tracing::field::Empty
    )
)]
pub async fn capture_lead(
    body: web::Json<LeadBody>,
    store: web::Data<LeadStore>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, LeadError> {
    let new_lead: NewLead = body.0.try_into().map_err(|e: String| {
        tracing::warn!("Rejected lead submission: {}", e);
        LeadError::ValidationError(REQUIRED_FIELDS_MESSAGE.into())
    })?;
    tracing::Span::current()
        .record("lead_email", &tracing::field::display(&new_lead.email))
        .record("lead_name", &tracing::field::display(&new_lead.name));

    store.record(&new_lead).await?;

    email_client
        .send_lead_magnet(&new_lead.name, &new_lead.email)
        .await
        .map_err(|e| {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "The lead was stored but the lead magnet could not be sent"
            );
            e
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": LEAD_CAPTURED_MESSAGE
    })))
}
