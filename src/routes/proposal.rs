use crate::domain::{ContactPhone, LeadEmail, LeadName, NewProposal};
use crate::lead_store::{LeadStore, ProposalStoreError};
use crate::utils::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

pub const PROPOSAL_RECEIVED_MESSAGE: &str = "Proposta cadastrada com sucesso!";

#[derive(serde::Deserialize)]
pub struct ProposalBody {
    nome: Option<String>,
    email: Option<String>,
    telefone: Option<String>,
    empresa: Option<String>,
    mensagem: Option<String>,
}

impl TryFrom<ProposalBody> for NewProposal {
    type Error = String;

    fn try_from(body: ProposalBody) -> Result<Self, Self::Error> {
        let name = LeadName::parse(body.nome.unwrap_or_default())?;
        let email = LeadEmail::parse(body.email.unwrap_or_default())?;
        let phone = ContactPhone::parse(body.telefone.unwrap_or_default())?;
        Ok(Self {
            name,
            email,
            phone,
            company: body.empresa.unwrap_or_default(),
            message: body.mensagem.unwrap_or_default(),
        })
    }
}

/// Unlike leads, proposal failures never expose internals: the 500 body is a fixed message and the
/// cause only goes to the logs.
#[derive(thiserror::Error)]
pub enum ProposalError {
    #[error("Nome, email e telefone são obrigatórios")]
    ValidationError,
    #[error("Você já solicitou uma proposta. Nossa equipe entrará em contato em breve!")]
    Duplicate,
    #[error("Erro ao processar solicitação. Tente novamente.")]
    UnexpectedError(#[source] sqlx::Error),
}

impl std::fmt::Debug for ProposalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<ProposalStoreError> for ProposalError {
    fn from(e: ProposalStoreError) -> Self {
        match e {
            ProposalStoreError::Duplicate(_) => ProposalError::Duplicate,
            ProposalStoreError::Database(e) => ProposalError::UnexpectedError(e),
        }
    }
}

impl ResponseError for ProposalError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProposalError::ValidationError => StatusCode::BAD_REQUEST,
            ProposalError::Duplicate => StatusCode::CONFLICT,
            ProposalError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string()
        }))
    }
}

#[tracing::instrument(
    name = "Receiving a commercial proposal",
    skip(body, store),
    fields(proposal_email = tracing::field::Empty)
)]
pub async fn submit_proposal(
    body: web::Json<ProposalBody>,
    store: web::Data<LeadStore>,
) -> Result<HttpResponse, ProposalError> {
    let proposal: NewProposal = body.0.try_into().map_err(|e: String| {
        tracing::warn!("Rejected proposal submission: {}", e);
        ProposalError::ValidationError
    })?;
    tracing::Span::current().record(
        "proposal_email",
        &tracing::field::display(&proposal.email),
    );

    store.record_proposal(&proposal).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": PROPOSAL_RECEIVED_MESSAGE
    })))
}
