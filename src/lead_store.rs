use crate::configuration::DatabaseSettings;
use crate::domain::{NewLead, NewProposal};
use chrono::Utc;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use uuid::Uuid;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(thiserror::Error, Debug)]
pub enum ProposalStoreError {
    #[error("A proposal was already submitted for {0}")]
    Duplicate(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Writes leads and proposals to Postgres.
///
/// There is no pool: every call opens its own connection, begins a transaction, inserts exactly
/// one row, commits and closes the connection before returning. A request therefore holds at most
/// one connection, and only for the duration of its insert.
///
/// On error paths the connection and any open transaction are dropped, which rolls the
/// transaction back and closes the socket. Failures are logged here and handed back untouched:
/// mapping them to a response is up to the route.
///
/// Leads are append-only, so the same person submitting twice gets two rows. Proposals are unique
/// per email, and a second one surfaces as [`ProposalStoreError::Duplicate`].
pub struct LeadStore {
    options: PgConnectOptions,
}

impl LeadStore {
    pub fn new(settings: &DatabaseSettings) -> Self {
        Self {
            options: settings.with_db(),
        }
    }

    /// Inserts exactly one row into `leads`. Duplicates are allowed.
    #[tracing::instrument(name = "Saving new lead details in the database", skip(self, lead))]
    pub async fn record(&self, lead: &NewLead) -> Result<(), sqlx::Error> {
        let mut connection = self.connect().await?;
        let mut transaction = connection.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO leads (id, nome, email, empresa, recurso, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(lead.name.as_ref())
        .bind(lead.email.as_ref())
        .bind(lead.company.as_str())
        .bind(lead.resource())
        .bind(Utc::now())
        .execute(&mut transaction)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;
        transaction.commit().await?;

        release(connection).await;
        Ok(())
    }

    #[tracing::instrument(
        name = "Saving new proposal details in the database",
        skip(self, proposal)
    )]
    pub async fn record_proposal(&self, proposal: &NewProposal) -> Result<(), ProposalStoreError> {
        let mut connection = self.connect().await?;
        let mut transaction = connection.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO propostas (id, nome, email, telefone, empresa, mensagem, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(proposal.name.as_ref())
        .bind(proposal.email.as_ref())
        .bind(proposal.phone.as_ref())
        .bind(proposal.company.as_str())
        .bind(proposal.message.as_str())
        .bind(Utc::now())
        .execute(&mut transaction)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ProposalStoreError::Duplicate(proposal.email.to_string())
            } else {
                tracing::error!("Failed to execute query: {:?}", e);
                ProposalStoreError::Database(e)
            }
        })?;
        transaction.commit().await?;

        release(connection).await;
        Ok(())
    }

    async fn connect(&self) -> Result<PgConnection, sqlx::Error> {
        PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to Postgres: {:?}", e);
                e
            })
    }
}

/// The row is committed by the time we get here, a failed goodbye is not worth failing the request.
async fn release(connection: PgConnection) {
    if let Err(e) = connection.close().await {
        tracing::warn!(
            error.cause_chain = ?e,
            "Failed to close the database connection cleanly"
        );
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}
