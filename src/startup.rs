use crate::configuration::Settings;
use crate::email_client::{EmailClient, Mailer, SmtpMailer};
use crate::lead_store::LeadStore;
use crate::routes;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Builds the application against the SMTP relay described in `configuration`.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let mailer = SmtpMailer::new(&configuration.email_client);
        Self::build_with_mailer(configuration, Arc::new(mailer)).await
    }

    /// Same as [`Application::build`], with the relay swapped for any other [`Mailer`].
    pub async fn build_with_mailer(
        configuration: Settings,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, anyhow::Error> {
        let lead_store = LeadStore::new(&configuration.database);

        let sender = configuration
            .email_client
            .sender()
            .context("Invalid sender email address")?;
        let email_client = EmailClient::new(
            mailer,
            sender,
            configuration.email_client.attachment_path,
            configuration.email_client.attachment_filename,
        );

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {address}"))?;
        //Retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();
        let server = run(listener, lead_store, email_client)?;

        // We "save" the bound port in one of `Application`'s fields.
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that this function only returns when the application
    /// is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Wires the routes onto an `HttpServer` listening on `listener`.
///
/// Every route answers cross-origin requests, preflight included: the landing page that posts the
/// forms is served from a different origin than the API. Bodies that fail to decode are answered
/// with a 400 in the error shape of the route they were sent to, `{"error": ...}` for leads and
/// `{"success": false, "error": ...}` for proposals.
///
/// The returned `Server` does nothing until it is awaited.
pub fn run(
    listener: TcpListener,
    lead_store: LeadStore,
    email_client: EmailClient,
) -> Result<Server, std::io::Error> {
    // Wrap the components in a smart pointer, every worker gets a clone of the `Arc`.
    let lead_store = web::Data::new(lead_store);
    let email_client = web::Data::new(email_client);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/api/health", web::get().to(routes::health_check))
            .route("/api/lead", web::post().to(routes::capture_lead))
            .service(
                web::resource("/api/proposta")
                    .app_data(
                        web::JsonConfig::default().error_handler(proposal_json_error_handler),
                    )
                    .route(web::post().to(routes::submit_proposal)),
            )
            .app_data(lead_store.clone())
            .app_data(email_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Malformed bodies get the same `{"error": ...}` shape as every other rejection.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(serde_json::json!({
        "error": err.to_string()
    }));
    InternalError::from_response(err, response).into()
}

fn proposal_json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": err.to_string()
    }));
    InternalError::from_response(err, response).into()
}
