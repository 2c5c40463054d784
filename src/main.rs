mod clock;
mod config;
mod error;
mod handlers;
mod mail;
mod models;
mod routes;
mod store;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use dotenv::dotenv;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::handlers::Workflow;
use crate::mail::{HttpMailer, LogMailer, MailComposer, Notifier};
use crate::store::{CredentialStore, MemoryCredentialStore, spawn_sweeper};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    if dotenv().is_err() {
        warn!("no .env file found, using the process environment");
    }

    let settings = Settings::from_env().context("invalid configuration")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn CredentialStore> =
        Arc::new(MemoryCredentialStore::new(settings.store, clock.clone()));

    let notifier: Arc<dyn Notifier> = match &settings.mail_api_url {
        Some(endpoint) => Arc::new(
            HttpMailer::new(
                endpoint.clone(),
                settings.mail_api_key.clone(),
                settings.mail_from.clone(),
            )
            .context("failed to build mail client")?,
        ),
        None => {
            warn!("MAIL_API_URL not set, mails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let composer = MailComposer::new(
        settings.organization.clone(),
        settings.admin_email.clone(),
        settings.verify_url()?,
    );

    let workflow = web::Data::new(Workflow::new(
        store.clone(),
        notifier,
        clock.clone(),
        composer,
        settings.notify_admin_on_intake,
    ));

    spawn_sweeper(store, clock, settings.sweep_interval);

    info!(
        "listening on {}:{} ({:?} credentials, valid {} min)",
        settings.bind_addr,
        settings.port,
        settings.store.kind,
        settings.store.lifetime.num_minutes()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(workflow.clone())
            .configure(routes::init)
    })
    .bind((settings.bind_addr.as_str(), settings.port))?
    .run()
    .await?;

    Ok(())
}
