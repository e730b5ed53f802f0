use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use triage_core::artifact::{self, ArtifactLocation};
use triage_core::{CoreConfig, SeverityClassifier, SymptomExtractor};

/// Main entry point for the symptom triage service
///
/// Loads the severity classifier, builds the extraction pipeline and then serves the REST API.
/// The listener is only bound once the classifier is resident, so a reply on `/` means the
/// service is ready.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `TRIAGE_MODEL_PATH` or `TRIAGE_MODEL_BUCKET`/`TRIAGE_MODEL_KEY`: classifier artifact location
/// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`, `AWS_REGION`: object store credentials
/// - `TRIAGE_*`: translation and annotation settings, see `CoreConfig::resolve`
///
/// # Errors
/// Returns an error if configuration is invalid, the classifier cannot be fetched or validated,
/// or the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("TRIAGE_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".into())
        .parse()?;

    let lookup = |name: &str| std::env::var(name).ok();
    let cfg = CoreConfig::resolve(lookup)?;
    let source = ArtifactLocation::resolve(lookup)?.into_source()?;

    // Startup fails outright if the classifier is unavailable.
    let classifier = artifact::load(source.as_ref()).await?;
    let extractor = SymptomExtractor::from_config(&cfg)?;

    let state = AppState::new(extractor, SeverityClassifier::new(Arc::new(classifier)));

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    tracing::info!("++ Starting symptom triage REST on {}", rest_addr);
    api_rest::serve(listener, state).await?;

    Ok(())
}
