use anyhow::Context;
use api_shared::{ExtractRes, SeverityRes};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use triage_core::artifact::{self, source::FileSource};
use triage_core::severity::encoding::feature_names;
use triage_core::{
    Classifier, CoreConfig, QuestionnaireAnswer, RawText, SeverityClassifier, SymptomExtractor,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Offline tools for the symptom triage service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract symptom terms from free text using the built-in lexicon
    Extract {
        /// Text in any language
        text: String,
        /// Skip the translation step
        #[arg(long)]
        no_translate: bool,
    },
    /// Print the feature vector for questionnaire answers
    Encode {
        /// Answers as a JSON object
        answers: String,
    },
    /// Classify questionnaire answers with a local classifier artifact
    Classify {
        /// Path to the classifier artifact
        #[arg(long)]
        model: PathBuf,
        /// Answers as a JSON object
        answers: String,
    },
    /// Validate a classifier artifact and print what it contains
    InspectModel {
        /// Path to the classifier artifact
        path: PathBuf,
    },
}

fn parse_answers(raw: &str) -> anyhow::Result<QuestionnaireAnswer> {
    serde_json::from_str(raw).context("answers must be a JSON object")
}

async fn load_model(path: &Path) -> anyhow::Result<Classifier> {
    artifact::load(&FileSource::new(path))
        .await
        .with_context(|| format!("loading classifier from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("triage=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Extract { text, no_translate }) => {
            let cfg = CoreConfig::resolve(|name| match name {
                "TRIAGE_NLP_URL" => None,
                "TRIAGE_TRANSLATION" if no_translate => Some("off".into()),
                _ => std::env::var(name).ok(),
            })?;
            let extractor = SymptomExtractor::from_config(&cfg)?;
            let text = RawText::new(text)?;
            let symptoms = extractor.extract(&text).await?;
            println!("{}", serde_json::to_string(&ExtractRes { symptoms })?);
        }
        Some(Commands::Encode { answers }) => {
            let features = parse_answers(&answers)?.encode();
            println!("{}", serde_json::to_string(&features)?);
        }
        Some(Commands::Classify { model, answers }) => {
            let answers = parse_answers(&answers)?;
            let classifier = SeverityClassifier::new(std::sync::Arc::new(load_model(&model).await?));
            let label = classifier.classify(&answers)?;
            println!(
                "{}",
                serde_json::to_string(&SeverityRes {
                    severity: label.to_string(),
                })?
            );
        }
        Some(Commands::InspectModel { path }) => {
            let model = load_model(&path).await?;
            println!("model:    {}", model.summary());
            println!("classes:  {:?}", model.classes());
            println!("features: {}", feature_names().join(", "));
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}
