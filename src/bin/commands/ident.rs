use anyhow::Result;
use clap::Args;
use pipedb::{IdentRecord, IdentRepository, PipedbConfig, StreamClassifier};
use tracing::info;

/// Arguments for the Ident command
#[derive(Args)]
pub struct IdentArgs {
    /// Unique dataset identifier, e.g. ENGWEB
    #[clap(long)]
    pub bible_id: String,

    /// Old Testament audio fileset id
    #[clap(long, default_value = "")]
    pub audio_ot_id: String,

    /// New Testament audio fileset id
    #[clap(long, default_value = "")]
    pub audio_nt_id: String,

    /// Old Testament text fileset id
    #[clap(long, default_value = "")]
    pub text_ot_id: String,

    /// New Testament text fileset id
    #[clap(long, default_value = "")]
    pub text_nt_id: String,

    /// Where the text came from, e.g. USX or plain text
    #[clap(long, default_value = "")]
    pub text_source: String,

    /// ISO 639-3 language code
    #[clap(long, default_value = "")]
    pub language_iso: String,

    /// Language code used for speech recognition, if different
    #[clap(long, default_value = "")]
    pub asr_language_iso: String,

    #[clap(long, default_value = "")]
    pub version_code: String,

    #[clap(long, default_value_t = 0)]
    pub language_id: i64,

    #[clap(long, default_value_t = 0)]
    pub rolv_id: i64,

    /// Script of the text, e.g. Latn
    #[clap(long, default_value = "")]
    pub alphabet: String,

    #[clap(long, default_value = "")]
    pub language_name: String,

    #[clap(long, default_value = "")]
    pub version_name: String,
}

impl From<IdentArgs> for IdentRecord {
    fn from(args: IdentArgs) -> Self {
        IdentRecord {
            dataset_id: 0,
            bible_id: args.bible_id,
            audio_ot_id: args.audio_ot_id,
            audio_nt_id: args.audio_nt_id,
            text_ot_id: args.text_ot_id,
            text_nt_id: args.text_nt_id,
            text_source: args.text_source,
            language_iso: args.language_iso,
            asr_language_iso: args.asr_language_iso,
            version_code: args.version_code,
            language_id: args.language_id,
            rolv_id: args.rolv_id,
            alphabet: args.alphabet,
            language_name: args.language_name,
            version_name: args.version_name,
        }
    }
}

pub fn run<C: StreamClassifier>(config: &PipedbConfig, classifier: &C, args: IdentArgs) -> Result<()> {
    let record = IdentRecord::from(args);
    super::with_session(config, classifier, |session| {
        let id = IdentRepository::new(session.connection()).insert(&record)?;
        info!("added dataset {} as id {}", record.bible_id, id);
        Ok(())
    })
}
