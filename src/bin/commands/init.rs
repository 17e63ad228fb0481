use anyhow::Result;
use pipedb::{PipedbConfig, StreamClassifier};
use tracing::info;

pub fn run<C: StreamClassifier>(config: &PipedbConfig, classifier: &C) -> Result<()> {
    super::with_session(config, classifier, |session| {
        info!("database ready at {}", session.path().display());
        Ok(())
    })
}
