use anyhow::Result;
use factory_loader::naming::RandomSuffix;
use factory_loader::{ResourcePreparer, SourceParameters};
use tracing::debug;

use super::load_source;
use crate::cli::SourceFile;

pub fn handle_prepare(query: &str, source: &SourceFile, append_suffix: bool) -> Result<()> {
    let params = SourceParameters::parse(query)?;
    let raw = load_source(source)?;
    debug!(factory_id = params.factory_id(), kind = %raw.kind(), "Preparing resource");

    let prepared = ResourcePreparer::new(&RandomSuffix).prepare(
        &raw,
        params.factory_id(),
        params.storage_type(),
        append_suffix,
    )?;
    print!("{}", prepared.to_yaml()?);
    Ok(())
}
