use anyhow::Result;
use factory_loader::SourceParameters;
use factory_messages::{msg, MESSAGES};

pub fn handle_id(query: &str) -> Result<()> {
    let params = SourceParameters::parse(query)?;
    let cli = &MESSAGES.cli;

    println!("{}", msg!(cli.id_factory, id = params.factory_id()));
    println!("{}", msg!(cli.id_policy, policy = params.policy().as_str()));
    println!(
        "{}",
        msg!(cli.id_source_kind, kind = params.source_kind().to_string())
    );
    let storage = params.storage_type().map_or("default", |s| s.as_str());
    println!("{}", msg!(cli.id_storage, storage = storage));
    Ok(())
}
