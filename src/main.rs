use clap::Parser;
use tracing_subscriber::EnvFilter;

use fluent_query::cli::Args;
use fluent_query::config::ConfigFile;
use fluent_query::db::DatabaseConfig;
use fluent_query::query::Db;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = ConfigFile::load_optional()?.map(|c| c.options).unwrap_or_default();
    let config = match &args.db {
        Some(url) => DatabaseConfig::from_url(url)?,
        None => DatabaseConfig::resolve()?,
    };
    let db = Db::new(config.connect_with(&options)?);
    let output = args.command.run(&db, args.format)?;
    println!("{}", output);
    Ok(())
}
