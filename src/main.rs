use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tenantspec_config::{Format, TenantConfig};
use tenantspec_fqmn::{Fqmn, from_parts};
use tenantspec_source::{FileSource, TenantStore};
use tenantspec_validator::validate;

/// tenantspec - validate and inspect multi-tenant module configs
#[derive(Parser)]
#[command(name = "tenantspec")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log filter used when RUST_LOG is not set
  #[arg(long, global = true, default_value = "info")]
  log_level: String,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a tenant file and link its workflows
  Validate {
    /// Path to the tenant file (JSON or YAML)
    file: PathBuf,
  },

  /// Print a tenant file with module addresses filled in
  Marshal {
    /// Path to the tenant file (JSON or YAML)
    file: PathBuf,

    /// Output encoding
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
  },

  /// Resolve a module reference against a tenant file
  Find {
    /// Path to the tenant file (JSON or YAML)
    file: PathBuf,

    /// A name, namespace::name, or FQMN
    reference: String,
  },

  /// Work with fully-qualified module names
  Fqmn {
    #[command(subcommand)]
    command: FqmnCommand,
  },

  /// Serve the latest valid config of a tenant from a directory, logging
  /// every accepted or rejected version
  Watch {
    /// Directory holding `<identifier>.json|yaml` tenant files
    dir: PathBuf,

    /// Tenant identifier to follow
    identifier: String,

    /// Seconds between successful refreshes
    #[arg(long, default_value_t = 5)]
    interval: u64,

    /// Seconds between retries after a failed fetch
    #[arg(long, default_value_t = 1)]
    backoff: u64,
  },
}

#[derive(Subcommand)]
enum FqmnCommand {
  /// Parse an FQMN in any surface form
  Parse { fqmn: String },

  /// Build a text-form FQMN from its parts
  Build {
    tenant: String,
    namespace: String,
    name: String,
    #[arg(value_name = "REF")]
    reference: String,
  },

  /// Convert a legacy `tenant#namespace::name@version` reference
  Migrate {
    legacy: String,

    /// Ref to attach to the migrated FQMN
    #[arg(long = "ref", default_value = "")]
    reference: String,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
  Json,
  Yaml,
}

impl From<OutputFormat> for Format {
  fn from(format: OutputFormat) -> Self {
    match format {
      OutputFormat::Json => Format::Json,
      OutputFormat::Yaml => Format::Yaml,
    }
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  match cli.command {
    Some(Commands::Validate { file }) => validate_file(&file)?,
    Some(Commands::Marshal { file, format }) => marshal_file(&file, format.into())?,
    Some(Commands::Find { file, reference }) => find_module(&file, &reference)?,
    Some(Commands::Fqmn { command }) => fqmn(command)?,
    Some(Commands::Watch {
      dir,
      identifier,
      interval,
      backoff,
    }) => watch(
      dir,
      identifier,
      Duration::from_secs(interval),
      Duration::from_secs(backoff),
    )?,
    None => {
      println!("tenantspec - use --help to see available commands");
    }
  }

  Ok(())
}

fn load(file: &Path) -> Result<TenantConfig> {
  TenantConfig::load(file).with_context(|| format!("failed to load tenant file: {}", file.display()))
}

fn validate_file(file: &Path) -> Result<()> {
  let mut config = load(file)?;

  validate(&mut config)
    .with_context(|| format!("tenant file {} is invalid", file.display()))?;

  println!(
    "{} (version {}) is valid",
    config.identifier, config.tenant_version
  );

  Ok(())
}

fn marshal_file(file: &Path, format: Format) -> Result<()> {
  let mut config = load(file)?;
  let bytes = config.encode(format).context("failed to encode tenant config")?;

  println!("{}", String::from_utf8_lossy(&bytes));

  Ok(())
}

fn find_module(file: &Path, reference: &str) -> Result<()> {
  let config = load(file)?;

  let module = config
    .find_module(reference)
    .with_context(|| format!("invalid module reference: {reference}"))?;

  match module {
    Some(module) => println!("{}", serde_json::to_string_pretty(module)?),
    None => bail!("module {reference} not found in {}", config.identifier),
  }

  Ok(())
}

fn fqmn(command: FqmnCommand) -> Result<()> {
  match command {
    FqmnCommand::Parse { fqmn } => {
      let parsed = Fqmn::parse(&fqmn)?;
      println!("{}", serde_json::to_string_pretty(&parsed)?);
      println!("url path: {}", parsed.url_path());
    }
    FqmnCommand::Build {
      tenant,
      namespace,
      name,
      reference,
    } => {
      println!("{}", from_parts(&tenant, &namespace, &name, &reference)?);
    }
    FqmnCommand::Migrate { legacy, reference } => {
      println!("{}", Fqmn::migrate_v1(&legacy, &reference));
    }
  }

  Ok(())
}

fn watch(dir: PathBuf, identifier: String, interval: Duration, backoff: Duration) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { watch_async(dir, identifier, interval, backoff).await })
}

async fn watch_async(
  dir: PathBuf,
  identifier: String,
  interval: Duration,
  backoff: Duration,
) -> Result<()> {
  let store = TenantStore::new(identifier, FileSource::new(dir));
  let cancel = CancellationToken::new();

  tokio::spawn({
    let cancel = cancel.clone();
    async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        cancel.cancel();
      }
    }
  });

  let Some(version) = store.ready(backoff, &cancel).await else {
    return Ok(());
  };
  info!(tenant = %store.identifier(), version, "serving tenant config");

  store.sync(interval, backoff, cancel).await;

  Ok(())
}
