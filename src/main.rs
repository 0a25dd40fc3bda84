// Entrypoint for the themes CLI.
// - Parses flags, sets up logging, resolves the runtime context and hands
//   it to the selected command.
// - Returns `anyhow::Result` so library errors surface with context.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use zcli_themes::api::{PreviewOutcome, ThemeClient};
use zcli_themes::preview::{build_payload, PreviewBundle};
use zcli_themes::ui::{self, TerminalPrompter};
use zcli_themes::{resolve, FlagValues, PromptPolicy, RuntimeContext};

/// Helpers for developing help center themes
#[derive(Parser)]
#[command(name = "zcli-themes", version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a bundled theme to the local preview endpoint
    Preview {
        /// Theme directory (where zcli.themes.config.json is looked up)
        theme_dir: PathBuf,

        /// JSON file with the bundled templates, assets and variables
        #[arg(long)]
        bundle: PathBuf,

        #[command(flatten)]
        conn: ConnectionArgs,
    },
    /// Create a theme import job for a brand
    Import {
        /// Theme directory (where zcli.themes.config.json is looked up)
        theme_dir: PathBuf,

        /// Brand the theme is imported into
        #[arg(long = "brand-id")]
        brand_id: String,

        #[command(flatten)]
        conn: ConnectionArgs,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// Address the local dev server binds to
    #[arg(long, default_value = "localhost")]
    bind: String,

    /// Host the preview loads local assets from
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port of the local dev server
    #[arg(long, default_value_t = 4567, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Enable debug logs (unless RUST_LOG is set)
    #[arg(long)]
    logs: bool,

    /// Disable the livereload script in the preview
    #[arg(long = "no-livereload")]
    no_livereload: bool,

    /// Account subdomain or full URL
    #[arg(long)]
    subdomain: Option<String>,

    /// Account username (email)
    #[arg(long)]
    username: Option<String>,

    /// Account password
    #[arg(long)]
    password: Option<String>,

    /// Prompt for every credential, replacing flag and config values
    #[arg(long = "prompt-always")]
    prompt_always: bool,
}

impl ConnectionArgs {
    fn policy(&self) -> PromptPolicy {
        if self.prompt_always {
            PromptPolicy::Always
        } else {
            PromptPolicy::Missing
        }
    }

    fn into_flags(self) -> FlagValues {
        FlagValues {
            bind: self.bind,
            host: self.host,
            port: self.port,
            logs: self.logs,
            livereload: !self.no_livereload,
            subdomain: self.subdomain,
            username: self.username,
            password: self.password,
        }
    }
}

fn init_tracing(logs: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if logs { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn context_for(theme_dir: &Path, conn: ConnectionArgs) -> Result<RuntimeContext> {
    let policy = conn.policy();
    let context = resolve(theme_dir, conn.into_flags(), policy, &mut TerminalPrompter)
        .context("Failed to resolve runtime context")?;
    debug!(?context, "runtime context");
    Ok(context)
}

fn run_preview(theme_dir: PathBuf, bundle: PathBuf, conn: ConnectionArgs) -> Result<bool> {
    let context = context_for(&theme_dir, conn)?;
    let bundle = PreviewBundle::load(&bundle)?;
    let payload = build_payload(bundle, &context);
    let client = ThemeClient::from_context(&context)?;

    ui::status("Uploading", "Uploading theme");
    match client.upload_preview(&payload) {
        Ok(PreviewOutcome::Uploaded) => {
            ui::status("Uploading", "OK");
            Ok(true)
        }
        Ok(PreviewOutcome::ValidationFailed(errors)) => {
            ui::report_template_errors(&errors);
            Ok(false)
        }
        Err(e) => {
            ui::failure("Error", "Something went wrong");
            Err(e.into())
        }
    }
}

fn run_import(theme_dir: PathBuf, brand_id: String, conn: ConnectionArgs) -> Result<bool> {
    let context = context_for(&theme_dir, conn)?;
    let client = ThemeClient::from_context(&context)?;
    let job = ui::with_spinner("Creating theme import job", || {
        client.create_theme_import_job(&brand_id)
    })?;
    ui::status("Created", &format!("import job {} ({})", job.id, job.status));
    Ok(true)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let logs = match &cli.command {
        Commands::Preview { conn, .. } | Commands::Import { conn, .. } => conn.logs,
    };
    init_tracing(logs);

    let ok = match cli.command {
        Commands::Preview {
            theme_dir,
            bundle,
            conn,
        } => run_preview(theme_dir, bundle, conn)?,
        Commands::Import {
            theme_dir,
            brand_id,
            conn,
        } => run_import(theme_dir, brand_id, conn)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
