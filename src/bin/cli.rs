//! Desktop CLI for exercising the share upload workflow against the live API
//!
//! Not shipped with the mobile app; built with `--features cli`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use share_core::api::{CapitalClient, ClientConfig, DocumentUpload, UploadMode};
use share_core::file;

#[derive(Parser)]
#[command(name = "share-cli", about = "Arti Capital share core test CLI")]
struct Cli {
    /// Session token (or ARTI_USER_TOKEN)
    #[arg(long, env = "ARTI_USER_TOKEN")]
    token: String,

    /// Override the service base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List projects for a company
    Projects {
        #[arg(long)]
        comp_id: i64,
    },
    /// Show a project's required documents and their resolution state
    Detail {
        #[arg(long)]
        project_id: i64,
    },
    /// Upload a file as a project document (add mode)
    Upload {
        #[arg(long)]
        comp_id: i64,
        #[arg(long)]
        project_id: i64,
        #[arg(long)]
        document_type: i64,
        #[arg(long)]
        file: String,
        #[arg(long, default_value = "")]
        note: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "share_core=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = match &cli.base_url {
        Some(url) => CapitalClient::new(ClientConfig::with_base_url(url.clone()))?,
        None => CapitalClient::shared().clone(),
    };

    match cli.command {
        Command::Projects { comp_id } => {
            let projects = client
                .list_projects(&cli.token, comp_id)
                .await
                .context("project list failed")?;
            if projects.is_empty() {
                println!("(no projects)");
            }
            for p in projects {
                println!("{:>6}  {:<10} {}", p.id, p.code, p.name);
            }
        }
        Command::Detail { project_id } => {
            let detail = client
                .fetch_project_detail(&cli.token, project_id)
                .await
                .context("project detail failed")?;
            println!("compID={} compAdrID={}", detail.company_id, detail.company_address_id);
            for d in detail.required_documents {
                let state = if d.supports_update() {
                    format!("on file (record {})", d.existing_document_id.unwrap_or_default())
                } else if d.is_added {
                    "on file (unresolved, will add)".to_string()
                } else {
                    "missing".to_string()
                };
                println!(
                    "{:>4}  {:<30} required={} {}",
                    d.document_type_id, d.document_name, d.is_required, state
                );
            }
        }
        Command::Upload { comp_id, project_id, document_type, file: file_path, note } => {
            println!(
                "uploading {} ({})",
                file_path,
                file::infer_mime_type(&file_path)
            );
            let upload = DocumentUpload {
                user_token: cli.token.clone(),
                company_id: comp_id,
                document_type_id: document_type,
                description: note,
                mode: UploadMode::Add { app_id: project_id },
                file_uri: file_path,
            };
            let outcome = upload.submit(&client).await.context("upload failed")?;
            println!(
                "success: {}{}",
                outcome.success,
                outcome.message.map(|m| format!(" ({m})")).unwrap_or_default()
            );
        }
    }

    Ok(())
}
