// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::core::flow::LoginForm;
use crate::core::preview::{build_preview, quick_preview};
use crate::error::CollaboratorError;
use crate::services::{self, CredentialVerifier, SqliteAccounts};
use crate::types::ResumeDocument;
use crate::utils;
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "resumecraft")]
#[command(about = "Build, preview and export resumes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the text preview of a saved document
    Preview {
        document: PathBuf,
        /// Only the sidebar card
        #[arg(long)]
        quick: bool,
    },
    /// Render a saved document to PDF
    Export {
        document: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Create an account
    Add {
        username: String,
        email: String,
        password: String,
    },
    /// Check a password against an account
    Check { email: String, password: String },
}

async fn read_document(path: &Path) -> Result<ResumeDocument> {
    let content = utils::read_file_safe(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a resume document", path.display()))
}

pub async fn handle_command(cli: Cli, mut config: AppConfig) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.paths.port = port;
            }
            start_web_server(config).await
        }

        Command::Preview { document, quick } => {
            let document = read_document(&document).await?;
            if quick {
                let card = quick_preview(&document.personal_info);
                println!("{}", serde_json::to_string_pretty(&card)?);
            } else {
                print!("{}", build_preview(&document).to_text());
            }
            Ok(())
        }

        Command::Export { document, output } => {
            let resume = read_document(&document).await?;
            let renderer = services::renderer_from_config(&config)?;
            config.ensure_directories().await?;

            let pdf = renderer.render(&resume).await?;
            let output = output.unwrap_or_else(|| config.paths.output_path.join(&pdf.filename));
            utils::write_file_safe(&output, &pdf.bytes).await?;

            info!("Exported {} ({} bytes)", output.display(), pdf.bytes.len());
            println!("{}", output.display());
            Ok(())
        }

        Command::Account { command } => {
            let accounts = SqliteAccounts::connect(&config.paths.database_path).await?;
            handle_account_command(command, &accounts).await
        }
    }
}

async fn handle_account_command(command: AccountCommand, accounts: &SqliteAccounts) -> Result<()> {
    match command {
        AccountCommand::Add {
            username,
            email,
            password,
        } => match accounts.create(&username, &email, &password).await {
            Ok(account) => {
                println!("✅ Account created:");
                println!("   Username: {}", account.username);
                println!("   Email: {}", account.email);
                println!("   ID: {}", account.id);
                Ok(())
            }
            Err(CollaboratorError::AccountExists(email)) => {
                anyhow::bail!("Email '{}' already exists", email)
            }
            Err(e) => {
                error!("Failed to create account: {}", e);
                Err(e.into())
            }
        },

        AccountCommand::Check { email, password } => {
            let form = LoginForm { email, password };
            match accounts.verify(&form).await {
                Ok(user) => {
                    println!("✅ {} <{}> is authorized", user.username, user.email);
                    Ok(())
                }
                Err(CollaboratorError::InvalidCredentials) => {
                    anyhow::bail!("Invalid email or password for {}", form.email)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_add() {
        let cli = Cli::try_parse_from([
            "resumecraft",
            "account",
            "add",
            "ada",
            "ada@example.com",
            "engine",
        ])
        .unwrap();

        match cli.command {
            Command::Account {
                command: AccountCommand::Add { username, email, .. },
            } => {
                assert_eq!(username, "ada");
                assert_eq!(email, "ada@example.com");
            }
            _ => panic!("expected account add"),
        }
    }

    #[test]
    fn test_parse_export_and_serve() {
        let cli = Cli::try_parse_from(["resumecraft", "export", "cv.json", "-o", "cv.pdf"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export { output: Some(ref o), .. } if o == &PathBuf::from("cv.pdf")
        ));

        let cli = Cli::try_parse_from(["resumecraft", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(9000) }));
    }

    #[tokio::test]
    async fn test_account_commands() {
        let accounts = SqliteAccounts::in_memory().await.unwrap();

        handle_account_command(
            AccountCommand::Add {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "engine".to_string(),
            },
            &accounts,
        )
        .await
        .unwrap();

        let ok = handle_account_command(
            AccountCommand::Check {
                email: "ada@example.com".to_string(),
                password: "engine".to_string(),
            },
            &accounts,
        )
        .await;
        assert!(ok.is_ok());

        let wrong = handle_account_command(
            AccountCommand::Check {
                email: "ada@example.com".to_string(),
                password: "other".to_string(),
            },
            &accounts,
        )
        .await;
        assert!(wrong.is_err());
    }

    #[tokio::test]
    async fn test_read_document_rejects_non_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.json");
        utils::write_file_safe(&path, b"[1, 2, 3]").await.unwrap();

        assert!(read_document(&path).await.is_err());
    }
}
