//! `walletpass`: build and verify signed `.pkpass` archives.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use walletpass::{verify_pkpass, CredentialSource, PkpassBuilder, SigningConfig};

#[derive(Parser)]
#[command(name = "walletpass", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and sign a .pkpass from a pass description and an assets directory.
    Build {
        /// Pass description JSON (becomes pass.json).
        #[arg(long)]
        pass: PathBuf,
        /// Directory whose files become archive entries, named by file name.
        #[arg(long)]
        assets: PathBuf,
        /// PKCS#12 container with the pass certificate and private key.
        #[arg(long)]
        p12: PathBuf,
        /// Passphrase for the PKCS#12 container.
        #[arg(long, env = "WALLETPASS_P12_PASSWORD", hide_env_values = true)]
        p12_password: String,
        /// WWDR intermediate certificate (PEM or DER).
        #[arg(long)]
        wwdr: PathBuf,
        /// Output path for the signed archive.
        #[arg(long, short)]
        out: PathBuf,
    },
    /// Verify an existing .pkpass against a trust root certificate.
    Verify {
        /// The .pkpass archive to check.
        pkpass: PathBuf,
        /// Trust root certificate (PEM or DER).
        #[arg(long)]
        trust_root: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            pass,
            assets,
            p12,
            p12_password,
            wwdr,
            out,
        } => build(&pass, &assets, &p12, p12_password, &wwdr, &out),
        Command::Verify { pkpass, trust_root } => verify(&pkpass, &trust_root),
    }
}

fn build(
    pass: &Path,
    assets: &Path,
    p12: &Path,
    p12_password: String,
    wwdr: &Path,
    out: &Path,
) -> Result<()> {
    let pass_text = std::fs::read_to_string(pass)
        .with_context(|| format!("reading pass description {}", pass.display()))?;
    let description: serde_json::Value =
        serde_json::from_str(&pass_text).context("pass description is not valid JSON")?;

    let mut builder = PkpassBuilder::new(description);
    let mut names = Vec::new();
    let mut dir: Vec<_> = std::fs::read_dir(assets)
        .with_context(|| format!("reading assets directory {}", assets.display()))?
        .collect::<std::io::Result<_>>()?;
    dir.sort_by_key(|entry| entry.file_name());
    for entry in dir {
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            bail!("asset file name is not UTF-8: {:?}", entry.file_name());
        };
        names.push(name.clone());
        builder = builder.asset_path(name, entry.path());
    }
    info!(assets = names.len(), "collected assets");

    let config = SigningConfig {
        p12: CredentialSource::path(p12),
        p12_password,
        wwdr: CredentialSource::path(wwdr),
    };

    let pkpass = builder.finish(&config)?;
    std::fs::write(out, &pkpass).with_context(|| format!("writing {}", out.display()))?;
    info!(bytes = pkpass.len(), out = %out.display(), "pass written");
    Ok(())
}

fn verify(pkpass: &Path, trust_root: &Path) -> Result<()> {
    let archive =
        std::fs::read(pkpass).with_context(|| format!("reading {}", pkpass.display()))?;
    let root = std::fs::read(trust_root)
        .with_context(|| format!("reading trust root {}", trust_root.display()))?;

    let report = verify_pkpass(&archive, &root)?;
    println!(
        "{}: OK ({} payload entries, signature verified)",
        pkpass.display(),
        report.payload_entries
    );
    Ok(())
}
