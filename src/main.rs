use std::io::Write;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::Rng;
use tracing_subscriber::EnvFilter;

use laport::portal::Portal;
use laport::server::{routes, runtime};
use laport::ui::qr;

#[derive(Parser)]
#[command(name = "laport")]
#[command(about = "Share a file, a directory, or a snippet of text over the LAN")]
#[command(version)]
#[command(group = clap::ArgGroup::new("mode").required(true).multiple(false))]
struct Cli {
    /// Send (share) a single file
    #[arg(short = 'f', long, value_name = "FILE", group = "mode")]
    send_file: Option<PathBuf>,

    /// Receive files into the directory (also browsable)
    #[arg(short = 'd', long, value_name = "DIR", group = "mode")]
    recv_dir: Option<PathBuf>,

    /// Send text from the command line, or from stdin with '-'
    #[arg(short = 't', long, value_name = "TEXT", group = "mode")]
    send_text: Option<String>,

    /// Receive text and write it to stdout
    #[arg(short = 'p', long, group = "mode")]
    recv_text: bool,

    /// Address to bind (default: all interfaces, LAN reachable)
    #[arg(long, default_value = "0.0.0.0")]
    addr: IpAddr,

    /// Port to bind (default: OS-assigned)
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// Service path (default: a random short path; use "/" for the root)
    #[arg(long, value_name = "PATH")]
    path: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("laport=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let portal = resolve_portal(&cli)?;
    let service_path = match cli.path {
        Some(ref path) => normalize_service_path(path)?,
        None => random_path(4),
    };

    let app = routes::mount_at(routes::build_portal_router(&portal), &service_path);
    let slot = portal.text_slot();

    let server = runtime::start_server(app, cli.addr, cli.port).await?;

    // URL and QR go to stderr so `laport -p > file.txt` captures only the text
    let host = if cli.addr.is_unspecified() {
        runtime::get_local_ip().unwrap_or_else(|_| "127.0.0.1".to_string())
    } else {
        cli.addr.to_string()
    };
    let url = runtime::service_url(&host, server.port, &service_path);
    eprintln!("Visit: {url} , or scan the QR code:");
    match qr::generate_qr(&url) {
        Ok(code) => eprintln!("{code}"),
        Err(_) => eprintln!("(QR code not available)"),
    }
    tracing::info!(mode = %portal.mode(), %url, "serving");

    if let Some(slot) = slot {
        // Single-shot: first paste wins, gets printed, and the portal closes
        tokio::select! {
            text = slot.wait_filled() => {
                let mut out = std::io::stdout();
                out.write_all(text.as_bytes()).context("write received text")?;
                if !text.ends_with('\n') {
                    out.write_all(b"\n").context("write trailing newline")?;
                }
                out.flush().context("flush received text")?;
            }
            _ = tokio::signal::ctrl_c() => {}
        }
    } else {
        tokio::signal::ctrl_c().await.context("wait for interrupt")?;
    }

    server.shutdown(Duration::from_secs(3)).await;
    Ok(())
}

fn resolve_portal(cli: &Cli) -> Result<Portal> {
    if let Some(file) = &cli.send_file {
        Portal::send_file(file)
    } else if let Some(dir) = &cli.recv_dir {
        Portal::recv_files(dir)
    } else if let Some(text) = &cli.send_text {
        let text = if text == "-" {
            std::io::read_to_string(std::io::stdin()).context("read text from stdin")?
        } else {
            text.clone()
        };
        Ok(Portal::send_text(text))
    } else {
        Ok(Portal::recv_text())
    }
}

fn normalize_service_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }
    let path = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    if path.contains(|c: char| c.is_whitespace()) || path.contains(['*', ':']) {
        bail!("invalid service path: {raw}");
    }
    Ok(path)
}

/// Random short path, lowercase alphanumeric, like `/ab3f`. Obscures the
/// portal from casual port scans without pretending to be authentication.
fn random_path(len: usize) -> String {
    const CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let mut path = String::with_capacity(len + 1);
    path.push('/');
    for _ in 0..len {
        path.push(CHARS[rng.gen_range(0..CHARS.len())] as char);
    }
    path
}
