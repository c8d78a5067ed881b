// Command-line upload client for the extraction API.

use anyhow::Result;
use clap::Parser;
use pdf_extraction::{ClientError, UploadClient};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdf_client", about = "Extract headings and a summary from a PDF")]
struct Args {
    /// PDF file to upload (max 10MB)
    file: PathBuf,

    /// Base URL of the extraction server
    #[arg(long, env = "PDF_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Print the text exactly as returned, without markdown cleanup
    #[arg(long)]
    raw: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let client = UploadClient::new(&args.server);

    let upload = match client.prepare(&args.file).await {
        Ok(upload) => upload,
        Err(ClientError::Invalid(e)) => {
            eprintln!("{}", e.kind().message().to_uppercase());
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    let result = match client.submit(upload).await {
        Ok(result) => result,
        Err(ClientError::Rejected { status, kind, message }) => {
            match kind {
                Some(kind) => eprintln!("{} ({}, {})", message, status, kind),
                None => eprintln!("{} ({})", message, status),
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let result = if args.raw { result } else { result.cleaned() };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("FILE: {}", result.filename);
    println!("\nHEADINGS ({})", result.headings.len());
    for (i, heading) in result.headings.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, heading);
    }
    println!("\nSUMMARY\n{}", result.summary);

    Ok(())
}
