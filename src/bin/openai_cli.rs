//! openai-cli: smoke-test tool for the openai-kit client.
//!
//! Usage:
//!   openai-cli models                         List available models
//!   openai-cli model <id>                     Show one model
//!   openai-cli complete <prompt> [--max <n>]  Create a completion with text-davinci-003
//!   openai-cli image <prompt>                 Generate one image and print its URL

use openai_kit::{CompletionModel, CompletionRequest, CreateImageRequest, OpenAiClient, Prompt};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let command = args[1].as_str();
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    if matches!(command, "version" | "--version" | "-V") {
        println!("openai-cli {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let client = match OpenAiClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        "models" => cmd_models(&client).await,
        "model" => match args.get(2) {
            Some(id) => cmd_model(&client, id).await,
            None => Err("missing model id".to_string()),
        },
        "complete" => match args.get(2) {
            Some(prompt) => cmd_complete(&client, prompt, parse_max(&args[3..])).await,
            None => Err("missing prompt".to_string()),
        },
        "image" => match args.get(2) {
            Some(prompt) => cmd_image(&client, prompt).await,
            None => Err("missing prompt".to_string()),
        },
        other => Err(format!("unknown command: {other}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!(
        r#"openai-cli — openai-kit smoke-test tool

USAGE:
    openai-cli <COMMAND> [OPTIONS]

COMMANDS:
    models                       List available models
    model <id>                   Show one model
    complete <prompt> [--max N]  Create a completion (text-davinci-003)
    image <prompt>               Generate an image and print its URL
    version                      Show version information
    help                         Show this help message

ENVIRONMENT:
    OPENAI_API_KEY               API key (required unless stored in the keyring)
    OPENAI_ORGANIZATION          Organization id (optional)
    OPENAI_HTTP_TIMEOUT_SECS     Request timeout (default 30)
    RUST_LOG                     Log filter, e.g. openai_kit=debug"#
    );
}

fn parse_max(args: &[String]) -> Option<u32> {
    args.iter()
        .position(|a| a == "--max")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

async fn cmd_models(client: &OpenAiClient) -> Result<(), String> {
    let models = client.models().list().await.map_err(|e| e.to_string())?;
    for model in models {
        println!("{:<40} {}", model.id, model.owned_by);
    }
    Ok(())
}

async fn cmd_model(client: &OpenAiClient, id: &str) -> Result<(), String> {
    let model = client.models().retrieve(id).await.map_err(|e| e.to_string())?;
    println!("{}", model);
    println!("  owned_by: {}", model.owned_by);
    if let Some(perms) = &model.permission {
        for p in perms {
            println!(
                "  permission {} (created {}, sampling: {}, fine_tuning: {})",
                p.id, p.created, p.allow_sampling, p.allow_fine_tuning
            );
        }
    }
    Ok(())
}

async fn cmd_complete(client: &OpenAiClient, prompt: &str, max: Option<u32>) -> Result<(), String> {
    let mut request =
        CompletionRequest::new(CompletionModel::Davinci).prompt(&Prompt::Basic(prompt.to_string()));
    if let Some(max) = max {
        request = request.max_tokens(max);
    }
    let choices = client
        .completions()
        .create(request)
        .await
        .map_err(|e| e.to_string())?;
    for choice in choices {
        println!("[{}] {}", choice.index, choice.text.trim());
    }
    Ok(())
}

async fn cmd_image(client: &OpenAiClient, prompt: &str) -> Result<(), String> {
    let images = client
        .images()
        .create(CreateImageRequest::new(prompt).n(1))
        .await
        .map_err(|e| e.to_string())?;
    for image in images {
        match image.url() {
            Some(url) => println!("{}", url),
            None => println!("<inline image data>"),
        }
    }
    Ok(())
}
