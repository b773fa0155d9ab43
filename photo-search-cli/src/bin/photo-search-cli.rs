use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_std::io::prelude::BufReadExt;
use async_std::stream::StreamExt;
use structopt::StructOpt;

use photo_search::page::SelectedFile;
use photo_search::render::ResultsView;
use photo_search::templates::Templates;
use photo_search::{ApiClient, ApiConfig, App, ConfigUpdate};

#[derive(StructOpt)]
struct SharedApiArgs {
    /// Photo search API base URL
    #[structopt(long, env = "PHOTO_SEARCH_API_ENDPOINT")]
    endpoint: String,
    /// Photo search API key
    #[structopt(long, env = "PHOTO_SEARCH_API_KEY", hide_env_values = true)]
    api_key: String,
    /// Region the API is deployed in.
    #[structopt(long, default_value = "us-east-1", env = "PHOTO_SEARCH_REGION")]
    region: String,
}

impl SharedApiArgs {
    fn into_app(self) -> App {
        let config = ApiConfig {
            endpoint: self.endpoint,
            api_key: self.api_key,
            region: self.region,
        };
        App::new(ApiClient::new(config))
    }
}

#[derive(StructOpt)]
pub struct SearchArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Write the rendered page to this file instead of stdout.
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Words to search for.
    #[structopt(name = "QUERY", required = true)]
    query: Vec<String>,
}

#[derive(StructOpt)]
pub struct UploadArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Write the rendered page to this file instead of stdout.
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Extra labels to index the photo under, comma-separated.
    #[structopt(long)]
    labels: Option<String>,

    /// Path to photo file to upload.
    #[structopt(name = "PATH", parse(from_os_str))]
    file_path: PathBuf,
}

#[derive(StructOpt)]
pub struct ShellArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Rewrite the rendered page to this file after every command.
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,
}

#[derive(StructOpt)]
pub enum Command {
    Search(SearchArgs),
    Upload(UploadArgs),
    Shell(ShellArgs),
}

const SHELL_HELP: &str = "\
commands:
  search <query>   search for photos
  select [path]    pick the photo to upload, or clear the selection
  labels [text]    set the custom labels for the next upload
  upload           upload the selected photo
  config <json>    update the API configuration, e.g. {\"apiKey\": \"...\"}
  show             print the rendered page
  help             show this message
  quit             leave the shell";

async fn write_page(app: &App, templates: &Templates, output: Option<&Path>) -> anyhow::Result<()> {
    let html = templates.render_page(&app.snapshot())?;
    match output {
        Some(path) => {
            let target = path.to_path_buf();
            async_std::task::spawn_blocking(move || std::fs::write(target, html))
                .await
                .with_context(|| format!("couldn't write page to {}", path.display()))?
        },
        None => println!("{}", html),
    }

    Ok(())
}

fn fail_on_error(app: &App) -> anyhow::Result<()> {
    match app.snapshot().error {
        Some(banner) => Err(anyhow::anyhow!(banner.message)),
        None => Ok(()),
    }
}

async fn search(args: SearchArgs) -> anyhow::Result<()> {
    let templates = Templates::new()?;
    let app = args.api_arguments.into_app();

    app.handle_search(&args.query.join(" ")).await;

    write_page(&app, &templates, args.output.as_deref()).await?;
    fail_on_error(&app)
}

async fn upload(args: UploadArgs) -> anyhow::Result<()> {
    let templates = Templates::new()?;
    let app = args.api_arguments.into_app();

    let file_path = &args.file_path;
    let file = SelectedFile::from_path(file_path)
        .await
        .with_context(|| format!("couldn't read {}", file_path.display()))?;
    app.select_file(Some(file));
    if let Some(labels) = args.labels {
        app.set_custom_labels(labels);
    }

    app.handle_upload().await;

    write_page(&app, &templates, args.output.as_deref()).await?;
    fail_on_error(&app)
}

fn print_status(app: &App) {
    let page = app.snapshot();
    if let Some(error) = page.error {
        eprintln!("error: {}", error.message);
    }
    for banner in page.successes {
        println!("{}", banner.message);
    }
    match page.results {
        Some(ResultsView::Empty) => println!("No photos found matching your search."),
        Some(ResultsView::Cards(cards)) => {
            for card in cards {
                println!("{}  [{}]", card.image_url, card.labels_html.join(", "));
            }
        },
        None => {},
    }
}

async fn run_command(app: &App, templates: &Templates, line: &str) -> anyhow::Result<bool> {
    let line = line.trim();
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => return Ok(true),
        "search" => app.handle_search(rest).await,
        "select" if rest.is_empty() => app.select_file(None),
        "select" => match SelectedFile::from_path(rest).await {
            Ok(file) => {
                println!("selected {} ({})", file.name, file.media_type);
                app.select_file(Some(file));
            },
            Err(err) => tracing::warn!(path = rest, error = %err, "couldn't read photo"),
        },
        "labels" => app.set_custom_labels(rest),
        "upload" => app.handle_upload().await,
        "config" => match serde_json::from_str::<ConfigUpdate>(rest) {
            Ok(update) => app.update_config(update),
            Err(err) => tracing::warn!(error = %err, "invalid configuration"),
        },
        "show" => {
            write_page(app, templates, None).await?;
            return Ok(true);
        },
        "help" => {
            println!("{}", SHELL_HELP);
            return Ok(true);
        },
        "quit" | "exit" => return Ok(false),
        other => {
            tracing::warn!(command = other, "unknown command, try help");
            return Ok(true);
        },
    }

    print_status(app);
    Ok(true)
}

async fn shell(args: ShellArgs) -> anyhow::Result<()> {
    let templates = Templates::new()?;
    let app = args.api_arguments.into_app();

    let stdin = async_std::io::BufReader::new(async_std::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next().await {
            Some(line) => line?,
            None => break,
        };
        tracing::debug!(%line, "shell command");
        if !run_command(&app, &templates, &line).await? {
            break;
        }
        if let Some(output) = args.output.as_deref() {
            write_page(&app, &templates, Some(output)).await?;
        }
    }

    Ok(())
}

#[async_std::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    photo_search::telemetry::init()?;

    match Command::from_args() {
        Command::Search(args) => search(args).await,
        Command::Upload(args) => upload(args).await,
        Command::Shell(args) => shell(args).await,
    }
}
