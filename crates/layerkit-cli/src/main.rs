//! LayerKit CLI - Command line client for the image-layering service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use layerkit_client::{
    BuildMode, ClientConfig, DirectoryDownloader, DownloadPolicy, TaskId, TaskStatus,
    TransferClient, UploadFile, UploadRequest, Url, DEFAULT_NUM_LAYERS, DEV_ORIGIN,
};
use layerkit_core::{layer_file_name, psd_file_name};

mod output;
#[cfg(test)]
mod test_service;

use output::{JsonEvent, JsonEventType};

/// LayerKit CLI - Split images into editable layers
#[derive(Parser)]
#[command(name = "layerkit")]
#[command(about = "CLI for the LayerKit image-layering service", long_about = None)]
struct Cli {
    /// Service endpoints: development or production (defaults to the build profile)
    #[arg(short, long, global = true)]
    mode: Option<BuildMode>,

    /// Deployment origin, required in production mode
    #[arg(short, long, global = true)]
    origin: Option<Url>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UploadArgs {
    /// Image to split (PNG or JPEG)
    path: PathBuf,

    /// Number of layers to ask for
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_LAYERS)]
    layers: u32,

    /// Hint for the layering model
    #[arg(short, long, default_value = "")]
    prompt: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and start a layering task
    Upload(UploadArgs),

    /// Get task status
    Status {
        /// Task ID
        task_id: String,
    },

    /// Download the layered PSD of a completed task
    Download {
        /// Task ID
        task_id: String,

        /// Directory to save into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Fail instead of saving the body when the server returns an error status
        #[arg(long)]
        strict: bool,
    },

    /// Download a single layer image
    Layer {
        /// Layer URL
        url: String,

        /// File name without the .png extension
        name: String,

        /// Directory to save into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Check service health
    Health,

    /// Upload, wait for the task to finish, and download the result
    Run {
        #[command(flatten)]
        upload: UploadArgs,

        /// Seconds between status checks
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..=3600))]
        interval: u64,

        /// Seconds to wait before giving up
        #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..=86_400))]
        timeout: u64,

        /// Directory to save into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Also save every layer as PNG
        #[arg(long)]
        with_layers: bool,

        /// Fail instead of saving the body when the server returns an error status
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("layerkit=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mode = cli.mode.unwrap_or_default();
    let mut config = ClientConfig::for_mode(mode);
    if let Some(origin) = &cli.origin {
        config = config.with_origin(origin.clone());
    }
    let layer_origin = match (&cli.origin, mode) {
        (Some(origin), _) => Some(origin.clone()),
        (None, BuildMode::Development) => Url::parse(DEV_ORIGIN).ok(),
        (None, BuildMode::Production) => None,
    };

    match cli.command {
        Commands::Upload(args) => {
            let client = connect(config, PathBuf::from("."), layer_origin)?;
            upload(&client, args, cli.json).await?;
        }
        Commands::Status { task_id } => {
            let client = connect(config, PathBuf::from("."), layer_origin)?;
            status(&client, TaskId::new(task_id), cli.json).await?;
        }
        Commands::Download {
            task_id,
            out_dir,
            strict,
        } => {
            let config = config.with_download_policy(policy(strict));
            let client = connect(config, out_dir.clone(), layer_origin)?;
            let task_id = TaskId::new(task_id);
            client.download_psd(&task_id).await?;
            println!("Saved {}", out_dir.join(psd_file_name(task_id.as_str())).display());
        }
        Commands::Layer { url, name, out_dir } => {
            let client = connect(config, out_dir.clone(), layer_origin)?;
            client.download_layer_png(&url, &name).await?;
            println!("Saved {}", out_dir.join(layer_file_name(&name)).display());
        }
        Commands::Health => {
            let client = connect(config, PathBuf::from("."), layer_origin)?;
            let health = client.health().await?;
            if cli.json {
                output::print_json(&health)?;
            } else {
                output::print_health(&health);
            }
        }
        Commands::Run {
            upload,
            interval,
            timeout,
            out_dir,
            with_layers,
            strict,
        } => {
            let config = config.with_download_policy(policy(strict));
            let client = connect(config, out_dir.clone(), layer_origin)?;
            let options = RunOptions {
                interval: Duration::from_secs(interval),
                timeout: Duration::from_secs(timeout),
                out_dir,
                with_layers,
                json: cli.json,
            };
            run(&client, upload, options).await?;
        }
    }

    Ok(())
}

fn policy(strict: bool) -> DownloadPolicy {
    if strict {
        DownloadPolicy::Strict
    } else {
        DownloadPolicy::Passthrough
    }
}

fn connect(
    config: ClientConfig,
    out_dir: PathBuf,
    layer_origin: Option<Url>,
) -> Result<TransferClient, Box<dyn std::error::Error>> {
    let mut downloader = DirectoryDownloader::new(out_dir);
    if let Some(origin) = layer_origin {
        downloader = downloader.with_origin(origin);
    }
    Ok(TransferClient::new(config, Arc::new(downloader))?)
}

async fn upload_request(args: UploadArgs) -> Result<UploadRequest, Box<dyn std::error::Error>> {
    let file = UploadFile::from_path(&args.path).await?;
    Ok(UploadRequest::new(file)
        .with_num_layers(args.layers)
        .with_prompt(args.prompt))
}

async fn upload(
    client: &TransferClient,
    args: UploadArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = upload_request(args).await?;
    let response = client.upload_image(request).await?;

    if json {
        output::print_json(&response)?;
    } else {
        output::print_upload(&response);
    }
    Ok(())
}

async fn status(
    client: &TransferClient,
    task_id: TaskId,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let task = client.get_task_status(&task_id).await?;

    if json {
        output::print_json(&task)?;
    } else {
        output::print_task(task_id.as_str(), &task);
    }
    Ok(())
}

struct RunOptions {
    interval: Duration,
    timeout: Duration,
    out_dir: PathBuf,
    with_layers: bool,
    json: bool,
}

async fn run(
    client: &TransferClient,
    args: UploadArgs,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = upload_request(args).await?;
    let upload = client.upload_image(request).await?;
    let task_id = upload.task_id.clone();

    if options.json {
        JsonEvent::new(JsonEventType::Uploaded, &upload)?.emit()?;
    } else {
        output::print_upload(&upload);
    }

    let deadline = Instant::now()
        .checked_add(options.timeout)
        .ok_or("Timeout is too large")?;
    let task = loop {
        let task = client.get_task_status(&task_id).await?;
        if options.json {
            JsonEvent::new(JsonEventType::Status, &task)?.emit()?;
        }
        if task.is_terminal() {
            break task;
        }
        let next_poll = Instant::now().checked_add(options.interval);
        if next_poll.map_or(true, |next| next > deadline) {
            return Err(format!(
                "Task {} still {} after {:?}",
                task_id, task.status, options.timeout
            )
            .into());
        }

        info!(task_id = %task_id, status = %task.status, "Waiting for task");
        tokio::time::sleep(options.interval).await;
    };

    if !options.json {
        output::print_task(task_id.as_str(), &task);
    }
    if task.status == TaskStatus::Failed {
        let reason = task.failure().unwrap_or("no reason given");
        return Err(format!("Task {} failed: {}", task_id, reason).into());
    }
    if task.layers().is_empty() {
        return Err(format!("Task {} finished without layers", task_id).into());
    }

    client.download_psd(&task_id).await?;
    saved(&options, options.out_dir.join(psd_file_name(task_id.as_str())))?;

    if options.with_layers {
        for layer in task.layers() {
            client.download_layer_png(&layer.url, &layer.name).await?;
            saved(&options, options.out_dir.join(layer.png_file_name()))?;
        }
    }

    Ok(())
}

fn saved(options: &RunOptions, path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if options.json {
        let data = serde_json::json!({ "path": path.display().to_string() });
        JsonEvent::new(JsonEventType::Saved, &data)?.emit()?;
    } else {
        println!("Saved {}", path.display());
    }
    Ok(())
}
