use clap::{Parser, Subcommand};
use staffdir::config::{self, DirectoryConfig};
use staffdir::context::{DocumentMetadata, InstanceMetadata, NoMetadata, RequestContext};
use staffdir::directory::{Directory, PhotoSettings, SaveRequest};
use staffdir::imaging::{CanvasSpec, RustBackend};
use staffdir::objects::FsObjectStore;
use staffdir::types::EmployeeFields;
use staffdir::{admin, batch, output, pages, store};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "staffdir")]
#[command(about = "Employee directory with photo normalization")]
#[command(long_about = "\
Employee directory with photo normalization

Records live in a SQLite database or a JSON key-value file; photos are
normalized to a fixed transparent canvas and stored in a bucket directory.

Configuration (first match wins):
  environment   PHOTOS_BUCKET, DATABASE_BACKEND, DATABASE_DB_NAME, ...
  --config      TOML file
  defaults      see 'staffdir gen-config'

Set RUST_LOG=debug for pipeline detail.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Editable employee fields; unset flags keep current values on edit.
#[derive(clap::Args, Clone)]
struct FieldArgs {
    /// Full name
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// Job title
    #[arg(long)]
    title: Option<String>,
    /// Comma-separated badge ids (coffee, trophy, bug, camera, plane, bike)
    #[arg(long)]
    badges: Option<String>,
    /// Photo to normalize and attach
    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List all employees
    List,
    /// Show one employee
    Show { id: String },
    /// Add an employee
    Add(FieldArgs),
    /// Edit an employee
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an employee
    Delete { id: String },
    /// Normalize photos (files or directories) into PNGs
    Normalize {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output directory
        #[arg(long, default_value = "normalized")]
        out: PathBuf,
        /// Canvas width (defaults to photos.canvas)
        #[arg(long)]
        width: Option<u32>,
        /// Canvas height (defaults to photos.canvas)
        #[arg(long)]
        height: Option<u32>,
    },
    /// Render every page as static HTML
    Export {
        #[arg(long, default_value = "site")]
        out: PathBuf,
    },
    /// Show instance metadata
    Info,
    /// Start a CPU stress run in the background
    Stress {
        #[arg(default_value_t = pages::STRESS_SECONDS)]
        seconds: u64,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            let config = load_config(cli.config.as_deref())?;
            let directory = open_directory(&config)?;
            output::print_employee_list(&directory.list()?);
        }
        Command::Show { id } => {
            let config = load_config(cli.config.as_deref())?;
            let directory = open_directory(&config)?;
            let view = directory
                .view(&id)?
                .ok_or_else(|| format!("no employee with id {id}"))?;
            output::print_employee(&view);
        }
        Command::Add(args) => {
            let config = load_config(cli.config.as_deref())?;
            let directory = open_directory(&config)?;
            let request = save_request(None, EmployeeFields::default(), args)?;
            let name = request.fields.full_name.clone();
            let outcome = directory.save(request)?;
            output::print_save_outcome(&outcome, &name);
        }
        Command::Edit { id, fields } => {
            let config = load_config(cli.config.as_deref())?;
            let directory = open_directory(&config)?;
            let current = directory
                .load(&id)?
                .ok_or_else(|| format!("no employee with id {id}"))?;
            let request = save_request(Some(id), EmployeeFields::from(&current), fields)?;
            let name = request.fields.full_name.clone();
            let outcome = directory.save(request)?;
            output::print_save_outcome(&outcome, &name);
        }
        Command::Delete { id } => {
            let config = load_config(cli.config.as_deref())?;
            open_directory(&config)?.delete(&id)?;
            println!("Deleted employee {id}");
        }
        Command::Normalize {
            paths,
            out,
            width,
            height,
        } => {
            // The bucket is irrelevant here, so a config that fails
            // validation only costs the configured canvas and thread cap.
            let (canvas, processing) = match load_config(cli.config.as_deref()) {
                Ok(config) => (config.photos.canvas, config.processing),
                Err(e) => {
                    log::debug!("normalizing with default settings: {e}");
                    let canvas = CanvasSpec::default();
                    (
                        [canvas.width(), canvas.height()],
                        config::ProcessingConfig::default(),
                    )
                }
            };
            let canvas = CanvasSpec::new(width.unwrap_or(canvas[0]), height.unwrap_or(canvas[1]))?;
            init_thread_pool(&processing);

            let inputs = batch::collect_inputs(&paths)?;
            let items = batch::plan_outputs(&inputs, &out);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = batch::normalize_batch(&RustBackend::new(), &items, canvas, Some(tx))?;
            printer
                .join()
                .map_err(|_| "output thread panicked")?;
            println!("{}", output::format_batch_summary(&summary));
        }
        Command::Export { out } => {
            let config = load_config(cli.config.as_deref())?;
            let directory = open_directory(&config)?;
            let ctx = request_context(&config);
            let written = pages::export_site(&directory, &ctx, &out)?;
            for line in output::format_export(&written, &out) {
                println!("{}", line);
            }
        }
        Command::Info => {
            let config = load_config(cli.config.as_deref())?;
            for line in output::format_info(&request_context(&config)) {
                println!("{}", line);
            }
        }
        Command::Stress { seconds } => {
            let config = load_config(cli.config.as_deref())?;
            let child = admin::spawn_stress(config.instance.stress_cpus, seconds)?;
            println!(
                "Started stress on {} cpus for {}s (pid {})",
                config.instance.stress_cpus,
                seconds,
                child.id()
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DirectoryConfig, config::ConfigError> {
    config::load_config(path, |key| std::env::var(key).ok())
}

/// Wire the record store, the bucket and the image backend from config.
fn open_directory(
    config: &DirectoryConfig,
) -> Result<Directory<RustBackend>, Box<dyn std::error::Error>> {
    let records = store::open_record_store(config)?;
    let objects = FsObjectStore::new(
        config.data_dir.join("objects"),
        config.photos_bucket.clone(),
        config.photos.base_url.clone(),
        config.photos.signing_secret.clone(),
    );
    Ok(Directory::new(
        Arc::from(records),
        Arc::new(objects),
        RustBackend::new(),
        PhotoSettings::from_config(&config.photos)?,
    ))
}

fn request_context(config: &DirectoryConfig) -> RequestContext {
    let source: Box<dyn InstanceMetadata> = match &config.instance.identity_document {
        Some(path) => Box::new(DocumentMetadata { path: path.clone() }),
        None => Box::new(NoMetadata),
    };
    RequestContext::populate(source.as_ref())
}

/// Overlay CLI flags on `base` and read the photo, if any.
fn save_request(
    employee_id: Option<String>,
    base: EmployeeFields,
    args: FieldArgs,
) -> std::io::Result<SaveRequest> {
    let photo = args.photo.as_deref().map(std::fs::read).transpose()?;
    Ok(SaveRequest {
        employee_id,
        fields: EmployeeFields {
            full_name: args.name.unwrap_or(base.full_name),
            location: args.location.unwrap_or(base.location),
            job_title: args.title.unwrap_or(base.job_title),
            badges: args.badges.unwrap_or(base.badges),
        },
        photo,
    })
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
