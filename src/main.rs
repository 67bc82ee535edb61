use clap::{Parser, Subcommand};
use estate_media::config::{self, Preset};
use estate_media::documents;
use estate_media::imaging::RustCodec;
use estate_media::output;
use estate_media::sources;
use estate_media::types::Folder;
use estate_media::upload::Uploader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "estate-media")]
#[command(about = "Compress listing photos into JPEG data URIs for the site's documents")]
#[command(long_about = "\
Compress listing photos into JPEG data URIs for the site's documents

Every image is scaled so its longer side is at most the configured maximum,
then re-encoded as JPEG at decreasing quality until the base64 payload fits
the byte budget. Files are processed one at a time; the first failure aborts
the batch.

Folders:

  projects       project photos  (appended to a project's \"images\")
  gallery        gallery items   (written as gallery entries)
  floor-plans    floor plans     (appended to a project's \"floorPlans\")

Results are written as JSON to --out. With --project, the data URIs are also
appended to that project document in place.

Run 'estate-media gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the preset the config is built from
    #[arg(long, value_enum, global = true)]
    preset: Option<Preset>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct UploadArgs {
    /// Image files or directories to upload
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Destination folder, recorded in each logical path
    #[arg(long, value_enum)]
    folder: Folder,

    /// Where to write the results
    #[arg(long, default_value = "uploads.json")]
    out: PathBuf,

    /// Project document (JSON) to append the data URIs to
    #[arg(long)]
    project: Option<PathBuf>,

    /// Category for gallery items
    #[arg(long)]
    category: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images and write their data URIs
    Upload(UploadArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Load and validate the config, then print the effective values
    CheckConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::CheckConfig => {
            let app_config = config::load_config(cli.config.as_deref(), cli.preset)?;
            for line in output::format_config(&app_config) {
                println!("{}", line);
            }
        }
        Command::Upload(args) => {
            let app_config = config::load_config(cli.config.as_deref(), cli.preset)?;
            init_logging(&app_config.logging.level);
            upload(args, &app_config)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so stdout
/// stays readable.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn upload(args: UploadArgs, app_config: &config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let collected = sources::collect_image_paths(&args.paths)?;
    for path in &collected.skipped {
        println!("Skipping {} (not a supported image)", path.display());
    }
    if collected.images.is_empty() {
        println!("No images to upload");
        return Ok(());
    }

    let uploader = Uploader::new(RustCodec::new(), &app_config.compression);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_upload_event(&event) {
                println!("{}", line);
            }
        }
    });
    let outcome = uploader.upload_paths(&collected.images, args.folder, Some(tx));
    printer.join().ok();
    let results = outcome?;

    match args.folder {
        Folder::Gallery => {
            let items = documents::gallery_items(&results, args.category.as_deref());
            documents::save_json(&args.out, &items)?;
        }
        Folder::Projects | Folder::FloorPlans => {
            documents::save_json(&args.out, &results)?;
        }
    }
    println!("Wrote {} results to {}", results.len(), args.out.display());

    if let Some(project_path) = &args.project {
        let mut project = documents::load_project(project_path)?;
        let added = documents::attach_to_project(&mut project, args.folder, &results);
        documents::save_json(project_path, &project)?;
        println!("Added {} images to {}", added, project_path.display());
    }

    Ok(())
}
