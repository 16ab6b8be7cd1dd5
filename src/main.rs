use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use sightings::catalog;
use sightings::config::Config;
use sightings::device::{resolve_location, FixedLocation, LocationProvider, NoLocation};
use sightings::logging;
use sightings::media::{MediaDirectory, PhotoRef};
use sightings::state::{CommentManager, Library, LoadReport, Location, Match, Scope};
use sightings::Journal;

/// Record wildlife sightings as comments on catalog animals
#[derive(Debug, Parser)]
#[command(name = "sightings", version)]
struct Cli {
    /// Directory holding the comment database and saved photos
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog item to comment on (default: your profile list)
    #[arg(long, global = true)]
    item: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the animals in the catalog
    Catalog,
    /// Show comments, optionally filtered by a keyword
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Add a comment
    Add {
        text: String,
        #[command(flatten)]
        position: Position,
        /// Image file to attach, or a photo URI
        #[arg(long)]
        photo: Option<String>,
        /// Copy the image into the media directory instead of embedding it
        #[arg(long, requires = "photo")]
        link: bool,
    },
    /// Replace the text (and location) of a comment
    Edit {
        index: usize,
        text: String,
        #[command(flatten)]
        position: Position,
    },
    /// Delete a comment and release its photo
    Delete { index: usize },
    /// Attach a photo to a comment
    Attach {
        index: usize,
        /// Image file, or a photo URI
        photo: String,
        /// Copy the image into the media directory instead of embedding it
        #[arg(long)]
        link: bool,
    },
    /// Print the share message of a comment
    Share { index: usize },
}

/// Where the sighting was made
#[derive(Debug, clap::Args)]
struct Position {
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl Position {
    async fn resolve(&self) -> Result<Option<Location>> {
        let provider: Box<dyn LocationProvider> = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Box::new(FixedLocation(Location::new(lat, lon)?)),
            _ => Box::new(NoLocation),
        };
        Ok(resolve_location(provider.as_ref()).await)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // The catalog is static; no need to touch the store
    if let Command::Catalog = cli.command {
        print_catalog();
        return Ok(());
    }

    let scope = match &cli.item {
        Some(id) if catalog::find(id).is_none() => bail!("unknown catalog item '{id}'"),
        Some(id) => Scope::item(id.as_str()),
        None => Scope::Profile,
    };

    let config = Config::resolve(cli.data_dir.as_deref())?;
    config.ensure_dirs()?;
    let library = Library::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let media = MediaDirectory::new(&config.media_dir);
    let journal = Journal::new(Arc::new(library), Arc::new(media.clone()));

    let (mut manager, report) = journal.open(scope).await;
    if let LoadReport::Recovered(err) = report {
        eprintln!("warning: {err}; starting with an empty list");
    }

    run(cli.command, &mut manager, &media).await?;
    manager.flush().await?;
    Ok(())
}

async fn run(command: Command, manager: &mut CommentManager, media: &MediaDirectory) -> Result<()> {
    match command {
        Command::Catalog => print_catalog(),
        Command::List { filter } => {
            let matches = manager.search(filter.as_deref().unwrap_or(""));
            if matches.is_empty() {
                println!("No comments.");
            }
            for m in &matches {
                print_match(m);
            }
        }
        Command::Add {
            text,
            position,
            photo,
            link,
        } => {
            let location = position.resolve().await?;
            let photo = match photo {
                Some(spec) => Some(load_photo(&spec, link, media).await?),
                None => None,
            };
            let index = manager.add(&text, location, photo)?.confirm().await?;
            println!("Added comment [{index}].");
        }
        Command::Edit {
            index,
            text,
            position,
        } => {
            let location = position.resolve().await?;
            manager.begin_edit(index)?;
            manager.commit_edit(&text, location)?.confirm().await?;
            println!("Updated comment [{index}].");
        }
        Command::Delete { index } => {
            let (removed, report) = manager.delete(index)?.settle().await;
            report.persisted?;
            if let Some(Err(err)) = report.asset_release {
                eprintln!("warning: {err}");
            }
            println!("Deleted \"{}\".", removed.text);
        }
        Command::Attach { index, photo, link } => {
            let photo = load_photo(&photo, link, media).await?;
            manager.attach_photo(index, photo)?.confirm().await?;
            println!("Attached photo to comment [{index}].");
        }
        Command::Share { index } => {
            let record = manager
                .get(index)
                .with_context(|| format!("no comment at index {index}"))?;
            match record.share_message() {
                Some(message) => println!("{message}"),
                None => bail!("location is not available for this comment"),
            }
        }
    }
    Ok(())
}

/// A local image file is embedded (or copied with `link`); anything else is kept as a URI
async fn load_photo(spec: &str, link: bool, media: &MediaDirectory) -> Result<PhotoRef> {
    let path = Path::new(spec);
    if !path.is_file() {
        if link {
            bail!("{spec} is not a file");
        }
        return Ok(PhotoRef::from(spec));
    }
    if link {
        return Ok(media.import(path).await?);
    }
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {spec}"))?;
    Ok(PhotoRef::inline(&bytes)?)
}

fn print_catalog() {
    for item in catalog::catalog() {
        println!("{:<12} {:<10} {}", item.id, item.title, item.country);
    }
}

fn print_match(m: &Match<'_>) {
    let record = m.record;
    println!("[{}] {}  {}", m.index, record.created_at, record.text);
    if let Some(location) = &record.location {
        println!("    at {}, {}", location.coords.latitude, location.coords.longitude);
    }
    if let Some(photo) = &record.photo {
        println!("    photo {photo}");
    }
}
