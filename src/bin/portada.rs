use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use portada::{
    ComposerConfig, CoverSession, CoverState, DirectorySink, DurationClass, FontSet, ImageSlot,
    ThemeKey, ToneKey, open_store,
};

#[derive(Parser, Debug)]
#[command(name = "portada", version, about = "Vertical cover thumbnail composer")]
struct Cli {
    /// Log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose the cover and write `<business>_thumbnail.png` at export density.
    Export(ExportArgs),
    /// Print the voice-over script.
    Script(CoverArgs),
    /// Print the layer stack as JSON.
    Layers(CoverArgs),
    /// List theme keys with their headline and subhead.
    Themes,
    /// Ingest an image into a slot and mirror it into the store (face and logo only).
    Upload(UploadArgs),
}

#[derive(Args, Debug)]
struct CoverArgs {
    /// Cover state JSON; missing fields take their defaults.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Composer config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store file for mirrored images (overrides the config).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Apply a theme (replaces headline and subhead).
    #[arg(long)]
    theme: Option<ThemeKey>,

    /// Business name.
    #[arg(long)]
    business: Option<String>,

    /// City.
    #[arg(long)]
    city: Option<String>,

    /// Overlay tone (warm, cool, neutral).
    #[arg(long)]
    tone: Option<ToneKey>,

    /// Script duration (short/45 or extended/120).
    #[arg(long)]
    duration: Option<DurationClass>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    cover: CoverArgs,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Foreground portrait image.
    #[arg(long)]
    face: Option<PathBuf>,

    /// Background photo.
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Logo image.
    #[arg(long)]
    logo: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UploadArgs {
    /// Store file to mirror into.
    #[arg(long)]
    store: PathBuf,

    /// Target slot (face, entrepreneur, logo).
    #[arg(long)]
    slot: ImageSlot,

    /// Image file.
    #[arg(long)]
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Script(args) => cmd_script(args),
        Command::Layers(args) => cmd_layers(args),
        Command::Themes => cmd_themes(),
        Command::Upload(args) => cmd_upload(args),
    }
}

fn open_session(args: &CoverArgs) -> anyhow::Result<CoverSession> {
    let mut config = match &args.config {
        Some(path) => ComposerConfig::from_path(path)?,
        None => ComposerConfig::default(),
    };
    if let Some(store) = &args.store {
        config.store_path = Some(store.clone());
    }
    let mut state = match &args.state {
        Some(path) => CoverState::from_path(path)?,
        None => CoverState::default(),
    };
    if let Some(theme) = args.theme {
        state.apply_theme(theme);
    }
    if let Some(business) = &args.business {
        state.business_name = business.clone();
    }
    if let Some(city) = &args.city {
        state.city = city.clone();
    }
    if let Some(tone) = args.tone {
        state.tone_key = tone;
    }
    if let Some(duration) = args.duration {
        state.duration_class = duration;
    }

    let store = open_store(&config)?;
    let fonts = FontSet::load(&config.fonts);
    Ok(CoverSession::with_fonts(config, store, fonts, state)?)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.cover)?;
    for (slot, path) in [
        (ImageSlot::CrissFace, &args.face),
        (ImageSlot::Entrepreneur, &args.photo),
        (ImageSlot::Logo, &args.logo),
    ] {
        if let Some(path) = path {
            if !session.upload(slot, path) {
                anyhow::bail!("could not load image '{}'", path.display());
            }
        }
    }

    session.mount_preview().context("paint preview")?;
    let mut sink = DirectorySink::new(&args.out);
    let artifact = session
        .export(&mut sink)
        .context("export failed (run with -v for details)")?;
    let written = sink.last_path().unwrap_or(args.out.as_path());
    eprintln!(
        "wrote {} ({}x{})",
        written.display(),
        artifact.width,
        artifact.height
    );
    Ok(())
}

fn cmd_script(args: CoverArgs) -> anyhow::Result<()> {
    let session = open_session(&args)?;
    println!("{}", session.script());
    Ok(())
}

fn cmd_layers(args: CoverArgs) -> anyhow::Result<()> {
    let session = open_session(&args)?;
    let json = serde_json::to_string_pretty(session.stack()).context("serialize layer stack")?;
    println!("{json}");
    Ok(())
}

fn cmd_themes() -> anyhow::Result<()> {
    for key in ThemeKey::ALL {
        let theme = key.theme();
        println!("{key}\t{}\t{}", theme.title, theme.subtitle);
    }
    Ok(())
}

fn cmd_upload(args: UploadArgs) -> anyhow::Result<()> {
    let config = ComposerConfig {
        store_path: Some(args.store.clone()),
        ..ComposerConfig::default()
    };
    let store = open_store(&config)?;
    let mut session =
        CoverSession::with_fonts(config, store, FontSet::empty(), CoverState::default())?;
    if !session.upload(args.slot, &args.file) {
        anyhow::bail!("could not load image '{}'", args.file.display());
    }
    if portada::mirror_key(args.slot).is_none() {
        eprintln!("note: the {:?} slot is not persisted", args.slot);
    }
    eprintln!("stored {}", args.file.display());
    Ok(())
}
