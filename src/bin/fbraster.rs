use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "fbraster", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON scene to a PNG.
    Render(RenderArgs),
    /// Print the header and ranges of a font file.
    FontInfo(FontInfoArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Engine to draw with.
    #[arg(long, value_enum, default_value_t = EngineChoice::Sync)]
    engine: EngineChoice,
}

#[derive(Parser, Debug)]
struct FontInfoArgs {
    /// Input font file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EngineChoice {
    Sync,
    Async1,
    Async2,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::FontInfo(args) => cmd_font_info(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<fbraster::Scene> {
    let json =
        fs::read_to_string(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let scene = fbraster::Scene::from_json(&json).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn make_context(choice: EngineChoice) -> anyhow::Result<fbraster::RenderContext> {
    let mut opts = fbraster::EngineOpts::from_env();
    let kind = match choice {
        EngineChoice::Sync => fbraster::EngineKind::Sync,
        EngineChoice::Async1 => {
            opts.async_engine = opts.async_engine.with_workers(1);
            fbraster::EngineKind::Async
        }
        EngineChoice::Async2 => {
            opts.async_engine = opts.async_engine.with_workers(2);
            fbraster::EngineKind::Async
        }
    };
    Ok(fbraster::RenderContext::with_kind(kind, &opts)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    scene.validate()?;

    let scene_dir = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let fonts = scene.load_fonts(scene_dir)?;

    let mut ctx = make_context(args.engine)?;
    let buf = scene
        .render(&mut ctx, &fonts)
        .with_context(|| format!("render scene '{}'", args.in_path.display()))?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    buf.to_rgba_image()
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({})", args.out.display(), ctx.engine_name());
    Ok(())
}

fn cmd_font_info(args: FontInfoArgs) -> anyhow::Result<()> {
    let font = fbraster::Font::load(&args.in_path)
        .with_context(|| format!("load font '{}'", args.in_path.display()))?;

    println!("name:         {}", font.name);
    println!("default size: {}", font.default_size);
    println!("antialias:    {}", font.recommend_aa);
    println!("bitmap bytes: {}", font.bitmap().len());
    println!("ranges:       {}", font.ranges().len());
    for range in font.ranges() {
        let kind = match &range.kind {
            fbraster::RangeKind::Mono { width, height, bpp } => {
                format!("mono {width}x{height} {bpp}bpp")
            }
            fbraster::RangeKind::Variable { height, bpp, .. } => {
                format!("variable h{height} {bpp}bpp")
            }
        };
        println!(
            "  U+{:04X}..=U+{:04X}  {kind}  {} glyphs, {} bytes",
            range.start,
            range.end,
            range.glyph_count(),
            range.bitmap_len()
        );
    }
    Ok(())
}
