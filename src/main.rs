use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tsx_kit::{collect_images, AssetPath, CollectionBuilder, FileProtocol, Settings, Tileset, Validator};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// YAML settings file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Checks tilesets for duplicate ids, bad tile counts and missing or mis-sized images
    Check(Check),
    /// Prints a tileset and the resolved location of every tile image
    Show(Show),
    /// Rewrites a tileset in the layout Tiled saves
    Format(Format),
    /// Builds a collection-of-images tileset from directories of images
    Collect(Collect),
}

#[derive(Args)]
struct Check {
    /// Tilesets to check
    #[clap(required = true, value_parser)]
    tilesets: Vec<PathBuf>,

    /// Only check the document, not the images it references
    #[clap(long)]
    skip_images: bool,
}

#[derive(Args)]
struct Show {
    #[clap(value_parser)]
    tileset: PathBuf,
}

#[derive(Args)]
struct Format {
    #[clap(value_parser)]
    tileset: PathBuf,

    /// Output path. Prints to stdout when absent
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct Collect {
    /// Directories to search for images
    #[clap(required = true, value_parser)]
    dirs: Vec<PathBuf>,

    /// Where the tileset will be written. Image sources are made relative to it
    #[clap(short, long, value_parser)]
    output: PathBuf,

    /// Name of the tileset. Defaults to the output file's stem
    #[clap(short, long)]
    name: Option<String>,

    /// Extensions of image files in the directories
    #[clap(long)]
    extensions: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    #[cfg(feature = "profile")]
    let _guard = {
        use tracing_subscriber::prelude::*;
        let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
        tracing_subscriber::registry().with(chrome_layer).init();
        guard
    };

    let succeeded = run(Cli::parse())?;
    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Runs a subcommand. False when a checked tileset has errors.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path).with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    match cli.subcmd {
        SubCommand::Check(args) => check(args, settings),
        SubCommand::Show(args) => show(args).map(|_| true),
        SubCommand::Format(args) => format(args).map(|_| true),
        SubCommand::Collect(args) => collect(args, settings).map(|_| true),
    }
}

fn check(args: Check, settings: Settings) -> anyhow::Result<bool> {
    let mut check_settings = settings.check;
    if args.skip_images {
        check_settings.images = false;
    }
    let validator = Validator::with_settings(&FileProtocol, check_settings);
    let mut failed = false;
    for path in &args.tilesets {
        let path = AssetPath::from_path(path);
        let tileset = match Tileset::load(&path, &FileProtocol) {
            Ok(tileset) => tileset,
            Err(err) => {
                println!("{path}: error: {err}");
                failed = true;
                continue;
            },
        };
        let report = validator.validate(&tileset, &path);
        for issue in &report.issues {
            println!("{path}: {issue}");
        }
        if report.is_ok() {
            println!("{path}: ok ({} tiles)", tileset.tiles.len());
        }
        else {
            failed = true;
        }
    }
    Ok(!failed)
}

fn show(args: Show) -> anyhow::Result<()> {
    let path = AssetPath::from_path(&args.tileset);
    let tileset = Tileset::load(&path, &FileProtocol)?;
    println!("name: {}", tileset.name);
    println!("version: {} (tiled {})", tileset.version, tileset.tiled_version);
    println!("tile size: {}x{}", tileset.tile_width, tileset.tile_height);
    println!("tiles: {} (tilecount {}, columns {})", tileset.tiles.len(), tileset.tile_count, tileset.columns);
    for tile in &tileset.tiles {
        let size = tile.image
            .as_ref()
            .and_then(|image| image.size())
            .map(|(width, height)| format!("{width}x{height}"))
            .unwrap_or_else(|| String::from("?"));
        let location = tileset
            .resolve_image(tile, &path)
            .map(|image_path| image_path.to_string())
            .unwrap_or_else(|| String::from("-"));
        println!("{:>5}  {size:>9}  {location}", tile.id);
    }
    Ok(())
}

fn format(args: Format) -> anyhow::Result<()> {
    let path = AssetPath::from_path(&args.tileset);
    let tileset = Tileset::load(&path, &FileProtocol)?;
    match args.output {
        Some(output) => tileset.save(&AssetPath::from_path(&output))?,
        None => print!("{}", tileset.to_tsx()),
    }
    Ok(())
}

fn collect(args: Collect, settings: Settings) -> anyhow::Result<()> {
    let collect_settings = settings.collect;
    let extensions = if args.extensions.is_empty() { collect_settings.extensions } else { args.extensions };
    let output = AssetPath::from_path(&args.output);
    let name = match args.name {
        Some(name) => name,
        None => args.output
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(String::from)
            .context("Output path has no file name")?,
    };

    let mut builder = CollectionBuilder::new(name)
        .version(collect_settings.version)
        .tiled_version(collect_settings.tiled_version);
    for image_path in collect_images(&args.dirs, &extensions)? {
        builder.add_probed(AssetPath::from_path(&image_path), &FileProtocol)?;
    }
    if builder.is_empty() {
        anyhow::bail!("No images with extensions {extensions:?} found");
    }
    let tileset = builder.build(&output)?;
    tileset.save(&output)?;
    println!("{output}: wrote {} tiles", tileset.tiles.len());
    Ok(())
}


#[cfg(test)]
mod test {
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use clap::Parser;
    use image::{DynamicImage, ImageOutputFormat};
    use tsx_kit::{AssetPath, FileProtocol, Tileset};
    use super::{run, Cli};

    const GRASS: &str = include_str!("../data/levels/tilesets/grass.tsx");

    const SMALL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.8" tiledversion="1.8.2" name="small" tilewidth="16" tileheight="16" tilecount="1" columns="0">
 <grid orientation="orthogonal" width="1" height="1"/>
 <tile id="0">
  <image width="16" height="16" source="art/a.png"/>
 </tile>
</tileset>
"#;

    fn write_png(path: &Path, width: u32, height: u32) {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::new_rgba8(width, height).write_to(&mut cursor, ImageOutputFormat::Png).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, cursor.into_inner()).unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tsx_kit_cli_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn run_args(args: &[&str]) -> anyhow::Result<bool> {
        run(Cli::parse_from(std::iter::once("tsx-kit").chain(args.iter().copied())))
    }

    fn arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn check_reports_failures() {
        let dir = temp_dir("check");
        let valid = dir.join("small.tsx");
        let broken = dir.join("broken.tsx");
        let missing = dir.join("missing.tsx");
        std::fs::write(&valid, SMALL).unwrap();
        std::fs::write(&broken, "<tileset").unwrap();
        std::fs::write(&missing, SMALL.replace("art/a.png", "art/gone.png")).unwrap();
        write_png(&dir.join("art/a.png"), 16, 16);

        assert!(run_args(&["check", arg(&valid)]).unwrap());
        assert!(!run_args(&["check", arg(&broken)]).unwrap());
        assert!(!run_args(&["check", arg(&missing)]).unwrap());
        assert!(!run_args(&["check", arg(&valid), arg(&missing)]).unwrap());
        assert!(run_args(&["check", "--skip-images", arg(&missing)]).unwrap());

        let config = dir.join("settings.yaml");
        std::fs::write(&config, "check:\n  images: false\n").unwrap();
        assert!(run_args(&["--config", arg(&config), "check", arg(&missing)]).unwrap());
        assert!(run_args(&["--config", arg(&dir.join("absent.yaml")), "check", arg(&valid)]).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn format_rewrites_in_tiled_layout() {
        let dir = temp_dir("format");
        let messy = dir.join("messy.tsx");
        let output = dir.join("grass.tsx");
        std::fs::write(&messy, GRASS.replace("\n ", "\n    ")).unwrap();

        assert!(run_args(&["format", arg(&messy), "-o", arg(&output)]).unwrap());
        assert_eq!(GRASS, std::fs::read_to_string(&output).unwrap());
        assert!(run_args(&["show", arg(&output)]).unwrap());
        assert!(run_args(&["format", arg(&dir.join("absent.tsx"))]).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn collect_writes_tileset() {
        let dir = temp_dir("collect");
        write_png(&dir.join("art/a.png"), 16, 48);
        write_png(&dir.join("art/b.png"), 32, 8);
        std::fs::write(dir.join("art/readme.txt"), "not an image").unwrap();
        let output = dir.join("levels/art.tsx");
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();

        assert!(run_args(&["collect", arg(&dir.join("art")), "-o", arg(&output)]).unwrap());
        let tileset = Tileset::load(&AssetPath::from_path(&output), &FileProtocol).unwrap();
        assert_eq!("art", tileset.name);
        assert_eq!((32, 48), (tileset.tile_width, tileset.tile_height));
        let sources: Vec<&str> = tileset.tiles
            .iter()
            .map(|tile| tile.image.as_ref().unwrap().source.as_str())
            .collect();
        assert_eq!(vec!["../art/a.png", "../art/b.png"], sources);
        assert!(run_args(&["check", arg(&output)]).unwrap());

        assert!(run_args(&["collect", arg(&dir.join("art")), "-o", arg(&output), "--extensions", "bmp"]).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
