//! Load an Infinigen frame export, convert it to a scene graph and save it
//!
//! Usage: cargo run --bin load_and_save_scene -- /path/to/scene -o lychsim/scene.npz
//!
//! The saved file is read back and compared with the imported scene before
//! the tool reports success.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};
use log::info;

use lych_scene::prelude::*;

const DEFAULT_OUTPUT: &str = "lychsim/scene.npz";

fn parse_index(matches: &clap::ArgMatches, name: &str) -> Result<Option<u32>> {
    matches
        .get_one::<String>(name)
        .map(|value| value.parse().with_context(|| format!("Invalid {name} index: {value}")))
        .transpose()
}

fn main() -> Result<()> {
    let matches = Command::new("load_and_save_scene")
        .about("Converts an Infinigen frame export into a LychSim scene file")
        .arg(
            Arg::new("scene")
                .value_name("DIR")
                .help("Infinigen export folder")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output file (.json or .npz), relative to the export folder")
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            Arg::new("camera")
                .short('c')
                .long("camera")
                .value_name("INDEX")
                .help("Camera index (defaults to the first camera)"),
        )
        .arg(
            Arg::new("frame")
                .short('f')
                .long("frame")
                .value_name("INDEX")
                .help("Frame index (defaults to the first frame of the camera)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Import configuration (.toml or .ron)"),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("NAME")
                .help("Scene name, overriding the configuration"),
        )
        .arg(
            Arg::new("no-visibility")
                .long("no-visibility")
                .help("Skip the visibility computation")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    lych_scene::foundation::logging::init();

    let scene_path = PathBuf::from(matches.get_one::<String>("scene").context("missing scene folder")?);
    let output = matches.get_one::<String>("output").context("missing output path")?;
    let output_path = scene_path.join(output);

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ImportConfig::load_from_file(path).with_context(|| format!("Failed to load {path}"))?,
        None => ImportConfig::default(),
    };
    if let Some(name) = matches.get_one::<String>("name") {
        config = config.with_scene_name(name);
    }
    config.validate()?;

    let mut loads = FrameLoads::SCENE | FrameLoads::VISIBILITY;
    if matches.get_flag("no-visibility") {
        loads.remove(FrameLoads::VISIBILITY);
    }

    let frame = InfinigenImporter::new(config)
        .load_frame(
            &scene_path,
            parse_index(&matches, "camera")?,
            parse_index(&matches, "frame")?,
            loads,
        )
        .with_context(|| format!("Failed to load Infinigen frame from {}", scene_path.display()))?;
    let scene = frame.scene.context("frame carries no scene")?;

    println!("{} objects loaded", scene.get_all_objects().len());
    if let Some(visibility) = &frame.visibility {
        println!("{} objects visible", visibility.values().filter(|v| **v).count());
    }

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    scene.save(&output_path)?;
    info!("Saved scene to {}", output_path.display());

    let reloaded = SemanticScene::load(&output_path)?;
    if reloaded != scene {
        bail!("Reloaded scene differs from the one that was saved");
    }
    println!("Scene saved to {}", output_path.display());
    Ok(())
}
