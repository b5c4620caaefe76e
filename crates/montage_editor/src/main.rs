// SPDX-License-Identifier: MIT OR Apache-2.0
//! `montage` - command-line access to Montage scene documents.
//!
//! Subcommands:
//! - `inspect`: list clips per layer, optionally sampling properties at a time
//! - `reborn`: write a copy of a scene with fresh identities
//! - `new`: write an empty scene using the editor settings

use clap::{Parser, Subcommand};
use montage_editor::{EditorSession, EditorSettings, SessionError, SettingsError, SETTINGS_FILE_NAME};
use montage_timeline::{Clip, Scene, Time};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "montage", version, about = "Inspect and transform Montage scenes")]
struct Cli {
    /// Settings file (defaults to montage.ron in the working directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the clips of a scene
    Inspect {
        /// Scene document
        scene: PathBuf,
        /// Sample property values at this time in seconds
        #[arg(long)]
        at: Option<f64>,
        /// Print the whole document as JSON instead
        #[arg(long, conflicts_with = "at")]
        json: bool,
    },
    /// Write a copy of a scene with fresh identities
    Reborn {
        /// Scene document
        scene: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write an empty scene
    New {
        /// Output file
        output: PathBuf,
        /// Scene name
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["montage_editor=debug", "montage=info"] {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log directive {directive}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Montage v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings_path = cli.settings.unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
    let settings = EditorSettings::load_or_default(&settings_path)?;
    let mut session = EditorSession::new(settings);

    match cli.command {
        Command::Inspect { scene, at, json } => {
            session.load_from_path(&scene)?;
            if json {
                println!("{}", serde_json::to_string_pretty(session.scene())?);
            } else {
                print_scene(session.scene(), at.map(Time::from_seconds));
            }
        }
        Command::Reborn { scene, output } => {
            session.load_from_path(&scene)?;
            let remapped = session.reborn_scene()?;
            session.save_to_path(&output)?;
            println!("Wrote {} with {remapped} new identities", output.display());
        }
        Command::New { output, name } => {
            if let Some(name) = name {
                session.rename_scene(name).map_err(SessionError::from)?;
            }
            session.save_to_path(&output)?;
            println!("Wrote {}", output.display());
        }
    }
    Ok(())
}

fn print_scene(scene: &Scene, at: Option<Time>) {
    println!("Scene \"{}\" ({})", scene.name, scene.id);
    println!(
        "  {} fps, duration {}, {} clips",
        scene.frame_rate,
        scene.duration(),
        scene.clip_count()
    );

    let Some(max_layer) = scene.max_layer_in_use() else {
        return;
    };
    for layer in 0..=max_layer {
        let clips: Vec<&Clip> = match at {
            Some(time) => scene.clips_at(layer, time),
            None => scene.clips_on_layer(layer),
        };
        if clips.is_empty() {
            continue;
        }

        println!("Layer {layer}");
        for clip in clips {
            print_clip(clip, at);
        }
    }
}

fn print_clip(clip: &Clip, at: Option<Time>) {
    println!("  [{}, {}) {} ({})", clip.start, clip.end(), clip.name, clip.id);
    for effect in clip.effects.iter().filter(|e| !e.enabled) {
        println!("    {} (disabled)", effect.name);
    }

    for effect in clip.effects.iter().filter(|e| e.enabled) {
        for property in effect.properties.values() {
            match at {
                Some(time) => {
                    if let Some(value) = clip.sample(effect.id, &property.name, time) {
                        println!("    {}.{} = {}", effect.name, property.name, value);
                    }
                }
                None if property.is_animated() => {
                    println!("    {}.{} = {} (animated)", effect.name, property.name, property.value);
                }
                None => println!("    {}.{} = {}", effect.name, property.name, property.value),
            }
        }
    }
}
