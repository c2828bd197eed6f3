// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Export a scene snapshot to an ifcJSON document
//!
//! Usage:
//!   ifcjson <scene.json> [options]
//!
//! Configuration overrides are read from `IFCJSON_*` environment variables,
//! log filtering from `RUST_LOG`.

use anyhow::{bail, Context};
use ifcjson_export::{ExportConfig, ExportOutcome, ExportScope, Exporter, FileSink};
use ifcjson_scene::Scene;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

struct Options {
    scene_path: PathBuf,
    output: Option<PathBuf>,
    overwrite: bool,
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args)? else {
        print_usage();
        return Ok(());
    };

    let json = fs::read_to_string(&options.scene_path)
        .with_context(|| format!("Cannot read scene '{}'", options.scene_path.display()))?;
    let scene = Scene::from_json(&json)
        .with_context(|| format!("Cannot load scene '{}'", options.scene_path.display()))?;

    let config = ExportConfig::from_env();
    tracing::info!(
        scene = %options.scene_path.display(),
        definitions = scene.definition_count(),
        entities = scene.entity_count(),
        schema = %config.header.schema,
        "Exporting scene"
    );

    let chooser = |suggested: &Path| choose_output(&options, suggested);
    let outcome = Exporter::new(config)
        .pretty(options.pretty)
        .export(&scene, &ExportScope::Model, &chooser, &mut FileSink)
        .context("Export failed")?;

    match outcome {
        ExportOutcome::Cancelled => println!("Export cancelled, nothing written."),
        ExportOutcome::Written {
            path,
            entity_count,
            geometry_count,
            bytes,
        } => println!(
            "Wrote {} ({} entities, {} geometry records, {} bytes)",
            path.display(),
            entity_count,
            geometry_count,
            bytes
        ),
    }

    Ok(())
}

/// Returns `None` when usage should be printed instead of exporting.
fn parse_args(args: &[String]) -> anyhow::Result<Option<Options>> {
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return Ok(None);
    }

    let mut options = Options {
        scene_path: PathBuf::from(&args[1]),
        output: None,
        overwrite: false,
        pretty: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--output needs a path");
                };
                options.output = Some(PathBuf::from(path));
            }
            "--overwrite" => options.overwrite = true,
            "--pretty" => options.pretty = true,
            "--help" | "-h" => return Ok(None),
            other => bail!("Unknown option: {}", other),
        }
        i += 1;
    }

    Ok(Some(options))
}

/// The non-interactive save prompt: an existing file counts as a declined overwrite.
fn choose_output(options: &Options, suggested: &Path) -> Option<PathBuf> {
    let path = options
        .output
        .clone()
        .unwrap_or_else(|| default_output(&options.scene_path, suggested));

    if path.exists() && !options.overwrite {
        tracing::warn!(path = %path.display(), "Output exists, pass --overwrite to replace it");
        return None;
    }
    Some(path)
}

/// Snapshots without a model path would suggest `Untitled.json`; name the output after the snapshot instead.
fn default_output(scene_path: &Path, suggested: &Path) -> PathBuf {
    if suggested.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
        return suggested.to_path_buf();
    }
    scene_path.with_extension("ifc.json")
}

fn print_usage() {
    eprintln!("ifcjson - Export a scene snapshot to ifcJSON");
    eprintln!();
    eprintln!("Usage: ifcjson <scene.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <PATH>   Output file (default: next to the model, <model>.json)");
    eprintln!("      --overwrite       Replace an existing output file");
    eprintln!("      --pretty          Indent the JSON output");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG                    Log filter (default: info)");
    eprintln!("  IFCJSON_SCHEMA              Header schema (default: IFC2X3)");
    eprintln!("  IFCJSON_DESCRIPTION         Header description");
    eprintln!("  IFCJSON_ORIGINATING_SYSTEM  Header originating system");
    eprintln!("  IFCJSON_TIMESTAMP           Fixed header time stamp");
    eprintln!("  IFCJSON_SCHEMA_NAMESPACE    Attribute namespace (default: IFC 2x3)");
    eprintln!("  IFCJSON_TYPE_PREFIX         Prefix stripped from types (default: Ifc)");
    eprintln!("  IFCJSON_TYPE_ALIASES        Deprecated=Canonical type pairs, comma separated");
}
