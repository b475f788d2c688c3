#![doc = include_str!("../README.md")]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use flatdocx::{FileResolver, Node, SectionConfig, SerializeOptions, Serializer};

/// Arguments of a conversion.
#[derive(Debug, Clone, Parser)]
#[clap(name = "flatdocx", version, about)]
pub struct ConvertArgs {
    /// Path to the input document in ProseMirror JSON
    #[clap(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to output file, `-` for stdout. A `.docx` extension packs a
    /// DOCX document, anything else writes the description as JSON.
    #[clap(value_name = "OUTPUT", default_value = None)]
    pub output: Option<String>,

    /// JSON file with an array of initial section configurations
    #[clap(long, default_value = None, value_name = "FILE")]
    pub sections: Option<PathBuf>,

    /// The width in pixels of a full-width image
    #[clap(long, default_value_t = 600.0, value_name = "PX")]
    pub max_image_width: f64,
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .filter_module("flatdocx", log::LevelFilter::Info)
        .parse_default_env()
        .try_init();

    run(ConvertArgs::parse())
}

fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {:?}", args.input))?;
    let doc: Node = serde_json::from_str(&source).context("failed to parse the input document")?;

    let sections: Vec<SectionConfig> = match &args.sections {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {path:?}"))?;
            serde_json::from_str(&text).context("failed to parse the section configurations")?
        }
        None => Vec::new(),
    };

    let is_stdout = args.output.as_deref() == Some("-");
    let output_path = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| args.input.with_extension("docx"));
    let is_docx = !is_stdout
        && output_path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));

    let base = args.input.parent().unwrap_or(Path::new("."));
    let options = SerializeOptions::default()
        .with_max_image_width(args.max_image_width)
        .with_sections(sections);
    let description = Serializer::new(options)
        .serialize(&doc, &FileResolver::new(base))
        .context("failed to serialize the document")?;

    let result = if is_docx {
        description.to_docx().context("failed to pack the document")?
    } else {
        serde_json::to_vec_pretty(&description)?
    };

    if is_stdout {
        std::io::stdout()
            .write_all(&result)
            .context("failed to write to stdout")?;
    } else if let Err(err) = std::fs::write(&output_path, &result) {
        bail!("failed to write file {output_path:?}: {err}");
    }

    Ok(())
}
