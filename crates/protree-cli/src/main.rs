//! protree - Print Protocol Buffer schemas as an annotated tree
//!
//! This tool compiles `.proto` files (or loads compiled descriptor sets)
//! and prints every file's messages, enums and services as an indented,
//! annotated tree.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use protree_core::{
    OutlineVisitor, ParserConfig, ProtoParser, Registry, RenderConfig, Renderer, StatsVisitor,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Print Protocol Buffer schemas as an annotated tree
#[derive(Parser, Debug)]
#[command(name = "protree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Directory searched for imports (repeatable)
    #[arg(short = 'I', long = "import-path", default_value = ".")]
    import_paths: Vec<PathBuf>,

    /// Treat inputs as encoded FileDescriptorSet files instead of .proto sources
    #[arg(long)]
    descriptor_set: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Spaces per indentation level
    #[arg(long, default_value = "4")]
    indent: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Schema files to render
    files: Vec<PathBuf>,

    /// Render every .proto file under a directory
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Output format for rendered schemas
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Indented text tree
    Text,
    /// Structured JSON outline
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = load(&cli)?;

    let mut stats = StatsVisitor::default();
    protree_core::render::walk(&registry, &mut stats);
    info!(
        "Summary: {} files, {} messages, {} fields, {} enums, {} services, {} methods",
        stats.file_count,
        stats.message_count,
        stats.field_count,
        stats.enum_count,
        stats.service_count,
        stats.method_count
    );

    let content = render(&cli, &registry)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

/// Fill a registry from the selected input mode
fn load(cli: &Cli) -> Result<Registry> {
    let mut registry = Registry::new();

    if let Some(ref directory) = cli.input.directory {
        load_directory(cli, directory, &mut registry)?;
    } else if !cli.input.files.is_empty() {
        load_files(cli, &cli.input.files, &[], &mut registry)?;
    } else {
        bail!("Either FILES or --directory must be specified")
    }

    if registry.is_empty() {
        bail!("No schema files were loaded");
    }
    Ok(registry)
}

fn load_files(
    cli: &Cli,
    files: &[PathBuf],
    extra_imports: &[PathBuf],
    registry: &mut Registry,
) -> Result<()> {
    if cli.descriptor_set {
        for file in files {
            let count = ProtoParser::load_descriptor_set_file(file, registry)
                .with_context(|| format!("Failed to load descriptor set: {}", file.display()))?;
            debug!("Loaded {} file(s) from {}", count, file.display());
        }
        return Ok(());
    }

    let import_paths = extra_imports.iter().chain(&cli.import_paths).cloned();
    let parser = ProtoParser::with_config(ParserConfig::new().import_paths(import_paths));

    for file in files {
        if !file.is_file() {
            bail!("Input path is not a file: {}", file.display());
        }
        trace!("Parsing {}", file.display());
        parser
            .parse_file(file, registry)
            .with_context(|| format!("Failed to parse proto file: {}", file.display()))?;
    }
    Ok(())
}

/// Process a directory of schemas recursively
fn load_directory(cli: &Cli, directory: &Path, registry: &mut Registry) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let extension = if cli.descriptor_set { "pb" } else { "proto" };
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && has_extension(p, extension))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!(
            "No .{} files found under {}",
            extension,
            directory.display()
        );
    }
    debug!("Found {} schema file(s)", files.len());

    // Skip files that fail to read or parse; anything else aborts the run
    let extra = [directory.to_path_buf()];
    for file in &files {
        if let Err(e) = load_files(cli, std::slice::from_ref(file), &extra, registry) {
            if !is_skippable(&e) {
                return Err(e);
            }
            warn!("Skipping {}: {:#}", file.display(), e);
        }
    }

    Ok(())
}

fn is_skippable(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<protree_core::Error>()
        .is_some_and(protree_core::Error::is_recoverable)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn render(cli: &Cli, registry: &Registry) -> Result<String> {
    match cli.format {
        OutputFormat::Text => {
            let config = RenderConfig::new().indent_str(" ".repeat(cli.indent));
            Ok(Renderer::with_config(config).render_string(registry))
        }
        OutputFormat::Json => {
            let mut json = OutlineVisitor::to_json(registry).context("Failed to build outline")?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    const SCHEMA: &str = "syntax = \"proto3\";\npackage t;\nmessage M { int32 x = 1; }\n";

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("protree").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a/b.proto"), "proto"));
        assert!(has_extension(Path::new("B.PROTO"), "proto"));
        assert!(!has_extension(Path::new("b.txt"), "proto"));
        assert!(!has_extension(Path::new("proto"), "proto"));
    }

    #[test]
    fn test_input_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["protree"]).is_err());
        assert!(Cli::try_parse_from(["protree", "a.proto", "-d", "dir"]).is_err());
        assert_eq!(cli(&["a.proto", "b.proto"]).input.files.len(), 2);
    }

    #[test]
    fn test_directory_mode() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/one.proto"), SCHEMA).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();

        let dir_arg = dir.path().to_str().unwrap();
        let cli = cli(&["-d", dir_arg]);
        let registry = load(&cli).unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), ["sub/one.proto"]);
        let text = render(&cli, &registry).unwrap();
        assert!(text.contains("     [*]int32 x = 0;"));
    }

    #[test]
    fn test_directory_skips_broken_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.proto"), SCHEMA).unwrap();
        fs::write(dir.path().join("broken.proto"), "message {").unwrap();

        let cli = cli(&["-d", dir.path().to_str().unwrap()]);
        let registry = load(&cli).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["good.proto"]);
    }

    #[test]
    fn test_directory_stops_on_invalid_descriptor_set() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.pb"), b"").unwrap();

        let cli = cli(&["--descriptor-set", "-d", dir.path().to_str().unwrap()]);
        let err = load(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<protree_core::Error>(),
            Some(protree_core::Error::NoFilesFound)
        ));
    }

    #[test]
    fn test_is_skippable() {
        let parse = anyhow::Error::new(protree_core::Error::parse("a.proto", "syntax error"))
            .context("Failed to parse proto file: a.proto");
        assert!(is_skippable(&parse));

        let deep = anyhow::Error::new(protree_core::Error::nesting_too_deep("a.proto", "a.B", 1000))
            .context("Failed to parse proto file: a.proto");
        assert!(!is_skippable(&deep));

        let dangling = anyhow::Error::new(protree_core::Error::unresolved(
            "a.proto",
            "a.B.c",
            "enum a.E has no value 7",
        ));
        assert!(!is_skippable(&dangling));

        assert!(!is_skippable(&anyhow::anyhow!("Input path is not a file: x")));
    }

    #[test]
    fn test_json_format() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("one.proto");
        fs::write(&file, SCHEMA).unwrap();

        let cli = cli(&[
            "-I",
            dir.path().to_str().unwrap(),
            "--format",
            "json",
            file.to_str().unwrap(),
        ]);
        let registry = load(&cli).unwrap();
        let json = render(&cli, &registry).unwrap();
        assert!(json.contains("\"marker\": \"*\""));
        assert!(json.ends_with("]\n"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
