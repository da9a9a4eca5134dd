//! jsxkit - HTML mockup to React project converter

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use jsxkit::{
    CancellationToken, ConversionOptions, ConversionRequest, ConversionResult, Converter,
    CssStrategy, JsonFileSettings, SettingsStore, StageStatus,
};

#[derive(Parser)]
#[command(name = "jsxkit")]
#[command(version, about = "Convert HTML mockups into React projects", long_about = None)]
#[command(after_help = "EXAMPLES:
    jsxkit page.html                    Write page.zip (JSX, plain CSS)
    jsxkit page.html -o app.zip --ts    TypeScript project
    jsxkit page.html --css tailwind     Tailwind utility classes
    jsxkit - --report < page.html       Print the JSON report")]
struct Cli {
    /// Input HTML file, or `-` for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output ZIP archive (defaults to the input name with `.zip`)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Also extract the project into this directory
    #[arg(long, value_name = "DIR")]
    unpack: Option<PathBuf>,

    /// Generate TypeScript (.tsx) components
    #[arg(long = "ts", alias = "typescript")]
    typescript: bool,

    /// CSS strategy: tailwind, css-modules or vanilla
    #[arg(long, value_name = "STRATEGY")]
    css: Option<CssStrategy>,

    /// Name of the root component
    #[arg(short, long)]
    name: Option<String>,

    /// Project name for package.json
    #[arg(long)]
    project: Option<String>,

    /// Keep inline styles in the markup instead of extracting them
    #[arg(long)]
    no_extract_styles: bool,

    /// Base URL for resolving relative asset references
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Do not download remote assets
    #[arg(long)]
    no_download: bool,

    /// Add a sha256 integrity digest to the manifest
    #[arg(long)]
    integrity: bool,

    /// Settings file supplying defaults
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Store the effective options in the settings file
    #[arg(long, requires = "settings")]
    save_settings: bool,

    /// Print the conversion report as JSON instead of writing an archive
    #[arg(long)]
    report: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn options(cli: &Cli) -> ConversionOptions {
    let mut options = ConversionOptions::default();
    if cli.typescript {
        options = options.with_typescript(true);
    }
    if cli.no_extract_styles {
        options = options.with_extract_styles(false);
    }
    if cli.no_download {
        options = options.with_download_assets(false);
    }
    if cli.integrity {
        options = options.with_integrity(true);
    }
    options.css_strategy = cli.css;
    options.component_name = cli.name.clone();
    options.project_name = cli.project.clone();
    options.base_url = cli.base_url.clone();
    options
}

fn read_input(input: &str) -> Result<String, String> {
    let bytes = if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        buf
    } else {
        std::fs::read(input).map_err(|e| format!("failed to read {input}: {e}"))?
    };
    Ok(jsxkit::util::decode_text(&bytes, None).into_owned())
}

fn output_path(cli: &Cli) -> PathBuf {
    if let Some(output) = &cli.output {
        return output.clone();
    }
    let stem = Path::new(&cli.input)
        .file_stem()
        .filter(|_| cli.input != "-")
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jsxkit-app".to_string());
    PathBuf::from(format!("{stem}.zip"))
}

fn run(cli: &Cli) -> Result<bool, String> {
    let markup = read_input(&cli.input)?;
    let options = options(cli);

    let mut converter = Converter::new();
    if cli.no_download {
        converter = converter.without_fetcher();
    }
    if let Some(path) = &cli.settings {
        let store = JsonFileSettings::new(path);
        if cli.save_settings {
            save_settings(&store, &options)?;
        }
        converter = converter.with_settings(store);
    }

    let request = ConversionRequest::new(markup).with_options(options);
    let result = converter.convert(&request, &CancellationToken::new());

    if cli.report {
        println!("{}", result.to_json().map_err(|e| e.to_string())?);
        return Ok(result.is_success());
    }

    if !cli.quiet {
        print_summary(&result);
    }
    if !result.is_success() {
        eprintln!("error: {}", result.outcome.message());
        return Ok(false);
    }

    let Some(archive) = &result.archive else {
        if !cli.quiet {
            println!("Nothing to write: the input has no content");
        }
        return Ok(true);
    };
    let output = output_path(cli);
    std::fs::write(&output, archive).map_err(|e| format!("failed to write {}: {e}", output.display()))?;
    if let Some(dir) = &cli.unpack {
        unpack(archive, dir)?;
    }
    if !cli.quiet {
        println!("Wrote {} ({} bytes)", output.display(), archive.len());
    }
    Ok(true)
}

fn save_settings(store: &JsonFileSettings, options: &ConversionOptions) -> Result<(), String> {
    let current = store.load().map_err(|e| e.to_string())?;
    let resolved = options.resolve(&current);
    let updated = jsxkit::StoredSettings {
        typescript: resolved.typescript,
        component_name: resolved.component_name,
        css_strategy: resolved.css_strategy,
        extract_styles: resolved.extract_styles,
        class_name: resolved.class_name,
        download_assets: resolved.download_assets,
        base_url: resolved.base_url,
        project_name: resolved.project_name,
        integrity: resolved.integrity,
        indent: resolved.indent,
    };
    store.save(&updated).map_err(|e| e.to_string())
}

fn unpack(archive: &[u8], dir: &Path) -> Result<(), String> {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).map_err(|e| e.to_string())?;
    zip.extract(dir)
        .map_err(|e| format!("failed to unpack into {}: {e}", dir.display()))
}

fn print_summary(result: &ConversionResult) {
    for stage in &result.stages {
        let mark = match stage.status {
            StageStatus::Complete => "ok",
            StageStatus::Error => "FAILED",
        };
        println!(
            "{:>9} {:>6} {:>8.1}ms  {}",
            stage.name.as_str(),
            mark,
            stage.duration,
            stage.message
        );
    }
    for warning in &result.warnings {
        println!("warning: {warning}");
    }
    println!(
        "{} files, {} components, {} patterns, {} assets in {:.1}ms",
        result.stats.files,
        result.stats.components,
        result.stats.patterns,
        result.stats.assets,
        result.stats.elapsed
    );
}
