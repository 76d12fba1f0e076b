use anyhow::Context;
use clap::{Parser, ValueEnum};
use comfy_table::{presets::ASCII_FULL, Table};
use netmap_core::{GenerationSummary, IndexStyle, ReportConfig, ReportError, ReportGenerator};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Render a NetProbe host snapshot as a browsable HTML report"
)]
struct ReportCli {
    /// Path to the JSON host snapshot
    snapshot: PathBuf,
    /// Output directory, or an .html file for a single-page report
    output: PathBuf,
    /// Report configuration file (YAML, or JSON when the extension is .json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Override the layout of the device index on the menu page
    #[arg(long, value_enum)]
    index_style: Option<IndexStyleArg>,
    /// Write a single self-contained page instead of a menu plus detail pages
    #[arg(long)]
    single: bool,
    /// Output JSON instead of a human-readable summary
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IndexStyleArg {
    Table,
    Links,
}

impl From<IndexStyleArg> for IndexStyle {
    fn from(value: IndexStyleArg) -> Self {
        match value {
            IndexStyleArg::Table => IndexStyle::Table,
            IndexStyleArg::Links => IndexStyle::Links,
        }
    }
}

fn main() -> ExitCode {
    let cli = ReportCli::parse();
    init_logging();

    match run(cli) {
        Ok(summary) if summary.has_failures() => {
            eprintln!("[warn] some hosts could not be rendered");
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ReportError>() {
                Some(report_err) => {
                    eprintln!("[error] {} step failed: {report_err}", report_err.step())
                }
                None => eprintln!("[error] {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout is reserved for the summary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: ReportCli) -> anyhow::Result<GenerationSummary> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(style) = cli.index_style {
        config.index_style = style.into();
    }

    let generator = ReportGenerator::new(config);
    let summary = if single_document(&cli.output, cli.single) {
        generator.generate_document(&cli.snapshot, &cli.output)?
    } else {
        generator.generate(&cli.snapshot, &cli.output)?
    };

    output_summary(&summary, cli.json)?;
    Ok(summary)
}

fn single_document(output: &Path, forced: bool) -> bool {
    forced
        || output
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            .unwrap_or(false)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReportConfig> {
    let Some(path) = path else {
        return Ok(ReportConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = parse_config(&content, path)?;
    debug!(config = %path.display(), "report config loaded");
    Ok(config)
}

fn parse_config(content: &str, path: &Path) -> anyhow::Result<ReportConfig> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let config = if is_json {
        serde_json::from_str(content)
            .with_context(|| format!("invalid JSON config {}", path.display()))?
    } else {
        serde_yaml::from_str(content)
            .with_context(|| format!("invalid YAML config {}", path.display()))?
    };
    Ok(config)
}

fn output_summary(summary: &GenerationSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{}", render_pages(summary));
    print!("{summary}");
    Ok(())
}

fn render_pages(summary: &GenerationSummary) -> String {
    let mut display = Table::new();
    display.load_preset(ASCII_FULL);
    display.set_header(vec!["Kind", "File", "Host"]);

    for page in &summary.pages {
        let kind = serde_json::to_value(page.kind)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        display.add_row(vec![
            kind,
            page.path.display().to_string(),
            page.host.clone().unwrap_or_default(),
        ]);
    }

    display.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use netmap_core::TimelineLabel;

    #[test]
    fn cli_definition_is_consistent() {
        ReportCli::command().debug_assert();
    }

    #[test]
    fn exactly_two_positionals_are_required() {
        assert!(ReportCli::try_parse_from(["netmap-report", "hosts.json"]).is_err());
        assert!(ReportCli::try_parse_from(["netmap-report", "a", "b", "c"]).is_err());
        let cli = ReportCli::try_parse_from(["netmap-report", "hosts.json", "out"])
            .expect("two arguments parse");
        assert_eq!(cli.snapshot, PathBuf::from("hosts.json"));
        assert!(!cli.single);
    }

    #[test]
    fn html_output_selects_single_document_mode() {
        assert!(single_document(Path::new("report.html"), false));
        assert!(single_document(Path::new("report.HTM"), false));
        assert!(!single_document(Path::new("report"), false));
        assert!(single_document(Path::new("report"), true));
    }

    #[test]
    fn index_style_flag_parses() {
        let cli = ReportCli::try_parse_from([
            "netmap-report",
            "hosts.json",
            "out",
            "--index-style",
            "links",
        ])
        .expect("flag parses");
        assert!(matches!(cli.index_style, Some(IndexStyleArg::Links)));
    }

    #[test]
    fn yaml_config_only_names_what_it_changes() {
        let config = parse_config(
            "title: Lab network\ntimeline_label: composite\nlogos: []\n",
            Path::new("report.yaml"),
        )
        .expect("yaml parses");
        assert_eq!(config.title, "Lab network");
        assert_eq!(config.timeline_label, TimelineLabel::Composite);
        assert!(config.logos.is_empty());
        assert_eq!(config.menu_file_name, "menu.html");
    }

    #[test]
    fn json_config_is_selected_by_extension() {
        let config = parse_config(
            r#"{"index_style": "links", "table_enhancement": null}"#,
            Path::new("report.json"),
        )
        .expect("json parses");
        assert_eq!(config.index_style, IndexStyle::Links);
        assert!(config.table_enhancement.is_none());

        let err = parse_config("{not json", Path::new("report.json")).expect_err("invalid");
        assert!(err.to_string().contains("invalid JSON config"));
    }
}
