use crate::artifact::{PageKind, ReportArtifact};
use crate::config::ReportConfig;
use crate::diagnostics::Diagnostic;
use crate::error::ReportError;
use crate::ident::device_file_name;
use crate::loader::{self, RejectedEntry};
use crate::render::{render_detail, render_document, render_menu, MenuLink};
use crate::timeline::{build_timeline, SvgTimelineChart, TimelineChart, TimelineOptions};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

pub struct ReportGenerator {
    config: ReportConfig,
    chart: Box<dyn TimelineChart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub output: PathBuf,
    pub entry_page: PathBuf,
    pub generated_at: String,
    pub pages: Vec<PageRecord>,
    pub failures: Vec<HostFailure>,
    pub warnings: Vec<Diagnostic>,
    pub timeline_points: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    pub name: String,
    pub kind: PageKind,
    pub path: PathBuf,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostFailure {
    pub ordinal: usize,
    pub host: String,
    pub reason: String,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self::with_chart(config, SvgTimelineChart)
    }

    pub fn with_chart(config: ReportConfig, chart: impl TimelineChart + 'static) -> Self {
        Self {
            config,
            chart: Box::new(chart),
        }
    }

    pub fn generate(
        &self,
        snapshot_path: &Path,
        output_dir: &Path,
    ) -> Result<GenerationSummary, ReportError> {
        self.generate_stamped(snapshot_path, output_dir, &generation_timestamp())
    }

    pub fn generate_stamped(
        &self,
        snapshot_path: &Path,
        output_dir: &Path,
        generated_at: &str,
    ) -> Result<GenerationSummary, ReportError> {
        self.config.validate()?;
        let snapshot = loader::load(snapshot_path)?;
        info!(
            snapshot = %snapshot_path.display(),
            hosts = snapshot.hosts.len(),
            rejected = snapshot.rejected.len(),
            "snapshot loaded"
        );

        fs::create_dir_all(output_dir).map_err(|err| ReportError::write(output_dir, err))?;

        let timeline = build_timeline(&snapshot.hosts, &*self.chart, self.timeline_options());
        let menu_file_name = self.config.menu_file_name.trim();

        let mut pages = Vec::with_capacity(snapshot.hosts.len() + 1);
        let mut links = Vec::with_capacity(snapshot.hosts.len());
        for host in &snapshot.hosts {
            let file_name = device_file_name(host);
            let artifact = ReportArtifact::new(
                file_name.clone(),
                PageKind::Detail,
                render_detail(host, menu_file_name),
            );
            let path = artifact.write_into(output_dir)?;
            debug!(host = %host.mac, path = %path.display(), "detail page written");
            pages.push(PageRecord {
                name: file_name.clone(),
                kind: PageKind::Detail,
                path,
                host: Some(host.mac.clone()),
            });
            links.push(MenuLink { host, file_name });
        }

        let menu = ReportArtifact::new(
            menu_file_name,
            PageKind::Menu,
            render_menu(&links, &timeline, generated_at, &self.config),
        );
        let menu_path = menu.write_atomically_into(output_dir)?;
        pages.push(PageRecord {
            name: menu_file_name.to_string(),
            kind: PageKind::Menu,
            path: menu_path.clone(),
            host: None,
        });

        let summary = GenerationSummary {
            output: output_dir.to_path_buf(),
            entry_page: menu_path,
            generated_at: generated_at.to_string(),
            pages,
            failures: host_failures(&snapshot.rejected),
            warnings: snapshot.diagnostics,
            timeline_points: timeline.points,
        };
        info!(
            menu = %summary.entry_page.display(),
            detail_files = summary.distinct_detail_files(),
            failures = summary.failures.len(),
            "report generated"
        );
        Ok(summary)
    }

    pub fn generate_document(
        &self,
        snapshot_path: &Path,
        output_file: &Path,
    ) -> Result<GenerationSummary, ReportError> {
        self.generate_document_stamped(snapshot_path, output_file, &generation_timestamp())
    }

    pub fn generate_document_stamped(
        &self,
        snapshot_path: &Path,
        output_file: &Path,
        generated_at: &str,
    ) -> Result<GenerationSummary, ReportError> {
        self.config.validate()?;
        let snapshot = loader::load(snapshot_path)?;

        let file_name = output_file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                ReportError::InvalidConfig(format!(
                    "output {:?} does not name a file",
                    output_file
                ))
            })?;
        let dir = match output_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|err| ReportError::write(&dir, err))?;

        let timeline = build_timeline(&snapshot.hosts, &*self.chart, self.timeline_options());
        let artifact = ReportArtifact::new(
            file_name.clone(),
            PageKind::Document,
            render_document(&snapshot.hosts, &timeline, generated_at, &self.config),
        );
        let path = artifact.write_atomically_into(&dir)?;
        info!(document = %path.display(), hosts = snapshot.hosts.len(), "report generated");

        Ok(GenerationSummary {
            output: path.clone(),
            entry_page: path.clone(),
            generated_at: generated_at.to_string(),
            pages: vec![PageRecord {
                name: file_name,
                kind: PageKind::Document,
                path,
                host: None,
            }],
            failures: host_failures(&snapshot.rejected),
            warnings: snapshot.diagnostics,
            timeline_points: timeline.points,
        })
    }

    fn timeline_options(&self) -> TimelineOptions {
        TimelineOptions {
            label: self.config.timeline_label,
            mode: self.config.chart_mode,
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

fn host_failures(rejected: &[RejectedEntry]) -> Vec<HostFailure> {
    rejected
        .iter()
        .map(|entry| {
            let err = ReportError::RenderFailure {
                host: entry.label.clone(),
                reason: entry.reason.clone(),
            };
            warn!(ordinal = entry.ordinal, "{err}");
            HostFailure {
                ordinal: entry.ordinal,
                host: entry.label.clone(),
                reason: entry.reason.clone(),
            }
        })
        .collect()
}

fn generation_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(format_description!(
            "[day]-[month]-[year] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| "unknown".to_string())
}

impl GenerationSummary {
    /// Detail files on disk. Hosts sharing a MAC share a file.
    pub fn distinct_detail_files(&self) -> usize {
        self.pages
            .iter()
            .filter(|page| page.kind == PageKind::Detail)
            .map(|page| page.name.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report generated at {}", self.generated_at)?;
        writeln!(f, "  entry page: {}", self.entry_page.display())?;
        writeln!(
            f,
            "  pages: {} ({} distinct detail files)",
            self.pages.len(),
            self.distinct_detail_files()
        )?;
        writeln!(f, "  timeline points: {}", self.timeline_points)?;
        if !self.failures.is_empty() {
            writeln!(f, "Hosts that could not be rendered:")?;
            for failure in &self.failures {
                writeln!(
                    f,
                    "  - [failed] #{} {}: {}",
                    failure.ordinal, failure.host, failure.reason
                )?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }
        Ok(())
    }
}
