pub mod artifact;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod ident;
pub mod loader;
pub mod render;
pub mod report;
pub mod timeline;

pub use artifact::{PageKind, ReportArtifact};
pub use config::{ChartMode, IndexStyle, LogoAsset, ReportConfig, TableEnhancement, TimelineLabel};
pub use diagnostics::Diagnostic;
pub use error::ReportError;
pub use host::{AttributeMap, HostRecord, ProtocolEntry, ProtocolObservation};
pub use ident::{device_anchor_id, device_file_name, escape_html, protocol_anchor_id};
pub use loader::{load, parse, RejectedEntry, Snapshot};
pub use render::{render_detail, render_document, render_menu, MenuLink};
pub use report::{GenerationSummary, HostFailure, PageRecord, ReportGenerator};
pub use timeline::{
    build_timeline, timeline_series, ChartError, SvgTimelineChart, TimelineChart,
    TimelineFragment, TimelineOptions, TimelinePoint, TimelineSeries,
};
