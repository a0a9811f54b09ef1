//! Discover social posts about an organisation, store them in a spreadsheet
//! and reshape human-annotated rows into per-category report tabs.

pub mod cache;
pub mod classify;
pub mod config;
pub mod connectors;
pub mod discovery;
pub mod error;
pub mod http;
pub mod report;
pub mod retry;
pub mod sheets;
pub mod table;

pub use cache::ScrapeCache;
pub use config::{load_targets, Paths, Settings, Targets};
pub use connectors::{ApifyInstagram, SocialSource, SourceKind, VideoSource, YouTubeApi};
pub use discovery::DiscoveryParams;
pub use error::{Error, Result};
pub use report::{ReportLine, RunReport, Severity};
pub use retry::RetryPolicy;
pub use sheets::{DryRunSheets, GoogleSheets, MemoryWorkbook, SheetGateway};
pub use table::{Record, Table};
