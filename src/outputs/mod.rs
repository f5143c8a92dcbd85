//! Export formats for calendar reports and news.
//!
//! # Submodules
//!
//! - [`json`]: the full [`crate::models::CalendarReport`] or an article list as JSON
//! - [`csv`]: one row per earnings record
//! - [`ical`]: an iCalendar feed with one event per earnings record
//! - [`table`]: aligned plain text for the terminal
//!
//! Every renderer returns a `String`; [`write_output`] sends it to a file or
//! stdout.

pub mod csv;
pub mod ical;
pub mod json;
pub mod table;

use crate::error::ExportError;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWriteExt, stdout};
use tracing::{info, instrument};

/// Write `content` to `path`, creating parent directories, or to stdout when
/// `path` is `None`.
#[instrument(level = "info", skip(content), fields(bytes = content.len()))]
pub async fn write_output(path: Option<&str>, content: &str) -> Result<(), ExportError> {
    match path {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(path, content).await?;
            info!(%path, "Wrote export");
        }
        None => {
            let mut out = stdout();
            out.write_all(content.as_bytes()).await?;
            if !content.ends_with('\n') {
                out.write_all(b"\n").await?;
            }
            out.flush().await?;
        }
    }
    Ok(())
}
