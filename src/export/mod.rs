//! PDF snapshot of the planner.

pub mod layout;
pub mod metrics;
pub mod render;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;

use crate::error::ExportError;
use crate::planner::PlannerState;

use self::layout::{layout, PageGeometry, DOCUMENT_TITLE};
use self::render::render_pdf;

/// `weekly-ops-planner-2024-03-18.pdf`
pub fn file_name(date: NaiveDate) -> String {
    format!("weekly-ops-planner-{}.pdf", date.format("%Y-%m-%d"))
}

/// Write `bytes` into `dir` under the dated export name, via a temp file.
pub fn write_export(dir: &Path, date: NaiveDate, bytes: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(date));
    let tmp = path.with_extension("pdf.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, &path)?;
    Ok(path)
}

/// Builds PDF snapshots, refusing to overlap with itself.
#[derive(Debug, Default)]
pub struct Exporter {
    busy: AtomicBool,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_exporting(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Lay out and render `state`. Returns `None` on failure or while
    /// another export is running.
    pub fn export(&self, state: &PlannerState) -> Option<Vec<u8>> {
        self.run(|| {
            let doc = layout(state, PageGeometry::A4);
            render_pdf(&doc, DOCUMENT_TITLE)
        })
    }

    fn run<F>(&self, job: F) -> Option<Vec<u8>>
    where
        F: FnOnce() -> Result<Vec<u8>, ExportError>,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("export already in progress");
            return None;
        }

        let result = job();
        self.busy.store(false, Ordering::SeqCst);

        match result {
            Ok(bytes) => {
                tracing::info!(bytes = bytes.len(), "export rendered");
                Some(bytes)
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                None
            }
        }
    }
}
