use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use data_sweeper::{Batch, ConversionTarget, ExportArtifact, SweeperConfig, UploadedFile};

// ---------------------------------------------------------------------------
// Per-file widget state
// ---------------------------------------------------------------------------

/// Toggles and selections for one file's card. Lives next to, not inside,
/// the file's pipeline session.
#[derive(Debug, Clone, Default)]
pub struct FileView {
    pub cleaning_enabled: bool,
    pub show_chart: bool,
    /// `(column, keep?)` in current column order.
    pub column_choices: Vec<(String, bool)>,
    pub target: ConversionTarget,
    /// Last success / error message for this file.
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl FileView {
    fn for_columns(columns: Vec<String>) -> Self {
        Self {
            column_choices: columns.into_iter().map(|c| (c, true)).collect(),
            ..Self::default()
        }
    }

    pub fn selected_columns(&self) -> Vec<&str> {
        self.column_choices
            .iter()
            .filter(|(_, keep)| *keep)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: SweeperConfig,

    /// Sessions for the current upload set (None until files are picked).
    pub batch: Option<Batch>,

    /// One view per session, same order as `batch`.
    pub views: Vec<FileView>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Whether any file of the last upload failed, unreadable ones included.
    pub upload_failed: bool,
}

impl AppState {
    pub fn new(config: SweeperConfig) -> Self {
        Self {
            config,
            batch: None,
            views: Vec::new(),
            status_message: None,
            upload_failed: false,
        }
    }

    /// Replace the whole upload set; previous sessions are dropped.
    pub fn load_paths(&mut self, paths: &[PathBuf]) {
        let mut files = Vec::with_capacity(paths.len());
        let mut unreadable = Vec::new();
        for path in paths {
            match read_upload(path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    log::error!("{e:#}");
                    unreadable.push(format!("{e:#}"));
                }
            }
        }

        let batch = Batch::from_uploads(files, &self.config.codec_options());
        self.views = batch
            .sessions()
            .iter()
            .map(|s| FileView::for_columns(s.columns().unwrap_or_default()))
            .collect();

        let failed = batch.failures().len() + unreadable.len();
        self.upload_failed = failed > 0;
        self.status_message = Some(if failed == 0 {
            format!("All {} files processed successfully", batch.len())
        } else {
            format!(
                "{} of {} files could not be loaded",
                failed,
                batch.len() + unreadable.len()
            )
        });
        if !unreadable.is_empty() {
            log::warn!("Unreadable uploads: {unreadable:?}");
        }
        self.batch = Some(batch);
    }

    /// Run `op` against session `index` and record its outcome on the view.
    pub fn apply<F>(&mut self, index: usize, op: F)
    where
        F: FnOnce(&mut data_sweeper::FileSession) -> data_sweeper::Result<String>,
    {
        let Some(session) = self.batch.as_mut().and_then(|b| b.get_mut(index)) else {
            return;
        };
        let outcome = op(session);
        let columns = session.columns().unwrap_or_default();
        let Some(view) = self.views.get_mut(index) else {
            return;
        };
        view.notice = Some(match outcome {
            Ok(msg) => Notice::Success(msg),
            Err(e) => Notice::Error(e.to_string()),
        });
        sync_choices(view, columns);
    }

    pub fn remove_duplicates(&mut self, index: usize) {
        self.apply(index, |s| {
            s.remove_duplicates()
                .map(|n| format!("Duplicates removed ({n} rows)"))
        });
    }

    pub fn fill_missing(&mut self, index: usize) {
        self.apply(index, |s| {
            s.fill_missing_numeric().map(|report| {
                let mut msg = format!("Missing values filled ({} cells)", report.total_filled());
                if !report.undefined_mean.is_empty() {
                    msg.push_str(&format!(
                        "; no values to average in {}",
                        report.undefined_mean.join(", ")
                    ));
                }
                msg
            })
        });
    }

    pub fn apply_selection(&mut self, index: usize) {
        let Some(view) = self.views.get(index) else {
            return;
        };
        let selected: Vec<String> = view
            .selected_columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.apply(index, move |s| {
            s.project(&selected)
                .map(|()| format!("Keeping {} columns", selected.len()))
        });
    }

    /// Encode session `index` in its chosen target format.
    pub fn convert(&mut self, index: usize) -> Option<ExportArtifact> {
        let target = self.views.get(index)?.target;
        let options = self.config.codec_options();
        let session = self.batch.as_mut()?.get_mut(index)?;
        let result = session.export(target, &options);
        let view = self.views.get_mut(index)?;
        match result {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                view.notice = Some(Notice::Error(e.to_string()));
                None
            }
        }
    }
}

/// Keep existing choices for surviving columns and drop vanished ones.
fn sync_choices(view: &mut FileView, columns: Vec<String>) {
    view.column_choices = columns
        .into_iter()
        .map(|name| {
            let keep = view
                .column_choices
                .iter()
                .find(|(n, _)| *n == name)
                .map_or(true, |(_, keep)| *keep);
            (name, keep)
        })
        .collect();
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    Ok(UploadedFile::new(name, bytes))
}

/// Write a converted file to `path`.
pub fn save_artifact(artifact: &ExportArtifact, path: &Path) -> Result<()> {
    std::fs::write(path, &artifact.bytes)
        .with_context(|| format!("writing {} to {}", artifact.file_name, path.display()))?;
    log::info!(
        "Saved {} ({}) to {}",
        artifact.file_name,
        artifact.mime_type,
        path.display()
    );
    Ok(())
}
