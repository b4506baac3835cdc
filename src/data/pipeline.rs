use super::clean::{self, FillReport};
use super::codec::{self, CodecOptions, ConversionTarget, ExportArtifact, Format};
use super::model::{Table, Value};
use super::project;
use crate::error::{Result, SweeperError};

// ---------------------------------------------------------------------------
// UploadedFile – name + immutable payload
// ---------------------------------------------------------------------------

/// A file handed over by the front-end. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// ---------------------------------------------------------------------------
// FileSession – per-file pipeline state
// ---------------------------------------------------------------------------

/// Where a session is in `Uploaded -> Decoded -> [Cleaned]* -> Projected -> Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploaded,
    Decoded,
    Cleaned,
    Projected,
    Ready,
    /// Decoding failed; nothing else can run until the file is re-uploaded.
    Failed,
}

/// One numeric column prepared for charting. Gaps stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Pipeline state for one uploaded file. Each operation replaces the table
/// wholesale; there is no undo.
#[derive(Debug)]
pub struct FileSession {
    file: UploadedFile,
    format: Option<Format>,
    table: Option<Table>,
    stage: Stage,
    failure: Option<String>,
}

impl FileSession {
    pub fn new(file: UploadedFile) -> Self {
        Self {
            file,
            format: None,
            table: None,
            stage: Stage::Uploaded,
            failure: None,
        }
    }

    pub fn file_name(&self) -> &str {
        self.file.name()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// The message recorded when decoding failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Detect the format and parse the payload. Only the first call does any
    /// work; later calls report the outcome of that first attempt.
    pub fn decode(&mut self, options: &CodecOptions) -> Result<&Table> {
        if self.stage == Stage::Uploaded {
            let outcome = codec::detect_format(self.file.name()).and_then(|format| {
                self.format = Some(format);
                codec::decode(self.file.bytes(), format, options)
            });
            match outcome {
                Ok(table) => {
                    log::info!(
                        "Decoded {}: {} rows, columns {:?}",
                        self.file.name(),
                        table.row_count(),
                        table.column_names()
                    );
                    self.table = Some(table);
                    self.stage = Stage::Decoded;
                }
                Err(e) => {
                    log::warn!("Failed to decode {}: {e}", self.file.name());
                    self.failure = Some(e.to_string());
                    self.stage = Stage::Failed;
                    return Err(e);
                }
            }
        }
        self.table()
    }

    /// The current table, or `NotDecoded` if there is none.
    pub fn table(&self) -> Result<&Table> {
        self.table.as_ref().ok_or_else(|| self.not_decoded())
    }

    pub fn columns(&self) -> Result<Vec<String>> {
        Ok(self.table()?.column_names())
    }

    /// First `n` rows for a preview grid.
    pub fn head(&self, n: usize) -> Result<Table> {
        Ok(self.table()?.head(n))
    }

    /// Returns the number of rows dropped.
    pub fn remove_duplicates(&mut self) -> Result<usize> {
        let table = self.table()?;
        let deduped = clean::remove_duplicates(table);
        let removed = table.row_count() - deduped.row_count();
        log::info!("{}: removed {removed} duplicate rows", self.file.name());
        self.replace(deduped, Stage::Cleaned);
        Ok(removed)
    }

    pub fn fill_missing_numeric(&mut self) -> Result<FillReport> {
        let (filled, report) = clean::fill_missing_numeric(self.table()?);
        log::info!(
            "{}: filled {} missing numeric cells",
            self.file.name(),
            report.total_filled()
        );
        self.replace(filled, Stage::Cleaned);
        Ok(report)
    }

    /// Narrow the table to `selected`. On error the table is left as it was.
    pub fn project<S: AsRef<str>>(&mut self, selected: &[S]) -> Result<()> {
        let projected = project::project(self.table()?, selected)?;
        log::info!(
            "{}: keeping columns {:?}",
            self.file.name(),
            projected.column_names()
        );
        self.replace(projected, Stage::Projected);
        Ok(())
    }

    /// Chart data: the first `column_limit` numeric columns.
    pub fn numeric_preview(&mut self, column_limit: usize) -> Result<Vec<NumericSeries>> {
        let series = numeric_preview(self.table()?, column_limit);
        self.stage = Stage::Ready;
        Ok(series)
    }

    /// Encode the current table as `target`, named `<base>_cleaned.<ext>`.
    pub fn export(
        &mut self,
        target: ConversionTarget,
        options: &CodecOptions,
    ) -> Result<ExportArtifact> {
        let artifact = codec::export(self.table()?, self.file.name(), target, options)?;
        log::info!(
            "Exported {} as {} ({} bytes)",
            self.file.name(),
            artifact.file_name,
            artifact.bytes.len()
        );
        self.stage = Stage::Ready;
        Ok(artifact)
    }

    fn replace(&mut self, table: Table, stage: Stage) {
        self.table = Some(table);
        self.stage = stage;
    }

    fn not_decoded(&self) -> SweeperError {
        SweeperError::NotDecoded {
            file_name: self.file.name().to_string(),
            reason: self
                .failure
                .clone()
                .unwrap_or_else(|| "file has not been decoded yet".to_string()),
        }
    }
}

/// The first `column_limit` numeric columns of `table`, in column order.
pub fn numeric_preview(table: &Table, column_limit: usize) -> Vec<NumericSeries> {
    table
        .columns()
        .iter()
        .filter(|c| c.kind().is_numeric())
        .take(column_limit)
        .map(|c| NumericSeries {
            name: c.name().to_string(),
            values: c.values().iter().map(Value::as_f64).collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Batch – all sessions for one upload set
// ---------------------------------------------------------------------------

/// Independent sessions for every file of one upload. A failure in one file
/// never touches the others.
#[derive(Debug, Default)]
pub struct Batch {
    sessions: Vec<FileSession>,
}

impl Batch {
    /// Create a session per file and decode each one.
    pub fn from_uploads(files: Vec<UploadedFile>, options: &CodecOptions) -> Self {
        let sessions: Vec<FileSession> = files
            .into_iter()
            .map(|file| {
                let mut session = FileSession::new(file);
                // Failures stay recorded on the session.
                let _ = session.decode(options);
                session
            })
            .collect();

        let batch = Self { sessions };
        log::info!(
            "Processed {} files: {} loaded, {} failed",
            batch.len(),
            batch.len() - batch.failures().len(),
            batch.failures().len()
        );
        batch
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[FileSession] {
        &self.sessions
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut FileSession> {
        self.sessions.get_mut(index)
    }

    /// `(file name, message)` for every file that failed to load.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.sessions
            .iter()
            .filter_map(|s| s.failure().map(|msg| (s.file_name(), msg)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, body: &str) -> UploadedFile {
        UploadedFile::new(name, body.as_bytes().to_vec())
    }

    #[test]
    fn session_walks_through_stages() {
        let options = CodecOptions::default();
        let mut session = FileSession::new(upload("scores.csv", "name,score\na,1\na,1\nb,\n"));
        assert_eq!(session.stage(), Stage::Uploaded);

        session.decode(&options).unwrap();
        assert_eq!(session.stage(), Stage::Decoded);
        assert_eq!(session.format(), Some(Format::Csv));

        assert_eq!(session.remove_duplicates().unwrap(), 1);
        let report = session.fill_missing_numeric().unwrap();
        assert_eq!(report.filled.get("score"), Some(&1));
        assert_eq!(session.stage(), Stage::Cleaned);

        session.project(&["score"]).unwrap();
        assert_eq!(session.stage(), Stage::Projected);
        assert_eq!(session.columns().unwrap(), vec!["score"]);

        let artifact = session.export(ConversionTarget::Csv, &options).unwrap();
        assert_eq!(session.stage(), Stage::Ready);
        assert_eq!(artifact.file_name, "scores_cleaned.csv");
        assert_eq!(String::from_utf8(artifact.bytes).unwrap(), "score\n1.0\n1.0\n");

        // Ready is not terminal.
        session.remove_duplicates().unwrap();
        assert_eq!(session.stage(), Stage::Cleaned);
        assert_eq!(session.table().unwrap().row_count(), 1);
    }

    #[test]
    fn failed_decode_blocks_later_steps() {
        let mut session = FileSession::new(upload("notes.txt", "hello"));
        assert!(matches!(
            session.decode(&CodecOptions::default()),
            Err(SweeperError::UnsupportedFormat(_))
        ));
        assert_eq!(session.stage(), Stage::Failed);
        assert!(session.failure().unwrap().contains(".txt"));
        assert!(matches!(
            session.remove_duplicates(),
            Err(SweeperError::NotDecoded { .. })
        ));
        assert!(session.decode(&CodecOptions::default()).is_err());
    }

    #[test]
    fn bad_projection_leaves_table_alone() {
        let mut session = FileSession::new(upload("a.csv", "x,y\n1,2\n"));
        session.decode(&CodecOptions::default()).unwrap();
        assert!(session.project(&["x", "nope"]).is_err());
        assert_eq!(session.columns().unwrap(), vec!["x", "y"]);
        assert_eq!(session.stage(), Stage::Decoded);
    }

    #[test]
    fn numeric_preview_skips_non_numeric_and_caps_columns() {
        let mut session = FileSession::new(upload(
            "m.csv",
            "label,a,flag,b,c\nx,1,True,2.5,3\ny,,False,1.0,4\n",
        ));
        session.decode(&CodecOptions::default()).unwrap();

        let series = session.numeric_preview(2).unwrap();
        assert_eq!(session.stage(), Stage::Ready);
        assert_eq!(
            series,
            vec![
                NumericSeries {
                    name: "a".into(),
                    values: vec![Some(1.0), None],
                },
                NumericSeries {
                    name: "b".into(),
                    values: vec![Some(2.5), Some(1.0)],
                },
            ]
        );
    }

    #[test]
    fn batch_isolates_failures() {
        let batch = Batch::from_uploads(
            vec![
                upload("broken.csv", "a,b\n1,2,3\n"),
                upload("fine.csv", "a,b\n1,2\n"),
                upload("readme.txt", "hi"),
            ],
            &CodecOptions::default(),
        );

        assert_eq!(batch.len(), 3);
        let failed: Vec<&str> = batch.failures().iter().map(|(name, _)| *name).collect();
        assert_eq!(failed, vec!["broken.csv", "readme.txt"]);
        assert_eq!(batch.sessions()[1].stage(), Stage::Decoded);
    }
}
