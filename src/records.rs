//! Append-only comma separated logs of form submissions.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::error::HubError;

#[derive(Debug)]
pub struct RecordLog {
    path: PathBuf,

    header: &'static [&'static str],

    /// Quote fields containing delimiters instead of writing them verbatim.
    quote_fields: bool,

    /// Serializes appends coming from concurrent requests.
    lock: Mutex<()>,
}

impl RecordLog {
    pub fn new(
        path: impl Into<PathBuf>,
        header: &'static [&'static str],
        quote_fields: bool,
    ) -> Self {
        Self {
            path: path.into(),
            header,
            quote_fields,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a row, writing the header first if the file does not exist.
    pub async fn append(&self, row: &[&str]) -> Result<(), HubError> {
        let _guard = self.lock.lock().await;

        let line = self.format_line(row);
        let result = write_row(&self.path, &self.format_line(self.header), &line);

        match &result {
            Ok(created) => {
                if *created {
                    info!("Created {}", self.path.display());
                }
                info!("Appended record to {}", self.path.display());
            }
            Err(e) => error!("Unable to append to {}: {e}", self.path.display()),
        }

        result.map(|_| ())
    }

    fn format_line(&self, fields: &[&str]) -> String {
        let mut line = if self.quote_fields {
            fields
                .iter()
                .map(|field| quote(field))
                .collect::<Vec<_>>()
                .join(",")
        } else {
            fields.join(",")
        };
        line.push('\n');
        line
    }
}

/// Returns whether the file had to be created.
fn write_row(path: &Path, header: &str, line: &str) -> Result<bool, HubError> {
    let created = !path.exists();

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    if created {
        file.write_all(header.as_bytes())?;
    }

    file.write_all(line.as_bytes())?;

    Ok(created)
}

fn quote(field: &str) -> String {
    if !field.contains([',', '"', '\r', '\n']) {
        return field.to_string();
    }
    format!("\"{}\"", field.replace('"', "\"\""))
}
