//! Concatenation of batch files into a single table

use log::info;
use std::path::{Path, PathBuf};

use crate::corpus::list_files;
use crate::error::{Error, Result};
use crate::output::{create_writer, read_rows};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifySummary {
    pub path: PathBuf,
    /// Input files that contributed at least one row
    pub files: usize,
    pub rows: usize,
}

/// Concatenate every CSV in `dir` except `output` into `output`
///
/// Rows are copied as-is, in sorted file order, without deduplication.
pub fn unify(dir: &Path, output: &Path) -> Result<UnifySummary> {
    let inputs: Vec<PathBuf> = list_files(dir, "csv")?
        .into_iter()
        .filter(|path| path.as_path() != output)
        .collect();

    let mut writer = create_writer(output)?;
    let mut summary = UnifySummary {
        path: output.to_path_buf(),
        files: 0,
        rows: 0,
    };

    for (i, path) in inputs.iter().enumerate() {
        info!("{} {}", i, path.display());
        let rows = read_rows(path)?;
        if rows.is_empty() {
            continue;
        }
        for row in &rows {
            writer.serialize(row).map_err(|e| Error::csv(output, e))?;
        }
        summary.files += 1;
        summary.rows += rows.len();
    }

    writer.flush().map_err(|e| Error::io(output, e))?;
    info!("{} rows from {} files written to {}", summary.rows, summary.files, output.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UNIFIED_FILE_NAME;
    use crate::output::ResultRow;
    use std::fs;

    fn row(fname: &str, structure: &str) -> ResultRow {
        ResultRow {
            fname: fname.to_string(),
            sentence: "a, \"quoted\" sentence".to_string(),
            structure: structure.to_string(),
            data: "[]".to_string(),
        }
    }

    fn write_rows(path: &Path, rows: &[ResultRow]) {
        let mut writer = create_writer(path).unwrap();
        for r in rows {
            writer.serialize(r).unwrap();
        }
        writer.flush().unwrap();
    }

    #[test]
    fn test_unify_concatenates() {
        let dir = tempfile::tempdir().unwrap();
        write_rows(
            &dir.path().join("b_0.csv"),
            &[row("b", "L2_comparative_form")],
        );
        write_rows(
            &dir.path().join("a_0.csv"),
            &[row("a", "L2_superlative_form"), row("a", "L2_superlative_form")],
        );
        write_rows(&dir.path().join("c_0.csv"), &[]);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let output = dir.path().join(UNIFIED_FILE_NAME);
        let summary = unify(dir.path(), &output).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.rows, 3);

        let rows = read_rows(&output).unwrap();
        let fnames: Vec<&str> = rows.iter().map(|r| r.fname.as_str()).collect();
        assert_eq!(fnames, vec!["a", "a", "b"]);
        assert_eq!(rows[0], row("a", "L2_superlative_form"));
    }

    #[test]
    fn test_unify_skips_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        write_rows(&dir.path().join("a_0.csv"), &[row("a", "L2_comparative_form")]);
        let output = dir.path().join(UNIFIED_FILE_NAME);

        unify(dir.path(), &output).unwrap();
        let again = unify(dir.path(), &output).unwrap();
        assert_eq!(again.rows, 1);
        assert_eq!(read_rows(&output).unwrap().len(), 1);
    }
}
