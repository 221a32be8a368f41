use crate::domain::model::{Resolution, ResolutionSummary};
use crate::utils::error::{FinderError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use calamine::Reader;
use std::io::Cursor;

pub const ADDRESS_COLUMN: &str = "token address";
pub const NETWORK_COLUMN: &str = "Blockchain";
pub const OUTPUT_STEM: &str = "token_addresses_output";

/// Whether the first row of the input names the columns or is data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum HeaderMode {
    #[default]
    None,
    FirstRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", OUTPUT_STEM, self.extension())
    }
}

/// Tab for `.tsv`/`.tab` files, comma otherwise.
pub fn delimiter_for_path(path: &str) -> u8 {
    match extension_of(path).as_deref() {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

fn extension_of(path: &str) -> Option<String> {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_workbook_path(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.as_str()))
}

/// Counts the blank lines starting at `offset`. A `\n` completing the
/// previous record's `\r\n` is not a blank line.
fn blank_lines_at(data: &[u8], offset: usize) -> usize {
    let mut i = offset;
    if i > 0 && data.get(i - 1) == Some(&b'\r') && data.get(i) == Some(&b'\n') {
        i += 1;
    }

    let mut count = 0;
    while let Some(&byte) = data.get(i) {
        match byte {
            b'\r' => {
                i += 1;
                if data.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => i += 1,
            _ => break,
        }
        count += 1;
    }
    count
}

/// Spreadsheet-style column label: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl InputTable {
    /// Parses delimited text. Blank lines are kept as empty rows so every
    /// line of the input maps to one row.
    pub fn from_bytes(data: &[u8], delimiter: u8, header_mode: HeaderMode) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(data);

        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            let offset = csv_reader.position().byte() as usize;
            if !csv_reader.read_record(&mut record)? {
                break;
            }
            // csv skips blank lines silently
            rows.extend(std::iter::repeat_with(Vec::new).take(blank_lines_at(data, offset)));
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self::from_rows(rows, header_mode))
    }

    /// Reads the first worksheet of an xlsx/xls/ods workbook. Cells are
    /// placed at their sheet coordinates, so column A is always the ticker.
    pub fn from_workbook(data: &[u8], header_mode: HeaderMode) -> Result<Self> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => return Ok(Self::from_rows(Vec::new(), header_mode)),
        };

        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<String>> = (0..first_row).map(|_| Vec::new()).collect();
        for row in range.rows() {
            let mut cells = vec![String::new(); first_col as usize];
            cells.extend(row.iter().map(|cell| cell.to_string()));
            rows.push(cells);
        }

        Ok(Self::from_rows(rows, header_mode))
    }

    /// Picks the workbook or delimited reader from the file extension.
    pub fn parse(path: &str, data: &[u8], header_mode: HeaderMode) -> Result<Self> {
        if is_workbook_path(path) {
            Self::from_workbook(data, header_mode)
        } else {
            Self::from_bytes(data, delimiter_for_path(path), header_mode)
        }
    }

    fn from_rows(mut rows: Vec<Vec<String>>, header_mode: HeaderMode) -> Self {
        let headers = match header_mode {
            HeaderMode::FirstRow if rows.is_empty() => Some(Vec::new()),
            HeaderMode::FirstRow => Some(rows.remove(0)),
            HeaderMode::None => None,
        };
        Self { headers, rows }
    }

    /// First cell of every row; rows without cells yield null.
    pub fn ticker_cells(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| match row.first() {
                Some(cell) => serde_json::Value::String(cell.clone()),
                None => serde_json::Value::Null,
            })
            .collect()
    }

    pub fn width(&self) -> usize {
        let header_width = self.headers.as_ref().map(Vec::len).unwrap_or(0);
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(header_width)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    columns: &'a [String],
    rows: &'a [Vec<String>],
    summary: &'a ResolutionSummary,
}

impl ResultTable {
    /// Pads every input row to the table width and appends the resolution
    /// columns. Row count and order are preserved.
    pub fn assemble(
        input: &InputTable,
        resolutions: &[Resolution],
        include_network: bool,
    ) -> Result<Self> {
        if input.rows.len() != resolutions.len() {
            return Err(FinderError::ProcessingError {
                message: format!(
                    "{} resolutions for {} input rows",
                    resolutions.len(),
                    input.rows.len()
                ),
            });
        }

        let width = input.width();
        let mut headers: Vec<String> = (0..width)
            .map(|i| {
                input
                    .headers
                    .as_ref()
                    .and_then(|h| h.get(i))
                    .cloned()
                    .unwrap_or_else(|| format!("Column {}", column_letter(i)))
            })
            .collect();
        headers.push(ADDRESS_COLUMN.to_string());
        if include_network {
            headers.push(NETWORK_COLUMN.to_string());
        }

        let rows = input
            .rows
            .iter()
            .zip(resolutions)
            .map(|(row, resolution)| {
                let mut cells = row.clone();
                cells.resize(width, String::new());
                cells.push(resolution.address_cell().to_string());
                if include_network {
                    cells.push(resolution.network_cell().to_string());
                }
                cells
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|h| h == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    pub fn to_delimited(&self, delimiter: u8) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| FinderError::IoError(e.into_error()))
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        self.to_delimited(b',')
    }

    pub fn to_json(&self, summary: &ResolutionSummary, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
        let report = JsonReport {
            generated_at,
            columns: &self.headers,
            rows: &self.rows,
            summary,
        };
        Ok(serde_json::to_vec_pretty(&report)?)
    }

    pub fn encode(
        &self,
        format: OutputFormat,
        summary: &ResolutionSummary,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Csv => self.to_csv(),
            OutputFormat::Tsv => self.to_delimited(b'\t'),
            OutputFormat::Json => self.to_json(summary, generated_at),
        }
    }

    /// Aligned text rendering of the header and the first `max_rows` rows.
    pub fn render_preview(&self, max_rows: usize) -> String {
        let shown = &self.rows[..self.rows.len().min(max_rows)];
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in shown {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let format_line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![format_line(self.headers.as_slice())];
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        lines.extend(shown.iter().map(|row| format_line(row.as_slice())));

        let hidden = self.rows.len() - shown.len();
        if hidden > 0 {
            lines.push(format!("... {} more rows", hidden));
        }
        lines.join("\n")
    }
}
