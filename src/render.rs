// src/render.rs
use std::borrow::Cow;
use std::io::{self, Write};

use crate::ansi::strip_ansi;
use crate::session::ExtractionRow;
use crate::window::DisplayWindow;

/// Shown for a missing timestamp or a column with no recorded value.
pub const PLACEHOLDER: &str = "-";

const TIME_COLUMN: &str = "updated";
const MIN_COLUMN_WIDTH: usize = 8;

/// Where extraction updates go. `render` replaces the previous row
/// wholesale; there is no incremental cell patching.
pub trait RenderSink {
    /// Called for every incoming log line, before extraction results are
    /// known.
    fn observe_line(&mut self, line: &str) -> io::Result<()>;

    /// Called when at least one extractor matched the observed line.
    fn render(&mut self, header: &[String], row: &ExtractionRow) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[value(name = "table", help = "Plain-text row per update")]
    Table,
    #[value(name = "jsonl", help = "One JSON object per update")]
    Jsonl,
    #[value(name = "csv", help = "CSV: header once, then one record per update")]
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Table
    }
}

/// Serializes extraction rows in the selected format. Header emission is
/// stateful: once for csv, on every header change for table.
pub struct RowWriter {
    format: OutputFormat,
    header_written: bool,
    last_header: Vec<String>,
}

impl RowWriter {
    pub fn new(format: OutputFormat) -> Self {
        RowWriter {
            format,
            header_written: false,
            last_header: Vec::new(),
        }
    }

    pub fn write_row<W: Write>(
        &mut self,
        output: &mut W,
        header: &[String],
        row: &ExtractionRow,
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Table => self.write_table(output, header, row),
            OutputFormat::Jsonl => self.write_jsonl(output, header, row),
            OutputFormat::Csv => self.write_csv(output, header, row),
        }
    }

    pub fn reset(&mut self) {
        self.header_written = false;
        self.last_header.clear();
    }

    fn write_table<W: Write>(
        &mut self,
        output: &mut W,
        header: &[String],
        row: &ExtractionRow,
    ) -> io::Result<()> {
        if !self.header_written || self.last_header != header {
            writeln!(output, "{}", table_line(header, TIME_COLUMN, header.iter()))?;
            self.header_written = true;
            self.last_header = header.to_vec();
        }

        let time = row.timestamp.as_deref().unwrap_or(PLACEHOLDER);
        writeln!(
            output,
            "{}",
            table_line(header, time, row.cells.iter().map(cell_text))
        )
    }

    fn write_jsonl<W: Write>(
        &mut self,
        output: &mut W,
        header: &[String],
        row: &ExtractionRow,
    ) -> io::Result<()> {
        let mut obj = serde_json::Map::new();
        obj.insert(
            TIME_COLUMN.to_string(),
            match &row.timestamp {
                Some(t) => serde_json::Value::String(t.clone()),
                None => serde_json::Value::Null,
            },
        );
        for (name, cell) in header.iter().zip(&row.cells) {
            let value = match cell {
                Some(v) => serde_json::Value::String(v.clone()),
                None => serde_json::Value::Null,
            };
            obj.insert(name.clone(), value);
        }

        let json_line = serde_json::to_string(&serde_json::Value::Object(obj))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(output, "{}", json_line)
    }

    fn write_csv<W: Write>(
        &mut self,
        output: &mut W,
        header: &[String],
        row: &ExtractionRow,
    ) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(output.by_ref());

        if !self.header_written {
            let mut record = vec![TIME_COLUMN.to_string()];
            record.extend(header.iter().cloned());
            wtr.write_record(&record)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            self.header_written = true;
            self.last_header = header.to_vec();
        }

        let mut record =
            vec![row.timestamp.clone().unwrap_or_else(|| PLACEHOLDER.to_string())];
        record.extend(row.cells.iter().map(|cell| cell_text(cell).into_owned()));
        wtr.write_record(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        wtr.flush()
    }
}

fn cell_text(cell: &Option<String>) -> Cow<'_, str> {
    match cell {
        Some(value) => strip_ansi(value),
        None => Cow::Borrowed(PLACEHOLDER),
    }
}

fn table_line<I, S>(header: &[String], time: &str, cells: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = format!("{:<10}", time);
    for (name, cell) in header.iter().zip(cells) {
        let width = name.chars().count().max(MIN_COLUMN_WIDTH);
        line.push_str("  ");
        line.push_str(&format!("{:<width$}", cell.as_ref()));
    }
    line.trim_end().to_string()
}

/// Sink for stream output: echoes observed lines to one writer and
/// appends extraction rows to another.
pub struct WriteSink {
    rows: Box<dyn Write>,
    echo: Option<Box<dyn Write>>,
    writer: RowWriter,
}

impl WriteSink {
    pub fn new(
        format: OutputFormat,
        rows: Box<dyn Write>,
        echo: Option<Box<dyn Write>>,
    ) -> Self {
        WriteSink {
            rows,
            echo,
            writer: RowWriter::new(format),
        }
    }
}

impl RenderSink for WriteSink {
    fn observe_line(&mut self, line: &str) -> io::Result<()> {
        if let Some(echo) = &mut self.echo {
            writeln!(echo, "{}", line)?;
            echo.flush()?;
        }
        Ok(())
    }

    fn render(&mut self, header: &[String], row: &ExtractionRow) -> io::Result<()> {
        self.writer.write_row(&mut self.rows, header, row)?;
        self.rows.flush()
    }
}

/// Live terminal dashboard: keeps the bounded log window and redraws it
/// together with the extraction table on every update.
pub struct ScreenSink {
    out: Box<dyn Write>,
    window: DisplayWindow,
    header: Vec<String>,
    row: Option<ExtractionRow>,
    use_colors: bool,
}

impl ScreenSink {
    pub fn new(out: Box<dyn Write>, window_lines: usize, use_colors: bool) -> Self {
        ScreenSink {
            out,
            window: DisplayWindow::new(window_lines),
            header: Vec::new(),
            row: None,
            use_colors,
        }
    }

    pub fn window(&self) -> &DisplayWindow {
        &self.window
    }

    fn redraw(&mut self) -> io::Result<()> {
        let height = terminal_size::terminal_size()
            .map(|(_, terminal_size::Height(h))| h as usize)
            .unwrap_or(24);
        // Log tail above, three lines of table below
        let tail = height.saturating_sub(4).max(1);

        write!(self.out, "\x1b[2J\x1b[H")?;
        for line in self.window.tail(tail) {
            writeln!(self.out, "{}", line)?;
        }

        let (accent, reset) = if self.use_colors {
            ("\x1b[36m", "\x1b[0m")
        } else {
            ("", "")
        };
        writeln!(self.out, "{}{}{}", accent, "─".repeat(40), reset)?;
        writeln!(
            self.out,
            "{}{}{}",
            accent,
            table_line(&self.header, TIME_COLUMN, self.header.iter()),
            reset
        )?;

        let empty = ExtractionRow {
            timestamp: None,
            cells: vec![None; self.header.len()],
        };
        let row = self.row.as_ref().unwrap_or(&empty);
        let time = row.timestamp.as_deref().unwrap_or(PLACEHOLDER);
        writeln!(
            self.out,
            "{}",
            table_line(&self.header, time, row.cells.iter().map(cell_text))
        )?;
        self.out.flush()
    }
}

impl RenderSink for ScreenSink {
    fn observe_line(&mut self, line: &str) -> io::Result<()> {
        self.window.push(line.to_string());
        self.redraw()
    }

    fn render(&mut self, header: &[String], row: &ExtractionRow) -> io::Result<()> {
        self.header = header.to_vec();
        self.row = Some(row.clone());
        self.redraw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(timestamp: Option<&str>, cells: Vec<Option<&str>>) -> ExtractionRow {
        ExtractionRow {
            timestamp: timestamp.map(|s| s.to_string()),
            cells: cells
                .into_iter()
                .map(|c| c.map(|s| s.to_string()))
                .collect(),
        }
    }

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_header_once_then_rows() {
        let mut writer = RowWriter::new(OutputFormat::Table);
        let mut out = Vec::new();
        let h = header(&["loss", "acc"]);

        writer
            .write_row(&mut out, &h, &row(Some("12:00:01"), vec![Some("0.5"), None]))
            .unwrap();
        writer
            .write_row(&mut out, &h, &row(Some("12:00:02"), vec![Some("0.4"), Some("0.9")]))
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("updated"));
        assert!(lines[0].contains("loss"));
        assert!(lines[1].contains("12:00:01"));
        assert!(lines[1].contains("0.5"));
        assert!(lines[1].contains("-"));
        assert!(lines[2].contains("0.9"));
    }

    #[test]
    fn test_table_reemits_header_on_change() {
        let mut writer = RowWriter::new(OutputFormat::Table);
        let mut out = Vec::new();

        writer
            .write_row(&mut out, &header(&["a"]), &row(None, vec![None]))
            .unwrap();
        writer
            .write_row(&mut out, &header(&["a", "b"]), &row(None, vec![None, None]))
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("updated")).count(), 2);
    }

    #[test]
    fn test_table_strips_ansi_from_cells() {
        let mut writer = RowWriter::new(OutputFormat::Table);
        let mut out = Vec::new();

        writer
            .write_row(
                &mut out,
                &header(&["err"]),
                &row(Some("12:00:00"), vec![Some("\x1b[31mboom\x1b[0m")]),
            )
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("boom"));
        assert!(!text.contains("\x1b[31m"));
    }

    #[test]
    fn test_jsonl_row_shape() {
        let mut writer = RowWriter::new(OutputFormat::Jsonl);
        let mut out = Vec::new();

        writer
            .write_row(
                &mut out,
                &header(&["loss", "acc"]),
                &row(Some("12:00:01"), vec![Some("0.5"), None]),
            )
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.trim_end(),
            r#"{"updated":"12:00:01","loss":"0.5","acc":null}"#
        );
    }

    #[test]
    fn test_jsonl_placeholder_timestamp_is_null() {
        let mut writer = RowWriter::new(OutputFormat::Jsonl);
        let mut out = Vec::new();

        writer
            .write_row(&mut out, &header(&["x"]), &row(None, vec![None]))
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert!(parsed["updated"].is_null());
        assert!(parsed["x"].is_null());
    }

    #[test]
    fn test_csv_header_once_and_quoting() {
        let mut writer = RowWriter::new(OutputFormat::Csv);
        let mut out = Vec::new();
        let h = header(&["msg"]);

        writer
            .write_row(&mut out, &h, &row(Some("12:00:01"), vec![Some("a, b")]))
            .unwrap();
        writer
            .write_row(&mut out, &h, &row(Some("12:00:02"), vec![None]))
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "updated,msg");
        assert_eq!(lines[1], "12:00:01,\"a, b\"");
        assert_eq!(lines[2], "12:00:02,-");
    }

    #[test]
    fn test_write_sink_echoes_and_renders() {
        // Echo disabled: observed lines leave no trace
        let mut sink = WriteSink::new(OutputFormat::Table, Box::new(Vec::new()), None);
        sink.observe_line("loss: 0.5").unwrap();
        sink.render(&header(&["loss"]), &row(Some("12:00:00"), vec![Some("0.5")]))
            .unwrap();
    }

    #[test]
    fn test_screen_sink_window_is_bounded() {
        let mut sink = ScreenSink::new(Box::new(Vec::new()), 3, false);
        for i in 0..10 {
            sink.observe_line(&format!("line {}", i)).unwrap();
        }
        assert_eq!(sink.window().len(), 3);
    }
}
