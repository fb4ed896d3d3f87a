//! Persistence sinks for scrape batches
//!
//! Both sinks overwrite their file on every write; the file always holds the
//! most recent batch.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::product::ScrapeBatch;
use crate::infrastructure::crawl_error::CrawlResult;

/// Column headers of the CSV export, in order
pub const CSV_HEADERS: [&str; 5] = ["url", "Name", "Price", "Brand", "Fibre Content"];

pub trait BatchSink: Send + Sync {
    /// Persist the batch, returning the path written
    fn write_batch(&self, batch: &ScrapeBatch) -> CrawlResult<PathBuf>;
}

fn ensure_parent_dir(path: &Path) -> CrawlResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes one row per record; missing values are empty cells, a missing
/// fibre count is "NA"
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchSink for CsvSink {
    fn write_batch(&self, batch: &ScrapeBatch) -> CrawlResult<PathBuf> {
        ensure_parent_dir(&self.path)?;

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CSV_HEADERS)?;

        for record in &batch.records {
            let price = record.price.map(|p| p.to_string()).unwrap_or_default();
            writer.write_record([
                record.url.as_str(),
                record.name.as_deref().unwrap_or_default(),
                price.as_str(),
                record.brand.as_deref().unwrap_or_default(),
                record.fibre_count.to_string().as_str(),
            ])?;
        }
        writer.flush()?;

        info!("💾 Saved {} records to {}", batch.len(), self.path.display());
        Ok(self.path.clone())
    }
}

/// Writes the records as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BatchSink for JsonSink {
    fn write_batch(&self, batch: &ScrapeBatch) -> CrawlResult<PathBuf> {
        ensure_parent_dir(&self.path)?;

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &batch.records)?;
        writer.flush()?;

        info!("💾 Saved {} records to {}", batch.len(), self.path.display());
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{FibreCount, ProductRecord};
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_batch() -> ScrapeBatch {
        ScrapeBatch::new(
            vec![
                ProductRecord {
                    url: "https://example.com/p/1".to_string(),
                    name: Some("Wool, Blend Scarf".to_string()),
                    price: Some(19.99),
                    brand: Some("Acme".to_string()),
                    fibre_count: FibreCount::Count(120),
                },
                ProductRecord::empty("https://example.com/p/2"),
            ],
            Utc::now(),
        )
    }

    #[test]
    fn test_csv_sink_writes_renamed_columns() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("out/products.csv"));

        let path = sink.write_batch(&sample_batch()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "url,Name,Price,Brand,Fibre Content");
        assert_eq!(lines[1], "https://example.com/p/1,\"Wool, Blend Scarf\",19.99,Acme,120");
        assert_eq!(lines[2], "https://example.com/p/2,,,,NA");
    }

    #[test]
    fn test_csv_sink_overwrites_previous_batch() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("products.csv"));

        sink.write_batch(&sample_batch()).unwrap();
        sink.write_batch(&ScrapeBatch::new(Vec::new(), Utc::now())).unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_json_sink() {
        let dir = TempDir::new().unwrap();
        let sink = JsonSink::new(dir.path().join("products.json"));

        let path = sink.write_batch(&sample_batch()).unwrap();
        let parsed: Vec<ProductRecord> = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].fibre_count, FibreCount::NotAvailable);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_json_sink_reports_buffered_write_failure() {
        let sink = JsonSink::new("/dev/full");
        assert!(sink.write_batch(&sample_batch()).is_err());
    }
}
