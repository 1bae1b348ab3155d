use std::time::Duration;

use crate::{
    dal::StreamWriter,
    domain::{JobRecord, ScrapedFields, UrlField, ERROR_MARKER},
};

use super::{extract_metadata, FetchError, HttpTransport, PageFetcher, Transport};

pub const DEFAULT_RECORD_DELAY: Duration = Duration::from_millis(700);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnrichSummary {
    pub total: usize,
    pub described: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct Enricher<T = HttpTransport> {
    fetcher: PageFetcher<T>,
    record_delay: Duration,
}

impl<T: Transport> Enricher<T> {
    pub fn new(fetcher: PageFetcher<T>, record_delay: Duration) -> Self {
        Enricher {
            fetcher,
            record_delay,
        }
    }

    pub fn fetcher(&self) -> &PageFetcher<T> {
        &self.fetcher
    }

    /// Fetch and extract one page. Failures end up in the description.
    pub async fn scrape(&self, url: &str) -> ScrapedFields {
        match self.fetcher.fetch(url).await {
            Ok(html) => extract_metadata(&html),
            Err(e) => {
                log::debug!("Fetching {} failed: {:?}", url, e);
                ScrapedFields::from_error(e)
            }
        }
    }

    pub async fn enrich_record(&self, record: JobRecord) -> JobRecord {
        let scraped = match record.url_field() {
            UrlField::Missing => return record,
            UrlField::Link(url) => self.scrape(url).await,
            UrlField::Malformed(value) => {
                ScrapedFields::from_error(FetchError::InvalidUrl(value.to_string()))
            }
        };
        record.merge(scraped)
    }

    /// Enriches and writes every record in order, pausing after each one.
    pub async fn run(
        &self,
        records: Vec<JobRecord>,
        writer: &mut StreamWriter,
    ) -> anyhow::Result<EnrichSummary> {
        let total = records.len();
        let mut summary = EnrichSummary {
            total,
            ..EnrichSummary::default()
        };

        for (index, record) in records.into_iter().enumerate() {
            if record.url_field() == UrlField::Missing {
                summary.skipped += 1;
            }
            let record = self.enrich_record(record).await;

            let described = record.is_described();
            if described {
                summary.described += 1;
            }
            if record
                .description()
                .is_some_and(|text| text.starts_with(ERROR_MARKER))
            {
                summary.failed += 1;
            }

            log::info!(
                "[{}/{}] ID: {} {} | Fields Found: {}",
                index + 1,
                total,
                record.id_label(),
                if described { "✅" } else { "❌" },
                record.extra_field_count()
            );

            writer.write_record(&record)?;

            tokio::time::sleep(self.record_delay).await;
        }

        Ok(summary)
    }
}
