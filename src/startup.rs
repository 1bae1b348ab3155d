use anyhow::Context;

use crate::{
    configuration::{ApplicationSettings, FetcherSettings},
    dal::{load_records, StreamWriter},
    services::{EnrichSummary, Enricher, HttpTransport, PageFetcher, Transport},
};

pub fn build_enricher(
    fetcher: &FetcherSettings,
    application: &ApplicationSettings,
) -> anyhow::Result<Enricher<HttpTransport>> {
    let transport = HttpTransport::new(&fetcher.user_agent, fetcher.timeout())
        .context("Failed to build HTTP client")?;
    let fetcher = PageFetcher::new(transport, fetcher.retry_policy()?);

    Ok(Enricher::new(fetcher, application.record_delay()))
}

/// Enriches the configured input file into the configured output file.
/// Returns `None` without touching the output when the input is missing.
pub async fn run_enrichment<T: Transport>(
    application: &ApplicationSettings,
    enricher: &Enricher<T>,
) -> anyhow::Result<Option<EnrichSummary>> {
    let Some(records) = load_records(&application.input_file)? else {
        log::error!(
            "❌ Error: {} not found.",
            application.input_file.display()
        );
        return Ok(None);
    };

    log::info!("🚀 Scraping {} jobs with dynamic metadata...", records.len());

    let mut writer = StreamWriter::create(&application.output_file)?;
    let summary = enricher.run(records, &mut writer).await?;
    writer.finish()?;

    log::info!(
        "🎉 Done! {} of {} jobs described, {} failed, {} without url. All metadata saved to {}",
        summary.described,
        summary.total,
        summary.failed,
        summary.skipped,
        application.output_file.display()
    );

    Ok(Some(summary))
}
