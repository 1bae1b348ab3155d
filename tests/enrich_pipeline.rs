use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use jobmeta::{
    configuration::ApplicationSettings,
    services::{Enricher, FetchError, PageFetcher, PageResponse, RetryPolicy, Transport},
    startup::run_enrichment,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::tempdir;

/// Serves fixed pages by URL; unknown URLs fail like an unreachable host.
struct FixedPages(HashMap<&'static str, (StatusCode, &'static str)>);

#[async_trait]
impl Transport for FixedPages {
    async fn get(&self, url: &str) -> Result<PageResponse, FetchError> {
        match self.0.get(url) {
            Some((status, body)) => Ok(PageResponse {
                status: *status,
                body: body.to_string(),
            }),
            None => Err(FetchError::Transport(
                format!("error sending request for url ({})", url).into(),
            )),
        }
    }
}

const POSTING: &str = r#"<!DOCTYPE html><html><body>
  <article>
    <div class="article__content__view__field tf_replaceFieldVideoTokens">
      <div class="article__content__view__field__label">Req #</div>
      <div class="article__content__view__field__value">R-1042</div>
    </div>
    <div class="article__content__view__field">
      <div class="article__content__view__field__label">Travel</div>
      <div class="article__content__view__field__value">25%</div>
    </div>
    <div class="article__header"><h2>Job Overview</h2></div>
    <div class="article__content article__content--rich-text">
      <p>Plan maintenance.</p>
      <ul><li>Read drawings</li><li>Lead crews</li></ul>
    </div>
  </article>
</body></html>"#;

fn settings(dir: &Path) -> ApplicationSettings {
    ApplicationSettings {
        input_file: dir.join("jobs.json"),
        output_file: dir.join("jobs_with_metadata.json"),
        record_delay_millis: 700,
    }
}

fn enricher() -> Enricher<FixedPages> {
    let pages = FixedPages(HashMap::from([
        ("https://careers.example.com/1042", (StatusCode::OK, POSTING)),
        ("https://careers.example.com/gone", (StatusCode::GONE, "")),
    ]));
    Enricher::new(
        PageFetcher::new(pages, RetryPolicy::default()),
        Duration::from_millis(700),
    )
}

fn write_input(path: &PathBuf, records: &Value) {
    fs::write(path, serde_json::to_string_pretty(records).unwrap()).unwrap();
}

#[tokio::test(start_paused = true)]
async fn enriches_every_record_into_a_valid_array() {
    let dir = tempdir().unwrap();
    let settings = settings(dir.path());
    write_input(
        &settings.input_file,
        &json!([
            {"id": "1042", "title": "Planner", "application_url": "https://careers.example.com/1042"},
            {"id": "1043", "title": "Welder", "application_url": ""},
            {"id": "1044", "title": "Fitter", "application_url": "https://careers.example.com/gone"},
            {"id": "1045", "title": "Rigger", "application_url": "https://unreachable.example.com/"},
            {"id": "1046", "title": "Ingénieur", "application_url": null}
        ]),
    );

    let summary = run_enrichment(&settings, &enricher())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.described, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.skipped, 2);

    let text = fs::read_to_string(&settings.output_file).unwrap();
    assert!(text.contains("Ingénieur"));
    let output: Vec<Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(output.len(), 5);

    let ids: Vec<&str> = output.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["1042", "1043", "1044", "1045", "1046"]);

    assert_eq!(
        output[0],
        json!({
            "id": "1042",
            "title": "Planner",
            "application_url": "https://careers.example.com/1042",
            "description": "Plan maintenance. Read drawings Lead crews",
            "Req #": "R-1042",
            "Travel": "25%"
        })
    );
    assert_eq!(
        output[1],
        json!({"id": "1043", "title": "Welder", "application_url": ""})
    );
    assert_eq!(
        output[2]["description"],
        json!("ERROR: 410 Client Error: Gone for url: https://careers.example.com/gone")
    );
    assert_eq!(output[3].as_object().unwrap().len(), 4);
    assert!(output[3]["description"]
        .as_str()
        .unwrap()
        .starts_with("ERROR: "));
    assert!(output[4].get("description").is_none());
}

#[tokio::test]
async fn missing_input_leaves_no_output() {
    let dir = tempdir().unwrap();
    let settings = settings(dir.path());

    let summary = run_enrichment(&settings, &enricher()).await.unwrap();

    assert!(summary.is_none());
    assert!(!settings.output_file.exists());
}

#[tokio::test]
async fn malformed_input_is_an_error() {
    let dir = tempdir().unwrap();
    let settings = settings(dir.path());
    fs::write(&settings.input_file, "{\"id\": 1}").unwrap();

    assert!(run_enrichment(&settings, &enricher()).await.is_err());
    assert!(!settings.output_file.exists());
}
