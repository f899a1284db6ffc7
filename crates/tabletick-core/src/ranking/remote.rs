//! HTTP scoreboard client.
//!
//! Contract:
//! - `GET {endpoint}?duration=N` returns a JSON array of `{name, score, date}`.
//! - `POST {endpoint}` with `{duration, name, score, date}` returns 2xx on
//!   success, optionally with a boolean-ish body.
//!
//! Reads degrade to an empty board on any failure. Writes report failure so
//! the caller can offer a retry.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use url::Url;

use super::{RankEntry, RankingBucket, RankingStore};
use crate::error::{ConfigError, CoreError, RankingError};
use crate::tap::TapDuration;

/// Body of a score POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub duration: u32,
    pub name: String,
    pub score: i64,
    pub date: String,
}

pub struct RemoteRankingStore {
    endpoint: Url,
    client: Client,
    runtime: Runtime,
    settle_delay: Duration,
}

impl RemoteRankingStore {
    /// Build a client for `endpoint`.
    ///
    /// # Errors
    /// Fails if the endpoint is not an absolute http(s) URL or the HTTP
    /// client cannot be created.
    pub fn new(endpoint: &str, timeout: Duration, settle_delay: Duration) -> Result<Self, CoreError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "ranking.endpoint".into(),
            message: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "ranking.endpoint".into(),
                message: format!("unsupported scheme '{}'", endpoint.scheme()),
            }
            .into());
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RankingError::Transport)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RankingError::Runtime)?;

        Ok(Self {
            endpoint,
            client,
            runtime,
            settle_delay,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn board_url(&self, duration: TapDuration) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("duration", &duration.secs().to_string());
        url
    }

    fn fetch(&self, duration: TapDuration) -> Result<Vec<RankEntry>, RankingError> {
        let url = self.board_url(duration);
        self.runtime.block_on(async {
            let resp = self.client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(RankingError::Rejected {
                    status: status.as_u16(),
                });
            }
            Ok(resp.json::<Vec<RankEntry>>().await?)
        })
    }
}

/// Interpret a 2xx POST body. Only an explicit negative counts as failure.
fn submission_accepted(body: &str) -> bool {
    let body = body.trim();
    if body.is_empty() {
        return true;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Bool(ok)) => ok,
        Ok(serde_json::Value::Object(map)) => ["success", "ok"]
            .iter()
            .filter_map(|k| map.get(*k))
            .all(|v| v.as_bool() != Some(false)),
        _ => true,
    }
}

impl RankingStore for RemoteRankingStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    fn load(&self, duration: TapDuration) -> RankingBucket {
        match self.fetch(duration) {
            Ok(entries) => RankingBucket::from_entries(entries),
            Err(e) => {
                tracing::warn!(%duration, error = %e, "ranking fetch failed; showing empty board");
                RankingBucket::new()
            }
        }
    }

    fn submit(&self, duration: TapDuration, entry: &RankEntry) -> Result<(), RankingError> {
        let body = ScoreSubmission {
            duration: duration.secs(),
            name: entry.name.clone(),
            score: entry.score,
            date: entry.date.clone(),
        };
        self.runtime.block_on(async {
            let resp = self
                .client
                .post(self.endpoint.clone())
                .json(&body)
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(RankingError::Rejected {
                    status: status.as_u16(),
                });
            }
            let text = resp.text().await?;
            if submission_accepted(&text) {
                Ok(())
            } else {
                Err(RankingError::NotAccepted)
            }
        })
    }

    fn clear(&self, _duration: TapDuration) -> Result<(), RankingError> {
        Err(RankingError::Unsupported {
            backend: "remote",
            operation: "clear",
        })
    }

    fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use mockito::Matcher;

    use super::*;

    fn store(server: &mockito::Server) -> RemoteRankingStore {
        RemoteRankingStore::new(
            &format!("{}/scores", server.url()),
            Duration::from_secs(5),
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn rejects_non_http_endpoint() {
        assert!(RemoteRankingStore::new("ftp://example.com", Duration::from_secs(1), Duration::ZERO).is_err());
        assert!(RemoteRankingStore::new("not a url", Duration::from_secs(1), Duration::ZERO).is_err());
    }

    #[test]
    fn load_parses_and_normalizes_board() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/scores")
            .match_query(Matcher::UrlEncoded("duration".into(), "5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"name":"low","score":3,"date":"2024-01-02"},
                    {"name":"high","score":9,"date":"2024-01-01"}]"#,
            )
            .create();

        let bucket = store(&server).load(TapDuration::Five);
        mock.assert();
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.entries()[0].name, "high");
    }

    #[test]
    fn load_failure_degrades_to_empty() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/scores")
            .match_query(Matcher::Any)
            .with_status(503)
            .create();
        assert!(store(&server).load(TapDuration::Ten).is_empty());
    }

    #[test]
    fn load_garbage_degrades_to_empty() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/scores")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create();
        assert!(store(&server).load(TapDuration::Ten).is_empty());
    }

    #[test]
    fn submit_fails_when_accepted_body_cannot_be_read() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/scores")
            .with_status(201)
            .with_chunked_body(|w| {
                w.write_all(br#"{"succ"#)?;
                std::thread::sleep(Duration::from_millis(600));
                w.write_all(br#"ess": true}"#)
            })
            .create();
        let store = RemoteRankingStore::new(
            &format!("{}/scores", server.url()),
            Duration::from_millis(150),
            Duration::ZERO,
        )
        .unwrap();

        let entry = RankEntry::new("ann", 21, "d").unwrap();
        assert!(matches!(
            store.submit(TapDuration::Three, &entry),
            Err(RankingError::Transport(_))
        ));
    }

    #[test]
    fn submit_posts_contract_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/scores")
            .match_body(Matcher::Json(serde_json::json!({
                "duration": 3,
                "name": "ann",
                "score": 21,
                "date": "2024-06-01T10:00:00Z"
            })))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create();

        let entry = RankEntry::new("ann", 21, "2024-06-01T10:00:00Z").unwrap();
        store(&server).submit(TapDuration::Three, &entry).unwrap();
        mock.assert();
    }

    #[test]
    fn submit_non_2xx_is_surfaced() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("POST", "/scores").with_status(500).create();
        let entry = RankEntry::new("ann", 21, "d").unwrap();
        let err = store(&server).submit(TapDuration::Three, &entry).unwrap_err();
        assert!(matches!(err, RankingError::Rejected { status: 500 }));
    }

    #[test]
    fn submit_explicit_false_is_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/scores")
            .with_status(200)
            .with_body("false")
            .create();
        let entry = RankEntry::new("ann", 21, "d").unwrap();
        let err = store(&server).submit(TapDuration::Three, &entry).unwrap_err();
        assert!(matches!(err, RankingError::NotAccepted));
    }

    #[test]
    fn remote_clear_is_unsupported() {
        let server = mockito::Server::new();
        assert!(matches!(
            store(&server).clear(TapDuration::Five),
            Err(RankingError::Unsupported { .. })
        ));
    }

    #[test]
    fn acceptance_body_variants() {
        assert!(submission_accepted(""));
        assert!(submission_accepted("true"));
        assert!(submission_accepted(r#"{"ok": true}"#));
        assert!(submission_accepted("created"));
        assert!(!submission_accepted("false"));
        assert!(!submission_accepted(r#"{"success": false}"#));
        assert!(!submission_accepted(r#"{"ok": false, "error": "dup"}"#));
    }
}
