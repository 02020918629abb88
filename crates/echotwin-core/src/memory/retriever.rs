//! Semantic retrieval of past exchanges as grounding context.

use std::fmt::Write;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use echotwin_types::exchange::RankedExchange;

use crate::memory::box_embedder::BoxEmbedder;
use crate::memory::vector::ExchangeVectorStore;

/// Heading of the memory block injected into the user prompt.
pub const CONTEXT_HEADER: &str = "RELEVANT PAST CONVERSATIONS:";

pub struct MemoryRetriever<V: ExchangeVectorStore> {
    index: Arc<V>,
    embedder: Arc<BoxEmbedder>,
}

impl<V: ExchangeVectorStore> MemoryRetriever<V> {
    pub fn new(index: Arc<V>, embedder: Arc<BoxEmbedder>) -> Self {
        Self { index, embedder }
    }

    /// Exchanges most similar to `query`, most similar first.
    ///
    /// With `days_back` set, an exchange is eligible when the start of its
    /// day is no earlier than `days_back` days before now. Failures degrade
    /// to an empty result.
    pub async fn retrieve_context(
        &self,
        query: &str,
        limit: usize,
        days_back: Option<u32>,
    ) -> Vec<RankedExchange> {
        self.retrieve_context_at(query, limit, days_back, Utc::now())
            .await
    }

    #[tracing::instrument(name = "retrieve_context", skip(self, query, now))]
    pub async fn retrieve_context_at(
        &self,
        query: &str,
        limit: usize,
        days_back: Option<u32>,
        now: DateTime<Utc>,
    ) -> Vec<RankedExchange> {
        if limit == 0 {
            return Vec::new();
        }

        let embedding = match self.embedder.embed_one(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed; continuing without memory");
                return Vec::new();
            }
        };

        let since = days_back.map(|days| first_eligible_day(now, days));

        match self.index.search(&embedding, limit, since).await {
            Ok(mut ranked) => {
                ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
                ranked.truncate(limit);
                tracing::debug!(hits = ranked.len(), "memory retrieved");
                ranked
            }
            Err(e) => {
                tracing::warn!(error = %e, "memory search failed; continuing without memory");
                Vec::new()
            }
        }
    }
}

/// Earliest exchange date whose midnight falls at or after `now - days_back`.
fn first_eligible_day(now: DateTime<Utc>, days_back: u32) -> NaiveDate {
    let cutoff = (now - Duration::days(i64::from(days_back))).naive_utc();
    let day = cutoff.date();
    if cutoff.time() == NaiveTime::MIN {
        day
    } else {
        day.succ_opt().unwrap_or(day)
    }
}

/// Render retrieved exchanges as a prompt block, in the given order.
///
/// Returns an empty string when there is nothing to show.
pub fn format_context(ranked: &[RankedExchange]) -> String {
    if ranked.is_empty() {
        return String::new();
    }

    let mut out = String::from(CONTEXT_HEADER);
    out.push('\n');
    for hit in ranked {
        let record = &hit.record;
        let _ = writeln!(out, "[{}] ({}) {}", record.date, record.mood, record.document);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::TimeZone;
    use echotwin_types::exchange::{EmbeddingRecord, ExchangeId, LanguageMix, Mood};

    use super::*;
    use crate::testing::{FakeEmbedder, FakeExchangeIndex};

    fn record(id: &str, timestamp: DateTime<Utc>) -> EmbeddingRecord {
        EmbeddingRecord {
            id: ExchangeId(id.to_string()),
            document: format!("User: {id} | AI: ok"),
            timestamp,
            date: timestamp.date_naive(),
            mood: Mood::Neutral,
            language_mix: LanguageMix::LatinDominant,
            context: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap()
    }

    fn retriever(index: Arc<FakeExchangeIndex>) -> MemoryRetriever<FakeExchangeIndex> {
        let embedder = FakeEmbedder::default().with("query", vec![0.0, 0.0, 0.0]);
        MemoryRetriever::new(index, Arc::new(BoxEmbedder::new(embedder)))
    }

    #[tokio::test]
    async fn test_results_ascend_by_distance() {
        let index = Arc::new(FakeExchangeIndex::default());
        index.insert(record("a", now()), vec![0.1, 0.0, 0.0]);
        index.insert(record("b", now()), vec![0.9, 0.0, 0.0]);
        index.insert(record("c", now()), vec![0.3, 0.0, 0.0]);

        let hits = retriever(index)
            .retrieve_context_at("query", 2, None, now())
            .await;
        let ids: Vec<&str> = hits.iter().map(|h| h.record.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!((hits[0].distance - 0.1).abs() < 1e-6);
        assert!((hits[1].distance - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_days_back_window() {
        let index = Arc::new(FakeExchangeIndex::default());
        index.insert(record("old", now() - Duration::days(10)), vec![0.1, 0.0, 0.0]);
        index.insert(record("new", now() - Duration::days(1)), vec![0.5, 0.0, 0.0]);
        let retriever = retriever(index);

        let week = retriever.retrieve_context_at("query", 3, Some(7), now()).await;
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].record.id.as_str(), "new");

        let fortnight = retriever.retrieve_context_at("query", 3, Some(14), now()).await;
        assert_eq!(fortnight.len(), 2);
        assert_eq!(fortnight[0].record.id.as_str(), "old");

        let unbounded = retriever.retrieve_context_at("query", 3, None, now()).await;
        assert_eq!(unbounded.len(), 2);
    }

    #[test]
    fn test_first_eligible_day() {
        assert_eq!(
            first_eligible_day(now(), 7),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
        );
        let midnight = Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap();
        assert_eq!(
            first_eligible_day(midnight, 7),
            NaiveDate::from_ymd_opt(2026, 3, 13).unwrap()
        );
    }

    #[tokio::test]
    async fn test_record_exactly_days_back_is_excluded() {
        let index = Arc::new(FakeExchangeIndex::default());
        index.insert(record("edge", now() - Duration::days(7)), vec![0.1, 0.0, 0.0]);
        index.insert(record("inside", now() - Duration::days(6)), vec![0.2, 0.0, 0.0]);

        let hits = retriever(index)
            .retrieve_context_at("query", 3, Some(7), now())
            .await;
        let ids: Vec<&str> = hits.iter().map(|h| h.record.id.as_str()).collect();
        assert_eq!(ids, vec!["inside"]);
    }

    #[tokio::test]
    async fn test_old_near_duplicates_do_not_starve_window() {
        let index = Arc::new(FakeExchangeIndex::default());
        for i in 0..5 {
            index.insert(
                record(&format!("old{i}"), now() - Duration::days(30)),
                vec![0.01 * i as f32, 0.0, 0.0],
            );
        }
        index.insert(record("recent", now()), vec![2.0, 0.0, 0.0]);

        let hits = retriever(index)
            .retrieve_context_at("query", 3, Some(7), now())
            .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.id.as_str(), "recent");
    }

    #[tokio::test]
    async fn test_search_failure_yields_empty() {
        let index = Arc::new(FakeExchangeIndex::default());
        index.insert(record("a", now()), vec![0.1, 0.0, 0.0]);
        index.fail_search.store(true, Ordering::SeqCst);

        let hits = retriever(index)
            .retrieve_context_at("query", 3, None, now())
            .await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_yields_empty() {
        let index = Arc::new(FakeExchangeIndex::default());
        index.insert(record("a", now()), vec![0.1, 0.0, 0.0]);
        let embedder = FakeEmbedder::default();
        embedder.fail.store(true, Ordering::SeqCst);
        let retriever = MemoryRetriever::new(index, Arc::new(BoxEmbedder::new(embedder)));

        assert!(retriever.retrieve_context("anything", 3, None).await.is_empty());
    }

    #[test]
    fn test_format_context() {
        assert_eq!(format_context(&[]), "");

        let hits = vec![RankedExchange {
            record: EmbeddingRecord {
                mood: Mood::Happy,
                ..record("a", now())
            },
            distance: 0.1,
        }];
        assert_eq!(
            format_context(&hits),
            "RELEVANT PAST CONVERSATIONS:\n[2026-03-20] (happy) User: a | AI: ok\n"
        );
    }
}
