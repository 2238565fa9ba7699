use std::cmp::Ordering;

use serde::Serialize;
use strsim::jaro_winkler;
use ts_rs::TS;

use crate::catalog::{Article, EducationCatalog};

/// Minimum similarity for a query token to count as a typo of a word.
const FUZZY_THRESHOLD: f64 = 0.85;

const EXACT_TITLE_SCORE: f64 = 100.0;
const TITLE_CONTAINS_SCORE: f64 = 40.0;
const KEYWORD_SCORE: f64 = 15.0;
const FUZZY_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SearchHit {
    pub article: Article,
    pub score: f64,
}

impl EducationCatalog {
    /// Rank articles against a free-text query.
    ///
    /// Linear scan. Exact and substring title matches rank highest, then
    /// keyword hits, then near-miss spellings of title or keyword words.
    /// Ties are ordered by title. An empty query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let tokens = tokenize(&query);

        let mut hits: Vec<SearchHit> = self
            .articles()
            .iter()
            .filter_map(|article| {
                let score = score_article(article, &query, &tokens);
                (score > 0.0).then(|| SearchHit {
                    article: article.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.article.title.cmp(&b.article.title))
        });
        hits.truncate(limit);

        tracing::debug!(query = %query, hits = hits.len(), "education search");
        hits
    }
}

fn score_article(article: &Article, query: &str, tokens: &[String]) -> f64 {
    let title = article.title.to_lowercase();
    let mut score = 0.0;

    if title == query {
        score += EXACT_TITLE_SCORE;
    } else if title.contains(query) {
        score += TITLE_CONTAINS_SCORE;
    }

    let keywords: Vec<String> = article.keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut words = tokenize(&title);
    words.extend(keywords.iter().flat_map(|k| tokenize(k)));

    for token in tokens {
        if keywords.iter().any(|k| k == token) {
            score += KEYWORD_SCORE;
            continue;
        }
        let best = words
            .iter()
            .map(|w| jaro_winkler(token, w))
            .fold(0.0_f64, f64::max);
        if best >= FUZZY_THRESHOLD {
            score += best * FUZZY_SCORE;
        }
    }

    score
}

/// Lowercase alphanumeric words of at least two characters.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}
