//! Top-stories resolver
//!
//! Search → language and script filter (non-English headlines are translated
//! when a translator is configured) → topic dedup.

use super::classifier::{from_failure, settle, Grade};
use crate::models::{FieldResult, NewsItem, Provenance};
use crate::services::news_deduplicator::{is_latin_script, NewsDeduplicator};
use crate::sources::{Article, NewsQuery, NewsSource, Translator};
use tracing::debug;

/// Candidates requested per wanted item; duplicates and foreign scripts
/// are dropped before the limit applies
const OVERFETCH_FACTOR: usize = 5;

/// Target language for translated headlines
const TRANSLATION_TARGET: &str = "en";

/// Source language label of English articles
const SOURCE_ENGLISH: &str = "English";

pub struct NewsContext<'a> {
    pub source: &'a dyn NewsSource,
    pub translator: Option<&'a dyn Translator>,
    pub country: &'a str,
    pub aliases: &'a [String],
    /// Search window, e.g. "7d"
    pub window: &'a str,
    pub language: &'a str,
    pub limit: usize,
}

pub async fn resolve(ctx: &NewsContext<'_>) -> FieldResult<Vec<NewsItem>> {
    let provenance = vec![Provenance::new(ctx.source.endpoint(), None)];
    let query = NewsQuery {
        query: ctx.country.to_string(),
        window: ctx.window.to_string(),
        language: ctx.language.to_string(),
        max_records: ctx.limit.saturating_mul(OVERFETCH_FACTOR),
    };

    let articles = match ctx.source.search(&query).await {
        Ok(articles) => articles,
        Err(failure) => return from_failure(&failure, provenance),
    };

    let mut candidates = Vec::with_capacity(articles.len());
    for article in articles {
        if let Some(article) = readable(ctx.translator, article).await {
            candidates.push(article);
        }
    }

    let deduplicator = NewsDeduplicator::new(ctx.country, ctx.aliases);
    let items: Vec<NewsItem> = deduplicator
        .select(candidates, |article| article.title.as_str(), ctx.limit)
        .into_iter()
        .map(|(article, topic_key)| NewsItem {
            title: article.title,
            url: article.url,
            source: article.source,
            published_at: article.published_at,
            topic_key,
        })
        .collect();

    debug!(country = ctx.country, items = items.len(), "News selected");
    settle(items, Grade::Direct, provenance)
}

/// Keep English Latin-script titles. Others are translated when a translator
/// exists; without one, only Latin-script titles survive.
async fn readable(translator: Option<&dyn Translator>, mut article: Article) -> Option<Article> {
    let latin = is_latin_script(&article.title);
    let english = article
        .language
        .as_deref()
        .map_or(true, |language| language.trim().eq_ignore_ascii_case(SOURCE_ENGLISH));
    if latin && english {
        return Some(article);
    }

    let Some(translator) = translator else {
        return latin.then_some(article);
    };
    match translator.translate(&article.title, TRANSLATION_TARGET).await {
        Ok(translated) if is_latin_script(&translated) => {
            article.title = translated;
            article.language = Some(SOURCE_ENGLISH.to_string());
            Some(article)
        }
        Ok(_) => latin.then_some(article),
        Err(failure) => {
            debug!(url = %article.url, failure = %failure, "Headline translation failed");
            latin.then_some(article)
        }
    }
}
