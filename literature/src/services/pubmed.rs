use async_trait::async_trait;
use medisense_models::{LiteratureItem, MISSING_TEXT};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::time::Duration;

use super::LiteratureSource;
use crate::errors::{LiteratureError, LiteratureResult};

/// NCBI E-utilities client for PubMed.
///
/// Searches with `esearch` (JSON) and fetches article records with a single
/// batched `efetch` (XML). Every request carries the API key and the
/// contact email/tool that NCBI asks clients to identify with.
pub struct PubMedClient {
    client: Client,
    api_base: String,
    api_key: String,
    email: String,
    tool: String,
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// Article fields as they appear in the efetch XML, before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArticle {
    pub pmid: String,
    pub title: Option<String>,
    pub abstract_parts: Vec<String>,
    pub keywords: Vec<String>,
}

/// Lower-case the text fields and fill in missing ones.
///
/// Returns `None` when the PMID is not numeric.
pub fn normalize_article(raw: &RawArticle) -> Option<LiteratureItem> {
    let id = match raw.pmid.trim().parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(pmid = %raw.pmid, "Skipping article with non-numeric PMID");
            return None;
        }
    };

    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(MISSING_TEXT)
        .to_lowercase();

    let abstract_text = if raw.abstract_parts.is_empty() {
        MISSING_TEXT.to_string()
    } else {
        raw.abstract_parts.join(" ").to_lowercase()
    };

    Some(LiteratureItem {
        id,
        title,
        abstract_text,
        keywords: raw.keywords.iter().map(|k| k.to_lowercase()).collect(),
    })
}

struct Selectors {
    article: Selector,
    pmid: Selector,
    title: Selector,
    abstract_text: Selector,
    keyword: Selector,
}

impl Selectors {
    // The HTML parser lower-cases element names
    fn new() -> LiteratureResult<Self> {
        let parse = |s: &str| Selector::parse(s).map_err(|e| LiteratureError::Parse(format!("selector {}: {:?}", s, e)));
        Ok(Self {
            article: parse("pubmedarticle")?,
            pmid: parse("medlinecitation > pmid")?,
            title: parse("articletitle")?,
            abstract_text: parse("abstract > abstracttext")?,
            keyword: parse("keywordlist > keyword")?,
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract articles from an efetch `PubmedArticleSet` document
pub fn parse_efetch(xml: &str) -> LiteratureResult<Vec<RawArticle>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(xml);

    let articles = document
        .select(&selectors.article)
        .filter_map(|article| {
            let pmid = article.select(&selectors.pmid).next().map(element_text)?;
            Some(RawArticle {
                pmid,
                title: article.select(&selectors.title).next().map(element_text),
                abstract_parts: article
                    .select(&selectors.abstract_text)
                    .map(element_text)
                    .filter(|p| !p.is_empty())
                    .collect(),
                keywords: article
                    .select(&selectors.keyword)
                    .map(element_text)
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
        })
        .collect();

    Ok(articles)
}

impl PubMedClient {
    pub fn new(
        api_base: &str,
        api_key: impl Into<String>,
        email: impl Into<String>,
        tool: impl Into<String>,
        timeout_secs: u64,
    ) -> LiteratureResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            email: email.into(),
            tool: tool.into(),
        })
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> LiteratureResult<reqwest::Response> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("email", self.email.as_str()),
                ("tool", self.tool.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LiteratureError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// PMIDs matching `query`, best match first
    pub async fn search_ids(&self, query: &str, max_results: usize) -> LiteratureResult<Vec<String>> {
        let retmax = max_results.to_string();
        let response = self
            .get(
                "esearch.fcgi",
                &[("db", "pubmed"), ("term", query), ("retmax", retmax.as_str()), ("retmode", "json")],
            )
            .await?;

        let body: ESearchResponse = response
            .json()
            .await
            .map_err(|e| LiteratureError::Parse(e.to_string()))?;
        Ok(body.esearchresult.idlist)
    }

    pub async fn fetch_articles(&self, ids: &[String]) -> LiteratureResult<Vec<RawArticle>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_list = ids.join(",");
        let response = self
            .get("efetch.fcgi", &[("db", "pubmed"), ("id", id_list.as_str()), ("retmode", "xml")])
            .await?;

        let xml = response.text().await?;
        parse_efetch(&xml)
    }
}

#[async_trait]
impl LiteratureSource for PubMedClient {
    async fn search(&self, query: &str, max_results: usize) -> LiteratureResult<Vec<LiteratureItem>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!("Searching PubMed with query: {}", query);
        let ids = self.search_ids(query, max_results).await?;
        if ids.is_empty() {
            tracing::warn!("No articles found for query: {}", query);
            return Ok(Vec::new());
        }
        tracing::debug!(count = ids.len(), ids = ?ids, "Fetched article ids");

        let raw = self.fetch_articles(&ids).await?;
        let items: Vec<LiteratureItem> = raw.iter().filter_map(normalize_article).collect();

        tracing::info!("Fetched {} articles with details", items.len());
        Ok(items)
    }
}
