//! PubMed client implementation using the E-utilities API.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::EutilsConfig;
use crate::models::{PaperId, PaperRecord, PaperRecordBuilder, SearchQuery};
use crate::sources::SourceError;
use crate::utils::HttpClient;

/// E-utilities endpoint names, relative to the configured base URL
const ESEARCH_ENDPOINT: &str = "esearch.fcgi";
const EFETCH_ENDPOINT: &str = "efetch.fcgi";

/// PubMed client
///
/// Stateless apart from the shared HTTP connection pool: every call issues
/// exactly one request and nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct PubMedClient {
    client: Arc<HttpClient>,
    base_url: String,
    database: String,
}

impl PubMedClient {
    /// Create a client against the public NCBI endpoints
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&EutilsConfig::default())
    }

    /// Create a client from configuration
    pub fn from_config(config: &EutilsConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(
            Arc::new(HttpClient::from_config(config)?),
            config,
        ))
    }

    /// Create with a custom HTTP client (for testing)
    pub fn with_client(client: Arc<HttpClient>, config: &EutilsConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
        }
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let params = [
            ("db", self.database.clone()),
            ("term", query.query.clone()),
            ("retmode", "json".to_string()),
            ("retmax", query.max_results.to_string()),
        ];

        format!(
            "{}/{}?{}",
            self.base_url,
            ESEARCH_ENDPOINT,
            encode_params(&params)
        )
    }

    /// Build E-utilities fetch URL for a single PubMed ID
    fn build_fetch_url(&self, id: &PaperId) -> String {
        let params = [
            ("db", self.database.clone()),
            ("id", id.as_str().to_string()),
            ("retmode", "xml".to_string()),
        ];

        format!(
            "{}/{}?{}",
            self.base_url,
            EFETCH_ENDPOINT,
            encode_params(&params)
        )
    }

    /// Issue a GET and return the body, failing on non-success status
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// Resolve a query into an ordered list of PubMed IDs
    ///
    /// Returns an empty list when PubMed reports no matches. The result never
    /// holds more than `query.max_results` ids, none of them empty or repeated.
    #[tracing::instrument(name = "pubmed.fetch_ids", skip(self, query), fields(query = %query.query, max_results = query.max_results))]
    pub async fn fetch_ids(&self, query: &SearchQuery) -> Result<Vec<PaperId>, SourceError> {
        if query.is_blank() {
            return Err(SourceError::InvalidRequest(
                "search query must not be empty".to_string(),
            ));
        }

        let url = self.build_search_url(query);
        let body = self.get_text(&url).await?;
        let ids = parse_search_response(&body, query.max_results)?;

        tracing::info!(count = ids.len(), "PubMed search complete");
        tracing::debug!(ids = ?ids.iter().map(PaperId::as_str).collect::<Vec<_>>(), "Retrieved paper IDs");

        Ok(ids)
    }

    /// Fetch the record for one PubMed ID
    ///
    /// Missing title or year nodes yield empty strings; only transport and
    /// malformed-document failures are errors.
    #[tracing::instrument(name = "pubmed.fetch_details", skip(self, id), fields(id = %id))]
    pub async fn fetch_details(&self, id: &PaperId) -> Result<PaperRecord, SourceError> {
        if id.is_empty() {
            return Err(SourceError::InvalidRequest(
                "paper id must not be empty".to_string(),
            ));
        }

        let url = self.build_fetch_url(id);
        let body = self.get_text(&url).await?;
        let record = parse_fetch_response(id, &body)?;

        tracing::debug!(title = %record.title, year = %record.publication_date, "Parsed paper details");

        Ok(record)
    }
}

fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse the esearch JSON envelope into PubMed IDs
fn parse_search_response(json: &str, max_results: usize) -> Result<Vec<PaperId>, SourceError> {
    #[derive(Debug, Deserialize)]
    struct ESearchEnvelope {
        #[serde(default)]
        esearchresult: Option<ESearchResult>,
    }

    #[derive(Debug, Deserialize)]
    struct ESearchResult {
        #[serde(default)]
        idlist: Option<Vec<String>>,
        #[serde(rename = "ERROR", default)]
        error: Option<String>,
    }

    let envelope: ESearchEnvelope = serde_json::from_str(json)
        .map_err(|e| SourceError::Decode(format!("Failed to parse PubMed search JSON: {}", e)))?;

    let Some(result) = envelope.esearchresult else {
        return Ok(Vec::new());
    };

    if let Some(error) = &result.error {
        tracing::debug!(%error, "PubMed search reported an error");
    }

    let mut seen = HashSet::new();
    let ids = result
        .idlist
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .take(max_results)
        .map(PaperId::from)
        .collect();

    Ok(ids)
}

/// Field being collected while walking the efetch document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Year,
}

/// Text capture for one element, closed when the stack returns to `depth`
#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// Parse the efetch XML document into a record for `id`
///
/// The title is the text of the first `ArticleTitle` element anywhere in the
/// document; the year is the first `Year` directly under a `PubDate`.
fn parse_fetch_response(id: &PaperId, xml: &str) -> Result<PaperRecord, SourceError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut saw_root = false;
    let mut root_closed = false;
    let mut capture: Option<Capture> = None;
    let mut title: Option<String> = None;
    let mut year: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root_closed {
                    return Err(trailing_content());
                }
                saw_root = true;
                let name = e.local_name().as_ref().to_vec();
                if capture.is_none() {
                    capture = wanted_field(&name, stack.last(), &title, &year).map(|field| Capture {
                        field,
                        depth: stack.len(),
                        text: String::new(),
                    });
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if root_closed {
                    return Err(trailing_content());
                }
                saw_root = true;
                if stack.is_empty() {
                    root_closed = true;
                }
                let name = e.local_name().as_ref().to_vec();
                if capture.is_none() {
                    match wanted_field(&name, stack.last(), &title, &year) {
                        Some(Field::Title) => title = Some(String::new()),
                        Some(Field::Year) => year = Some(String::new()),
                        None => {}
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if stack.is_empty() && !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(SourceError::Decode(
                        "PubMed fetch XML has text outside the root element".to_string(),
                    ));
                }
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
                if stack.is_empty() {
                    root_closed = true;
                }
                if capture.as_ref().is_some_and(|c| c.depth == stack.len()) {
                    if let Some(done) = capture.take() {
                        let text = done.text.trim().to_string();
                        match done.field {
                            Field::Title => title = Some(text),
                            Field::Year => year = Some(text),
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(position = reader.buffer_position(), "XML parse error");
                return Err(e.into());
            }
        }
    }

    if !saw_root {
        return Err(SourceError::Decode(
            "PubMed fetch response contains no XML document".to_string(),
        ));
    }
    if !stack.is_empty() {
        return Err(SourceError::Decode(
            "PubMed fetch XML ended before all elements were closed".to_string(),
        ));
    }

    Ok(PaperRecordBuilder::new(id.clone())
        .title(title.unwrap_or_default())
        .publication_date(year.unwrap_or_default())
        .build())
}

fn trailing_content() -> SourceError {
    SourceError::Decode("PubMed fetch XML has content after the root element".to_string())
}

fn wanted_field(
    name: &[u8],
    parent: Option<&Vec<u8>>,
    title: &Option<String>,
    year: &Option<String>,
) -> Option<Field> {
    if title.is_none() && name == b"ArticleTitle" {
        Some(Field::Title)
    } else if year.is_none() && name == b"Year" && parent.is_some_and(|p| p == b"PubDate") {
        Some(Field::Year)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PubMedClient {
        PubMedClient::new().unwrap()
    }

    const ARTICLE_XML: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2025//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_250101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="Publisher" Owner="NLM">
      <PMID Version="1">40064631</PMID>
      <Article PubModel="Print-Electronic">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate>
              <Year>2025</Year>
              <Month>Mar</Month>
            </PubDate>
          </JournalIssue>
        </Journal>
        <ArticleTitle>Tumour <i>in vivo</i> imaging &amp; response.</ArticleTitle>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_build_search_url() {
        let query = SearchQuery::new("machine learning").max_results(5);
        let url = client().build_search_url(&query);

        assert!(url.starts_with("https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi?"));
        assert!(url.contains("db=pubmed"));
        assert!(url.contains("term=machine%20learning"));
        assert!(url.contains("retmode=json"));
        assert!(url.contains("retmax=5"));
    }

    #[test]
    fn test_build_fetch_url() {
        let url = client().build_fetch_url(&PaperId::new("40064631"));

        assert_eq!(
            url,
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi?db=pubmed&id=40064631&retmode=xml"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = EutilsConfig {
            base_url: "http://127.0.0.1:1234/".to_string(),
            ..Default::default()
        };
        let client = PubMedClient::from_config(&config).unwrap();
        let url = client.build_fetch_url(&PaperId::new("1"));
        assert!(url.starts_with("http://127.0.0.1:1234/efetch.fcgi?"));
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{"header":{"type":"esearch","version":"0.3"},
            "esearchresult":{"count":"12345","retmax":"3","retstart":"0",
            "idlist":["40064631","40064100","40063900"]}}"#;
        let ids = parse_search_response(json, 10).unwrap();

        assert_eq!(
            ids,
            vec![
                PaperId::new("40064631"),
                PaperId::new("40064100"),
                PaperId::new("40063900")
            ]
        );
    }

    #[test]
    fn test_parse_search_response_dedups_and_caps() {
        let json = r#"{"esearchresult":{"idlist":["3","1","3","","2","4"]}}"#;
        let ids = parse_search_response(json, 3).unwrap();

        assert_eq!(ids, vec![PaperId::new("3"), PaperId::new("1"), PaperId::new("2")]);
    }

    #[test]
    fn test_parse_search_response_missing_idlist() {
        let json = r#"{"esearchresult":{"count":"0","ERROR":"Invalid query"}}"#;
        assert!(parse_search_response(json, 10).unwrap().is_empty());

        let json = r#"{"header":{"type":"esearch"}}"#;
        assert!(parse_search_response(json, 10).unwrap().is_empty());
    }

    #[test]
    fn test_parse_search_response_malformed() {
        let err = parse_search_response("<html>oops</html>", 10).unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn test_parse_fetch_response() {
        let id = PaperId::new("40064631");
        let record = parse_fetch_response(&id, ARTICLE_XML).unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.title, "Tumour in vivo imaging & response.");
        assert_eq!(record.publication_date, "2025");
        assert!(record.non_academic_authors.is_empty());
        assert!(record.company_affiliations.is_empty());
        assert_eq!(record.corresponding_email, None);
    }

    #[test]
    fn test_parse_fetch_response_missing_nodes() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation>\
                   <PMID>1</PMID></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let record = parse_fetch_response(&PaperId::new("1"), xml).unwrap();

        assert_eq!(record.title, "");
        assert_eq!(record.publication_date, "");
    }

    #[test]
    fn test_parse_fetch_response_year_requires_pubdate_parent() {
        let xml = "<Set><DateCompleted><Year>1999</Year></DateCompleted>\
                   <PubDate><Year>2001</Year></PubDate></Set>";
        let record = parse_fetch_response(&PaperId::new("1"), xml).unwrap();

        assert_eq!(record.publication_date, "2001");
    }

    #[test]
    fn test_parse_fetch_response_first_title_wins() {
        let xml = "<Set><ArticleTitle>First</ArticleTitle><ArticleTitle>Second</ArticleTitle></Set>";
        let record = parse_fetch_response(&PaperId::new("1"), xml).unwrap();

        assert_eq!(record.title, "First");
    }

    #[test]
    fn test_parse_fetch_response_empty_title_element() {
        let xml = "<Set><ArticleTitle/><PubDate><Year>2020</Year></PubDate></Set>";
        let record = parse_fetch_response(&PaperId::new("1"), xml).unwrap();

        assert_eq!(record.title, "");
        assert_eq!(record.publication_date, "2020");
    }

    #[test]
    fn test_parse_fetch_response_malformed() {
        let id = PaperId::new("1");

        assert!(matches!(
            parse_fetch_response(&id, "<Set><ArticleTitle>x</Set>"),
            Err(SourceError::Decode(_))
        ));
        assert!(matches!(
            parse_fetch_response(&id, "<Set><ArticleTitle>x</ArticleTitle>"),
            Err(SourceError::Decode(_))
        ));
        assert!(matches!(
            parse_fetch_response(&id, ""),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_fetch_response_rejects_text_before_root() {
        let id = PaperId::new("1");

        assert!(matches!(
            parse_fetch_response(&id, "not xml at all <a/>"),
            Err(SourceError::Decode(_))
        ));
        assert!(matches!(
            parse_fetch_response(&id, "<a>x</a> trailing"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_fetch_response_rejects_second_root() {
        let id = PaperId::new("1");

        assert!(matches!(
            parse_fetch_response(&id, "<a><ArticleTitle>x</ArticleTitle></a><b/>"),
            Err(SourceError::Decode(_))
        ));
        assert!(matches!(
            parse_fetch_response(&id, "<a/><b></b>"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_fetch_response_allows_whitespace_around_root() {
        let xml = "\n  <a><ArticleTitle>x</ArticleTitle></a>\n\n";
        let record = parse_fetch_response(&PaperId::new("1"), xml).unwrap();

        assert_eq!(record.title, "x");
    }
}
