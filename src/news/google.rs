//! Google News RSS search client.
//!
//! Queries the [Google News](https://news.google.com/rss) search feed, which
//! accepts an URL-encoded query plus locale parameters and returns RSS 2.0.
//! The date window rides inside the query string as `after:`/`before:`
//! operators. Each `<item>` carries the headline, the article link, an
//! HTML-flavored `<description>` snippet, and a `<source url="...">` element
//! naming the publishing outlet; the description is tag-stripped before it
//! is used as the article summary.

use std::time::Duration;

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use scraper::Html;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::NewsArticle;
use crate::news::NewsSearch;
use crate::utils::truncate_for_log;

const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss";

/// HTTP client for the Google News RSS search endpoint.
#[derive(Debug, Clone)]
pub struct GoogleNewsClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
    country: String,
}

impl GoogleNewsClient {
    /// Build a client for the given locale with a bounded request timeout.
    /// There is no automatic retry; a failed call is reported and degraded
    /// by the caller.
    pub fn new(language: &str, country: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("churn_radar/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: GOOGLE_NEWS_RSS.to_string(),
            language: language.to_lowercase(),
            country: country.to_uppercase(),
        })
    }

    fn search_url(&self, query: &str, from: NaiveDate, to: NaiveDate) -> String {
        let dated_query = format!(
            "{query} after:{} before:{}",
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        format!(
            "{}/search?q={}&hl={}&gl={}&ceid={}:{}",
            self.base_url,
            urlencoding::encode(&dated_query),
            self.language,
            self.country,
            self.country,
            self.language,
        )
    }
}

impl NewsSearch for GoogleNewsClient {
    #[instrument(level = "info", skip_all, fields(query = %truncate_for_log(query, 80)))]
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsArticle>> {
        let url = self.search_url(query, from, to);
        debug!(%url, "Requesting news feed");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::NewsSearch(format!(
                "HTTP {status} from {}",
                self.base_url
            )));
        }

        let body = response.text().await?;
        let articles = parse_feed(&body)?;
        info!(count = articles.len(), "Parsed feed items");
        Ok(articles)
    }
}

/// Parse an RSS 2.0 feed body into article records.
///
/// Field text arrives fragmented around entity references; fragments and
/// resolved references accumulate per field, so escaped description markup
/// survives intact for the HTML strip. Text is kept untrimmed until an item
/// closes, preserving the spacing around references. Items missing a title
/// or link are skipped; everything else is optional and defaults to empty.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<NewsArticle>> {
    #[derive(Clone, Copy)]
    enum Field {
        Title,
        Link,
        Description,
        PubDate,
    }

    #[derive(Default)]
    struct ItemBuffers {
        title: String,
        link: String,
        description: String,
        pub_date: String,
        source_url: String,
    }

    impl ItemBuffers {
        fn field(&mut self, field: Field) -> &mut String {
            match field {
                Field::Title => &mut self.title,
                Field::Link => &mut self.link,
                Field::Description => &mut self.description,
                Field::PubDate => &mut self.pub_date,
            }
        }
    }

    let mut reader = Reader::from_str(xml);

    let mut articles = Vec::new();
    let mut skipped = 0usize;
    let mut in_item = false;
    let mut field: Option<Field> = None;
    let mut item = ItemBuffers::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => match start.name().as_ref() {
                b"item" => {
                    in_item = true;
                    field = None;
                    item = ItemBuffers::default();
                }
                b"title" if in_item => field = Some(Field::Title),
                b"link" if in_item => field = Some(Field::Link),
                b"description" if in_item => field = Some(Field::Description),
                b"pubDate" if in_item => field = Some(Field::PubDate),
                b"source" if in_item => {
                    field = None;
                    if let Some(url) = source_url_attr(&start)? {
                        item.source_url = url;
                    }
                }
                _ => field = None,
            },
            Ok(Event::Empty(start)) => {
                if in_item && start.name().as_ref() == b"source" {
                    if let Some(url) = source_url_attr(&start)? {
                        item.source_url = url;
                    }
                }
            }
            Ok(Event::Text(text)) if in_item => {
                if let Some(field) = field {
                    let value = text
                        .xml_content()
                        .map_err(|e| Error::FeedParse(e.to_string()))?;
                    item.field(field).push_str(&value);
                }
            }
            Ok(Event::GeneralRef(reference)) if in_item => {
                if let Some(field) = field {
                    let buffer = item.field(field);
                    match reference
                        .resolve_char_ref()
                        .map_err(|e| Error::FeedParse(e.to_string()))?
                    {
                        Some(ch) => buffer.push(ch),
                        None => {
                            let name = reference
                                .decode()
                                .map_err(|e| Error::FeedParse(e.to_string()))?;
                            match name.as_ref() {
                                "lt" => buffer.push('<'),
                                "gt" => buffer.push('>'),
                                "amp" => buffer.push('&'),
                                "apos" => buffer.push('\''),
                                "quot" => buffer.push('"'),
                                // Unknown entity: keep it verbatim, the
                                // HTML pass may still resolve it.
                                other => {
                                    buffer.push('&');
                                    buffer.push_str(other);
                                    buffer.push(';');
                                }
                            }
                        }
                    }
                }
            }
            Ok(Event::CData(cdata)) if in_item => {
                if let Some(field) = field {
                    let value = String::from_utf8_lossy(cdata.as_ref());
                    item.field(field).push_str(&value);
                }
            }
            Ok(Event::End(end)) => match end.name().as_ref() {
                b"item" => {
                    in_item = false;
                    field = None;
                    if item.title.trim().is_empty() || item.link.trim().is_empty() {
                        skipped += 1;
                    } else {
                        let pub_date = item.pub_date.trim();
                        articles.push(NewsArticle {
                            title: item.title.trim().to_string(),
                            link: item.link.trim().to_string(),
                            summary: strip_html(&item.description),
                            source_url: item.source_url.trim().to_string(),
                            published: if pub_date.is_empty() {
                                None
                            } else {
                                Some(pub_date.to_string())
                            },
                        });
                    }
                }
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::FeedParse(e.to_string())),
            Ok(_) => {}
        }
    }

    if skipped > 0 {
        warn!(skipped, "Skipped feed items missing a title or link");
    }
    Ok(articles)
}

fn source_url_attr(start: &BytesStart<'_>) -> Result<Option<String>> {
    let attr = start
        .try_get_attribute("url")
        .map_err(|e| Error::FeedParse(e.to_string()))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::FeedParse(e.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Reduce an HTML snippet to whitespace-normalized plain text.
fn strip_html(fragment: &str) -> String {
    if fragment.is_empty() {
        return String::new();
    }
    let parsed = Html::parse_fragment(fragment);
    let text = parsed.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
