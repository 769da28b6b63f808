use crate::error::{Result, WebError};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Site enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    #[serde(rename = "GENIUS")]
    Genius,
    #[serde(rename = "SONG_BPM")]
    SongBpm,
}

impl Site {
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Genius => "genius",
            Site::SongBpm => "songbpm",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Site::Genius => "https://genius.com",
            Site::SongBpm => "https://songbpm.com",
        }
    }
}

/// CSS selector for the blocks that hold song lyrics on a lyrics page.
pub const LYRICS_CONTAINER_SELECTOR: &str = "div[data-lyrics-container='true']";

static BLANK_LINES: OnceLock<Regex> = OnceLock::new();

fn blank_lines_regex() -> &'static Regex {
    BLANK_LINES.get_or_init(|| Regex::new(r"\n{2,}").unwrap())
}

/// A fetched page, kept as its raw markup.
///
/// `scraper::Html` is not `Send`, so the markup is re-parsed by each query
/// method instead of being stored parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    url: String,
    html: String,
}

impl PageDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// The URL this page was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Extract the lyrics text from every lyrics container, in page order.
    ///
    /// `<br>` becomes a newline, each container ends its own line and runs of
    /// blank lines are collapsed. Returns `None` when the page has no container
    /// or only empty ones.
    pub fn lyrics_text(&self) -> Option<String> {
        let document = Html::parse_document(&self.html);
        let selector = parse_selector(LYRICS_CONTAINER_SELECTOR).ok()?;

        let mut blocks = Vec::new();
        for container in document.select(&selector) {
            let mut block = String::new();
            for node in container.descendants() {
                match node.value() {
                    Node::Text(text) => block.push_str(text),
                    Node::Element(element) if element.name() == "br" => block.push('\n'),
                    _ => {}
                }
            }
            let block = blank_lines_regex().replace_all(block.trim(), "\n");
            if !block.is_empty() {
                blocks.push(block.into_owned());
            }
        }

        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n"))
        }
    }

    /// Collect the `href` of every element matching `selector`, in page order.
    pub fn links(&self, selector: &str) -> Result<Vec<String>> {
        let document = Html::parse_document(&self.html);
        let selector = parse_selector(selector)?;

        Ok(document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(str::to_string)
            .collect())
    }

    /// Read a `<dd>` value by label.
    ///
    /// A `<dd>` belongs to `label` when the first child of its parent contains
    /// the label text; the value is the text of the `<dd>`'s first child.
    pub fn definition(&self, label: &str) -> Option<String> {
        let document = Html::parse_document(&self.html);
        let selector = parse_selector("dd").ok()?;

        for dd in document.select(&selector) {
            let Some(parent) = dd.parent() else {
                continue;
            };
            let heading = parent
                .first_child()
                .map(|child| match ElementRef::wrap(child) {
                    Some(el) => el.text().collect::<String>(),
                    None => child.value().as_text().map(|t| (**t).to_owned()).unwrap_or_default(),
                })
                .unwrap_or_default();

            if !heading.contains(label) {
                continue;
            }

            let value = dd.first_child().map(|child| match ElementRef::wrap(child) {
                Some(el) => el.text().collect::<String>(),
                None => child.value().as_text().map(|t| (**t).to_owned()).unwrap_or_default(),
            })?;
            return Some(value.trim().to_string());
        }

        tracing::debug!("No <dd> labelled '{}' on {}", label, self.url);
        None
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| {
        tracing::error!("Invalid selector '{}': {:?}", selector, e);
        WebError::Selector(selector.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LYRICS_PAGE: &str = r#"
        <html><body>
        <div data-lyrics-container="true">[Verse 1]<br>Hello <a href="/x"><span>darkness</span></a><br><br><br>my old friend</div>
        <div class="ad">not lyrics</div>
        <div data-lyrics-container="true">[Chorus]<br>Sound of silence</div>
        </body></html>
    "#;

    #[test]
    fn test_lyrics_text_joins_containers() {
        let page = PageDocument::new("https://genius.com/x", LYRICS_PAGE);
        let text = page.lyrics_text().unwrap();
        assert_eq!(
            text,
            "[Verse 1]\nHello darkness\nmy old friend\n[Chorus]\nSound of silence"
        );
    }

    #[test]
    fn test_lyrics_text_missing_container() {
        let page = PageDocument::new("https://genius.com/x", "<html><body><p>404</p></body></html>");
        assert!(page.lyrics_text().is_none());
    }

    #[test]
    fn test_links_in_page_order() {
        let html = r#"<a class="items-start" href="/@a/one">1</a>
                      <a href="/ignored">x</a>
                      <a class="items-start other" href="/@b/two">2</a>"#;
        let page = PageDocument::new("https://songbpm.com/searches/1", html);
        let links = page.links("a.items-start").unwrap();
        assert_eq!(links, vec!["/@a/one", "/@b/two"]);
    }

    #[test]
    fn test_links_invalid_selector() {
        let page = PageDocument::new("u", "<a href='x'></a>");
        assert!(matches!(page.links("a[[["), Err(WebError::Selector(_))));
    }

    #[test]
    fn test_definition_lookup() {
        let html = r#"
            <dl>
              <div><dt>Tempo</dt><dd>128 BPM</dd></div>
              <div><dt>Key</dt><dd><span>A minor</span></dd></div>
              <div><dt>Duration</dt><dd>3:45</dd></div>
            </dl>"#;
        let page = PageDocument::new("https://songbpm.com/@a/b", html);
        assert_eq!(page.definition("Tempo").as_deref(), Some("128 BPM"));
        assert_eq!(page.definition("Key").as_deref(), Some("A minor"));
        assert_eq!(page.definition("Duration").as_deref(), Some("3:45"));
        assert_eq!(page.definition("Energy"), None);
    }

    #[test]
    fn test_site_urls() {
        assert_eq!(Site::Genius.base_url(), "https://genius.com");
        assert_eq!(Site::SongBpm.as_str(), "songbpm");
    }
}
