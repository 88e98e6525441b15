use crate::error::ExtractError;
use crate::model::Token;
use crate::token::{PageTokens, TokenSource};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Token source for pdftotext-style words XML:
///
/// ```xml
/// <doc>
///   <page number="6" width="595" height="842">
///     <word xMin="56.2" yMin="120.1" xMax="80.0" yMax="130.3">Total</word>
///     ...
///   </page>
/// </doc>
/// ```
///
/// `<word>` elements are accepted at any nesting depth under `<page>`, so
/// both flat word dumps and line/block-nested layouts parse.
pub struct WordsXmlSource;

impl WordsXmlSource {
    pub fn new() -> Self {
        WordsXmlSource
    }
}

impl Default for WordsXmlSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for WordsXmlSource {
    fn load_pages(&self, bytes: &[u8]) -> Result<Vec<PageTokens>, ExtractError> {
        let xml = String::from_utf8_lossy(bytes);
        parse_words_xml(&xml)
    }

    fn source_name(&self) -> &str {
        "words-xml"
    }
}

struct PendingWord {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    text: String,
}

pub fn parse_words_xml(xml: &str) -> Result<Vec<PageTokens>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<PageTokens> = Vec::new();
    let mut pending: Option<PendingWord> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => {
                    let number = attr_f32(&e, b"number")
                        .map(|n| n as usize)
                        .unwrap_or(pages.len() + 1);
                    pages.push(PageTokens {
                        page_number: number,
                        tokens: Vec::new(),
                    });
                }
                b"word" => {
                    pending = Some(PendingWord {
                        x0: attr_f32(&e, b"xMin").ok_or_else(|| missing_attr("xMin"))?,
                        y0: attr_f32(&e, b"yMin").ok_or_else(|| missing_attr("yMin"))?,
                        x1: attr_f32(&e, b"xMax").ok_or_else(|| missing_attr("xMax"))?,
                        y1: attr_f32(&e, b"yMax").ok_or_else(|| missing_attr("yMax"))?,
                        text: String::new(),
                    });
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some(word) = pending.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| ExtractError::TokenLoad(format!("invalid words XML: {e}")))?;
                    word.text.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"word" {
                    if let Some(word) = pending.take() {
                        let text = word.text.trim().to_string();
                        if !text.is_empty() {
                            if let Some(page) = pages.last_mut() {
                                let page_number = page.page_number;
                                page.tokens.push(Token {
                                    text,
                                    x0: word.x0,
                                    y0: word.y0,
                                    x1: word.x1,
                                    y1: word.y1,
                                    page: page_number,
                                });
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractError::TokenLoad(format!("invalid words XML: {e}")));
            }
        }
    }

    Ok(pages)
}

fn attr_f32(e: &BytesStart<'_>, name: &[u8]) -> Option<f32> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name {
            return String::from_utf8_lossy(&attr.value).trim().parse().ok();
        }
    }
    None
}

fn missing_attr(name: &str) -> ExtractError {
    ExtractError::TokenLoad(format!("word element missing '{name}' attribute"))
}
