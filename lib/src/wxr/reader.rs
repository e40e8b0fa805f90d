use quick_xml::Reader;
use quick_xml::events::Event;

use crate::elementor::Element;
use crate::error::{Chainable, Result};
use crate::wxr::unslash;

/// The parts of a WXR `<item>` needed to inspect generated output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedItem {
    pub title: String,
    pub post_type: String,
    pub post_name: String,
    pub post_id: Option<u32>,
    pub parent: Option<u32>,
    pub status: String,
    pub attachment_url: Option<String>,
    /// `(domain, nicename, name)` per `<category>`.
    pub categories: Vec<(String, String, String)>,
    pub meta: Vec<(String, String)>,
}

impl ParsedItem {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// The item's `_elementor_data`, parsed. `slashed` undoes the
    /// `addslashes` applied for the WordPress importer.
    pub fn elementor_data(&self, slashed: bool) -> Option<Result<Vec<Element>>> {
        let raw = self.meta("_elementor_data")?;
        let json = match slashed {
            true => unslash(raw),
            false => raw.to_string(),
        };

        Some(serde_json::from_str(&json).chain_with(|| error! {
            "invalid `_elementor_data` JSON",
            "item" => &self.title,
        }))
    }
}

/// Parses a WXR document into its items. Fails on malformed XML or a
/// document whose root isn't `<rss>`.
pub fn read(xml: &str) -> Result<Vec<ParsedItem>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<String> = vec![];
    let mut text = String::new();
    let mut items = vec![];
    let mut item: Option<ParsedItem> = None;
    let mut meta = (String::new(), String::new());
    let mut category = (String::new(), String::new());

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event().chain_with(|| error! {
            "malformed WXR document",
            "byte offset" => position,
        })?;

        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if stack.is_empty() && name != "rss" {
                    return err!("not a WXR document", "root element" => name);
                }

                match name.as_str() {
                    "item" => item = Some(ParsedItem::default()),
                    "category" if item.is_some() => {
                        category = (String::new(), String::new());
                        for attr in start.attributes().flatten() {
                            let value = attr.unescape_value()?.into_owned();
                            match attr.key.as_ref() {
                                b"domain" => category.0 = value,
                                b"nicename" => category.1 = value,
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }

                stack.push(name);
                text.clear();
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                stack.pop();
                let value = std::mem::take(&mut text);
                let Some(current) = item.as_mut() else { continue };
                match name.as_str() {
                    "item" => items.extend(item.take()),
                    "title" => current.title = value,
                    "wp:post_type" => current.post_type = value,
                    "wp:post_name" => current.post_name = value,
                    "wp:status" => current.status = value,
                    "wp:post_id" => current.post_id = value.trim().parse().ok(),
                    "wp:post_parent" => current.parent = value.trim().parse().ok(),
                    "wp:attachment_url" => current.attachment_url = Some(value),
                    "wp:meta_key" => meta.0 = value,
                    "wp:meta_value" => meta.1 = value,
                    "wp:postmeta" => current.meta.push(std::mem::take(&mut meta)),
                    "category" => {
                        let (domain, nicename) = std::mem::take(&mut category);
                        current.categories.push((domain, nicename, value));
                    }
                    _ => {}
                }
            }
            Event::Empty(empty) => {
                if stack.is_empty() {
                    let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                    return err!("not a WXR document", "root element" => name);
                }
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(std::str::from_utf8(&c.into_inner())?),
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return err!("truncated WXR document", "unclosed element" => stack.join(" > "));
    }

    Ok(items)
}
