use std::io::Write;

use chrono::{DateTime, FixedOffset};
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;
use crate::wxr::{Author, Category, Document, Item, Term, NAMESPACES, WXR_VERSION};

/// Writes `document` as a WXR file to `out`.
pub fn write<W: Write>(document: &Document, out: W) -> Result<()> {
    let mut xml = Xml { writer: Writer::new(out) };
    xml.writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.newline(0)?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    for (prefix, uri) in NAMESPACES {
        rss.push_attribute((format!("xmlns:{prefix}").as_str(), *uri));
    }

    xml.writer.write_event(Event::Start(rss))?;
    xml.newline(0)?;
    xml.open("channel", 0)?;
    channel(&mut xml, document)?;
    for item in &document.items {
        self::item(&mut xml, item)?;
    }

    xml.newline(0)?;
    xml.close("channel", 0)?;
    xml.close("rss", 0)?;
    Ok(())
}

/// Renders `document` as a WXR string.
pub fn to_string(document: &Document) -> Result<String> {
    let mut bytes = Vec::new();
    write(document, &mut bytes)?;
    Ok(String::from_utf8(bytes).map_err(|e| e.utf8_error())?)
}

struct Xml<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> Xml<W> {
    fn newline(&mut self, depth: usize) -> Result<()> {
        let indent = format!("\n{}", "\t".repeat(depth));
        self.writer.write_event(Event::Text(BytesText::from_escaped(indent)))?;
        Ok(())
    }

    fn open(&mut self, name: &str, depth: usize) -> Result<()> {
        self.newline(depth)?;
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn close(&mut self, name: &str, depth: usize) -> Result<()> {
        self.newline(depth)?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// `<name>escaped text</name>` on a new line.
    fn text(&mut self, depth: usize, name: &str, text: &str) -> Result<()> {
        self.newline(depth)?;
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// `<name><![CDATA[text]]></name>` on a new line.
    fn cdata(&mut self, depth: usize, name: &str, text: &str) -> Result<()> {
        self.cdata_with(depth, BytesStart::new(name), text)
    }

    fn cdata_with(&mut self, depth: usize, start: BytesStart<'_>, text: &str) -> Result<()> {
        let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        self.newline(depth)?;
        self.writer.write_event(Event::Start(start))?;
        for section in cdata_sections(text) {
            self.writer.write_event(Event::CData(BytesCData::new(section)))?;
        }

        self.writer.write_event(Event::End(end))?;
        Ok(())
    }
}

/// Splits `text` so that no CDATA section contains the `]]>` terminator:
/// `a]]>b` becomes `a]]` and `>b`.
pub fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    parts.into_iter()
        .enumerate()
        .map(|(i, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 { section.push('>'); }
            section.push_str(part);
            if i < last { section.push_str("]]"); }
            section
        })
        .collect()
}

fn rfc2822(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc2822()
}

fn mysql(date: &DateTime<FixedOffset>) -> String {
    date.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn mysql_gmt(date: &DateTime<FixedOffset>) -> String {
    date.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn channel<W: Write>(xml: &mut Xml<W>, document: &Document) -> Result<()> {
    let channel = &document.channel;
    xml.text(1, "title", &channel.title)?;
    xml.text(1, "link", &channel.link)?;
    xml.text(1, "description", &channel.description)?;
    xml.text(1, "pubDate", &rfc2822(&channel.pub_date))?;
    xml.text(1, "language", &channel.language)?;
    xml.text(1, "wp:wxr_version", WXR_VERSION)?;
    xml.text(1, "wp:base_site_url", &channel.base_site_url)?;
    xml.text(1, "wp:base_blog_url", &channel.base_blog_url)?;
    xml.newline(0)?;

    for author in &channel.authors {
        self::author(xml, author)?;
    }

    for category in &channel.categories {
        self::category(xml, category)?;
    }

    for term in &channel.terms {
        self::term(xml, term)?;
    }

    xml.newline(0)?;
    xml.text(1, "generator", &channel.generator)?;
    Ok(())
}

fn author<W: Write>(xml: &mut Xml<W>, author: &Author) -> Result<()> {
    xml.open("wp:author", 1)?;
    xml.text(2, "wp:author_id", &author.id.to_string())?;
    xml.cdata(2, "wp:author_login", &author.login)?;
    xml.cdata(2, "wp:author_email", &author.email)?;
    xml.cdata(2, "wp:author_display_name", &author.display_name)?;
    xml.cdata(2, "wp:author_first_name", &author.first_name)?;
    xml.cdata(2, "wp:author_last_name", &author.last_name)?;
    xml.close("wp:author", 1)
}

fn category<W: Write>(xml: &mut Xml<W>, category: &Category) -> Result<()> {
    xml.open("wp:category", 1)?;
    xml.text(2, "wp:term_id", &category.term_id.to_string())?;
    xml.cdata(2, "wp:category_nicename", &category.nicename)?;
    xml.cdata(2, "wp:category_parent", &category.parent)?;
    xml.cdata(2, "wp:cat_name", &category.name)?;
    xml.close("wp:category", 1)
}

fn term<W: Write>(xml: &mut Xml<W>, term: &Term) -> Result<()> {
    xml.open("wp:term", 1)?;
    xml.text(2, "wp:term_id", &term.term_id.to_string())?;
    xml.cdata(2, "wp:term_taxonomy", &term.taxonomy)?;
    xml.cdata(2, "wp:term_slug", &term.slug)?;
    xml.cdata(2, "wp:term_name", &term.name)?;
    xml.close("wp:term", 1)
}

fn item<W: Write>(xml: &mut Xml<W>, item: &Item) -> Result<()> {
    xml.newline(0)?;
    xml.open("item", 1)?;
    xml.cdata(2, "title", &item.title)?;
    xml.text(2, "link", &item.link)?;
    xml.text(2, "pubDate", &rfc2822(&item.pub_date))?;
    xml.cdata(2, "dc:creator", &item.creator)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    xml.newline(2)?;
    xml.writer.write_event(Event::Start(guid))?;
    xml.writer.write_event(Event::Text(BytesText::new(&item.guid)))?;
    xml.writer.write_event(Event::End(BytesEnd::new("guid")))?;

    xml.text(2, "description", &item.description)?;
    xml.cdata(2, "content:encoded", &item.content)?;
    xml.cdata(2, "excerpt:encoded", &item.excerpt)?;
    xml.text(2, "wp:post_id", &item.post_id.to_string())?;
    xml.cdata(2, "wp:post_date", &mysql(&item.pub_date))?;
    xml.cdata(2, "wp:post_date_gmt", &mysql_gmt(&item.pub_date))?;
    xml.cdata(2, "wp:post_modified", &mysql(&item.pub_date))?;
    xml.cdata(2, "wp:post_modified_gmt", &mysql_gmt(&item.pub_date))?;
    xml.cdata(2, "wp:comment_status", item.comment_status)?;
    xml.cdata(2, "wp:ping_status", "closed")?;
    xml.cdata(2, "wp:post_name", &item.post_name)?;
    xml.cdata(2, "wp:status", item.status.as_str())?;
    xml.text(2, "wp:post_parent", &item.parent.to_string())?;
    xml.text(2, "wp:menu_order", &item.menu_order.to_string())?;
    xml.cdata(2, "wp:post_type", item.post_type.as_str())?;
    xml.cdata(2, "wp:post_password", "")?;
    xml.text(2, "wp:is_sticky", "0")?;
    if let Some(url) = &item.attachment_url {
        xml.cdata(2, "wp:attachment_url", url)?;
    }

    for category in &item.categories {
        let mut start = BytesStart::new("category");
        start.push_attribute(("domain", category.domain.as_str()));
        start.push_attribute(("nicename", category.nicename.as_str()));
        xml.cdata_with(2, start, &category.name)?;
    }

    for meta in &item.meta {
        xml.open("wp:postmeta", 2)?;
        xml.cdata(3, "wp:meta_key", &meta.key)?;
        xml.cdata(3, "wp:meta_value", &meta.value)?;
        xml.close("wp:postmeta", 2)?;
    }

    xml.close("item", 1)
}
