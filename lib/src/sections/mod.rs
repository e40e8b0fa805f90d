//! Section builders: one per kind of page section.
//!
//! Every builder can fill a template section found in the [`Library`] or,
//! when the library has none for its role, construct the section from
//! scratch with default Cholot widget settings.

mod row;
mod hero;
mod services;
mod team;
mod testimonials;
mod contact;
mod about;
mod text;
mod custom;

pub use row::*;
pub use hero::*;
pub use services::*;
pub use team::*;
pub use testimonials::*;
pub use contact::*;
pub use about::*;
pub use text::*;
pub use custom::*;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::elementor::{merge_settings, Element, IdGen, Library, Role, Settings};
use crate::error::Result;
use crate::settings;
use crate::util::html_text;

/// One section of a page, as written in the site configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SectionSpec {
    Hero(Hero),
    Services(Services),
    Team(Team),
    Testimonials(Testimonials),
    Contact(Contact),
    About(About),
    Text(Text),
    Custom(Custom),
}

impl SectionSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            SectionSpec::Hero(_) => "hero",
            SectionSpec::Services(_) => "services",
            SectionSpec::Team(_) => "team",
            SectionSpec::Testimonials(_) => "testimonials",
            SectionSpec::Contact(_) => "contact",
            SectionSpec::About(_) => "about",
            SectionSpec::Text(_) => "text",
            SectionSpec::Custom(_) => "custom",
        }
    }

    /// Settings merged into the built section last.
    pub fn style(&self) -> &Settings {
        match self {
            SectionSpec::Hero(s) => &s.style,
            SectionSpec::Services(s) => &s.style,
            SectionSpec::Team(s) => &s.style,
            SectionSpec::Testimonials(s) => &s.style,
            SectionSpec::Contact(s) => &s.style,
            SectionSpec::About(s) => &s.style,
            SectionSpec::Text(s) => &s.style,
            SectionSpec::Custom(s) => &s.style,
        }
    }
}

/// A call to action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub external: bool,
}

/// Attachment ids of the site's media, by URL.
#[derive(Debug, Clone, Default)]
pub struct Media {
    ids: FxHashMap<String, u32>,
}

impl Media {
    pub fn new() -> Self {
        Media::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, id: u32) {
        self.ids.insert(url.into(), id);
    }

    pub fn id(&self, url: &str) -> Option<u32> {
        self.ids.get(url).copied()
    }
}

/// What a builder needs besides its own content.
pub struct Context<'a> {
    pub library: &'a Library,
    pub ids: &'a mut IdGen,
    pub media: &'a Media,
}

impl Context<'_> {
    pub fn id(&mut self) -> String {
        self.ids.next_id()
    }

    /// A fresh copy of the library's template for `role`.
    pub fn template(&mut self, role: Role) -> Option<Element> {
        let mut section = self.library.find(role)?.clone();
        self.ids.refresh(&mut section);
        Some(section)
    }

    /// An Elementor image control value.
    pub fn image(&self, url: &str) -> Value {
        match self.media.id(url) {
            Some(id) => json!({ "url": url, "id": id }),
            None => json!({ "url": url, "id": "" }),
        }
    }

    pub fn section(&mut self, settings: Settings, columns: Vec<Element>) -> Element {
        Element::section(self.id(), settings, columns)
    }

    pub fn inner_section(&mut self, columns: Vec<Element>) -> Element {
        Element::inner_section(self.id(), settings! { "gap": "extended" }, columns)
    }

    pub fn column(&mut self, size: u32, elements: Vec<Element>) -> Element {
        Element::column(self.id(), size, elements)
    }

    pub fn widget(&mut self, widget_type: &str, settings: Settings) -> Element {
        Element::widget(self.id(), widget_type, settings)
    }

    pub fn heading(&mut self, title: &str, size: &str) -> Element {
        self.widget("cholot-title", settings! {
            "title": title,
            "header_size": size,
            "align": "center",
        })
    }

    pub fn text_editor(&mut self, text: &str) -> Element {
        self.widget("text-editor", settings! { "editor": paragraphs(text) })
    }

    pub fn button(&mut self, link: &Link) -> Element {
        self.widget("cholot-button", settings! {
            "btn_text": link.text,
            "btn_link": link_value(&link.url, link.external),
            "align": "center",
        })
    }

    /// `cards` laid out `per_row` to an inner section, all in one column.
    pub fn card_rows(&mut self, cards: Vec<Element>, per_row: usize) -> Vec<Element> {
        let per_row = per_row.max(1);
        let size = (100 / per_row) as u32;
        let mut rows = vec![];
        let mut cards = cards.into_iter().peekable();
        while cards.peek().is_some() {
            let chunk: Vec<Element> = cards.by_ref().take(per_row).collect();
            let columns = chunk.into_iter().map(|card| self.column(size, vec![card])).collect();
            rows.push(self.inner_section(columns));
        }

        rows
    }
}

/// An Elementor URL control value.
pub fn link_value(url: &str, external: bool) -> Value {
    json!({
        "url": url,
        "is_external": if external { "on" } else { "" },
        "nofollow": "",
    })
}

/// Font Awesome library name for an icon class such as `fas fa-phone`.
pub fn icon_value(icon: &str) -> Value {
    let library = match icon.split_whitespace().next() {
        Some("far") => "fa-regular",
        Some("fab") => "fa-brands",
        _ => "fa-solid",
    };

    json!({ "value": icon, "library": library })
}

/// Plain text becomes HTML paragraphs; text that already starts with a tag
/// is passed through.
pub fn paragraphs(text: &str) -> String {
    let text = text.trim();
    if text.starts_with('<') {
        return text.to_string();
    }

    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", html_text(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds a section either by filling a template or from scratch.
pub trait Builder {
    /// The library role whose template this builder fills, if any.
    const ROLE: Option<Role> = None;

    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element;

    /// Writes this builder's content into `section`, a fresh copy of the
    /// role's template. Only called for builders with a `ROLE`.
    fn fill(&self, section: &mut Element, ctx: &mut Context<'_>) -> Result<()> {
        let _ = ctx;
        err!("section kind has no template", "template" => section.id())
    }
}

fn build<B: Builder>(builder: &B, ctx: &mut Context<'_>) -> Element {
    let Some(role) = B::ROLE else {
        return builder.from_scratch(ctx);
    };

    let Some(mut section) = ctx.template(role) else {
        log::debug!("no {role} template in the library; building from scratch");
        return builder.from_scratch(ctx);
    };

    match builder.fill(&mut section, ctx) {
        Ok(()) => section,
        Err(e) => {
            log::warn!("{role} template unusable, building from scratch: {}", e.message());
            builder.from_scratch(ctx)
        }
    }
}

/// Builds the Elementor section for `spec`.
pub fn build_section(spec: &SectionSpec, ctx: &mut Context<'_>) -> Element {
    let mut section = match spec {
        SectionSpec::Hero(b) => build(b, ctx),
        SectionSpec::Services(b) => build(b, ctx),
        SectionSpec::Team(b) => build(b, ctx),
        SectionSpec::Testimonials(b) => build(b, ctx),
        SectionSpec::Contact(b) => build(b, ctx),
        SectionSpec::About(b) => build(b, ctx),
        SectionSpec::Text(b) => build(b, ctx),
        SectionSpec::Custom(b) => build(b, ctx),
    };

    merge_settings(section.settings_mut(), spec.style().clone());
    section
}

/// Merges `content` into the first `widget_type` widget of `section`.
/// Returns `false` if there is no such widget.
pub(crate) fn merge_first(section: &mut Element, widget_type: &str, content: Settings) -> bool {
    match section.first_widget_mut(widget_type) {
        Some(widget) => {
            widget.merge(content);
            true
        }
        None => false,
    }
}

/// Removes every `widget_type` widget from `section`, returning how many
/// there were.
pub(crate) fn drop_widgets(section: &mut Element, widget_type: &str) -> usize {
    let mut dropped = 0;
    section.walk_mut(&mut |e| {
        let children = e.children_mut();
        let before = children.len();
        children.retain(|c| c.widget_type() != Some(widget_type));
        dropped += before - children.len();
    });

    dropped
}

/// Removes the elements with the given ids from `section`.
pub(crate) fn drop_ids(section: &mut Element, ids: &[String]) {
    if ids.is_empty() {
        return;
    }

    section.walk_mut(&mut |e| e.children_mut().retain(|c| !ids.iter().any(|id| id == c.id())));
}

/// Merges `title` into the template's first title widget, dropping any other
/// title widgets of the same type. Without a title they are all dropped.
pub(crate) fn fill_title(section: &mut Element, title: &str) -> Result<()> {
    let Some(widget_type) = ["cholot-title", "heading"].into_iter().find(|ty| section.contains_widget(ty)) else {
        return match title.is_empty() {
            true => Ok(()),
            false => err!("template has no title widget", "title" => title),
        };
    };

    if title.is_empty() {
        drop_widgets(section, widget_type);
        return Ok(());
    }

    fill_first(section, widget_type, settings! { "title": title });
    Ok(())
}

/// Like [`fill_title()`], for body text in `text-editor` widgets.
pub(crate) fn fill_text(section: &mut Element, text: &str) -> Result<()> {
    if text.is_empty() {
        drop_widgets(section, "text-editor");
        return Ok(());
    }

    if !fill_first(section, "text-editor", settings! { "editor": paragraphs(text) }) {
        return err!("template has no text widget");
    }

    Ok(())
}

/// Like [`fill_title()`], for a `cholot-button`.
pub(crate) fn fill_button(section: &mut Element, button: Option<&Link>) -> Result<()> {
    let Some(button) = button else {
        drop_widgets(section, "cholot-button");
        return Ok(());
    };

    let content = settings! {
        "btn_text": button.text,
        "btn_link": link_value(&button.url, button.external),
    };

    if !fill_first(section, "cholot-button", content) {
        return err!("template has no button widget", "button" => button.text);
    }

    Ok(())
}

/// Merges `content` into the first `widget_type` widget and drops the rest.
fn fill_first(section: &mut Element, widget_type: &str, content: Settings) -> bool {
    let mut widgets = section.widgets_mut(widget_type).into_iter();
    let Some(first) = widgets.next() else {
        return false;
    };

    first.merge(content);
    let surplus: Vec<String> = widgets.map(|w| w.id.clone()).collect();
    drop_ids(section, &surplus);
    true
}

/// Removes columns left without elements, and inner sections left without
/// columns. The remaining columns of a row are widened to fill it.
pub(crate) fn collapse_empty_columns(element: &mut Element) {
    for child in element.children_mut() {
        collapse_empty_columns(child);
    }

    if element.is_column() {
        element.children_mut().retain(|c| !(c.is_section() && c.children().is_empty()));
        return;
    }

    if !element.is_section() {
        return;
    }

    let columns = element.children_mut();
    let before = columns.len();
    columns.retain(|c| !c.children().is_empty());
    if columns.len() == before || columns.is_empty() {
        return;
    }

    let total: f64 = columns.iter().filter_map(Element::column_size).sum();
    if total <= 0.0 {
        return;
    }

    for column in columns.iter_mut() {
        if let Some(size) = column.column_size() {
            let size = (size * 100.0 / total).floor() as u32;
            column.settings_mut().insert("_column_size".into(), size.into());
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub struct Fixture {
        pub library: Library,
        pub ids: IdGen,
        pub media: Media,
    }

    impl Fixture {
        pub fn new(library: Library) -> Self {
            let mut media = Media::new();
            media.insert("https://riman.test/team/anna.jpg", 41);
            Fixture { library, ids: IdGen::seeded(11), media }
        }

        pub fn ctx(&mut self) -> Context<'_> {
            Context { library: &self.library, ids: &mut self.ids, media: &self.media }
        }
    }

    pub fn widget_settings<'a>(section: &'a Element, widget_type: &str) -> Vec<&'a Settings> {
        let mut found = vec![];
        section.walk(&mut |e| if e.widget_type() == Some(widget_type) {
            found.push(e.settings());
        });

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_from_plain_text() {
        assert_eq!(paragraphs("Eins\n\nZwei & Drei\nVier"), "<p>Eins</p>\n<p>Zwei &amp; Drei<br>Vier</p>");
        assert_eq!(paragraphs("  <p>fertig</p> "), "<p>fertig</p>");
        assert_eq!(paragraphs(""), "");
        assert_eq!(paragraphs("A {{ globals.company }}\n\nB"), "<p>{% filter html %}A {{ globals.company }}{% endfilter %}</p>\n<p>B</p>");
    }

    #[test]
    fn icon_libraries() {
        assert_eq!(icon_value("fas fa-phone")["library"], "fa-solid");
        assert_eq!(icon_value("far fa-clock")["library"], "fa-regular");
        assert_eq!(icon_value("fab fa-xing")["library"], "fa-brands");
    }

    #[test]
    fn drops_widgets_at_any_depth() {
        let mut section = Element::section("s", settings! {}, vec![
            Element::column("c1", 50, vec![
                Element::widget("b1", "cholot-button", settings! { "btn_text": "x" }),
                Element::widget("t1", "text-editor", settings! { "editor": "x" }),
            ]),
            Element::column("c2", 50, vec![
                Element::inner_section("s2", settings! {}, vec![
                    Element::column("c3", 100, vec![
                        Element::widget("b2", "cholot-button", settings! { "btn_text": "y" }),
                    ]),
                ]),
            ]),
        ]);

        assert_eq!(drop_widgets(&mut section, "cholot-button"), 2);
        assert!(!section.contains_widget("cholot-button"));
        assert!(section.contains_widget("text-editor"));
        assert_eq!(section.count(), 6);
    }

    #[test]
    fn titles_fill_the_first_widget_or_fail() {
        let mut section = Element::section("s", settings! {}, vec![
            Element::column("c", 100, vec![
                Element::widget("h1", "cholot-title", settings! { "title": "Alt", "header_size": "h2" }),
                Element::widget("h2", "cholot-title", settings! { "title": "Demo" }),
            ]),
        ]);

        fill_title(&mut section, "Leistungen").unwrap();
        let titles = test_support::widget_settings(&section, "cholot-title");
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0]["title"], "Leistungen");
        assert_eq!(titles[0]["header_size"], "h2");

        fill_title(&mut section, "").unwrap();
        assert!(!section.contains_widget("cholot-title"));

        let error = fill_title(&mut section, "Leistungen").unwrap_err();
        assert!(error.mentions("no title widget"));
        assert!(fill_text(&mut section, "Text").is_err());
        assert!(fill_text(&mut section, "").is_ok());
    }

    #[test]
    fn emptied_columns_collapse() {
        let mut section = Element::section("s", settings! {}, vec![
            Element::column("c1", 25, vec![Element::widget("w1", "image", settings! { "image": {} })]),
            Element::column("c2", 25, vec![]),
            Element::column("c3", 50, vec![
                Element::inner_section("s2", settings! {}, vec![Element::column("c4", 100, vec![])]),
                Element::widget("w2", "text-editor", settings! { "editor": "x" }),
            ]),
        ]);

        collapse_empty_columns(&mut section);
        let sizes: Vec<_> = section.children().iter().filter_map(Element::column_size).collect();
        assert_eq!(sizes, [33.0, 66.0]);
        assert_eq!(section.children()[1].children().len(), 1);
    }

    #[test]
    fn style_is_merged_last() {
        let spec: SectionSpec = serde_yaml::from_str(r##"
            kind: text
            title: Impressum
            text: "RIMAN GmbH"
            style: { background_color: "#f4f4f4", padding: { unit: px, top: 80 } }
        "##).unwrap();

        let mut fixture = test_support::Fixture::new(Library::new());
        let section = build_section(&spec, &mut fixture.ctx());
        assert_eq!(section.settings()["background_color"], "#f4f4f4");
        assert_eq!(section.settings()["padding"]["top"], 80);
    }
}
