use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form widget/section/column settings.
pub type Settings = serde_json::Map<String, Value>;

/// A node of an Elementor page tree, discriminated by `elType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "elType", rename_all = "lowercase")]
pub enum Element {
    Section(Container),
    Column(Container),
    Widget(Widget),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_settings")]
    pub settings: Settings,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(rename = "isInner", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_inner: bool,
    /// Keys Elementor writes that this crate doesn't interpret.
    #[serde(flatten)]
    pub extra: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(rename = "widgetType")]
    pub widget_type: String,
    #[serde(default, deserialize_with = "lenient_settings")]
    pub settings: Settings,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(flatten)]
    pub extra: Settings,
}

impl Element {
    pub fn section(id: impl Into<String>, settings: Settings, columns: Vec<Element>) -> Self {
        Element::Section(Container::new(id, settings, columns))
    }

    pub fn inner_section(id: impl Into<String>, settings: Settings, columns: Vec<Element>) -> Self {
        let mut container = Container::new(id, settings, columns);
        container.is_inner = true;
        Element::Section(container)
    }

    /// A column of `size` percent (`_column_size`).
    pub fn column(id: impl Into<String>, size: u32, elements: Vec<Element>) -> Self {
        let mut settings = Settings::new();
        settings.insert("_column_size".into(), size.into());
        Element::Column(Container::new(id, settings, elements))
    }

    pub fn widget(id: impl Into<String>, widget_type: impl Into<String>, settings: Settings) -> Self {
        Element::Widget(Widget {
            id: id.into(),
            widget_type: widget_type.into(),
            settings,
            elements: vec![],
            extra: Settings::new(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Section(_) => "section",
            Element::Column(_) => "column",
            Element::Widget(_) => "widget",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Element::Section(c) | Element::Column(c) => &c.id,
            Element::Widget(w) => &w.id,
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        match self {
            Element::Section(c) | Element::Column(c) => c.id = id.into(),
            Element::Widget(w) => w.id = id.into(),
        }
    }

    pub fn settings(&self) -> &Settings {
        match self {
            Element::Section(c) | Element::Column(c) => &c.settings,
            Element::Widget(w) => &w.settings,
        }
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        match self {
            Element::Section(c) | Element::Column(c) => &mut c.settings,
            Element::Widget(w) => &mut w.settings,
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Section(c) | Element::Column(c) => &c.elements,
            Element::Widget(w) => &w.elements,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        match self {
            Element::Section(c) | Element::Column(c) => &mut c.elements,
            Element::Widget(w) => &mut w.elements,
        }
    }

    pub fn widget_type(&self) -> Option<&str> {
        match self {
            Element::Widget(w) => Some(&w.widget_type),
            _ => None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Element::Section(_))
    }

    pub fn is_column(&self) -> bool {
        matches!(self, Element::Column(_))
    }

    /// The column's `_column_size`, if this is a column that has one.
    pub fn column_size(&self) -> Option<f64> {
        match self {
            Element::Column(c) => c.settings.get("_column_size").and_then(Value::as_f64),
            _ => None,
        }
    }

    /// Depth-first, pre-order visit of `self` and everything below it.
    pub fn walk<'a, F: FnMut(&'a Element)>(&'a self, f: &mut F) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    pub fn walk_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in self.children_mut() {
            child.walk_mut(f);
        }
    }

    /// Every widget type used anywhere in this subtree.
    pub fn widget_types(&self) -> BTreeSet<&str> {
        let mut types = BTreeSet::new();
        self.walk(&mut |e| if let Some(ty) = e.widget_type() {
            types.insert(ty);
        });

        types
    }

    pub fn contains_widget(&self, widget_type: &str) -> bool {
        let mut found = false;
        self.walk(&mut |e| found |= e.widget_type() == Some(widget_type));
        found
    }

    /// The widgets of `widget_type` in this subtree, in document order.
    pub fn widgets_mut(&mut self, widget_type: &str) -> Vec<&mut Widget> {
        fn collect<'a>(e: &'a mut Element, ty: &str, out: &mut Vec<&'a mut Widget>) {
            match e {
                Element::Widget(w) if w.widget_type == ty => out.push(w),
                Element::Widget(_) => {}
                Element::Section(c) | Element::Column(c) => {
                    for child in &mut c.elements {
                        collect(child, ty, out);
                    }
                }
            }
        }

        let mut out = vec![];
        collect(self, widget_type, &mut out);
        out
    }

    /// The first widget of `widget_type` in this subtree.
    pub fn first_widget_mut(&mut self, widget_type: &str) -> Option<&mut Widget> {
        self.widgets_mut(widget_type).into_iter().next()
    }

    /// Number of elements in this subtree, including `self`.
    pub fn count(&self) -> usize {
        let mut n = 0;
        self.walk(&mut |_| n += 1);
        n
    }
}

impl Container {
    pub fn new(id: impl Into<String>, settings: Settings, elements: Vec<Element>) -> Self {
        Container {
            id: id.into(),
            settings,
            elements,
            is_inner: false,
            extra: Settings::new(),
        }
    }
}

impl Widget {
    /// Overwrites each key of `content` in this widget's settings. Keys the
    /// widget has that `content` doesn't are kept.
    pub fn merge(&mut self, content: Settings) {
        merge_settings(&mut self.settings, content);
    }
}

/// PHP serializes an empty settings object as `[]`.
fn lenient_settings<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Settings, D::Error> {
    use serde::de::Error;

    match Value::deserialize(de)? {
        Value::Object(map) => Ok(map),
        Value::Array(v) if v.is_empty() => Ok(Settings::new()),
        Value::Null => Ok(Settings::new()),
        other => Err(D::Error::custom(format!("expected settings object, found {other}"))),
    }
}

/// Overwrites `into` with every key of `from`.
pub fn merge_settings(into: &mut Settings, from: Settings) {
    for (key, value) in from {
        into.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings;

    fn sample() -> Element {
        Element::section("s1", settings! { "layout": "boxed" }, vec![
            Element::column("c1", 50, vec![
                Element::widget("w1", "cholot-team", settings! { "title": "A" }),
            ]),
            Element::column("c2", 50, vec![
                Element::inner_section("s2", Settings::new(), vec![
                    Element::column("c3", 100, vec![
                        Element::widget("w2", "cholot-team", settings! { "title": "B" }),
                        Element::widget("w3", "text-editor", settings! { "editor": "x" }),
                    ]),
                ]),
            ]),
        ])
    }

    #[test]
    fn parses_elementor_json() {
        let json = r#"[{
            "id": "1a2b3c4", "elType": "section", "settings": {"gap": "no"}, "isLocked": false,
            "elements": [{
                "id": "5d6e7f8", "elType": "column", "settings": {"_column_size": 100},
                "elements": [{
                    "id": "9a0b1c2", "elType": "widget", "widgetType": "cholot-title",
                    "settings": {"title": "Schadstoffsanierung"}, "elements": []
                }]
            }]
        }]"#;

        let sections: Vec<Element> = serde_json::from_str(json).unwrap();
        let section = &sections[0];
        assert!(section.is_section());
        assert_eq!(section.children()[0].column_size(), Some(100.0));
        assert!(section.contains_widget("cholot-title"));
        match section {
            Element::Section(c) => assert_eq!(c.extra.get("isLocked"), Some(&Value::Bool(false))),
            _ => unreachable!(),
        }

        let back = serde_json::to_value(&sections).unwrap();
        assert_eq!(back[0]["isLocked"], Value::Bool(false));
        assert_eq!(back[0]["elements"][0]["elements"][0]["widgetType"], "cholot-title");
        assert!(back[0].get("isInner").is_none());
    }

    #[test]
    fn accepts_php_empty_settings() {
        let json = r#"{"id": "a", "elType": "column", "settings": [], "elements": []}"#;
        let column: Element = serde_json::from_str(json).unwrap();
        assert!(column.settings().is_empty());

        let json = r#"{"id": "a", "elType": "column", "settings": [1], "elements": []}"#;
        assert!(serde_json::from_str::<Element>(json).is_err());
    }

    #[test]
    fn walks_in_document_order() {
        let mut ids = vec![];
        let tree = sample();
        tree.walk(&mut |e| ids.push(e.id().to_string()));
        assert_eq!(ids, ["s1", "c1", "w1", "c2", "s2", "c3", "w2", "w3"]);
        assert_eq!(tree.count(), 8);

        let types: Vec<_> = tree.widget_types().into_iter().collect();
        assert_eq!(types, ["cholot-team", "text-editor"]);
    }

    #[test]
    fn inner_sections_serialize_flag() {
        let tree = sample();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["elements"][1]["elements"][0]["isInner"], Value::Bool(true));
        assert_eq!(json["elements"][0]["elements"][0]["elements"], serde_json::json!([]));
    }

    #[test]
    fn merges_content_into_widgets() {
        let mut tree = sample();
        let mut widgets = tree.widgets_mut("cholot-team");
        assert_eq!(widgets.len(), 2);
        widgets[1].merge(settings! { "title": "C", "text": "Bauleitung" });
        let w = tree.widgets_mut("cholot-team").pop().unwrap();
        assert_eq!(w.settings["title"], "C");
        assert_eq!(w.settings["text"], "Bauleitung");
    }
}
