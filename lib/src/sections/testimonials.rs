use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::elementor::{merge_settings, Element, Role, Settings};
use crate::error::Result;
use crate::sections::{fill_title, Builder, Context};
use crate::settings;

/// Testimonial widgets the Cholot theme ships, in order of preference.
const WIDGETS: &[&str] = &["cholot-testimonial-two", "cholot-testimonial", "testimonial"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonials {
    #[serde(default)]
    pub title: String,
    pub items: Vec<Testimonial>,
    #[serde(default)]
    pub style: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Testimonials {
    /// The repeater entries for `testi_list`. Each one starts from
    /// `prototype`, the template's first entry, so per-entry styling survives.
    fn entries(&self, prototype: &Settings, ctx: &mut Context<'_>) -> Vec<Value> {
        self.items.iter()
            .map(|item| {
                let mut entry = prototype.clone();
                merge_settings(&mut entry, settings! {
                    "_id": ctx.id(),
                    "testi_text": item.quote,
                    "testi_name": item.name,
                    "testi_position": item.role,
                });

                match &item.image {
                    Some(url) => {
                        entry.insert("testi_image".into(), ctx.image(url));
                    }
                    None if entry.contains_key("testi_image") => {
                        entry.insert("testi_image".into(), json!({ "url": "", "id": "" }));
                    }
                    None => {}
                }

                Value::Object(entry)
            })
            .collect()
    }
}

impl Builder for Testimonials {
    const ROLE: Option<Role> = Some(Role::Testimonials);

    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let mut widgets = vec![];
        if !self.title.is_empty() {
            widgets.push(ctx.heading(&self.title, "h2"));
        }

        let list = self.entries(&Settings::new(), ctx);
        widgets.push(ctx.widget("cholot-testimonial-two", settings! {
            "testi_list": list,
            "slides_to_show": "1",
            "autoplay": "yes",
        }));

        let column = ctx.column(100, widgets);
        ctx.section(settings! {
            "background_background": "classic",
            "background_color": "#f7f5f0",
            "padding": { "unit": "px", "top": "80", "right": "0", "bottom": "80", "left": "0", "isLinked": false },
        }, vec![column])
    }

    fn fill(&self, section: &mut Element, ctx: &mut Context<'_>) -> Result<()> {
        let Some(widget_type) = WIDGETS.iter().find(|ty| section.contains_widget(ty)) else {
            return err!("template has no testimonial widget");
        };

        let prototype = section.first_widget_mut(widget_type)
            .and_then(|w| w.settings.get("testi_list"))
            .and_then(|list| list.get(0))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let list = self.entries(&prototype, ctx);
        if let Some(widget) = section.first_widget_mut(widget_type) {
            widget.merge(settings! { "testi_list": list });
        }

        fill_title(section, &self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementor::Library;
    use crate::sections::test_support::{widget_settings, Fixture};
    use crate::sections::{build_section, SectionSpec};

    fn testimonials() -> Testimonials {
        Testimonials {
            title: "Das sagen unsere Kunden".into(),
            items: vec![
                Testimonial {
                    quote: "Schnell, sauber und gut dokumentiert.".into(),
                    name: "M. Becker".into(),
                    role: "Hausverwaltung".into(),
                    image: None,
                },
                Testimonial {
                    quote: "Die Asbestsanierung lief reibungslos.".into(),
                    name: "S. Wagner".into(),
                    role: String::new(),
                    image: None,
                },
            ],
            style: Settings::new(),
        }
    }

    #[test]
    fn repeater_entries_get_unique_ids() {
        let mut fixture = Fixture::new(Library::new());
        let section = build_section(&SectionSpec::Testimonials(testimonials()), &mut fixture.ctx());
        let widget = widget_settings(&section, "cholot-testimonial-two")[0];
        let list = widget["testi_list"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1]["testi_name"], "S. Wagner");
        assert_ne!(list[0]["_id"], list[1]["_id"]);
    }

    #[test]
    fn template_entries_keep_their_styling() {
        let template = Element::section("t", settings! {}, vec![
            Element::column("c", 100, vec![
                Element::widget("h", "cholot-title", settings! { "title": "Alt" }),
                Element::widget("w", "cholot-testimonial", settings! {
                    "testi_list": [{
                        "_id": "old",
                        "testi_text": "Alt",
                        "testi_color": "#fff",
                        "testi_image": { "url": "https://demo.test/stock.jpg", "id": 9 },
                    }],
                }),
            ]),
        ]);

        let mut fixture = Fixture::new(Library::from_sections([template]));
        let section = build_section(&SectionSpec::Testimonials(testimonials()), &mut fixture.ctx());
        let list = widget_settings(&section, "cholot-testimonial")[0]["testi_list"].as_array().unwrap().clone();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|e| e["testi_color"] == "#fff" && e["_id"] != "old"));
        assert_eq!(list[0]["testi_text"], "Schnell, sauber und gut dokumentiert.");
        assert!(list.iter().all(|e| e["testi_image"]["url"] == ""));
    }
}
