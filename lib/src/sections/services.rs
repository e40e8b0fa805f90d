use serde::{Deserialize, Serialize};

use crate::elementor::{Element, Role, Settings};
use crate::error::Result;
use crate::sections::{fill_text, fill_title, fit_row, icon_value, link_value, paragraphs, Builder, Context};
use crate::settings;

const CARDS_PER_ROW: usize = 3;

/// A grid of service cards, one `cholot-texticon` each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Services {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub items: Vec<Service>,
    #[serde(default)]
    pub style: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "Service::default_icon")]
    pub icon: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl Service {
    fn default_icon() -> String {
        "fas fa-check".into()
    }

    fn content(&self) -> Settings {
        let mut content = settings! {
            "title": self.title,
            "text": paragraphs(&self.text),
            "selected_icon": icon_value(&self.icon),
        };

        if let Some(url) = &self.link {
            content.insert("link".into(), link_value(url, false));
        }

        content
    }
}

impl Builder for Services {
    const ROLE: Option<Role> = Some(Role::Services);

    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let mut widgets = vec![];
        if !self.title.is_empty() {
            widgets.push(ctx.heading(&self.title, "h2"));
        }

        if !self.subtitle.is_empty() {
            widgets.push(ctx.text_editor(&self.subtitle));
        }

        let cards = self.items.iter()
            .map(|item| {
                let mut settings = item.content();
                settings.insert("icon_color".into(), "#b68c2f".into());
                ctx.widget("cholot-texticon", settings)
            })
            .collect();

        widgets.extend(ctx.card_rows(cards, CARDS_PER_ROW));
        let column = ctx.column(100, widgets);
        ctx.section(settings! {
            "gap": "extended",
            "padding": { "unit": "px", "top": "90", "right": "0", "bottom": "90", "left": "0", "isLinked": false },
        }, vec![column])
    }

    fn fill(&self, section: &mut Element, ctx: &mut Context<'_>) -> Result<()> {
        fill_title(section, &self.title)?;
        fill_text(section, &self.subtitle)?;

        fit_row(section, "cholot-texticon", self.items.len(), ctx.ids)?;
        for (widget, item) in section.widgets_mut("cholot-texticon").into_iter().zip(&self.items) {
            let mut content = item.content();
            content.entry("link").or_insert_with(|| link_value("", false));
            widget.merge(content);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementor::Library;
    use crate::sections::test_support::{widget_settings, Fixture};
    use crate::sections::{build_section, SectionSpec};

    fn services(n: usize) -> Services {
        let names = ["Asbestsanierung", "PCB-Sanierung", "KMF-Sanierung", "Schimmelsanierung", "Rückbau"];
        Services {
            title: "Leistungen".into(),
            subtitle: String::new(),
            items: names[..n].iter().map(|name| Service {
                title: name.to_string(),
                text: format!("{name} nach TRGS 519."),
                icon: "fas fa-shield-alt".into(),
                link: None,
            }).collect(),
            style: Settings::new(),
        }
    }

    #[test]
    fn from_scratch_lays_out_rows_of_three() {
        let mut fixture = Fixture::new(Library::new());
        let section = build_section(&SectionSpec::Services(services(5)), &mut fixture.ctx());
        let cards = widget_settings(&section, "cholot-texticon");
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[3]["title"], "Schimmelsanierung");
        assert_eq!(cards[0]["selected_icon"]["library"], "fa-solid");

        let column = &section.children()[0];
        assert_eq!(column.children().len(), 3);
        assert!(crate::elementor::check(std::slice::from_ref(&section)).is_clean());
    }

    #[test]
    fn fills_template_with_more_items_than_it_has() {
        let card = |id: &str| Element::column(id, 50, vec![
            Element::widget(format!("{id}w"), "cholot-texticon", settings! {
                "title": "Alt", "icon_color": "#123456",
            }),
        ]);

        let template = Element::section("t", settings! {}, vec![card("a"), card("b")]);
        let mut fixture = Fixture::new(Library::from_sections([template]));
        let untitled = Services { title: String::new(), ..services(4) };
        let section = build_section(&SectionSpec::Services(untitled), &mut fixture.ctx());

        let cards = widget_settings(&section, "cholot-texticon");
        let titles: Vec<_> = cards.iter().map(|c| c["title"].as_str().unwrap()).collect();
        assert_eq!(titles, ["Asbestsanierung", "PCB-Sanierung", "KMF-Sanierung", "Schimmelsanierung"]);
        assert!(cards.iter().all(|c| c["icon_color"] == "#123456"));
        assert_eq!(section.children()[0].column_size(), Some(25.0));
        assert!(crate::elementor::check(std::slice::from_ref(&section)).is_clean());
    }

    #[test]
    fn template_without_a_title_widget_falls_back() {
        let card = |id: &str| Element::column(id, 33, vec![
            Element::widget(format!("{id}w"), "cholot-texticon", settings! { "title": "Alt" }),
        ]);

        let template = Element::section("t", settings! {}, vec![card("a"), card("b"), card("c")]);
        let mut fixture = Fixture::new(Library::from_sections([template]));
        let spec = Services { subtitle: "Alles aus einer Hand.".into(), ..services(3) };
        let section = build_section(&SectionSpec::Services(spec), &mut fixture.ctx());

        assert_eq!(widget_settings(&section, "cholot-title")[0]["title"], "Leistungen");
        assert_eq!(widget_settings(&section, "text-editor")[0]["editor"], "<p>Alles aus einer Hand.</p>");
        assert_eq!(widget_settings(&section, "cholot-texticon").len(), 3);
    }

    #[test]
    fn stock_links_are_cleared() {
        let template = Element::section("t", settings! {}, vec![
            Element::column("c", 100, vec![
                Element::widget("h", "cholot-title", settings! { "title": "Alt" }),
                Element::widget("e", "text-editor", settings! { "editor": "Lorem ipsum" }),
                Element::inner_section("r", settings! {}, vec![
                    Element::column("a", 50, vec![
                        Element::widget("aw", "cholot-texticon", settings! { "link": { "url": "/demo/" } }),
                    ]),
                ]),
            ]),
        ]);

        let mut fixture = Fixture::new(Library::from_sections([template]));
        let section = build_section(&SectionSpec::Services(services(2)), &mut fixture.ctx());
        assert!(!section.contains_widget("text-editor"));
        assert!(widget_settings(&section, "cholot-texticon").iter().all(|c| c["link"]["url"] == ""));
    }
}
