use serde::{Deserialize, Serialize};

use crate::elementor::{Element, Role, Settings};
use crate::error::Result;
use crate::sections::{collapse_empty_columns, drop_ids, drop_widgets, fill_text, fill_title, icon_value, link_value, merge_first};
use crate::sections::{paragraphs, Builder, Context};
use crate::settings;
use crate::util::{mailto_link, tel_link};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub title: String,
    pub text: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
    /// A form shortcode such as `[contact-form-7 id="5"]`.
    pub form_shortcode: Option<String>,
    /// Address shown on an embedded map.
    pub map_address: Option<String>,
    pub style: Settings,
}

impl Contact {
    /// One `cholot-texticon` setting set per contact detail given.
    fn lines(&self) -> Vec<Settings> {
        let mut lines = vec![];
        if let Some(address) = &self.address {
            lines.push(line("fas fa-map-marker-alt", "Adresse", address, None));
        }

        if let Some(phone) = &self.phone {
            lines.push(line("fas fa-phone", "Telefon", phone, Some(tel_link(phone))));
        }

        if let Some(email) = &self.email {
            lines.push(line("fas fa-envelope", "E-Mail", email, Some(mailto_link(email))));
        }

        if let Some(hours) = &self.hours {
            lines.push(line("far fa-clock", "Öffnungszeiten", hours, None));
        }

        lines
    }
}

fn line(icon: &str, title: &str, text: &str, href: Option<String>) -> Settings {
    settings! {
        "title": title,
        "text": paragraphs(text),
        "selected_icon": icon_value(icon),
        "link": link_value(href.as_deref().unwrap_or(""), false),
    }
}

impl Builder for Contact {
    const ROLE: Option<Role> = Some(Role::Contact);

    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let mut details = vec![];
        if !self.title.is_empty() {
            details.push(ctx.heading(&self.title, "h2"));
        }

        if !self.text.is_empty() {
            details.push(ctx.text_editor(&self.text));
        }

        for settings in self.lines() {
            details.push(ctx.widget("cholot-texticon", settings));
        }

        let mut aside = vec![];
        if let Some(form) = &self.form_shortcode {
            aside.push(ctx.widget("shortcode", settings! { "shortcode": form }));
        }

        if let Some(address) = &self.map_address {
            aside.push(ctx.widget("google_maps", settings! {
                "address": address,
                "zoom": { "unit": "px", "size": 14 },
                "height": { "unit": "px", "size": 400 },
            }));
        }

        let columns = match aside.is_empty() {
            true => vec![ctx.column(100, details)],
            false => vec![ctx.column(50, details), ctx.column(50, aside)],
        };

        ctx.section(settings! {
            "gap": "extended",
            "padding": { "unit": "px", "top": "90", "right": "0", "bottom": "90", "left": "0", "isLinked": false },
        }, columns)
    }

    fn fill(&self, section: &mut Element, _: &mut Context<'_>) -> Result<()> {
        fill_title(section, &self.title)?;
        fill_text(section, &self.text)?;

        let lines = self.lines();
        let mut icons = section.widgets_mut("cholot-texticon");
        if icons.len() < lines.len() {
            return err! {
                "contact template has too few detail widgets",
                "widgets" => icons.len(),
                "details" => lines.len(),
            };
        }

        let used = lines.len();
        for (widget, line) in icons.iter_mut().zip(lines) {
            widget.merge(line);
        }

        let surplus: Vec<String> = icons[used..].iter().map(|w| w.id.clone()).collect();
        drop_ids(section, &surplus);

        match &self.form_shortcode {
            Some(form) => {
                let placed = merge_first(section, "shortcode", settings! { "shortcode": form })
                    || merge_first(section, "cholot-contact", settings! { "shortcode": form });
                if !placed {
                    return err!("contact template has no form widget");
                }
            }
            None => {
                drop_widgets(section, "shortcode");
                drop_widgets(section, "cholot-contact");
            }
        }

        match &self.map_address {
            Some(address) => {
                if !merge_first(section, "google_maps", settings! { "address": address }) {
                    return err!("contact template has no map widget");
                }
            }
            None => {
                drop_widgets(section, "google_maps");
            }
        }

        collapse_empty_columns(section);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementor::Library;
    use crate::sections::test_support::{widget_settings, Fixture};
    use crate::sections::{build_section, SectionSpec};

    fn contact() -> Contact {
        Contact {
            title: "Kontakt".into(),
            address: Some("Musterstraße 1\n53721 Siegburg".into()),
            phone: Some("+49 2241 12345".into()),
            email: Some("info@riman.test".into()),
            form_shortcode: Some("[contact-form-7 id=\"5\"]".into()),
            ..Contact::default()
        }
    }

    #[test]
    fn from_scratch_puts_the_form_beside_the_details() {
        let mut fixture = Fixture::new(Library::new());
        let section = build_section(&SectionSpec::Contact(contact()), &mut fixture.ctx());
        assert_eq!(section.children().len(), 2);

        let lines = widget_settings(&section, "cholot-texticon");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["text"], "<p>Musterstraße 1<br>53721 Siegburg</p>");
        assert_eq!(lines[1]["link"]["url"], "tel:+49224112345");
        assert_eq!(lines[2]["link"]["url"], "mailto:info@riman.test");
        assert_eq!(widget_settings(&section, "shortcode")[0]["shortcode"], "[contact-form-7 id=\"5\"]");
        assert!(crate::elementor::check(std::slice::from_ref(&section)).is_clean());
    }

    #[test]
    fn template_without_form_widget_falls_back() {
        let template = Element::section("t", settings! {}, vec![
            Element::column("c", 100, vec![
                Element::widget("m", "google_maps", settings! { "address": "Alt" }),
            ]),
        ]);

        let mut fixture = Fixture::new(Library::from_sections([template]));
        let section = build_section(&SectionSpec::Contact(contact()), &mut fixture.ctx());
        assert!(section.contains_widget("shortcode"));
        assert!(!section.contains_widget("google_maps"));
    }

    fn template() -> Element {
        let icon = |id: &str| Element::widget(id, "cholot-texticon", settings! { "title": "Alt", "title_color": "#1b1b1b" });
        Element::section("t", settings! {}, vec![
            Element::column("c1", 50, vec![
                Element::widget("h", "cholot-title", settings! { "title": "Alt" }),
                icon("i1"),
                icon("i2"),
                icon("i3"),
            ]),
            Element::column("c2", 50, vec![
                Element::widget("f", "shortcode", settings! { "shortcode": "[alt]" }),
            ]),
        ])
    }

    #[test]
    fn fills_detail_widgets_in_order() {
        let mut fixture = Fixture::new(Library::from_sections([template()]));
        let section = build_section(&SectionSpec::Contact(contact()), &mut fixture.ctx());
        assert_eq!(section.children()[0].settings()["_column_size"], 50);

        let titles: Vec<_> = widget_settings(&section, "cholot-texticon").iter()
            .map(|s| s["title"].clone())
            .collect();
        assert_eq!(titles, ["Adresse", "Telefon", "E-Mail"]);
        assert!(widget_settings(&section, "cholot-texticon").iter().all(|s| s["title_color"] == "#1b1b1b"));
        assert_eq!(widget_settings(&section, "cholot-title")[0]["title"], "Kontakt");
        assert_eq!(widget_settings(&section, "shortcode")[0]["shortcode"], "[contact-form-7 id=\"5\"]");
        assert_ne!(section.id(), "t");
    }

    #[test]
    fn details_that_do_not_fit_fall_back() {
        let mut fixture = Fixture::new(Library::from_sections([template()]));
        let with_hours = Contact { hours: Some("Mo bis Fr 7 bis 17 Uhr".into()), ..contact() };
        let section = build_section(&SectionSpec::Contact(with_hours), &mut fixture.ctx());
        assert_eq!(widget_settings(&section, "cholot-texticon").len(), 4);

        let mut fixture = Fixture::new(Library::from_sections([template()]));
        let with_map = Contact { map_address: Some("Siegburg".into()), ..contact() };
        let section = build_section(&SectionSpec::Contact(with_map), &mut fixture.ctx());
        assert_eq!(widget_settings(&section, "google_maps")[0]["address"], "Siegburg");
    }

    #[test]
    fn stock_form_and_map_are_dropped() {
        let template = Element::section("t", settings! {}, vec![
            Element::column("c1", 50, vec![
                Element::widget("h", "cholot-title", settings! { "title": "Alt" }),
                Element::widget("i1", "cholot-texticon", settings! { "title": "Alt", "link": { "url": "/demo/" } }),
            ]),
            Element::column("c2", 50, vec![
                Element::widget("f", "shortcode", settings! { "shortcode": "[contact-form-7 id=\"999\"]" }),
                Element::widget("m", "google_maps", settings! { "address": "Musterstadt Demo" }),
            ]),
        ]);

        let mut fixture = Fixture::new(Library::from_sections([template]));
        let mut section = fixture.ctx().template(Role::Contact).unwrap();
        let address_only = Contact {
            title: "Kontakt".into(),
            address: Some("Siegburg".into()),
            ..Contact::default()
        };

        address_only.fill(&mut section, &mut fixture.ctx()).unwrap();
        assert!(!section.contains_widget("shortcode"));
        assert!(!section.contains_widget("google_maps"));
        assert_eq!(section.children().len(), 1);
        assert_eq!(section.children()[0].column_size(), Some(100.0));
        assert_eq!(widget_settings(&section, "cholot-texticon")[0]["link"]["url"], "");
    }
}
