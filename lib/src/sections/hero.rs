use serde::{Deserialize, Serialize};

use crate::elementor::{Element, Role, Settings};
use crate::error::Result;
use crate::sections::{fill_button, fill_text, fill_title, paragraphs, Builder, Context, Link};
use crate::settings;

/// The full-width banner at the top of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Small line above the title.
    #[serde(default)]
    pub kicker: String,
    #[serde(default)]
    pub button: Option<Link>,
    /// Background image URL.
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub style: Settings,
}

impl Builder for Hero {
    const ROLE: Option<Role> = Some(Role::Hero);

    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let mut widgets = vec![];
        if !self.kicker.is_empty() {
            widgets.push(ctx.widget("text-editor", settings! {
                "editor": paragraphs(&self.kicker),
                "align": "center",
                "text_color": "#b68c2f",
            }));
        }

        let mut title = ctx.heading(&self.title, "h1");
        title.settings_mut().insert("title_color".into(), "#ffffff".into());
        widgets.push(title);

        if !self.subtitle.is_empty() {
            widgets.push(ctx.widget("text-editor", settings! {
                "editor": paragraphs(&self.subtitle),
                "align": "center",
                "text_color": "#ffffff",
            }));
        }

        if let Some(button) = &self.button {
            widgets.push(ctx.button(button));
        }

        let mut settings = settings! {
            "layout": "full_width",
            "height": "min-height",
            "custom_height": { "unit": "vh", "size": 85 },
            "content_position": "middle",
            "background_overlay_background": "classic",
            "background_overlay_color": "#1b1b1b",
            "background_overlay_opacity": { "unit": "px", "size": 0.55 },
        };

        if let Some(url) = &self.background {
            settings.extend(settings! {
                "background_background": "classic",
                "background_image": ctx.image(url),
                "background_position": "center center",
                "background_size": "cover",
            });
        }

        let column = ctx.column(100, widgets);
        ctx.section(settings, vec![column])
    }

    fn fill(&self, section: &mut Element, ctx: &mut Context<'_>) -> Result<()> {
        fill_title(section, &self.title)?;
        fill_text(section, &self.subtitle)?;
        fill_button(section, self.button.as_ref())?;

        if !self.kicker.is_empty() {
            let kicker = ctx.widget("text-editor", settings! {
                "editor": paragraphs(&self.kicker),
                "align": "center",
                "text_color": "#b68c2f",
            });

            if insert_before_title(section, kicker).is_some() {
                return err!("hero template has no title widget");
            }
        }

        if let Some(url) = &self.background {
            section.settings_mut().extend(settings! {
                "background_background": "classic",
                "background_image": ctx.image(url),
            });
        }

        Ok(())
    }
}

/// Inserts `widget` just above the first title widget of `element`, handing
/// it back if there is none.
fn insert_before_title(element: &mut Element, widget: Element) -> Option<Element> {
    let children = element.children_mut();
    if let Some(i) = children.iter().position(|c| matches!(c.widget_type(), Some("cholot-title" | "heading"))) {
        children.insert(i, widget);
        return None;
    }

    let mut widget = widget;
    for child in children.iter_mut().filter(|c| c.widget_type().is_none()) {
        widget = insert_before_title(child, widget)?;
    }

    Some(widget)
}
