use serde::{Deserialize, Serialize};

use crate::elementor::{Element, Role, Settings};
use crate::error::Result;
use crate::sections::{collapse_empty_columns, drop_widgets, fill_button, fill_text, fill_title, merge_first};
use crate::sections::{Builder, Context, Link};
use crate::settings;

/// Image beside a heading and body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct About {
    #[serde(default)]
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub button: Option<Link>,
    /// Put the image in the right-hand column.
    #[serde(default)]
    pub image_right: bool,
    #[serde(default)]
    pub style: Settings,
}

impl Builder for About {
    const ROLE: Option<Role> = Some(Role::About);

    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let mut body = vec![];
        if !self.title.is_empty() {
            let mut title = ctx.heading(&self.title, "h2");
            title.settings_mut().insert("align".into(), "left".into());
            body.push(title);
        }

        body.push(ctx.text_editor(&self.text));
        if let Some(button) = &self.button {
            let mut button = ctx.button(button);
            button.settings_mut().insert("align".into(), "left".into());
            body.push(button);
        }

        let Some(url) = &self.image else {
            let column = ctx.column(100, body);
            return ctx.section(settings! { "gap": "extended" }, vec![column]);
        };

        let image = settings! { "image": ctx.image(url), "image_size": "full" };
        let image = ctx.widget("image", image);

        let image = ctx.column(50, vec![image]);
        let body = ctx.column(50, body);
        let columns = match self.image_right {
            true => vec![body, image],
            false => vec![image, body],
        };

        ctx.section(settings! {
            "gap": "extended",
            "content_position": "middle",
            "padding": { "unit": "px", "top": "90", "right": "0", "bottom": "90", "left": "0", "isLinked": false },
        }, columns)
    }

    fn fill(&self, section: &mut Element, ctx: &mut Context<'_>) -> Result<()> {
        fill_title(section, &self.title)?;
        fill_text(section, &self.text)?;
        fill_button(section, self.button.as_ref())?;

        match &self.image {
            Some(url) => {
                merge_first(section, "image", settings! { "image": ctx.image(url) });
                place_image(section, self.image_right);
            }
            None => {
                drop_widgets(section, "image");
                collapse_empty_columns(section);
            }
        }

        Ok(())
    }
}

/// Swaps the image column and the text column of `section` if the image is
/// not on the requested side.
fn place_image(section: &mut Element, right: bool) {
    let columns = section.children_mut();
    let image = columns.iter().position(|c| c.contains_widget("image"));
    let body = columns.iter().position(|c| {
        !c.contains_widget("image") && ["cholot-title", "heading", "text-editor"].iter().any(|ty| c.contains_widget(ty))
    });

    if let (Some(image), Some(body)) = (image, body) {
        if (image > body) != right {
            columns.swap(image, body);
        }
    }
}
