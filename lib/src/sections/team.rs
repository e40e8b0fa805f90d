use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::elementor::{Element, Role, Settings};
use crate::error::Result;
use crate::sections::{fill_text, fill_title, fit_row, Builder, Context};
use crate::settings;
use crate::util::{html_text, mailto_link, tel_link};

const CARDS_PER_ROW: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub style: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Member {
    fn content(&self, ctx: &Context<'_>) -> Settings {
        let mut content = settings! {
            "title": self.name,
            "text": self.role,
        };

        if let Some(url) = &self.image {
            content.insert("image".into(), ctx.image(url));
        }

        let mut lines = vec![];
        if let Some(phone) = &self.phone {
            lines.push(format!("<a href=\"{}\">{}</a>", tel_link(phone), html_text(phone)));
        }

        if let Some(email) = &self.email {
            lines.push(format!("<a href=\"{}\">{}</a>", mailto_link(email), html_text(email)));
        }

        if !lines.is_empty() {
            content.insert("desc".into(), format!("<p>{}</p>", lines.join("<br>")).into());
        }

        content
    }
}

impl Builder for Team {
    const ROLE: Option<Role> = Some(Role::Team);

    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let mut widgets = vec![];
        if !self.title.is_empty() {
            widgets.push(ctx.heading(&self.title, "h2"));
        }

        if !self.subtitle.is_empty() {
            widgets.push(ctx.text_editor(&self.subtitle));
        }

        let cards = self.members.iter()
            .map(|member| {
                let settings = member.content(ctx);
                ctx.widget("cholot-team", settings)
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

        fit_row(section, "cholot-team", self.members.len(), ctx.ids)?;
        let contents: Vec<Settings> = self.members.iter()
            .map(|member| {
                let mut content = member.content(ctx);
                content.entry("image").or_insert_with(|| json!({ "url": "", "id": "" }));
                content.entry("desc").or_insert_with(|| "".into());
                content
            })
            .collect();

        for (widget, content) in section.widgets_mut("cholot-team").into_iter().zip(contents) {
            widget.merge(content);
        }

        Ok(())
    }
}
