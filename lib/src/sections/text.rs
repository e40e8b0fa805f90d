use serde::{Deserialize, Serialize};

use crate::elementor::{Element, Settings};
use crate::sections::{Builder, Context};

/// A plain heading and body, used for legal pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub style: Settings,
}

impl Builder for Text {
    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let mut widgets = vec![];
        if !self.title.is_empty() {
            let mut title = ctx.heading(&self.title, "h2");
            title.settings_mut().insert("align".into(), "left".into());
            widgets.push(title);
        }

        widgets.push(ctx.text_editor(&self.text));
        let column = ctx.column(100, widgets);
        ctx.section(crate::settings! { "gap": "default" }, vec![column])
    }
}
