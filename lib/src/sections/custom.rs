use serde::{Deserialize, Serialize};

use crate::elementor::{Element, Settings};
use crate::sections::{Builder, Context};

/// Widgets given verbatim, for layouts none of the other kinds cover.
///
/// Either `widgets` (one full-width column) or `columns` may be given.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Custom {
    pub widgets: Vec<CustomWidget>,
    pub columns: Vec<CustomColumn>,
    pub style: Settings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomColumn {
    /// Percent width; the columns without one share what is left.
    pub size: Option<u32>,
    pub widgets: Vec<CustomWidget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomWidget {
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default)]
    pub settings: Settings,
}

impl Custom {
    fn layout(&self) -> Vec<CustomColumn> {
        let mut columns = self.columns.clone();
        if !self.widgets.is_empty() {
            columns.insert(0, CustomColumn { size: None, widgets: self.widgets.clone() });
        }

        let fixed: u32 = columns.iter().filter_map(|c| c.size).sum();
        let open = columns.iter().filter(|c| c.size.is_none()).count() as u32;
        let share = match open {
            0 => 0,
            n => 100u32.saturating_sub(fixed) / n,
        };

        for column in &mut columns {
            column.size.get_or_insert(share);
        }

        columns
    }
}

impl Builder for Custom {
    fn from_scratch(&self, ctx: &mut Context<'_>) -> Element {
        let columns = self.layout()
            .into_iter()
            .map(|column| {
                let widgets = column.widgets.into_iter()
                    .map(|w| ctx.widget(&w.widget_type, w.settings))
                    .collect();

                ctx.column(column.size.unwrap_or(100), widgets)
            })
            .collect();

        ctx.section(Settings::new(), columns)
    }
}
