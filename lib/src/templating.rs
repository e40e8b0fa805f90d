//! Placeholder substitution in generated page trees.
//!
//! String settings that look like templates (`{{ .. }}` or `{% .. %}`) are
//! rendered with minijinja. Everything else is left alone and the engine is
//! never invoked for it.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use serde_json::Value;

use crate::elementor::{Element, Settings};
use crate::error::{Chainable, Result};
use crate::util::{html_lines, is_template, slugify, tel_href};

#[derive(Debug)]
pub struct Engine {
    env: Environment<'static>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("tel", ext::tel);
        env.add_filter("slugify", ext::slugify);
        env.add_filter("deslug", ext::deslug);
        env.add_filter("mailto", ext::mailto);
        env.add_filter("html", ext::html);
        Engine { env }
    }

    /// Renders `source`, naming it `name` in error messages.
    pub fn render_str<S: Serialize>(&self, name: &str, source: &str, ctx: &S) -> Result<String> {
        Ok(self.env.render_named_str(name, source, ctx)?)
    }

    /// Renders every templated string setting in `sections`, returning how
    /// many were rendered. `page` names the page in error messages.
    pub fn render_tree<S: Serialize>(&self, page: &str, sections: &mut [Element], ctx: &S) -> Result<usize> {
        let mut rendered = 0;
        for section in sections {
            rendered += self.render_element(page, section, ctx)?;
        }

        Ok(rendered)
    }

    fn render_element<S: Serialize>(&self, page: &str, element: &mut Element, ctx: &S) -> Result<usize> {
        let id = element.id().to_string();
        let mut rendered = self.render_settings(element.settings_mut(), ctx)
            .chain_with(|| error! {
                "failed to render a placeholder",
                "page" => page,
                "element" => id,
            })?;

        for child in element.children_mut() {
            rendered += self.render_element(page, child, ctx)?;
        }

        Ok(rendered)
    }

    fn render_settings<S: Serialize>(&self, settings: &mut Settings, ctx: &S) -> Result<usize> {
        let mut rendered = 0;
        for (key, value) in settings.iter_mut() {
            rendered += self.render_value(key, value, ctx)
                .chain_with(|| error!("in setting", "key" => key))?;
        }

        Ok(rendered)
    }

    fn render_value<S: Serialize>(&self, key: &str, value: &mut Value, ctx: &S) -> Result<usize> {
        match value {
            Value::String(s) if is_template(s) => {
                *s = self.render_str(key, s, ctx)?;
                Ok(1)
            }
            Value::Array(values) => {
                let mut rendered = 0;
                for value in values {
                    rendered += self.render_value(key, value, ctx)?;
                }

                Ok(rendered)
            }
            Value::Object(map) => self.render_settings(map, ctx),
            _ => Ok(0),
        }
    }
}

mod ext {
    pub fn tel(value: &str) -> String {
        super::tel_href(value)
    }

    pub fn slugify(value: &str) -> String {
        super::slugify(value)
    }

    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }

    pub fn mailto(value: &str) -> String {
        format!("mailto:{}", value.trim())
    }

    pub fn html(value: &str) -> String {
        super::html_lines(value)
    }
}
