use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Chainable, Result};
use crate::sections::SectionSpec;
use crate::util::slugify;
use crate::wxr::{Author, Status};

/// The whole site: metadata, content and generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteInfo,
    #[serde(default)]
    pub author: Author,
    /// Free-form values available to placeholders as `globals`.
    #[serde(default)]
    pub globals: serde_json::Map<String, Value>,
    /// Template library, relative to the configuration file.
    #[serde(default)]
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub categories: Vec<CategorySpec>,
    #[serde(default)]
    pub media: Vec<MediaSpec>,
    #[serde(default)]
    pub menus: Vec<Menu>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "SiteInfo::default_language")]
    pub language: String,
    /// Publication date of every item without its own, as RFC 3339,
    /// `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`. Defaults to now.
    #[serde(default)]
    pub date: Option<String>,
}

impl SiteInfo {
    fn default_language() -> String {
        "de-DE".into()
    }

    /// The site URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Makes element ids reproducible.
    pub seed: Option<u64>,
    pub first_post_id: u32,
    /// `addslashes` the `_elementor_data` meta for the WordPress importer.
    pub slash_meta: bool,
    pub elementor_version: String,
    pub page_template: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            seed: None,
            first_post_id: 100,
            slash_meta: true,
            elementor_version: "3.18.3".into(),
            page_template: "elementor_header_footer".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Slug of the parent page.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub menu_order: i32,
    /// `_wp_page_template`; the site default when unset.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

impl Page {
    pub fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.title))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Names or slugs of declared categories.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Classic post body, used when there are no sections.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

impl Post {
    pub fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.title))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Slug of the parent category.
    #[serde(default)]
    pub parent: Option<String>,
}

impl CategorySpec {
    pub fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSpec {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl MediaSpec {
    /// The file name without its extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }

    /// `_wp_attached_file`: the path below `wp-content/uploads/`, or just
    /// the file name for media hosted elsewhere.
    pub fn attached_file(&self) -> &str {
        match self.url.split_once("/uploads/") {
            Some((_, path)) => path,
            None => self.file_name(),
        }
    }

    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.stem().replace(['-', '_'], " "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

/// A menu entry linking either a page (by slug) or an arbitrary URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

impl SiteConfig {
    /// Reads a configuration file in any supported format. A relative
    /// `library` path is resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config: SiteConfig = crate::format::read_any(path)
            .chain_with(|| error!("failed to load site configuration"))?;

        if let (Some(library), Some(dir)) = (&config.library, path.parent()) {
            if library.is_relative() {
                config.library = Some(dir.join(library));
            }
        }

        Ok(config)
    }
}

/// Parses a configured date. Dates without an offset are taken as UTC.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date);
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0));

    match naive {
        Some(naive) => Ok(naive.and_utc().fixed_offset()),
        None => err! {
            "invalid date",
            "value" => value,
            "expected" => "RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`",
        },
    }
}
