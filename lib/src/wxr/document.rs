use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const WXR_VERSION: &str = "1.2";

/// Namespace prefixes and URIs declared on the `<rss>` element.
pub const NAMESPACES: &[(&str, &str)] = &[
    ("excerpt", "http://wordpress.org/export/1.2/excerpt/"),
    ("content", "http://purl.org/rss/1.0/modules/content/"),
    ("wfw", "http://wellformedweb.org/CommentAPI/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("wp", "http://wordpress.org/export/1.2/"),
];

/// A complete WordPress eXtended RSS export.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub channel: Channel,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub pub_date: DateTime<FixedOffset>,
    pub base_site_url: String,
    pub base_blog_url: String,
    pub authors: Vec<Author>,
    pub categories: Vec<Category>,
    pub terms: Vec<Term>,
    pub generator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default = "Author::default_id")]
    pub id: u32,
    pub login: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Author {
    fn default_id() -> u32 { 1 }
}

impl Default for Author {
    fn default() -> Self {
        Author {
            id: 1,
            login: "admin".into(),
            email: String::new(),
            display_name: "admin".into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

/// A post category (`<wp:category>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub term_id: u32,
    pub nicename: String,
    pub parent: String,
    pub name: String,
}

/// A taxonomy term other than a category, such as a `nav_menu`.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub term_id: u32,
    pub taxonomy: String,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    Page,
    Post,
    Attachment,
    NavMenuItem,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Page => "page",
            PostType::Post => "post",
            PostType::Attachment => "attachment",
            PostType::NavMenuItem => "nav_menu_item",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page" => Some(PostType::Page),
            "post" => Some(PostType::Post),
            "attachment" => Some(PostType::Attachment),
            "nav_menu_item" => Some(PostType::NavMenuItem),
            _ => None,
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Publish,
    Draft,
    Private,
    Inherit,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Publish => "publish",
            Status::Draft => "draft",
            Status::Private => "private",
            Status::Inherit => "inherit",
        }
    }
}

/// A `<category domain=".." nicename="..">` reference on an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCategory {
    pub domain: String,
    pub nicename: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostMeta {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<FixedOffset>,
    pub creator: String,
    pub guid: String,
    pub description: String,
    pub content: String,
    pub excerpt: String,
    pub post_id: u32,
    pub post_name: String,
    pub status: Status,
    pub parent: u32,
    pub menu_order: i32,
    pub post_type: PostType,
    pub comment_status: &'static str,
    pub attachment_url: Option<String>,
    pub categories: Vec<ItemCategory>,
    pub meta: Vec<PostMeta>,
}

impl Item {
    /// An item with the defaults every post type shares.
    pub fn new(post_type: PostType, post_id: u32, title: impl Into<String>, pub_date: DateTime<FixedOffset>) -> Self {
        Item {
            title: title.into(),
            link: String::new(),
            pub_date,
            creator: "admin".into(),
            guid: String::new(),
            description: String::new(),
            content: String::new(),
            excerpt: String::new(),
            post_id,
            post_name: String::new(),
            status: Status::Publish,
            parent: 0,
            menu_order: 0,
            post_type,
            comment_status: "closed",
            attachment_url: None,
            categories: vec![],
            meta: vec![],
        }
    }

    pub fn push_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.push(PostMeta { key: key.into(), value: value.into() });
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.iter().find(|m| m.key == key).map(|m| m.value.as_str())
    }
}

impl Document {
    pub fn items_of(&self, post_type: PostType) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| i.post_type == post_type)
    }

    pub fn item(&self, post_id: u32) -> Option<&Item> {
        self.items.iter().find(|i| i.post_id == post_id)
    }
}
