use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::elementor::Element;
use crate::error::{Chainable, Result};

/// The semantic job a page section does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hero,
    Services,
    Team,
    Testimonials,
    Contact,
    About,
}

/// Which widget types identify a section as playing a role.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    /// Every one of these must occur.
    pub all: &'static [&'static str],
    /// At least one of these must occur, unless empty.
    pub any: &'static [&'static str],
    /// None of these may occur.
    pub none: &'static [&'static str],
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Hero, Role::Services, Role::Team,
        Role::Testimonials, Role::Contact, Role::About,
    ];

    pub fn signature(self) -> Signature {
        match self {
            Role::Team => Signature {
                all: &["cholot-team"],
                any: &[],
                none: &[],
            },
            Role::Testimonials => Signature {
                all: &[],
                any: &["cholot-testimonial-two", "cholot-testimonial", "testimonial"],
                none: &["cholot-team"],
            },
            Role::Services => Signature {
                all: &["cholot-texticon"],
                any: &[],
                none: &["cholot-team", "cholot-contact", "shortcode", "google_maps"],
            },
            Role::Contact => Signature {
                all: &[],
                any: &["cholot-contact", "shortcode", "google_maps"],
                none: &["cholot-team"],
            },
            Role::Hero => Signature {
                all: &["cholot-button"],
                any: &["cholot-title", "heading", "rdn-slider"],
                none: &["cholot-texticon", "image", "cholot-team", "cholot-contact"],
            },
            Role::About => Signature {
                all: &["image"],
                any: &["cholot-title", "heading", "text-editor"],
                none: &["cholot-team", "cholot-texticon", "cholot-contact"],
            },
        }
    }

    /// The widget whose column a builder repeats once per entry.
    pub fn repeated_widget(self) -> Option<&'static str> {
        match self {
            Role::Team => Some("cholot-team"),
            Role::Services => Some("cholot-texticon"),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Hero => "hero",
            Role::Services => "services",
            Role::Team => "team",
            Role::Testimonials => "testimonials",
            Role::Contact => "contact",
            Role::About => "about",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl Signature {
    pub fn matches(&self, types: &BTreeSet<&str>) -> bool {
        self.all.iter().all(|t| types.contains(t))
            && (self.any.is_empty() || self.any.iter().any(|t| types.contains(t)))
            && !self.none.iter().any(|t| types.contains(t))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    section: Element,
    types: BTreeSet<String>,
}

/// Sections from an existing Elementor export, indexed by the widgets they
/// contain so that builders can reuse them as templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
    entries: Vec<Entry>,
}

/// An Elementor "export template" file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateExport {
    #[serde(default = "TemplateExport::default_version")]
    pub version: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "TemplateExport::default_type")]
    pub kind: String,
    pub content: Vec<Element>,
    #[serde(default)]
    pub page_settings: serde_json::Value,
}

impl TemplateExport {
    fn default_version() -> String { "0.4".into() }

    fn default_type() -> String { "page".into() }

    pub fn page(title: impl Into<String>, content: Vec<Element>) -> Self {
        TemplateExport {
            version: Self::default_version(),
            title: title.into(),
            kind: Self::default_type(),
            content,
            page_settings: serde_json::Value::Array(vec![]),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LibraryFile {
    Export(TemplateExport),
    Sections(Vec<Element>),
}

impl Library {
    pub fn new() -> Self {
        Library::default()
    }

    pub fn from_sections<I: IntoIterator<Item = Element>>(sections: I) -> Self {
        let mut library = Library::new();
        library.extend(sections);
        library
    }

    /// Adds every top-level section in `sections`. Anything that isn't a
    /// section is ignored.
    pub fn extend<I: IntoIterator<Item = Element>>(&mut self, sections: I) {
        for section in sections.into_iter().filter(Element::is_section) {
            let types = section.widget_types().into_iter().map(String::from).collect();
            self.entries.push(Entry { section, types });
        }
    }

    /// Parses an Elementor template export or a bare `_elementor_data`
    /// section array.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: LibraryFile = serde_json::from_str(json)
            .chain_with(|| "expected an Elementor template export or a section array")?;

        Ok(match file {
            LibraryFile::Export(export) => Library::from_sections(export.content),
            LibraryFile::Sections(sections) => Library::from_sections(sections),
        })
    }

    /// Collects the `_elementor_data` of every item in a WXR document.
    pub fn from_wxr(xml: &str, slashed: bool) -> Result<Self> {
        let mut library = Library::new();
        for item in crate::wxr::read(xml)? {
            match item.elementor_data(slashed) {
                Some(Ok(sections)) => library.extend(sections),
                Some(Err(e)) => log::warn!("skipping `{}` elementor data: {}", item.title, e.message()),
                None => {}
            }
        }

        Ok(library)
    }

    /// Loads a library from a `.json` export or a `.xml` WXR file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to read template library",
            "path" => path.display(),
        })?;

        let library = match path.extension().and_then(|e| e.to_str()) {
            Some("xml") => Library::from_wxr(&contents, true),
            _ => Library::from_json(&contents),
        };

        let library = library.chain_with(|| error! {
            "invalid template library",
            "path" => path.display(),
        })?;

        log::debug!("loaded {} template sections from {}", library.len(), path.display());
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Element> {
        self.entries.iter().map(|e| &e.section)
    }

    /// The first section, in document order, whose widgets match `role`.
    pub fn find(&self, role: Role) -> Option<&Element> {
        let signature = role.signature();
        self.entries.iter()
            .find(|e| signature.matches(&e.types.iter().map(|s| s.as_str()).collect()))
            .map(|e| &e.section)
    }

    /// The first section that contains every one of `types`.
    pub fn find_containing(&self, types: &[&str]) -> Option<&Element> {
        self.entries.iter()
            .find(|e| types.iter().all(|t| e.types.contains(*t)))
            .map(|e| &e.section)
    }

    /// The role of each section, as far as one is recognized.
    pub fn classify(&self) -> Vec<(Option<Role>, &Element)> {
        self.entries.iter()
            .map(|e| {
                let types = e.types.iter().map(|s| s.as_str()).collect();
                let role = Role::ALL.into_iter().find(|r| r.signature().matches(&types));
                (role, &e.section)
            })
            .collect()
    }
}
