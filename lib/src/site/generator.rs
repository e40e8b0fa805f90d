use chrono::{DateTime, FixedOffset};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde_json::json;

use crate::elementor::{check, Element, IdGen, Library, Report, TemplateExport};
use crate::error::{Chainable, Result};
use crate::sections::{build_section, paragraphs, Context, Media, SectionSpec};
use crate::site::{parse_date, Menu, MenuItem, MediaSpec, SiteConfig};
use crate::templating::Engine;
use crate::util::slugify;
use crate::wxr::{self, Category, Channel, Document, Item, ItemCategory, PostType, Status, Term};

/// Assembles a WXR document from a [`SiteConfig`].
#[derive(Debug)]
pub struct Generator {
    config: SiteConfig,
    library: Library,
    engine: Engine,
}

/// The result of [`Generator::build()`].
#[derive(Debug, Clone)]
pub struct Build {
    pub document: Document,
    /// Every page and post with an Elementor tree, in configuration order.
    pub pages: Vec<BuiltPage>,
    /// Check issues of all built trees, paths prefixed with the page slug.
    pub report: Report,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPage {
    pub post_id: u32,
    pub post_type: PostType,
    pub slug: String,
    pub title: String,
    pub sections: Vec<Element>,
}

impl BuiltPage {
    /// The page as a standalone Elementor template export.
    pub fn export(&self) -> TemplateExport {
        TemplateExport::page(&self.title, self.sections.clone())
    }
}

/// One page or post to build.
struct Job<'a> {
    index: usize,
    post_id: u32,
    post_type: PostType,
    slug: String,
    title: &'a str,
    sections: &'a [SectionSpec],
}

/// Sequential WordPress post ids.
struct PostIds(u32);

impl PostIds {
    fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

struct PageRef<'a> {
    id: u32,
    title: &'a str,
    parent: Option<&'a str>,
}

impl Generator {
    pub fn new(config: SiteConfig, library: Library, engine: Engine) -> Self {
        Generator { config, library, engine }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn build(&self) -> Result<Build> {
        let config = &self.config;
        let date = match &config.site.date {
            Some(date) => parse_date(date).chain_with(|| error!("invalid `site.date`"))?,
            None => chrono::Local::now().fixed_offset(),
        };

        let mut ids = PostIds(config.options.first_post_id);
        let mut items = vec![];

        let mut media = Media::new();
        for spec in &config.media {
            let id = ids.next();
            if media.id(&spec.url).is_some() {
                log::warn!("media `{}` is listed twice", spec.url);
            }

            media.insert(&spec.url, id);
            items.push(self.attachment(spec, id, date));
        }

        let mut pages: FxHashMap<String, PageRef<'_>> = FxHashMap::default();
        let mut jobs = vec![];
        for (index, page) in config.pages.iter().enumerate() {
            let slug = page.slug();
            let id = ids.next();
            let page_ref = PageRef { id, title: &page.title, parent: page.parent.as_deref() };
            if pages.insert(slug.clone(), page_ref).is_some() {
                return err!("duplicate page slug", "slug" => slug);
            }

            jobs.push(Job {
                index,
                post_id: id,
                post_type: PostType::Page,
                slug,
                title: &page.title,
                sections: &page.sections,
            });
        }

        for (i, post) in config.posts.iter().enumerate() {
            jobs.push(Job {
                index: config.pages.len() + i,
                post_id: ids.next(),
                post_type: PostType::Post,
                slug: post.slug(),
                title: &post.title,
                sections: &post.sections,
            });
        }

        for (slug, page) in &pages {
            if let Some(parent) = page.parent {
                if !pages.contains_key(parent) {
                    return err!("unknown parent page", "page" => slug, "parent" => parent);
                }
            }
        }

        let built: Vec<BuiltPage> = jobs.par_iter()
            .map(|job| self.build_page(job, &media))
            .collect::<Result<_>>()?;

        let mut report = Report::default();
        for page in &built {
            let issues = check(&page.sections);
            for issue in &issues.issues {
                log::warn!("{}: {issue}", page.slug);
            }

            report.absorb(&page.slug, issues);
        }

        let (page_built, post_built) = built.split_at(config.pages.len());
        for (page, built) in config.pages.iter().zip(page_built) {
            let mut item = Item::new(PostType::Page, built.post_id, &page.title, date);
            item.link = format!("{}/{}/", config.site.base_url(), page_path(&built.slug, &pages)?);
            item.guid = format!("{}/?page_id={}", config.site.base_url(), built.post_id);
            item.post_name = built.slug.clone();
            item.status = page.status;
            item.menu_order = page.menu_order;
            item.excerpt = page.excerpt.clone().unwrap_or_default();
            item.parent = page.parent.as_deref()
                .and_then(|parent| pages.get(parent))
                .map_or(0, |parent| parent.id);

            let template = page.template.as_deref().unwrap_or(&config.options.page_template);
            self.elementor_meta(&mut item, &built.sections, "wp-page", template)?;
            items.push(item);
        }

        let categories = self.categories()?;
        for (post, built) in config.posts.iter().zip(post_built) {
            let mut item = Item::new(PostType::Post, built.post_id, &post.title, date);
            if let Some(date) = &post.date {
                item.pub_date = parse_date(date).chain_with(|| error! {
                    "invalid post date",
                    "post" => &built.slug,
                })?;
            }

            item.link = format!("{}/{}/", config.site.base_url(), built.slug);
            item.guid = format!("{}/?p={}", config.site.base_url(), built.post_id);
            item.post_name = built.slug.clone();
            item.status = post.status;
            item.comment_status = "open";
            item.excerpt = post.excerpt.clone().unwrap_or_default();
            item.content = post.content.as_deref().map(paragraphs).unwrap_or_default();
            for name in &post.categories {
                let category = categories.iter()
                    .find(|c| c.nicename == *name || c.name == *name)
                    .ok_or_else(|| error! {
                        "unknown category",
                        "post" => &built.slug,
                        "category" => name,
                    })?;

                item.categories.push(ItemCategory {
                    domain: "category".into(),
                    nicename: category.nicename.clone(),
                    name: category.name.clone(),
                });
            }

            if !built.sections.is_empty() {
                self.elementor_meta(&mut item, &built.sections, "wp-post", "default")?;
            }

            items.push(item);
        }

        let mut terms = vec![];
        let mut term_id = categories.len() as u32;
        for menu in &config.menus {
            term_id += 1;
            terms.push(Term {
                term_id,
                taxonomy: "nav_menu".into(),
                slug: menu.slug(),
                name: menu.name.clone(),
            });

            let mut order = 0;
            self.menu_items(menu, &menu.items, 0, &pages, &mut ids, &mut order, date, &mut items)?;
        }

        let channel = Channel {
            title: config.site.title.clone(),
            link: config.site.base_url().to_string(),
            description: config.site.description.clone(),
            language: config.site.language.clone(),
            pub_date: date,
            base_site_url: config.site.base_url().to_string(),
            base_blog_url: config.site.base_url().to_string(),
            authors: vec![config.author.clone()],
            categories,
            terms,
            generator: format!("wxrkit/{}", env!("CARGO_PKG_VERSION")),
        };

        log::info!("assembled {} items, post ids {}..{}", items.len(), config.options.first_post_id, ids.0);
        Ok(Build { document: Document { channel, items }, pages: built, report })
    }

    fn build_page(&self, job: &Job<'_>, media: &Media) -> Result<BuiltPage> {
        let seed = self.config.options.seed
            .map(|seed| seed ^ (job.index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));

        let mut ids = IdGen::new(seed);
        let mut ctx = Context { library: &self.library, ids: &mut ids, media };
        let mut sections: Vec<Element> = job.sections.iter()
            .map(|spec| build_section(spec, &mut ctx))
            .collect();

        let template_ctx = json!({
            "site": self.config.site,
            "page": {
                "id": job.post_id,
                "title": job.title,
                "slug": job.slug,
                "type": job.post_type.as_str(),
            },
            "globals": self.config.globals,
        });

        let rendered = self.engine.render_tree(&job.slug, &mut sections, &template_ctx)?;
        let elements: usize = sections.iter().map(Element::count).sum();
        log::info!("built {} `{}`: {} sections, {} elements", job.post_type, job.slug, sections.len(), elements);
        log::debug!("rendered {rendered} placeholders in `{}`", job.slug);

        Ok(BuiltPage {
            post_id: job.post_id,
            post_type: job.post_type,
            slug: job.slug.clone(),
            title: job.title.to_string(),
            sections,
        })
    }

    fn elementor_meta(&self, item: &mut Item, sections: &[Element], kind: &str, template: &str) -> Result<()> {
        let options = &self.config.options;
        let json = serde_json::to_string(sections)
            .chain_with(|| error!("failed to serialize elementor data", "post" => &item.post_name))?;

        item.push_meta("_elementor_edit_mode", "builder");
        item.push_meta("_elementor_template_type", kind);
        item.push_meta("_elementor_version", &options.elementor_version);
        item.push_meta("_wp_page_template", template);
        item.push_meta("_elementor_data", match options.slash_meta {
            true => wxr::slash(&json),
            false => json,
        });

        Ok(())
    }

    fn attachment(&self, spec: &MediaSpec, id: u32, date: DateTime<FixedOffset>) -> Item {
        let title = spec.title();
        let mut item = Item::new(PostType::Attachment, id, &title, date);
        item.post_name = slugify(&title);
        item.status = Status::Inherit;
        item.link = spec.url.clone();
        item.guid = spec.url.clone();
        item.attachment_url = Some(spec.url.clone());
        item.push_meta("_wp_attached_file", spec.attached_file());
        item.push_meta("_wp_attachment_image_alt", spec.alt.clone().unwrap_or_default());
        item
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let categories: Vec<Category> = self.config.categories.iter()
            .enumerate()
            .map(|(i, spec)| Category {
                term_id: i as u32 + 1,
                nicename: spec.slug(),
                parent: spec.parent.clone().unwrap_or_default(),
                name: spec.name.clone(),
            })
            .collect();

        for category in &categories {
            if !category.parent.is_empty() && !categories.iter().any(|c| c.nicename == category.parent) {
                return err! {
                    "unknown parent category",
                    "category" => &category.nicename,
                    "parent" => &category.parent,
                };
            }
        }

        Ok(categories)
    }

    #[allow(clippy::too_many_arguments)]
    fn menu_items(
        &self,
        menu: &Menu,
        entries: &[MenuItem],
        parent: u32,
        pages: &FxHashMap<String, PageRef<'_>>,
        ids: &mut PostIds,
        order: &mut i32,
        date: DateTime<FixedOffset>,
        out: &mut Vec<Item>,
    ) -> Result<()> {
        let base = self.config.site.base_url();
        for entry in entries {
            let id = ids.next();
            *order += 1;

            let (kind, object, object_id, url, title) = match (&entry.page, &entry.url) {
                (Some(slug), None) => {
                    let page = pages.get(slug).ok_or_else(|| error! {
                        "menu item links an unknown page",
                        "menu" => &menu.name,
                        "page" => slug,
                    })?;

                    let title = entry.title.as_deref().unwrap_or(page.title);
                    ("post_type", "page", page.id, "", title)
                }
                (None, Some(url)) => {
                    let title = entry.title.as_deref().unwrap_or(url);
                    ("custom", "custom", id, url.as_str(), title)
                }
                _ => return err! {
                    "menu item needs exactly one of `page` or `url`",
                    "menu" => &menu.name,
                    "title" => entry.title.as_deref().unwrap_or("(untitled)"),
                },
            };

            let mut item = Item::new(PostType::NavMenuItem, id, title, date);
            item.post_name = id.to_string();
            item.menu_order = *order;
            item.link = format!("{base}/?p={id}");
            item.guid = item.link.clone();
            item.categories.push(ItemCategory {
                domain: "nav_menu".into(),
                nicename: menu.slug(),
                name: menu.name.clone(),
            });

            item.push_meta("_menu_item_type", kind);
            item.push_meta("_menu_item_menu_item_parent", parent.to_string());
            item.push_meta("_menu_item_object_id", object_id.to_string());
            item.push_meta("_menu_item_object", object);
            item.push_meta("_menu_item_target", "");
            item.push_meta("_menu_item_classes", r#"a:1:{i:0;s:0:"";}"#);
            item.push_meta("_menu_item_xfn", "");
            item.push_meta("_menu_item_url", url);
            out.push(item);

            self.menu_items(menu, &entry.children, id, pages, ids, order, date, out)?;
        }

        Ok(())
    }
}

/// `a/b/slug` for a page whose parents are `a` and `b`.
fn page_path(slug: &str, pages: &FxHashMap<String, PageRef<'_>>) -> Result<String> {
    let mut parts = vec![slug];
    let mut current = pages.get(slug).and_then(|p| p.parent);
    while let Some(parent) = current {
        if parts.len() > pages.len() {
            return err!("page parents form a cycle", "page" => slug);
        }

        parts.push(parent);
        current = pages.get(parent).and_then(|p| p.parent);
    }

    parts.reverse();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> SiteConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    const SITE: &str = r#"
        site: { title: RIMAN GmbH, url: "https://riman.test/", date: "2024-03-01" }
        globals: { phone: "+49 2241 12345" }
        options: { seed: 42 }
        media:
          - url: https://riman.test/wp-content/uploads/hero.jpg
            alt: Sanierung
        categories:
          - name: Neuigkeiten
          - name: Asbest
            parent: neuigkeiten
        pages:
          - title: Startseite
            slug: home
            sections:
              - kind: hero
                title: "{{ site.title }}"
                background: https://riman.test/wp-content/uploads/hero.jpg
                button: { text: "Anrufen", url: "{{ globals.phone | tel }}" }
          - title: Leistungen
            sections:
              - kind: text
                text: Unsere Leistungen.
          - title: Asbestsanierung
            parent: leistungen
        posts:
          - title: Neue Zertifizierung
            categories: [Asbest]
            content: Wir sind jetzt zertifiziert.
        menus:
          - name: Hauptmenü
            items:
              - page: home
              - page: leistungen
                children:
                  - page: asbestsanierung
              - url: https://riman.test/kontakt/
                title: Kontakt
    "#;

    fn build(yaml: &str) -> Result<Build> {
        Generator::new(config(yaml), Library::new(), Engine::new()).build()
    }

    #[test]
    fn assigns_ids_in_order() {
        let build = build(SITE).unwrap();
        let document = &build.document;
        let ids: Vec<(PostType, u32)> = document.items.iter().map(|i| (i.post_type, i.post_id)).collect();
        assert_eq!(ids, [
            (PostType::Attachment, 100),
            (PostType::Page, 101),
            (PostType::Page, 102),
            (PostType::Page, 103),
            (PostType::Post, 104),
            (PostType::NavMenuItem, 105),
            (PostType::NavMenuItem, 106),
            (PostType::NavMenuItem, 107),
            (PostType::NavMenuItem, 108),
        ]);

        let child = document.item(103).unwrap();
        assert_eq!(child.parent, 102);
        assert_eq!(child.link, "https://riman.test/leistungen/asbestsanierung/");
        assert_eq!(document.channel.terms[0].term_id, 3);
    }

    #[test]
    fn pages_carry_elementor_meta() {
        let build = build(SITE).unwrap();
        let home = build.document.item(101).unwrap();
        assert_eq!(home.meta("_elementor_edit_mode"), Some("builder"));
        assert_eq!(home.meta("_elementor_template_type"), Some("wp-page"));
        assert_eq!(home.meta("_elementor_version"), Some("3.18.3"));
        assert_eq!(home.meta("_wp_page_template"), Some("elementor_header_footer"));

        let data = wxr::unslash(home.meta("_elementor_data").unwrap());
        let sections: Vec<Element> = serde_json::from_str(&data).unwrap();
        assert_eq!(sections, build.pages[0].sections);

        let hero = serde_json::to_value(&sections).unwrap();
        let text = hero.to_string();
        assert!(text.contains("RIMAN GmbH"));
        assert!(text.contains("tel:+49224112345"));
        assert!(text.contains(r#""id":100"#), "hero background links the attachment");
        assert!(build.report.is_clean(), "{:?}", build.report);
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let a = build(SITE).unwrap();
        let b = build(SITE).unwrap();
        assert_eq!(a.pages, b.pages);
        assert_eq!(wxr::to_string(&a.document).unwrap(), wxr::to_string(&b.document).unwrap());
    }

    #[test]
    fn menus_posts_and_media() {
        let build = build(SITE).unwrap();
        let document = &build.document;

        let media = document.item(100).unwrap();
        assert_eq!(media.status, Status::Inherit);
        assert_eq!(media.meta("_wp_attached_file"), Some("hero.jpg"));
        assert_eq!(media.meta("_wp_attachment_image_alt"), Some("Sanierung"));

        let post = document.item(104).unwrap();
        assert_eq!(post.categories[0].nicename, "asbest");
        assert_eq!(post.content, "<p>Wir sind jetzt zertifiziert.</p>");
        assert!(post.meta("_elementor_data").is_none());

        let child = document.item(107).unwrap();
        assert_eq!(child.meta("_menu_item_menu_item_parent"), Some("106"));
        assert_eq!(child.meta("_menu_item_object_id"), Some("103"));
        assert_eq!(child.categories[0].nicename, "hauptmenu");

        let custom = document.item(108).unwrap();
        assert_eq!(custom.meta("_menu_item_type"), Some("custom"));
        assert_eq!(custom.meta("_menu_item_url"), Some("https://riman.test/kontakt/"));
        assert_eq!(custom.menu_order, 4);
    }

    #[test]
    fn dangling_references_are_errors() {
        let site = "site: { title: R, url: 'https://r.test' }\n";
        let error = build(&format!("{site}pages: [{{ title: A, parent: nope }}]")).unwrap_err();
        assert!(error.mentions("unknown parent page"));

        let error = build(&format!("{site}menus: [{{ name: M, items: [{{ page: nope }}] }}]")).unwrap_err();
        assert!(error.mentions("unknown page"));

        let error = build(&format!("{site}posts: [{{ title: P, categories: [nope] }}]")).unwrap_err();
        assert!(error.mentions("unknown category"));

        let error = build(&format!("{site}pages: [{{ title: A }}, {{ title: A }}]")).unwrap_err();
        assert!(error.mentions("duplicate page slug"));
    }

    #[test]
    fn placeholder_errors_name_the_page() {
        let error = build(r#"
            site: { title: R, url: "https://r.test" }
            pages:
              - title: Kontakt
                sections: [{ kind: text, text: "{{ globals.fax }}" }]
        "#).unwrap_err();

        assert!(error.mentions("kontakt"));
    }

    #[test]
    fn substituted_text_is_escaped() {
        let build = build(r#"
            site: { title: R, url: "https://r.test" }
            globals: { company: "Müller & Söhne", phone: "02241 12345" }
            pages:
              - title: Impressum
                sections: [{ kind: text, text: "{{ globals.company }}\nTelefon: {{ globals[\"phone\"] }}" }]
        "#).unwrap();

        let mut editors = vec![];
        build.pages[0].sections[0].walk(&mut |e| if e.widget_type() == Some("text-editor") {
            editors.push(e.settings()["editor"].clone());
        });

        assert_eq!(editors, ["<p>Müller &amp; Söhne<br>Telefon: 02241 12345</p>"]);
    }

    #[test]
    fn exports_standalone_templates() {
        let build = build(SITE).unwrap();
        let export = serde_json::to_value(build.pages[1].export()).unwrap();
        assert_eq!(export["version"], "0.4");
        assert_eq!(export["type"], "page");
        assert_eq!(export["title"], "Leistungen");
        assert_eq!(export["page_settings"], json!([]));
        assert_eq!(export["content"].as_array().map(Vec::len), Some(1));
    }
}
