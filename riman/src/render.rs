use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use wxrkit::elementor::{check, Report};
use wxrkit::error::{Chainable, Result};
use wxrkit::site::{Build, SiteConfig};
use wxrkit::util::slugify;
use wxrkit::wxr;
use wxrkit::{err, error};

use crate::ELEMENTOR_DIR;

/// Paths of everything [`write()`] wrote.
#[derive(Debug)]
pub struct Written {
    pub wxr: PathBuf,
    pub exports: Vec<PathBuf>,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).chain_with(|| error! {
        "failed to create output file",
        "path" => path.display(),
    })?;

    Ok(BufWriter::new(file))
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).chain_with(|| error! {
        "failed to create output directory",
        "path" => path.display(),
    })
}

/// Writes `<out>/<site>.xml` and, with `exports`, one Elementor template
/// export per page to `<out>/elementor/<slug>.json`.
pub fn write(build: &Build, config: &SiteConfig, out: &Path, exports: bool) -> Result<Written> {
    create_dir(out)?;

    let name = match slugify(&config.site.title) {
        slug if slug.is_empty() => "site".to_string(),
        slug => slug,
    };

    let path = out.join(format!("{name}.xml"));
    let mut writer = create(&path)?;
    wxr::write(&build.document, &mut writer)
        .and_then(|_| Ok(writer.flush()?))
        .chain_with(|| error!("failed to write WXR document", "path" => path.display()))?;

    let mut written = Written { wxr: path, exports: vec![] };
    if !exports {
        return Ok(written);
    }

    let dir = out.join(ELEMENTOR_DIR);
    create_dir(&dir)?;
    for page in &build.pages {
        let path = dir.join(format!("{}.json", page.slug));
        let mut writer = create(&path)?;
        wxrkit::serde_json::to_writer_pretty(&mut writer, &page.export())
            .map_err(wxrkit::error::Error::from)
            .and_then(|_| Ok(writer.flush()?))
            .chain_with(|| error!("failed to write template export", "path" => path.display()))?;

        written.exports.push(path);
    }

    Ok(written)
}

/// Re-reads the WXR file at `path` and checks that it holds every item of
/// the build and that each page's `_elementor_data` equals its sections.
pub fn verify(path: &Path, build: &Build, slashed: bool) -> Result<()> {
    let xml = std::fs::read_to_string(path)
        .chain_with(|| error!("failed to read written document", "path" => path.display()))?;

    let items = wxr::read(&xml)?;
    if items.len() != build.document.items.len() {
        return err! {
            "written document has the wrong number of items",
            "expected" => build.document.items.len(),
            "found" => items.len(),
        };
    }

    let by_id: FxHashMap<u32, &wxr::ParsedItem> = items.iter()
        .filter_map(|item| Some((item.post_id?, item)))
        .collect();

    for page in &build.pages {
        let item = by_id.get(&page.post_id).ok_or_else(|| error! {
            "page missing from written document",
            "page" => &page.slug,
            "post id" => page.post_id,
        })?;

        let sections = match item.elementor_data(slashed) {
            Some(sections) => sections?,
            None if page.sections.is_empty() => continue,
            None => return err!("page has no `_elementor_data`", "page" => &page.slug),
        };

        if sections != page.sections {
            return err!("`_elementor_data` differs from the built sections", "page" => &page.slug);
        }
    }

    log::debug!("verified {} items in {}", items.len(), path.display());
    Ok(())
}

#[derive(Debug, Default)]
pub struct Summary {
    pub items: usize,
    /// Items that carry `_elementor_data`.
    pub pages: usize,
    pub report: Report,
}

/// Runs the element checks on every item's `_elementor_data`.
pub fn check_file(path: &Path, slashed: bool) -> Result<Summary> {
    let xml = std::fs::read_to_string(path)
        .chain_with(|| error!("failed to read WXR file", "path" => path.display()))?;

    let items = wxr::read(&xml).chain_with(|| error!("invalid WXR file", "path" => path.display()))?;
    let mut summary = Summary { items: items.len(), ..Summary::default() };
    for item in &items {
        let Some(data) = item.elementor_data(slashed) else { continue };
        let name = match item.post_name.is_empty() {
            true => item.title.as_str(),
            false => item.post_name.as_str(),
        };

        summary.pages += 1;
        summary.report.absorb(name, check(&data?));
    }

    Ok(summary)
}
