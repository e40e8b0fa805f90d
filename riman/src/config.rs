use std::path::{Path, PathBuf};

use serde::Deserialize;

use wxrkit::elementor::Library;
use wxrkit::error::{Chainable, Result};
use wxrkit::site::{Page, SiteConfig};
use wxrkit::{err, error};

use crate::discover::{files_with, library_file};
use crate::{LIBRARY_DIR, PAGES_DIR, SITE_FILES};

/// A project directory with its configuration fully assembled.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub site_file: PathBuf,
    pub config: SiteConfig,
}

/// A file under `pages/`: one page, or several under `pages:`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageFile {
    Many { pages: Vec<Page> },
    One(Box<Page>),
}

impl Project {
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return err!("project directory does not exist", "path" => root.display());
        }

        let site_file = SITE_FILES.iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| error! {
                "project has no site configuration",
                "project" => root.display(),
                "expected one of" => SITE_FILES.join(", "),
            })?;

        let mut config = SiteConfig::load(&site_file)?;
        for path in files_with(&root.join(PAGES_DIR), wxrkit::format::EXTENSIONS) {
            let file: PageFile = wxrkit::format::read_any(&path)
                .chain_with(|| error!("invalid page file", "path" => path.display()))?;

            match file {
                PageFile::Many { pages } => config.pages.extend(pages),
                PageFile::One(page) => config.pages.push(*page),
            }
        }

        if config.library.is_none() {
            config.library = library_file(&root.join(LIBRARY_DIR));
        }

        log::debug!(
            "discovered {} pages, {} posts in {}; library: {}",
            config.pages.len(), config.posts.len(), root.display(),
            config.library.as_deref().map_or("none".into(), |p| p.display().to_string()),
        );

        Ok(Project { root: root.to_path_buf(), site_file, config })
    }

    /// The template library, or an empty one when the project has none.
    pub fn library(&self) -> Result<Library> {
        match &self.config.library {
            Some(path) => Library::load(path),
            None => Ok(Library::new()),
        }
    }
}
