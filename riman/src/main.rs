use std::process::ExitCode;

use wxrkit::err;
use wxrkit::error::Result;
use wxrkit::site::Generator;
use wxrkit::templating::Engine;

use crate::config::Project;

mod config;
mod discover;
mod render;

/// Site configuration file names, in order of preference.
pub const SITE_FILES: &[&str] = &["site.yaml", "site.yml", "site.toml", "site.json"];
pub const PAGES_DIR: &str = "pages";
pub const LIBRARY_DIR: &str = "library";
pub const OUT_DIR: &str = "out";
pub const ELEMENTOR_DIR: &str = "elementor";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Generates WordPress (WXR) imports of Elementor sites.
        cmd riman {
            /// Log more; repeat for even more.
            repeated -v, --verbose
            /// Only log errors.
            optional -q, --quiet

            /// Builds the WXR import of a project directory.
            cmd build {
                /// Directory holding `site.yaml`, `pages/` and `library/`.
                required project: PathBuf
                /// Output directory, `<project>/out` by default.
                optional -o, --out out: PathBuf
                /// Seed for reproducible element ids.
                optional --seed seed: u64
                /// Also write one Elementor template export per page.
                optional --json
                /// Re-read the written file and compare it with the build.
                optional --verify
                /// Fail if the element checks find errors.
                optional --strict
            }

            /// Checks the Elementor data of every item in a WXR file.
            cmd check {
                required file: PathBuf
                /// The `_elementor_data` values were written without slashes.
                optional --unslashed
            }
        }
    }
}

fn init_logging(verbose: u32, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_env("RUST_LOG")
        .init();
}

fn build(cmd: flags::Build) -> Result<()> {
    let project = Project::discover(&cmd.project)?;
    let library = project.library()?;
    let out = cmd.out.unwrap_or_else(|| project.root.join(OUT_DIR));

    let mut config = project.config;
    if let Some(seed) = cmd.seed {
        config.options.seed = Some(seed);
    }

    let generator = Generator::new(config, library, Engine::new());
    let build = generator.build()?;
    let written = render::write(&build, generator.config(), &out, cmd.json)?;
    println!("wrote {} ({} items)", written.wxr.display(), build.document.items.len());
    for path in &written.exports {
        log::debug!("wrote {}", path.display());
    }

    if cmd.verify {
        render::verify(&written.wxr, &build, generator.config().options.slash_meta)?;
        println!("verified {} pages", build.pages.len());
    }

    let errors = build.report.errors().count();
    let warnings = build.report.warnings().count();
    println!("checks: {errors} errors, {warnings} warnings");
    if cmd.strict && errors > 0 {
        return err!("element checks failed", "errors" => errors);
    }

    Ok(())
}

fn check(cmd: flags::Check) -> Result<()> {
    let summary = render::check_file(&cmd.file, !cmd.unslashed)?;
    for issue in &summary.report.issues {
        println!("{issue}");
    }

    let errors = summary.report.errors().count();
    println!(
        "{}: {} items, {} with elementor data, {} errors, {} warnings",
        cmd.file.display(), summary.items, summary.pages, errors, summary.report.warnings().count(),
    );

    if errors > 0 {
        return err!("element checks failed", "file" => cmd.file.display(), "errors" => errors);
    }

    Ok(())
}

pub fn main() -> ExitCode {
    let flags = flags::Riman::from_env_or_exit();
    init_logging(flags.verbose, flags.quiet);

    let result = match flags.subcommand {
        flags::RimanCmd::Build(cmd) => build(cmd),
        flags::RimanCmd::Check(cmd) => check(cmd),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
