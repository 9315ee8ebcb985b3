use std::path::Path;

use color_eyre::eyre::{bail, Result};
use testlists_core::{
    plan_runs, resolve_lists, Config, Diagnostics, ListDefinition, ListOptions, PlanLoader,
    ResolvedLists, Scraper,
};

fn report_warnings(diagnostics: &Diagnostics) {
    let count = diagnostics.warning_count();
    if count > 0 {
        eprintln!("{count} warning(s) while building the test inventory");
    }
}

fn resolve(config: &Config) -> Result<ResolvedLists> {
    let resolved = resolve_lists(config)?;
    report_warnings(&resolved.diagnostics);
    Ok(resolved)
}

pub fn get(
    config: &Config,
    profile: &str,
    options: &ListOptions,
    sort_by_duration: bool,
    output: Option<&Path>,
) -> Result<()> {
    // Reject bad flag combinations before any scraping.
    options.validate()?;

    let resolved = resolve(config)?;
    let tests = options.decorate(resolved.get(profile, sort_by_duration)?)?;
    let text = options.render(&tests)?;

    match output {
        Some(path) => testlists_core::output::write_output(path, &text)?,
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

pub fn profiles(config: &Config) -> Result<()> {
    let resolved = resolve(config)?;
    for name in resolved.profile_names() {
        println!("{name}");
    }
    Ok(())
}

pub fn scrape(config: &Config, json: bool) -> Result<()> {
    let scraper = Scraper::with_config(&config.scraper)?;
    let inventory = scraper.scrape(&config.paths.scrape_root_paths())?;
    let sources = inventory.source_map();

    if json {
        println!("{}", serde_json::to_string_pretty(&sources)?);
    } else {
        for (key, file) in &sources {
            println!("{key}\t{}", file.display());
        }
    }

    tracing::info!(definitions = sources.len(), "scrape finished");
    report_warnings(&inventory.diagnostics);
    Ok(())
}

pub fn plan(config: &Config, name: &str) -> Result<()> {
    let loader = PlanLoader::new(config.paths.plans_path());
    for (testcase, _) in loader.testcases_from_plan(name)? {
        println!("{testcase}");
    }
    Ok(())
}

pub fn install_tag(
    config: &Config,
    profile: Option<&str>,
    tests: Option<&str>,
    testplan: Option<&str>,
    installtag: Option<&str>,
) -> Result<()> {
    let (tests, overrides) = match (profile, tests) {
        (Some(profile), None) => {
            let resolved = resolve(config)?;
            let options = ListOptions {
                install: true,
                uninstall: true,
                ..ListOptions::default()
            };
            let tests = options.decorate(resolved.get(profile, false)?)?;
            (tests, resolved.install_tag_override)
        }
        (None, Some(tests)) => {
            // Only the metadata is needed, so skip resolution and scraping.
            let definition = ListDefinition::from_file(config.paths.lists_path())?;
            let tests = tests.split_whitespace().map(str::to_string).collect();
            (tests, definition.metadata.install_tag_override.tests)
        }
        (Some(_), Some(_)) => bail!("--profile and --tests cannot be used together"),
        (None, None) => bail!("one of --profile or --tests is required"),
    };

    let loaded = match testplan {
        Some(name) => Some((name, PlanLoader::new(config.paths.plans_path()).load(name)?)),
        None => None,
    };
    let runs = plan_runs(
        tests,
        &overrides,
        installtag,
        loaded.as_ref().map(|(name, plan)| (*name, plan)),
    )?;

    println!("{}", serde_json::to_string_pretty(&runs)?);
    Ok(())
}
