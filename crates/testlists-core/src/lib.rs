pub mod config;
pub mod diagnostics;
pub mod lists;
pub mod output;
pub mod plan;
pub mod scraper;
pub mod upgrade;

mod yaml;

pub use config::{Config, ConfigError, OutputConfig, PathsConfig, ResolutionConfig, ScraperConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Severity, SourceLocation};
pub use lists::{resolve_lists, Grouping, ListDefinition, ListError, ResolvedLists, Resolver};
pub use output::{ListOptions, OutputError, OutputFormat};
pub use plan::{LoadedPlan, PlanError, PlanLoader, Testcase};
pub use scraper::{Inventory, ScrapeError, Scraper, TestDefinition};
pub use upgrade::{plan_runs, RunPlan, UpgradeError};
