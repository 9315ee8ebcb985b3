//! Regex patterns for Ginkgo test declarations.

use regex::Regex;

/// `k8stest.InitTesting(t, "Basic volume IO tests", "basic_volume_io")`
pub const INIT_TESTING_PATTERN: &str =
    r#"^\s*(k8stest|e2e_ginkgo).InitTesting\((?P<t>.*)\s*,\s*"(?P<classname>.*)"\s*,\s*(?P<reportname>.*)\s*\)"#;

/// `ginkgo.RunSpecsWithDefaultAndCustomReporters(t, "CSI E2E Suite", rep.GetReporters("csi"))`
pub const RUN_SPECS_PATTERN: &str =
    r#"^\s*ginkgo.RunSpecsWithDefaultAndCustomReporters\s*\(\s*\w\s*,\s*"(?P<classname>.*)"\s*,"#;

/// `var _ = Describe("Volume IO test", func() {`
pub const DESCRIBE_PATTERN: &str =
    r#"^.*=(\s*|\s*ginkgo\.)Describe\s*\(\s*"(?P<desc>.*)"\s*,\s*func\s*\(\s*\)\s*\{"#;

/// `It("should verify a volume can process IO", func() {`
pub const IT_PATTERN: &str = r#"^(\s*|\s*ginkgo\.)It\s*\(\s*"(?P<it>.*)"\s*,\s*func\s*\(\s*\)\s*\{"#;

/// Any `It` clause, including ones whose description is built at runtime:
/// `ginkgo.It(fmt.Sprintf("should delete PV with reclaimPolicy %q", policy), func() {`
pub const IT_ANY_PATTERN: &str = r#"^(\s*|\s*ginkgo\.)It\s*\(\s*(?P<it>.*),\s*func\s*\(\s*\)\s*\{"#;

/// Line comment, up to end of line.
pub const LINE_COMMENT_PATTERN: &str = r"//.*";

pub const BLOCK_COMMENT_OPEN: &str = "/*";
pub const BLOCK_COMMENT_CLOSE: &str = "*/";

/// Compiled declaration patterns, built once per scrape.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub init_testing: Regex,
    pub run_specs: Regex,
    pub describe: Regex,
    pub it: Regex,
    pub it_any: Regex,
    pub line_comment: Regex,
}

impl Patterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            init_testing: Regex::new(INIT_TESTING_PATTERN)?,
            run_specs: Regex::new(RUN_SPECS_PATTERN)?,
            describe: Regex::new(DESCRIBE_PATTERN)?,
            it: Regex::new(IT_PATTERN)?,
            it_any: Regex::new(IT_ANY_PATTERN)?,
            line_comment: Regex::new(LINE_COMMENT_PATTERN)?,
        })
    }
}
