use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use testlists_core::{
    resolve_lists, Config, Diagnostic, ListDefinition, ListError, PathsConfig, PlanLoader,
    Resolver, Scraper,
};

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn suite(classname: &str, describe: &str, cases: &[&str]) -> String {
    let mut src = format!(
        "package e2e\n\nfunc TestSuite(t *testing.T) {{\n\te2e_ginkgo.InitTesting(t, \"{classname}\", \"{classname}\")\n}}\n\nvar _ = Describe(\"{describe}\", func() {{\n"
    );
    for case in cases {
        src.push_str(&format!("\tIt(\"{case}\", func() {{\n\t}})\n"));
    }
    src.push_str("})\n");
    src
}

/// An e2e tree with two test groups, `volume_io` and `pool_io`, and a few plans.
fn e2e_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        &root.join("src/volume_io/ext4/ext4_test.go"),
        &suite("volume_io_ext4", "Volume IO", &["should verify ext4"]),
    );
    write(
        &root.join("src/volume_io/xfs/xfs_test.go"),
        &suite("volume_io_xfs", "Volume IO", &["should verify xfs"]),
    );
    write(
        &root.join("src/pool_io/basic/basic_test.go"),
        &suite("pool_io", "Pool IO", &["should fill a pool"]),
    );

    write(
        &root.join("testplans/nightly.yaml"),
        r#"
testcases:
  ext4:
    testcase: "volume_io_ext4.Volume IO should verify ext4"
  xfs:
    testcase: "volume_io_xfs.Volume IO should verify xfs"
  pool:
    testcase: "pool_io.Pool IO should fill a pool"
  pool_BeforeSuite:
    testcase: "not scraped"
"#,
    );
    write(
        &root.join("testplans/smoke.yaml"),
        r#"
testcases:
  ext4:
    testcase: "volume_io_ext4.Volume IO should verify ext4"
"#,
    );
    write(
        &root.join("testplans/common.yaml"),
        r#"
testcases:
  broken:
    testcase: "nothing declares this"
"#,
    );

    temp
}

fn config_for(root: &Path) -> Config {
    Config {
        paths: PathsConfig {
            source_tree: root.to_path_buf(),
            scrape_roots: vec![PathBuf::from("src/volume_io"), PathBuf::from("src/pool_io")],
            ..PathsConfig::default()
        },
        ..Config::default()
    }
}

fn resolver_for(root: &Path) -> Resolver {
    Resolver::from_config(&config_for(root)).unwrap()
}

const LISTS: &str = r#"
testprofiles:
  smoke: [volume_io, install]
  p1: [volA, volB]
  p2: [volB, volD]
  empty:
macro-profiles:
  m1: [p1, nightly, empty, undefined]
metadata:
  groupings:
    - volA: [volC]
  exclude_from_regression: [smoke, literal_test]
  recorded_durations:
    volB: 300
    pool_io: 10
  install_tag_override:
    tests: [upgrade_basic]
"#;

#[test]
fn test_full_resolution() {
    let temp = e2e_tree();
    let resolved = resolver_for(temp.path())
        .resolve(ListDefinition::from_yaml(LISTS).unwrap())
        .unwrap();

    // Derived from the nightly plan, the reserved `common` plan is skipped.
    assert_eq!(resolved.profiles["nightly"], vec!["pool_io", "volume_io"]);
    assert!(!resolved.profiles.contains_key("common"));

    // Explicit definitions win over plans of the same name.
    assert_eq!(resolved.profiles["smoke"], vec!["volume_io", "install"]);
    assert!(resolved.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::ExplicitProfileShadowsPlan { profile } if profile == "smoke"
    )));

    // Macro union happens before grouping, so m1 is collapsed as well.
    assert_eq!(resolved.profiles["p1"], vec!["volB", "volA,volC"]);
    let m1: BTreeSet<&str> = resolved.profiles["m1"].iter().map(String::as_str).collect();
    assert_eq!(
        m1,
        BTreeSet::from(["volB", "volA,volC", "pool_io", "volume_io"])
    );

    assert!(resolved.profiles["empty"].is_empty());

    assert_eq!(
        resolved.exclude_from_regression,
        vec!["volume_io", "install", "literal_test"]
    );
    assert_eq!(resolved.install_tag_override, vec!["upgrade_basic"]);
}

#[test]
fn test_resolved_profiles_have_no_repeats_and_all_is_complete() {
    let temp = e2e_tree();
    let resolved = resolver_for(temp.path())
        .resolve(ListDefinition::from_yaml(LISTS).unwrap())
        .unwrap();

    let all: BTreeSet<&String> = resolved.profiles["ALL"].iter().collect();
    for (name, tests) in &resolved.profiles {
        let unique: BTreeSet<&String> = tests.iter().collect();
        assert_eq!(unique.len(), tests.len(), "profile {name} has repeats");
        for test in tests {
            assert!(all.contains(test), "{test} from {name} missing in ALL");
        }
    }
}

#[test]
fn test_get_after_grouping() {
    let temp = e2e_tree();
    let resolved = resolver_for(temp.path())
        .resolve(ListDefinition::from_yaml(LISTS).unwrap())
        .unwrap();

    assert_eq!(resolved.get("p1", false).unwrap(), vec!["volA,volC", "volB"]);
    assert_eq!(resolved.get("smoke", false).unwrap(), vec!["volume_io"]);
    assert_eq!(resolved.get("nightly", true).unwrap(), vec!["pool_io", "volume_io"]);
    assert_eq!(resolved.get("p2", true).unwrap(), vec!["volB", "volD"]);
    assert!(matches!(resolved.get("missing", false), Err(ListError::ProfileNotFound(_))));
}

#[test]
fn test_macro_union_scenario() {
    let temp = e2e_tree();
    let definition = ListDefinition::from_yaml(
        r#"
testprofiles:
  p1: [a, b]
  p2: [b, c]
  nightly: [a]
  smoke: []
macro-profiles:
  m1: [p1, p2]
"#,
    )
    .unwrap();

    let resolved = resolver_for(temp.path()).resolve(definition).unwrap();
    assert_eq!(resolved.profiles["m1"], vec!["a", "b", "c"]);
    assert_eq!(resolved.profiles["ALL"], vec!["a", "b", "c"]);
}

#[test]
fn test_repeated_explicit_entries_are_dropped() {
    let temp = e2e_tree();
    let definition = ListDefinition::from_yaml(
        r#"
testprofiles:
  p: [a, b, a]
macro-profiles:
  m: [p]
"#,
    )
    .unwrap();

    let resolved = resolver_for(temp.path()).resolve(definition).unwrap();
    assert_eq!(resolved.profiles["p"], vec!["a", "b"]);
    assert_eq!(resolved.get("p", false).unwrap(), vec!["a", "b"]);
    assert_eq!(resolved.get("m", true).unwrap(), vec!["a", "b"]);
}

#[test]
fn test_explicit_profiles_skip_scraping() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("testplans/nightly.yaml"), "testcases:\n  x:\n    testcase: \"never.scraped\"\n");
    let definition = ListDefinition::from_yaml("testprofiles:\n  nightly: [a]\n").unwrap();

    let resolver = Resolver::new(
        PlanLoader::new(temp.path().join("testplans")),
        Scraper::new().unwrap(),
        vec![temp.path().join("src")],
    );
    let resolved = resolver.resolve(definition).unwrap();
    assert_eq!(resolved.profiles["nightly"], vec!["a"]);
}

#[test]
fn test_unresolved_testcase_is_fatal() {
    let temp = e2e_tree();
    write(
        &temp.path().join("testplans/weekly.yaml"),
        "testcases:\n  gone:\n    testcase: \"volume_io_ext4.Volume IO was removed\"\n",
    );

    let err = resolver_for(temp.path())
        .resolve(ListDefinition::from_yaml(LISTS).unwrap())
        .unwrap_err();
    assert!(matches!(err, ListError::UnresolvedTestcase { ref plan, ref testcase, .. }
        if plan == "weekly" && testcase == "gone"));
}

#[test]
fn test_testcase_without_reference_is_fatal() {
    let temp = e2e_tree();
    write(&temp.path().join("testplans/weekly.yaml"), "testcases:\n  bare:\n");

    let err = resolver_for(temp.path())
        .resolve(ListDefinition::from_yaml(LISTS).unwrap())
        .unwrap_err();
    assert!(matches!(err, ListError::MissingReference { ref testcase, .. } if testcase == "bare"));
}

#[test]
fn test_resolve_lists_from_config() {
    let temp = e2e_tree();
    write(&temp.path().join("configurations/testlists.yaml"), LISTS);

    let resolved = resolve_lists(&config_for(temp.path())).unwrap();
    assert_eq!(resolved.get("p1", false).unwrap(), vec!["volA,volC", "volB"]);
}

#[test]
fn test_missing_list_definition() {
    let temp = e2e_tree();
    let err = resolve_lists(&config_for(temp.path())).unwrap_err();
    assert!(matches!(err, ListError::NotFound { .. }));
}

#[test]
fn test_malformed_list_definition() {
    let temp = e2e_tree();
    write(&temp.path().join("configurations/testlists.yaml"), "testprofiles: [a, b\n");
    let err = resolve_lists(&config_for(temp.path())).unwrap_err();
    assert!(matches!(err, ListError::Yaml { .. }));
}

#[test]
fn test_default_paths_name_tests_after_their_group() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let tests = root.join("src/tests");

    write(
        &tests.join("lvm/lvm_volume_resize/lvm_volume_resize_test.go"),
        &suite("lvm_volume_resize", "LVM Volume Resize", &["resize works"]),
    );
    write(&tests.join("lvm/common/util.go"), "package common\n");
    write(
        &tests.join("hostpath/hostpath_volume_provisioning/hostpath_volume_provisioning_test.go"),
        &suite("hostpath_volume_provisioning", "Hostpath Provisioning", &["provisions"]),
    );
    write(
        &tests.join("install/install_test.go"),
        &suite("Install Test", "Install", &["should install"]),
    );
    write(
        &root.join("testplans/lvm.yaml"),
        "testcases:\n  resize:\n    testcase: \"lvm_volume_resize.LVM Volume Resize resize works\"\n",
    );
    write(
        &root.join("testplans/ci.yaml"),
        r#"
testcases:
  resize:
    testcase: "lvm_volume_resize.LVM Volume Resize resize works"
  provisioning:
    testcase: "hostpath_volume_provisioning.Hostpath Provisioning provisions"
"#,
    );
    write(&root.join("configurations/testlists.yaml"), "testprofiles:\n  smoke: [lvm]\n");

    let config = Config {
        paths: PathsConfig {
            source_tree: root.to_path_buf(),
            ..PathsConfig::default()
        },
        ..Config::default()
    };
    let resolved = resolve_lists(&config).unwrap();

    assert_eq!(resolved.profiles["lvm"], vec!["lvm"]);
    assert_eq!(resolved.profiles["ci"], vec!["hostpath", "lvm"]);
    assert_eq!(resolved.profiles["ALL"], vec!["hostpath", "lvm"]);
}
