//! Status collection against a real git fixture and fake environments.

mod support;

use std::fs;
use std::path::Path;

use git2::Repository;

use strata_core::commands::{StatusOptions, collect_status};
use strata_core::vcs::GitCli;
use support::{FakeEnvs, test_config};

fn init_tagged_repo(path: &Path, tags: &[&str]) {
    let repo = Repository::init(path).unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("tester", "tester@example.com").unwrap();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();
    let target = repo.find_object(oid, None).unwrap();
    for tag in tags {
        repo.tag_lightweight(tag, &target, false).unwrap();
    }
}

#[test]
fn status_reports_latest_tag_and_missing_environment() {
    let temp = tempfile::tempdir().unwrap();
    let config = test_config(temp.path());
    init_tagged_repo(
        &config.package("pax").unwrap().repo,
        &["v1.2", "v1.10", "v1.9"],
    );
    let envs = FakeEnvs::new().with_envs(&["pax_head", "hax_head"]);

    let report = collect_status(&config, &GitCli::new(), &envs, &StatusOptions::new()).unwrap();

    assert_eq!(report.packages.len(), 3);
    let pax = &report.packages[0];
    assert!(pax.primary);
    assert!(pax.head_env_exists);
    let tagged = pax.tagged.as_ref().expect("primary carries tag status");
    assert_eq!(tagged.tag, "v1.10");
    assert_eq!(tagged.environment, "pax_v1.10");
    assert!(!tagged.environment_exists);
    assert!(!tagged.processed_dir_exists);
    assert!(!report.provisioned());

    // Companions carry no tagged status.
    assert!(report.packages[1].tagged.is_none());
    assert!(report.packages[2].tagged.is_none());
    assert!(!report.packages[2].head_env_exists);
}

#[test]
fn status_reports_fully_provisioned_tag() {
    let temp = tempfile::tempdir().unwrap();
    let config = test_config(temp.path());
    init_tagged_repo(&config.package("pax").unwrap().repo, &["v1.10"]);
    fs::create_dir_all(config.data.processed.join("pax_v1.10")).unwrap();
    fs::create_dir_all(config.data.minitrees.join("pax_v1.10")).unwrap();
    let envs = FakeEnvs::new().with_envs(&["pax_head", "pax_v1.10"]);

    let report = collect_status(&config, &GitCli::new(), &envs, &StatusOptions::new()).unwrap();

    let tagged = report.packages[0].tagged.as_ref().unwrap();
    assert!(tagged.environment_exists);
    assert!(tagged.processed_dir_exists);
    assert!(tagged.minitrees_dir_exists);
    assert!(report.provisioned());
}

#[test]
fn status_filter_restricts_packages() {
    let temp = tempfile::tempdir().unwrap();
    let config = test_config(temp.path());
    let envs = FakeEnvs::new().with_envs(&["hax_head"]);

    let report = collect_status(
        &config,
        &GitCli::new(),
        &envs,
        &StatusOptions::new().with_package("hax"),
    )
    .unwrap();

    assert_eq!(report.packages.len(), 1);
    assert_eq!(report.packages[0].name, "hax");
    assert!(report.packages[0].head_env_exists);
    assert!(report.packages[0].tagged.is_none());
}
