use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn shopsync(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("shopsync"));
    cmd.arg("--root")
        .arg(root)
        .env("RUST_LOG", "warn")
        .env("NO_COLOR", "1");
    cmd
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn seeded_site() -> TempDir {
    let site = TempDir::new().expect("site");
    write(
        site.path(),
        "data/products.json",
        r#"[{"id": "A1", "title": "Widget", "price": "10,000"}]"#,
    );
    write(site.path(), "yourshop/p/A1.html", "<title>Widget</title>");
    write(
        site.path(),
        "yourshop/index.html",
        "<html><body><header>nav</header><p>hi</p></body></html>\n",
    );
    site
}

#[test]
fn missing_catalog_exits_with_configuration_code() {
    let site = TempDir::new().expect("site");
    shopsync(site.path())
        .arg("pages")
        .assert()
        .code(2)
        .stderr(contains("catalog not found"));
}

#[test]
fn corrupt_catalog_exits_with_configuration_code() {
    let site = TempDir::new().expect("site");
    write(site.path(), "data/products.json", "{not json");
    shopsync(site.path()).arg("diff").assert().code(2);
}

#[test]
fn unparsable_config_exits_with_configuration_code() {
    let site = seeded_site();
    write(site.path(), "shopsync.yaml", "pages: [unterminated\n");
    shopsync(site.path()).arg("sitemap").assert().code(2);
}

#[test]
fn missing_host_exits_with_lookup_code() {
    let site = seeded_site();
    fs::remove_file(site.path().join("yourshop/index.html")).expect("rm host");
    shopsync(site.path())
        .arg("today")
        .assert()
        .code(3)
        .stderr(contains("no host document found"));
}

#[test]
fn inject_before_build_exits_with_lookup_code() {
    let site = seeded_site();
    shopsync(site.path())
        .args(["today", "inject"])
        .assert()
        .code(3)
        .stderr(contains("today-updates.html"));
}

#[test]
fn missing_pages_dir_exits_with_lookup_code() {
    let site = TempDir::new().expect("site");
    shopsync(site.path()).arg("sitemap").assert().code(3);
}

#[test]
fn all_succeeds_and_second_run_changes_nothing() {
    let site = seeded_site();
    shopsync(site.path())
        .arg("all")
        .assert()
        .success()
        .stdout(contains("pages (1 changed"));

    let host_1 = fs::read_to_string(site.path().join("yourshop/index.html")).expect("host");
    let page_1 = fs::read_to_string(site.path().join("p/A1.md")).expect("page");
    assert!(page_1.contains("price_number: \"10000\""));

    shopsync(site.path())
        .arg("all")
        .assert()
        .success()
        .stdout(contains("pages (0 changed, 1 unchanged"))
        .stdout(contains("unchanged, anchor replace-marked"));

    let host_2 = fs::read_to_string(site.path().join("yourshop/index.html")).expect("host");
    assert_eq!(host_1, host_2);
    assert_eq!(host_2.matches("id=\"today-updates\"").count(), 1);
}

#[test]
fn pages_dry_run_writes_nothing() {
    let site = seeded_site();
    shopsync(site.path())
        .args(["pages", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"));
    assert!(!site.path().join("p").exists());
}

#[test]
fn diff_reports_pending_page_then_nothing() {
    let site = seeded_site();
    shopsync(site.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(contains("+++ b/p/A1.md"));

    shopsync(site.path()).arg("pages").assert().success();
    shopsync(site.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(contains("No differences."));
}

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=shopsync", "-c", "user.email=shopsync@example.invalid"])
        .args(args)
        .env("GIT_AUTHOR_DATE", "2020-01-02T03:04:05Z")
        .env("GIT_COMMITTER_DATE", "2020-01-02T03:04:05Z")
        .output()
        .is_ok_and(|out| out.status.success())
}

#[test]
fn relative_root_inside_repo_uses_commit_times() {
    let repo = TempDir::new().expect("repo");
    write(repo.path(), "site/p/a.md", "page");
    if !git(repo.path(), &["init", "-q"]) {
        return;
    }
    assert!(git(repo.path(), &["add", "."]));
    assert!(git(repo.path(), &["commit", "-q", "-m", "init"]));

    // `--root site` from the repo top: the root is relative and has no `.git`
    // of its own, so both detection and pathspecs go through the parent repo.
    Command::new(assert_cmd::cargo::cargo_bin!("shopsync"))
        .current_dir(repo.path())
        .args(["--root", "site", "sitemap"])
        .env("RUST_LOG", "warn")
        .env("NO_COLOR", "1")
        .assert()
        .success();

    let xml = fs::read_to_string(repo.path().join("site/sitemap.xml")).expect("sitemap");
    assert!(
        xml.contains("<lastmod>2020-01-02T03:04:05Z</lastmod>"),
        "commit time missing:\n{xml}"
    );
}
