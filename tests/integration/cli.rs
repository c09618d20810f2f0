//! Tests of the `cms-content` binary.

use std::fs;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use crate::common::{Route, TestServer, query_param};

fn cms_content(temp: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("cms-content")?;
    cmd.env_remove("CMS_CONTENT_API_URL")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(temp.path().join("missing.toml"));
    Ok(cmd)
}

fn write_theme(temp: &TempDir) -> Result<std::path::PathBuf> {
    let path = temp.path().join("theme.json");
    fs::write(
        &path,
        json!({
            "_id": "ocean blue",
            "name": "Ocean",
            "colors": { "primary": "#3366cc", "background": "#f8fafc" },
            "fonts": { "heading": { "family": "Poppins", "weight": 700, "size": "2rem" } }
        })
        .to_string(),
    )?;
    Ok(path)
}

#[test]
fn test_theme_css_output() -> Result<()> {
    let temp = TempDir::new()?;
    let theme = write_theme(&temp)?;

    cms_content(&temp)?
        .arg("theme")
        .arg("--file")
        .arg(&theme)
        .assert()
        .success()
        .stdout(predicate::str::contains("/* classes: theme-ocean-blue */"))
        .stdout(predicate::str::contains("  --color-primary: #3366cc;"))
        .stdout(predicate::str::contains("  --color-secondary: #3366cc;"))
        .stdout(predicate::str::contains("  --color-background: #f8fafc;"))
        .stdout(predicate::str::contains("  --color-primary-50: #ebf0fa;"))
        .stdout(predicate::str::contains("  --font-heading-weight: 700;"));
    Ok(())
}

#[test]
fn test_theme_json_output() -> Result<()> {
    let temp = TempDir::new()?;
    let theme = write_theme(&temp)?;

    let output = cms_content(&temp)?.args(["theme", "--format", "json", "--file"]).arg(&theme).output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["class"], "theme-ocean-blue");
    assert_eq!(value["variables"]["--color-primary-900"], "#1f3d7a");
    assert_eq!(value["variables"]["--font-heading-family"], "Poppins");
    assert!(value["variables"].get("--font-body-family").is_none());
    Ok(())
}

#[test]
fn test_theme_missing_file_fails() -> Result<()> {
    let temp = TempDir::new()?;

    cms_content(&temp)?
        .args(["theme", "--file"])
        .arg(temp.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read theme file"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let temp = TempDir::new()?;
    let config = temp.path().join("config.toml");
    fs::write(&config, "[cache]\nstale_time_secs = 600\ngc_time_secs = 60\n")?;

    Command::cargo_bin("cms-content")?
        .env_remove("CMS_CONTENT_API_URL")
        .env("NO_COLOR", "1")
        .arg("websites")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("gc_time_secs"));
    Ok(())
}

#[test]
fn test_content_requires_a_target() -> Result<()> {
    let temp = TempDir::new()?;

    cms_content(&temp)?
        .args(["content", "--website", "w1", "--field", "title=Title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--section"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_content_command_against_server() -> Result<()> {
    let server = TestServer::start(vec![
        Route::ok("/api/languages/website/w1", json!([{ "languageID": "ar", "language": "Arabic", "isDefault": true }])),
        Route::ok("/api/section-items/section/s1", json!([{ "_id": "item-1", "name": "Team" }])),
        Route::ok(
            "/api/subsections/section-items",
            json!([{
                "_id": "sub-1",
                "order": 3,
                "contentElements": [
                    { "name": "Name", "defaultContent": "Alice",
                      "translations": [
                          { "content": "draft", "language": null },
                          { "content": "أليس", "language": { "languageID": "ar" } }
                      ] }
                ]
            }]),
        ),
    ])
    .await?;

    let temp = TempDir::new()?;
    let base_url = server.base_url();
    let output = tokio::task::spawn_blocking(move || -> Result<std::process::Output> {
        let output = cms_content(&temp)?
            .args(["--quiet", "--api-url", base_url.as_str()])
            .args(["content", "--website", "w1", "--section", "s1", "--field", "name=Name", "--format", "json"])
            .output()?;
        Ok(output)
    })
    .await??;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let items: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(items, json!([{ "name": "أليس", "order": 3 }]));

    // Language came from the website default
    assert_eq!(server.hits("/api/languages/website/w1"), 1);
    let batch = server
        .requests()
        .into_iter()
        .find(|target| target.starts_with("/api/subsections/section-items"))
        .unwrap_or_default();
    assert_eq!(query_param(&batch, "ids").as_deref(), Some("item-1"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sections_command_lists_sorted() -> Result<()> {
    let server = TestServer::start(vec![Route::ok(
        "/api/sections/website/w1",
        json!([
            { "_id": "s2", "name": "Footer", "order": 9 },
            { "_id": "s1", "name": "Hero", "type": "hero", "order": 1 }
        ]),
    )])
    .await?;

    let temp = TempDir::new()?;
    let base_url = server.base_url();
    let output = tokio::task::spawn_blocking(move || -> Result<std::process::Output> {
        Ok(cms_content(&temp)?
            .args(["-q", "--api-url", base_url.as_str(), "sections", "--website", "w1", "--format", "json"])
            .output()?)
    })
    .await??;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let sections: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(sections[0]["name"], "Hero");
    assert_eq!(sections[1]["name"], "Footer");
    Ok(())
}
