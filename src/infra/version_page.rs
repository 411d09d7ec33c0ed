use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::error::{AppError, AppResult};
use crate::services::{KnownVersionStore, VersionSource};

const VERSION_CLASS: &str = "js-update-num";

/// Opening tag with a `class` attribute; the value lands in group 1 or 2.
static CLASSED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<[a-z][a-z0-9]*\s(?:[^>]*?\s)?class\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#,
    )
    .expect("classed tag pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Vendor update page that shows the latest release number.
pub struct VersionPageClient {
    http: Client,
    page_url: String,
}

impl VersionPageClient {
    pub fn new(http: Client, page_url: String) -> Self {
        Self { http, page_url }
    }
}

#[async_trait]
impl VersionSource for VersionPageClient {
    async fn fetch_version(&self) -> AppResult<String> {
        let response = self
            .http
            .get(&self.page_url)
            .send()
            .await
            .map_err(|err| AppError::VersionWatch(format!("failed to load update page: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::VersionWatch(format!(
                "update page responded with {status}"
            )));
        }

        let html = response.text().await.map_err(|err| {
            AppError::VersionWatch(format!("failed to read update page: {err}"))
        })?;
        extract_version(&html).ok_or_else(|| {
            AppError::VersionWatch(format!("no '{VERSION_CLASS}' element on update page"))
        })
    }
}

/// Text of the first element carrying the version class, tags stripped and
/// entities decoded.
pub fn extract_version(html: &str) -> Option<String> {
    let opening = CLASSED_TAG.captures_iter(html).find(|captures| {
        captures
            .get(1)
            .or_else(|| captures.get(2))
            .is_some_and(|class| {
                class
                    .as_str()
                    .split_whitespace()
                    .any(|token| token == VERSION_CLASS)
            })
    })?;

    let rest = &html[opening.get(0)?.end()..];
    let inner = rest.find("</").map_or(rest, |end| &rest[..end]);
    let text = TAG.replace_all(inner, "");
    let text = html_escape::decode_html_entities(&text);
    let version = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!version.is_empty()).then_some(version)
}

/// Last announced version kept as a plain text file.
pub struct VersionFile {
    file_path: PathBuf,
}

impl VersionFile {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

impl KnownVersionStore for VersionFile {
    fn load(&self) -> String {
        match fs::read_to_string(&self.file_path) {
            Ok(contents) => contents.trim().to_string(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                tracing::error!(
                    path = %self.file_path.display(),
                    error = %err,
                    "failed to read known version"
                );
                String::new()
            }
        }
    }

    fn save(&self, version: &str) -> AppResult<()> {
        fs::write(&self.file_path, version)?;
        Ok(())
    }
}
