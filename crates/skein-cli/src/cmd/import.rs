//! `sk import` — validate and store an authored story document.

use crate::output::{CliError, OutputMode, render, render_error};
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use skein_core::error::ErrorCode;
use skein_core::model::StoryDoc;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the story JSON document.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ImportOutput {
    id: String,
    title: String,
    pages: usize,
}

pub fn run_import(
    args: &ImportArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("read story document {}", args.file.display()))?;

    let doc: StoryDoc = match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("not a story document: {err}"),
                    "Expected JSON with id, root, and a pages array.",
                    ErrorCode::InvalidStoryDoc.code(),
                ),
            )?;
            anyhow::bail!("invalid story document");
        }
    };

    let story = match doc.validate() {
        Ok(story) => story,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    err.to_string(),
                    ErrorCode::InvalidStoryDoc.hint().unwrap_or_default(),
                    ErrorCode::InvalidStoryDoc.code(),
                ),
            )?;
            anyhow::bail!("invalid story document");
        }
    };

    let mut conn = super::open_initialized(project_root)?;
    skein_core::db::story_store::put_story(&mut conn, &story, skein_core::time::wall_now_us())?;

    let summary = ImportOutput {
        id: story.id.to_string(),
        title: story.title.clone(),
        pages: story.pages.len(),
    };
    if quiet && !output.is_json() {
        return Ok(());
    }
    render(output, &summary, |s, w| {
        writeln!(w, "✓ imported '{}' ({} pages) as {}", s.title, s.pages, s.id)
    })
}

#[cfg(test)]
mod tests {
    use super::{ImportArgs, run_import};
    use crate::output::OutputMode;
    use tempfile::TempDir;

    fn init(dir: &TempDir) {
        crate::cmd::init::run_init(
            &crate::cmd::init::InitArgs { force: false },
            OutputMode::Text,
            true,
            dir.path(),
        )
        .expect("init");
    }

    #[test]
    fn valid_document_lands_in_the_store() {
        let dir = TempDir::new().expect("tempdir");
        init(&dir);

        let doc = serde_json::json!({
            "id": "demo",
            "title": "Demo",
            "root": "start",
            "pages": [
                {"id": "start", "name": "Start", "body": "hello", "links": [
                    {"target": "end", "label": "finish"}
                ]},
                {"id": "end", "name": "End", "body": "bye"}
            ]
        });
        let file = dir.path().join("demo.json");
        std::fs::write(&file, doc.to_string()).expect("write doc");

        run_import(
            &ImportArgs { file },
            OutputMode::Text,
            true,
            dir.path(),
        )
        .expect("import");

        let conn = crate::cmd::open_initialized(dir.path()).expect("open");
        let stories = skein_core::db::story_store::list_stories(&conn).expect("list");
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].page_count, 2);
    }

    #[test]
    fn invalid_document_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        init(&dir);

        let doc = serde_json::json!({
            "id": "demo",
            "root": "missing",
            "pages": [{"id": "start"}]
        });
        let file = dir.path().join("bad.json");
        std::fs::write(&file, doc.to_string()).expect("write doc");

        assert!(
            run_import(&ImportArgs { file }, OutputMode::Text, true, dir.path()).is_err()
        );
    }

    #[test]
    fn non_json_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        init(&dir);
        let file = dir.path().join("nope.json");
        std::fs::write(&file, "not json").expect("write doc");

        assert!(
            run_import(&ImportArgs { file }, OutputMode::Text, true, dir.path()).is_err()
        );
    }
}
