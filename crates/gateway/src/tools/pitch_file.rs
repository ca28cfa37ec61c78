//! Writes finished pitch documents to the configured output directory.

use std::path::{Path, PathBuf};

use gl_domain::error::Result;

/// Write a pitch document for `topic` under `dir`, returning the path.
///
/// The filename is a slug of the topic; a second run for the same topic
/// overwrites the earlier document.
pub async fn write_pitch(dir: &Path, topic: &str, content: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(format!("{}.md", slugify(topic)));
    tokio::fs::write(&path, content).await?;

    tracing::info!(path = %path.display(), "pitch document written");
    Ok(path)
}

/// Reduce a free-text topic to a safe filename stem: lowercase alphanumerics
/// with single dashes, capped at 60 characters.
fn slugify(topic: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for ch in topic.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
        if slug.len() >= 60 {
            break;
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "pitch".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_dashed() {
        assert_eq!(slugify("Ada Lovelace"), "ada-lovelace");
        assert_eq!(slugify("  The  Analytical Engine! "), "the-analytical-engine");
    }

    #[test]
    fn degenerate_topics_get_a_fallback_slug() {
        assert_eq!(slugify("???"), "pitch");
        assert_eq!(slugify(""), "pitch");
    }

    #[tokio::test]
    async fn writes_document_under_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pitch(dir.path(), "Ada Lovelace", "# Film Concept Pitch")
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "ada-lovelace.md");
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "# Film Concept Pitch");
    }

    #[tokio::test]
    async fn rerun_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        write_pitch(dir.path(), "Ada", "first").await.unwrap();
        let path = write_pitch(dir.path(), "Ada", "second").await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "second");
    }
}
