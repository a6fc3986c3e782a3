//! Content selection
//!
//! Turns an (account, forum target) pair into a submit-ready
//! [`ContentRecord`]: resolves the title and description templates against
//! the account profile and, for image accounts, claims the next image file
//! from the forum's local folder.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Account, ForumTarget};
use crate::error::Result;
use crate::template;
use crate::types::{ContentKind, ContentRecord};

/// File extensions recognized as postable images, lowercase
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Resolves templates and claims image files for submission
#[derive(Debug, Clone)]
pub struct ContentSelector {
    media_root: PathBuf,
}

impl ContentSelector {
    /// Create a selector that looks for `<forum>-images` folders under the
    /// given root directory
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    /// The folder images for the given forum are drawn from
    pub fn image_folder(&self, forum: &str) -> PathBuf {
        self.media_root.join(format!("{}-images", forum))
    }

    /// Build the next content record for this account and target
    ///
    /// Returns `Ok(None)` when an image account has no content available for
    /// the forum yet: the folder is created if missing so the operator knows
    /// where to put files. That skip is not an error.
    ///
    /// The selected image file is never removed here; deletion happens only
    /// after a confirmed successful submission, so a failed attempt leaves
    /// the file in place for the next run.
    ///
    /// # Errors
    ///
    /// Returns `MemecastError::Template` when a template references an
    /// undefined profile variable, and `MemecastError::Io` when the image
    /// folder cannot be created or read.
    pub fn prepare(&self, account: &Account, target: &ForumTarget) -> Result<Option<ContentRecord>> {
        let vars = account.profile.template_vars(&account.username);

        let title = template::render(target.title_template.choose()?, &vars)?;
        let body = template::render(target.description_template.choose()?, &vars)?;

        let image = match account.profile.content_type {
            ContentKind::Text => None,
            ContentKind::Meme => match self.claim_image(&target.name)? {
                Some(path) => Some(path),
                None => return Ok(None),
            },
        };

        Ok(Some(ContentRecord {
            forum: target.name.clone(),
            title,
            body,
            image,
            flair_text: target.flair_text.clone(),
        }))
    }

    /// Pick the lexicographically first image file in the forum's folder
    ///
    /// Lexicographic order gives a deterministic, stable consumption order
    /// across runs without a persistent cursor.
    fn claim_image(&self, forum: &str) -> Result<Option<PathBuf>> {
        let folder = self.image_folder(forum);

        if !folder.exists() {
            std::fs::create_dir_all(&folder)?;
            info!(
                "Created image folder {} for r/{}; populate it and re-run",
                folder.display(),
                forum
            );
            return Ok(None);
        }

        let mut names: Vec<String> = std::fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_image_file(name))
            .collect();

        if names.is_empty() {
            debug!("No images in {}", folder.display());
            return Ok(None);
        }

        names.sort();
        Ok(Some(folder.join(&names[0])))
    }
}

/// Whether a filename carries a recognized image extension
fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use crate::error::{MemecastError, TemplateError};
    use crate::template::Template;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn account(kind: ContentKind, hyperlink: Option<&str>) -> Account {
        let mut extras = HashMap::new();
        extras.insert("zodiac_sign".to_string(), "aries".to_string());
        Account {
            username: "alice".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            password: "pw".to_string(),
            profile: Profile {
                content_type: kind,
                hyperlink: hyperlink.map(String::from),
                extras,
            },
            subreddits: vec![],
        }
    }

    fn target(name: &str) -> ForumTarget {
        ForumTarget {
            name: name.to_string(),
            title_template: Template::One("Any other {zodiac_sign}s here?".to_string()),
            description_template: Template::One("Check this out: {hyperlink}".to_string()),
            flair_text: Some("OC".to_string()),
        }
    }

    #[test]
    fn test_text_account_has_no_image() {
        let dir = TempDir::new().unwrap();
        let selector = ContentSelector::new(dir.path());

        let record = selector
            .prepare(&account(ContentKind::Text, Some("http://x")), &target("askreddit"))
            .unwrap()
            .unwrap();

        assert_eq!(record.forum, "askreddit");
        assert_eq!(record.title, "Any other ariess here?");
        assert_eq!(record.body, "Check this out: http://x");
        assert_eq!(record.image, None);
        assert_eq!(record.flair_text, Some("OC".to_string()));
    }

    #[test]
    fn test_missing_hyperlink_substitutes_empty() {
        let dir = TempDir::new().unwrap();
        let selector = ContentSelector::new(dir.path());

        let record = selector
            .prepare(&account(ContentKind::Text, None), &target("askreddit"))
            .unwrap()
            .unwrap();

        assert_eq!(record.body, "Check this out: ");
    }

    #[test]
    fn test_undefined_placeholder_is_template_error() {
        let dir = TempDir::new().unwrap();
        let selector = ContentSelector::new(dir.path());
        let mut target = target("memes");
        target.title_template = Template::One("{not_a_real_key}".to_string());

        let result = selector.prepare(&account(ContentKind::Text, None), &target);
        assert!(matches!(
            result,
            Err(MemecastError::Template(TemplateError::UndefinedPlaceholder(name))) if name == "not_a_real_key"
        ));
    }

    #[test]
    fn test_missing_folder_created_and_skipped() {
        let dir = TempDir::new().unwrap();
        let selector = ContentSelector::new(dir.path());

        let result = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap();
        assert!(result.is_none());
        assert!(dir.path().join("memes-images").is_dir());

        // Second call after adding exactly one valid image picks it up.
        std::fs::write(dir.path().join("memes-images").join("only.png"), b"img").unwrap();
        let record = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap()
            .unwrap();
        assert_eq!(
            record.image,
            Some(dir.path().join("memes-images").join("only.png"))
        );
    }

    #[test]
    fn test_empty_folder_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("memes-images")).unwrap();
        let selector = ContentSelector::new(dir.path());

        let result = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_lexicographically_first_image_selected() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("memes-images");
        std::fs::create_dir(&folder).unwrap();
        // Create in non-sorted order; listing order must not matter.
        for name in ["c.gif", "a.png", "b.jpg"] {
            std::fs::write(folder.join(name), b"img").unwrap();
        }
        let selector = ContentSelector::new(dir.path());

        let record = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap()
            .unwrap();
        assert_eq!(record.image, Some(folder.join("a.png")));

        // Selection must not consume the file.
        assert!(folder.join("a.png").exists());

        // Still first until it is removed.
        let again = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap()
            .unwrap();
        assert_eq!(again.image, Some(folder.join("a.png")));

        std::fs::remove_file(folder.join("a.png")).unwrap();
        let next = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap()
            .unwrap();
        assert_eq!(next.image, Some(folder.join("b.jpg")));
    }

    #[test]
    fn test_unrecognized_extensions_ignored() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("memes-images");
        std::fs::create_dir(&folder).unwrap();
        for name in ["notes.txt", "clip.mp4", "archive.zip"] {
            std::fs::write(folder.join(name), b"x").unwrap();
        }
        let selector = ContentSelector::new(dir.path());

        let result = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_extension_matching_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("memes-images");
        std::fs::create_dir(&folder).unwrap();
        std::fs::write(folder.join("SHOUTING.PNG"), b"img").unwrap();
        let selector = ContentSelector::new(dir.path());

        let record = selector
            .prepare(&account(ContentKind::Meme, None), &target("memes"))
            .unwrap()
            .unwrap();
        assert_eq!(record.image, Some(folder.join("SHOUTING.PNG")));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("a.png"));
        assert!(is_image_file("b.JPG"));
        assert!(is_image_file("c.jpeg"));
        assert!(is_image_file("d.gif"));
        assert!(!is_image_file("e.webm"));
        assert!(!is_image_file("noext"));
    }
}
