//! Writing results to disk.
//!
//! Nothing in the session persists anything; these helpers exist for the CLI
//! and for embedders that want files.

use crate::analysis::{ImageRef, SermonAnalysis};
use crate::error::SermonError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Write `contents` to `path` via a temp file and rename, creating parent
/// directories as needed. A crash never leaves a half-written file behind.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), SermonError> {
    let fail = |source| SermonError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(fail)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(fail)?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Save every inline illustration to `dir` as `image-<n>.<ext>`, `n` from 1.
///
/// Remote images (fallbacks) are skipped. The extension comes from the
/// decoded bytes, falling back to the declared mime type.
///
/// Returns the written paths in image order.
pub async fn save_images(
    analysis: &SermonAnalysis,
    dir: &Path,
) -> Result<Vec<PathBuf>, SermonError> {
    let mut written = Vec::new();

    for (idx, image) in analysis.generated_images().iter().enumerate() {
        let ImageRef::Inline { mime_type, data } = image else {
            debug!("Image {}: remote, not saved", idx);
            continue;
        };

        let bytes = match STANDARD.decode(data.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Image {}: invalid base64 payload ({}); skipped", idx, e);
                continue;
            }
        };

        let ext = image_extension(&bytes, mime_type);
        let path = dir.join(format!("image-{}.{}", idx + 1, ext));
        write_atomic(&path, &bytes).await?;
        written.push(path);
    }

    info!("Saved {} images to {}", written.len(), dir.display());
    Ok(written)
}

fn image_extension(bytes: &[u8], mime_type: &str) -> &'static str {
    if let Some(ext) = image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
    {
        return ext;
    }
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(2, 2, Rgb([200, 160, 60]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn analysis_with(images: Vec<ImageRef>) -> SermonAnalysis {
        let a: SermonAnalysis = serde_json::from_value(serde_json::json!({
            "title": "t", "scripture": "s", "coreTheme": "c",
            "summaryPoints": [], "imagePrompts": [],
            "evangelismMessage": "e", "keywords": []
        }))
        .unwrap();
        a.with_images(images)
    }

    #[tokio::test]
    async fn write_atomic_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/card.html");
        write_atomic(&path, b"<p>hi</p>").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"<p>hi</p>");
        assert!(!dir.path().join("out/nested/card.html.tmp").exists());
    }

    #[tokio::test]
    async fn save_images_writes_inline_and_skips_remote() {
        let dir = tempfile::tempdir().unwrap();
        let png = tiny_png();
        let a = analysis_with(vec![
            ImageRef::Inline {
                mime_type: "image/png".into(),
                data: STANDARD.encode(&png),
            },
            ImageRef::Remote("https://example.com/fallback.jpg".into()),
            ImageRef::Inline {
                mime_type: "image/png".into(),
                data: STANDARD.encode(&png),
            },
        ]);

        let paths = save_images(&a, dir.path()).await.unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join("image-1.png"), dir.path().join("image-3.png")]
        );
        assert_eq!(std::fs::read(&paths[0]).unwrap(), png);
    }

    #[tokio::test]
    async fn invalid_base64_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let a = analysis_with(vec![ImageRef::Inline {
            mime_type: "image/png".into(),
            data: "not base64!!".into(),
        }]);
        assert!(save_images(&a, dir.path()).await.unwrap().is_empty());
    }

    #[test]
    fn extension_falls_back_to_mime() {
        assert_eq!(image_extension(&tiny_png(), "image/jpeg"), "png");
        assert_eq!(image_extension(b"????", "image/jpeg"), "jpg");
        assert_eq!(image_extension(b"????", "application/octet-stream"), "png");
    }
}
