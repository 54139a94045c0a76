use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use open::that;

use crate::utils::get_data_dir;

const IMAGES_DIR_NAME: &str = "images";

pub fn is_supported_image(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    matches!(
        ext.to_lowercase().as_str(),
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"
    )
}

pub fn images_dir() -> Result<PathBuf> {
    let dir = get_data_dir()?.join(IMAGES_DIR_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write uploaded image bytes under `dir` and return the stored path as
/// the card's image reference.
pub fn store_image(dir: &Path, name: &str, bytes: &[u8]) -> Result<String> {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|f| f.to_str())
        .with_context(|| format!("Invalid image file name: {name}"))?;
    if !is_supported_image(Path::new(file_name)) {
        bail!("Unsupported image type: {file_name}");
    }

    let destination = dir.join(file_name);
    fs::write(&destination, bytes)
        .with_context(|| format!("Failed to store image at {}", destination.display()))?;
    Ok(destination.to_string_lossy().into_owned())
}

/// Copy an image file from disk into `dir`. A missing source is reported
/// as such; other read failures keep their own context.
pub fn import_image(dir: &Path, source: &Path) -> Result<String> {
    if !is_supported_image(source) {
        bail!("Unsupported image type: {}", source.display());
    }

    let bytes = match fs::read(source) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            bail!("Image file not found: {}", source.display());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read image {}", source.display()));
        }
    };

    store_image(dir, &source.to_string_lossy(), &bytes)
}

/// Open an image reference with the system viewer. URLs are handed over
/// as-is; local paths must exist.
pub fn open_image(reference: &str) -> Result<()> {
    if !reference.starts_with("http://") && !reference.starts_with("https://") {
        let path = Path::new(reference);
        if !path.is_file() {
            bail!("Image file does not exist: {}", path.display());
        }
    }
    that(reference)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_image_extensions() {
        assert!(is_supported_image(Path::new("rose.jpg")));
        assert!(is_supported_image(Path::new("rose.PNG")));
        assert!(!is_supported_image(Path::new("rose.pdf")));
        assert!(!is_supported_image(Path::new("rose")));
    }

    #[test]
    fn store_image_rejects_unknown_types() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_image(dir.path(), "notes.txt", b"not an image").is_err());
    }

    #[test]
    fn store_image_writes_under_the_given_dir() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store_image(dir.path(), "rose.jpg", b"jpeg bytes").unwrap();
        assert!(Path::new(&stored).starts_with(dir.path()));
        assert_eq!(fs::read(&stored).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn import_reports_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.jpg");
        let err = import_image(dir.path(), &missing).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn open_image_rejects_missing_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.png");
        assert!(open_image(&missing.to_string_lossy()).is_err());
    }
}
