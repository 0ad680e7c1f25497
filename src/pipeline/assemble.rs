//! Result assembly: OCR response → `complete.md` + `images/` on disk.
//!
//! For each page, in order:
//! 1. decode every image record and write it to `images/<id>.png`;
//! 2. rewrite the page's `![id](id)` placeholders to `images/<id>.png`;
//! 3. keep the rewritten text.
//!
//! Then all pages are joined with one blank line and written to
//! `complete.md`. Images are always on disk before the Markdown that links
//! to them is produced.
//!
//! Everything here is blocking `std::fs` I/O. Existing bundle contents are
//! never cleaned: files with the same name are overwritten, others are left
//! alone. Ids repeated across pages overwrite the earlier page's file. On the
//! first decode or write failure the error is returned and whatever was
//! already written stays on disk.

use crate::error::Ocr2MdError;
use crate::output::{AssembledBundle, PageSummary};
use crate::pipeline::decode::decode_image_payload;
use crate::pipeline::rewrite::{
    find_unresolved_placeholders, image_relative_path, join_pages, rewrite_placeholders,
};
use crate::progress::ConversionProgressCallback;
use crate::response::{OcrImage, OcrPage, OcrResponse};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the Markdown file inside the bundle.
pub const MARKDOWN_FILE: &str = "complete.md";

/// Name of the image directory inside the bundle.
pub const IMAGES_DIR: &str = "images";

/// Write `response` as a bundle under `output_dir`.
///
/// `output_dir` and its `images/` child are created if absent.
///
/// # Errors
/// * [`Ocr2MdError::ImageDecode`] — an image payload is malformed
/// * [`Ocr2MdError::InvalidImageId`] — an id would escape `images/`
/// * [`Ocr2MdError::OutputWriteFailed`] — any directory or file write failed
pub fn assemble(
    response: &OcrResponse,
    output_dir: impl AsRef<Path>,
) -> Result<AssembledBundle, Ocr2MdError> {
    assemble_with_progress(response, output_dir, None)
}

/// [`assemble`], reporting each finished page to `progress`.
pub fn assemble_with_progress(
    response: &OcrResponse,
    output_dir: impl AsRef<Path>,
    progress: Option<&dyn ConversionProgressCallback>,
) -> Result<AssembledBundle, Ocr2MdError> {
    let root = output_dir.as_ref().to_path_buf();
    let images_dir = root.join(IMAGES_DIR);
    create_dir(&images_dir)?;

    let total_pages = response.pages.len();
    let mut rewritten: Vec<String> = Vec::with_capacity(total_pages);
    let mut summaries: Vec<PageSummary> = Vec::with_capacity(total_pages);

    for (i, page) in response.pages.iter().enumerate() {
        let page_num = i + 1;
        let (mapping, image_bytes) = persist_page_images(page, page_num, &images_dir)?;

        let markdown = rewrite_placeholders(&page.markdown, &mapping);
        let unresolved = find_unresolved_placeholders(&markdown);
        for id in &unresolved {
            warn!("Page {}: placeholder '{}' has no matching image", page_num, id);
        }

        summaries.push(PageSummary {
            page_num,
            image_ids: mapping.into_iter().map(|(id, _)| id).collect(),
            image_bytes,
            markdown_len: markdown.len(),
            unresolved_placeholders: unresolved,
        });
        rewritten.push(markdown);

        if let Some(cb) = progress {
            cb.on_page_assembled(page_num, total_pages, page.images.len());
        }
    }

    let markdown_path = root.join(MARKDOWN_FILE);
    write_file(&markdown_path, join_pages(&rewritten).as_bytes())?;

    let bundle = AssembledBundle {
        root,
        markdown_path,
        images_dir,
        pages: summaries,
    };
    info!(
        "Assembled {} pages, {} images into {}",
        total_pages,
        bundle.total_images(),
        bundle.root.display()
    );
    Ok(bundle)
}

/// Decode and write every image of one page.
///
/// Returns the page's `(id, relative path)` mapping in record order and the
/// number of bytes written.
fn persist_page_images(
    page: &OcrPage,
    page_num: usize,
    images_dir: &Path,
) -> Result<(Vec<(String, String)>, u64), Ocr2MdError> {
    let mut mapping = Vec::with_capacity(page.images.len());
    let mut written = 0u64;

    for image in &page.images {
        let path = image_path(images_dir, image, page_num)?;
        let bytes =
            decode_image_payload(&image.encoded_data).map_err(|source| Ocr2MdError::ImageDecode {
                page: page_num,
                image_id: image.id.clone(),
                source,
            })?;

        write_file(&path, &bytes)?;
        debug!("Page {}: wrote {} ({} bytes)", page_num, path.display(), bytes.len());

        written += bytes.len() as u64;
        mapping.push((image.id.clone(), image_relative_path(&image.id)));
    }

    Ok((mapping, written))
}

/// `images/<id>.png`, refusing ids whose file name is not a single path
/// component on this platform.
fn image_path(images_dir: &Path, image: &OcrImage, page_num: usize) -> Result<PathBuf, Ocr2MdError> {
    let file_name = format!("{}.png", image.id);
    let mut components = Path::new(&file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(images_dir.join(&file_name)),
        _ => Err(Ocr2MdError::InvalidImageId {
            page: page_num,
            image_id: image.id.clone(),
        }),
    }
}

fn create_dir(path: &Path) -> Result<(), Ocr2MdError> {
    std::fs::create_dir_all(path).map_err(|source| Ocr2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), Ocr2MdError> {
    std::fs::write(path, contents).map_err(|source| Ocr2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
