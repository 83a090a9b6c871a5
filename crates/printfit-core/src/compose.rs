//! Refit arbitrary-size pages onto a fixed physical page.
//!
//! Documents assembled from mixed sources (scans, generated forms, photos)
//! carry pages of wildly different sizes. For printing, every page is
//! wrapped in a single transform that scales it uniformly onto Letter,
//! centered horizontally and flush to the top edge, and the page boxes are
//! normalized to the target size.

use lopdf::{Document, Object, ObjectId};

use crate::error::ComposeError;
use crate::layout::{PageSize, Placement};

/// Pages this deep in the page tree still resolve an inherited MediaBox.
const MAX_PARENT_DEPTH: usize = 32;

/// Rescale every page of `source` onto the fixed target page size.
///
/// Pure transformation: the only failure mode is `source` not parsing as a
/// PDF (or a structurally broken page).
pub fn build_print_ready(source: &[u8]) -> Result<Vec<u8>, ComposeError> {
    let mut doc =
        Document::load_mem(source).map_err(|e| ComposeError::ParseError(e.to_string()))?;

    let target = PageSize::LETTER;
    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();

    for (page_num, page_id) in &pages {
        let (width, height) = source_page_size(&doc, *page_id);
        let placement = Placement::compute(width, height, target);

        if !placement.is_identity() {
            let content = doc.get_page_content(*page_id).map_err(|e| {
                ComposeError::OperationError(format!("page {} content: {}", page_num, e))
            })?;
            let mut wrapped = format!(
                "q\n{:.6} 0 0 {:.6} {:.6} {:.6} cm\n",
                placement.scale, placement.scale, placement.x, placement.y
            )
            .into_bytes();
            wrapped.extend_from_slice(&content);
            wrapped.extend_from_slice(b"\nQ");
            doc.change_page_content(*page_id, wrapped).map_err(|e| {
                ComposeError::OperationError(format!("page {} rewrite: {}", page_num, e))
            })?;
        }

        set_target_box(&mut doc, *page_id, target)?;
    }

    doc.compress();

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| ComposeError::OperationError(e.to_string()))?;
    Ok(output)
}

/// Intrinsic page size, following the page-tree Parent chain for an
/// inherited MediaBox. Pages with no resolvable box fall back to Letter.
fn source_page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let mut current = page_id;
    for _ in 0..MAX_PARENT_DEPTH {
        let Ok(dict) = doc.get_dictionary(current) else {
            break;
        };
        if let Ok(Object::Array(rect)) = dict.get(b"MediaBox") {
            if let Some(size) = rect_size(rect) {
                return size;
            }
        }
        match dict.get(b"Parent").and_then(|parent| parent.as_reference()) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    tracing::debug!("Page {:?} has no resolvable MediaBox, assuming Letter", page_id);
    (PageSize::LETTER.width, PageSize::LETTER.height)
}

fn rect_size(rect: &[Object]) -> Option<(f64, f64)> {
    if rect.len() != 4 {
        return None;
    }
    let nums: Vec<f64> = rect.iter().filter_map(number).collect();
    if nums.len() != 4 {
        return None;
    }
    let width = (nums[2] - nums[0]).abs();
    let height = (nums[3] - nums[1]).abs();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((width, height))
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn set_target_box(
    doc: &mut Document,
    page_id: ObjectId,
    target: PageSize,
) -> Result<(), ComposeError> {
    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| ComposeError::OperationError(e.to_string()))?;
    if let Object::Dictionary(ref mut dict) = page {
        dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(target.width as f32),
                Object::Real(target.height as f32),
            ]),
        );
        // A stale CropBox would clip the recentered content.
        dict.remove(b"CropBox");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper to create a PDF whose pages all share one media box.
    fn create_test_pdf(num_pages: u32, width: f64, height: f64) -> Vec<u8> {
        use lopdf::{dictionary, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for page_num in 0..num_pages {
            let content = format!("BT /F1 12 Tf 50 700 Td (Page-{}) Tj ET", page_num + 1);
            let content_id = doc.add_object(Stream::new(
                lopdf::Dictionary::new(),
                content.into_bytes(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(width as f32),
                    Object::Real(height as f32),
                ],
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Count" => num_pages as i64,
                "Kids" => kids,
            }),
        );
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn page_media_box(doc: &Document, page_id: ObjectId) -> (f64, f64) {
        source_page_size(doc, page_id)
    }

    #[test]
    fn test_invalid_bytes_are_a_parse_error() {
        let result = build_print_ready(b"definitely not a pdf");
        assert!(matches!(result, Err(ComposeError::ParseError(_))));
    }

    #[test]
    fn test_output_pages_are_letter_sized() {
        let source = create_test_pdf(3, 595.0, 842.0);
        let output = build_print_ready(&source).unwrap();
        assert!(output.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&output).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);
        for page_id in pages.values() {
            assert_eq!(page_media_box(&doc, *page_id), (612.0, 792.0));
        }
    }

    #[test]
    fn test_rescaled_page_content_is_wrapped() {
        let source = create_test_pdf(1, 595.0, 842.0);
        let output = build_print_ready(&source).unwrap();

        let doc = Document::load_mem(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        assert!(content.starts_with(b"q\n"));
        assert!(content.ends_with(b"\nQ"));
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains(" cm\n"));
        assert!(text.contains("Page-1"));
    }

    #[test]
    fn test_letter_page_passes_through_unwrapped() {
        let source = create_test_pdf(1, 612.0, 792.0);
        let output = build_print_ready(&source).unwrap();

        let doc = Document::load_mem(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        assert!(!content.starts_with(b"q\n"));
        assert!(String::from_utf8_lossy(&content).contains("Page-1"));
    }

    #[test]
    fn test_mixed_sizes_are_handled_per_page() {
        use lopdf::{dictionary, Stream};

        // One Letter page and one oversized page in the same document.
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for (width, height) in [(612.0f64, 792.0f64), (1224.0, 1584.0)] {
            let content_id = doc.add_object(Stream::new(
                lopdf::Dictionary::new(),
                b"BT /F1 12 Tf 10 10 Td (x) Tj ET".to_vec(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(width as f32),
                    Object::Real(height as f32),
                ],
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 2,
                "Kids" => kids,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut source = Vec::new();
        doc.save_to(&mut source).unwrap();

        let output = build_print_ready(&source).unwrap();
        let out_doc = Document::load_mem(&output).unwrap();
        let pages: Vec<ObjectId> = out_doc.get_pages().values().copied().collect();
        assert_eq!(pages.len(), 2);

        let first = out_doc.get_page_content(pages[0]).unwrap();
        assert!(!first.starts_with(b"q\n"));
        let second = out_doc.get_page_content(pages[1]).unwrap();
        assert!(second.starts_with(b"q\n"));
        // Oversized page is exactly halved.
        assert!(String::from_utf8_lossy(&second).contains("0.500000 0 0 0.500000"));
    }

    #[test]
    fn test_inherited_media_box_is_resolved() {
        use lopdf::{dictionary, Stream};

        // MediaBox lives on the Pages node, not the page itself.
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            b"BT /F1 12 Tf 10 10 Td (x) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1,
                "Kids" => vec![Object::Reference(page_id)],
                "MediaBox" => vec![0.into(), 0.into(), 1224.into(), 1584.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut source = Vec::new();
        doc.save_to(&mut source).unwrap();

        let output = build_print_ready(&source).unwrap();
        let out_doc = Document::load_mem(&output).unwrap();
        let out_page = *out_doc.get_pages().values().next().unwrap();
        let content = out_doc.get_page_content(out_page).unwrap();
        assert!(content.starts_with(b"q\n"));
        // The page now carries its own Letter box.
        assert_eq!(source_page_size(&out_doc, out_page), (612.0, 792.0));
    }

    #[test]
    fn test_output_is_reparseable() {
        let source = create_test_pdf(5, 300.0, 500.0);
        let output = build_print_ready(&source).unwrap();
        let doc = Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }
}
