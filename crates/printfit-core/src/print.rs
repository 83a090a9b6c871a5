//! Host-facing print and export actions.
//!
//! Printing hands the composed bytes to the host as a transient object URL,
//! opens its print view, and always releases the URL afterwards. A host that
//! refuses to open the view (pop-up blocking) surfaces a user-visible error
//! and leaves no partial state behind.

use base64::Engine;

use crate::compose::build_print_ready;
use crate::error::ComposeError;

/// Host environment hooks for presenting composed documents.
///
/// Implementations are thin: a browser host maps these onto object URLs and
/// `window.open`, a desktop host onto temp files and the system viewer.
/// Refusals are reported as plain strings at this boundary.
pub trait PrintHost {
    /// Publish bytes under a transient URL the host can display.
    fn create_object_url(&mut self, bytes: &[u8]) -> String;

    /// Open the host's print view for `url`. `Err` carries the refusal
    /// reason.
    fn open_print_view(&mut self, url: &str) -> Result<(), String>;

    /// Release a transient URL created by `create_object_url`.
    fn revoke_object_url(&mut self, url: &str);

    /// Save bytes to disk under `filename`.
    fn save_file(&mut self, filename: &str, bytes: &[u8]) -> Result<(), String>;
}

/// Compose `source` for printing and hand it to the host's print view.
pub fn print_document<H: PrintHost>(host: &mut H, source: &[u8]) -> Result<(), ComposeError> {
    let composed = build_print_ready(source)?;
    let url = host.create_object_url(&composed);
    let opened = host.open_print_view(&url);
    // The URL is transient either way.
    host.revoke_object_url(&url);
    opened.map_err(ComposeError::PrintBlocked)
}

/// Compose `source` and save it under `filename`.
pub fn download_document<H: PrintHost>(
    host: &mut H,
    source: &[u8],
    filename: &str,
) -> Result<(), ComposeError> {
    let composed = build_print_ready(source)?;
    host.save_file(filename, &composed)
        .map_err(ComposeError::SaveFailed)
}

/// A displayable reference to the composed bytes.
pub fn preview_uri(source: &[u8]) -> Result<String, ComposeError> {
    let composed = build_print_ready(source)?;
    Ok(format!(
        "data:application/pdf;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(composed)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal_pdf() -> Vec<u8> {
        use lopdf::{dictionary, Document, Object};

        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[derive(Default)]
    struct RecordingHost {
        block_print_view: bool,
        created: Vec<String>,
        opened: Vec<String>,
        revoked: Vec<String>,
        saved: Vec<(String, usize)>,
    }

    impl PrintHost for RecordingHost {
        fn create_object_url(&mut self, bytes: &[u8]) -> String {
            let url = format!("blob:{}", bytes.len());
            self.created.push(url.clone());
            url
        }

        fn open_print_view(&mut self, url: &str) -> Result<(), String> {
            if self.block_print_view {
                return Err("pop-up blocked".to_string());
            }
            self.opened.push(url.to_string());
            Ok(())
        }

        fn revoke_object_url(&mut self, url: &str) {
            self.revoked.push(url.to_string());
        }

        fn save_file(&mut self, filename: &str, bytes: &[u8]) -> Result<(), String> {
            self.saved.push((filename.to_string(), bytes.len()));
            Ok(())
        }
    }

    #[test]
    fn test_print_opens_then_revokes() {
        let mut host = RecordingHost::default();
        print_document(&mut host, &minimal_pdf()).unwrap();
        assert_eq!(host.created.len(), 1);
        assert_eq!(host.opened, host.created);
        assert_eq!(host.revoked, host.created);
    }

    #[test]
    fn test_blocked_print_surfaces_error_and_cleans_up() {
        let mut host = RecordingHost {
            block_print_view: true,
            ..RecordingHost::default()
        };
        let result = print_document(&mut host, &minimal_pdf());
        assert!(matches!(result, Err(ComposeError::PrintBlocked(_))));
        assert!(host.opened.is_empty());
        // The transient URL was still released.
        assert_eq!(host.revoked, host.created);
    }

    #[test]
    fn test_print_with_invalid_source_never_touches_the_host() {
        let mut host = RecordingHost::default();
        let result = print_document(&mut host, b"not a pdf");
        assert!(matches!(result, Err(ComposeError::ParseError(_))));
        assert!(host.created.is_empty());
        assert!(host.revoked.is_empty());
    }

    #[test]
    fn test_download_saves_composed_bytes() {
        let mut host = RecordingHost::default();
        download_document(&mut host, &minimal_pdf(), "packing-slip.pdf").unwrap();
        assert_eq!(host.saved.len(), 1);
        assert_eq!(host.saved[0].0, "packing-slip.pdf");
        assert!(host.saved[0].1 > 0);
    }

    #[test]
    fn test_preview_uri_is_a_pdf_data_uri() {
        let uri = preview_uri(&minimal_pdf()).unwrap();
        assert!(uri.starts_with("data:application/pdf;base64,"));
    }
}
