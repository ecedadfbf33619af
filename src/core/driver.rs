//! Multi-pass sanitization
//!
//! A single pass can delete an action whose removal exposes further cleanup
//! work (an `/AA` dictionary emptied into a removable key, or an annotation
//! reached through a different reference path than the root scan took).
//! Repeating passes until one makes no changes converges on a stable fixed
//! point instead of settling for a single best-effort sweep.

use std::collections::HashSet;
use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use serde::Serialize;

use crate::core::sanitizer::{sanitize_indirect, sanitize_object};
use crate::document;
use crate::error::{Result, SanitizeError};

/// Safety limit on sanitization passes.
pub const MAX_SANITIZE_PASSES: usize = 10;

/// Result of running sanitization to convergence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeOutcome {
    /// Whether any mutation happened across all passes
    pub changed: bool,
    /// Number of passes executed
    pub passes: usize,
    /// Whether the pass budget ran out before a pass made no changes.
    /// Treated as "possibly unstable structure", not as an error.
    pub reached_pass_limit: bool,
}

/// Remove JavaScript actions from `doc`, repeating passes until a pass makes
/// no changes or `max_passes` is exhausted.
pub fn sanitize_document(doc: &mut Document, max_passes: usize) -> Result<SanitizeOutcome> {
    let root = document::root_id(doc)?;
    let mut changed = false;

    for pass in 1..=max_passes {
        log::debug!("Starting removal pass {pass}");
        // Fresh visited set every pass: structural changes from the previous
        // pass may expose the same object to a new scan.
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut pass_changed = sanitize_indirect(doc, root, &mut visited);

        // Independently re-scan each page's annotations. The root scan
        // usually covers them, but shared references do not guarantee a
        // single canonical traversal path to every annotation.
        pass_changed |= sanitize_page_annotations(doc, &mut visited);

        if pass_changed {
            log::info!("Changes made during removal pass {pass}");
            changed = true;
        } else {
            log::debug!("No changes made during removal pass {pass}, stopping");
            return Ok(SanitizeOutcome { changed, passes: pass, reached_pass_limit: false });
        }
    }

    log::warn!(
        "Removal reached maximum passes ({max_passes}); structure may still be unstable"
    );
    Ok(SanitizeOutcome { changed: true, passes: max_passes, reached_pass_limit: true })
}

/// Run the sanitizer over every annotation of every page individually.
fn sanitize_page_annotations(doc: &mut Document, visited: &mut HashSet<ObjectId>) -> bool {
    let mut changed = false;
    let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    for page_id in pages {
        // The page object is detached so annotation recursion can borrow the
        // document; absent pages (dangling ids) are skipped.
        let Some(mut page_object) = doc.objects.remove(&page_id) else {
            continue;
        };
        if let Object::Dictionary(page) = &mut page_object {
            match page.get_mut(b"Annots") {
                Ok(Object::Array(annotations)) => {
                    for annotation in annotations.iter_mut() {
                        changed |= sanitize_object(doc, annotation, visited);
                    }
                }
                Ok(Object::Reference(annots_id)) => {
                    let annots_id = *annots_id;
                    if let Some(mut annots_object) = doc.objects.remove(&annots_id) {
                        if let Object::Array(annotations) = &mut annots_object {
                            for annotation in annotations.iter_mut() {
                                changed |= sanitize_object(doc, annotation, visited);
                            }
                        }
                        doc.objects.insert(annots_id, annots_object);
                    }
                }
                _ => {}
            }
        }
        doc.objects.insert(page_id, page_object);
    }

    changed
}

/// Sanitize `input` and write the result to `output`, surfacing structured
/// errors. The output file is written whether or not anything changed, so
/// the operation always produces a file on success.
pub fn sanitize_file(input: &Path, output: &Path) -> Result<SanitizeOutcome> {
    if same_path(input, output) {
        return Err(SanitizeError::InvalidInvocation(
            "input and output paths cannot be the same for sanitization".into(),
        ));
    }

    log::info!("Starting JavaScript sanitization for: {}", input.display());
    let mut doc = document::open(input)?;
    let outcome = sanitize_document(&mut doc, MAX_SANITIZE_PASSES)?;

    if outcome.changed {
        log::info!("JavaScript elements neutralized in {} pass(es)", outcome.passes);
    } else {
        log::info!("No JavaScript elements found or removed");
    }

    document::save(&mut doc, output)?;
    log::info!("Sanitized PDF saved to: {}", output.display());
    Ok(outcome)
}

/// Fail-safe boolean boundary around [`sanitize_file`]: any failure to open,
/// sanitize, or save collapses to `false` with the cause logged.
pub fn remove_javascript(input: &Path, output: &Path) -> bool {
    match sanitize_file(input, output) {
        Ok(_) => true,
        Err(err) => {
            log::error!("Error sanitizing {}: {}", input.display(), err);
            false
        }
    }
}

fn same_path(input: &Path, output: &Path) -> bool {
    match (std::path::absolute(input), std::path::absolute(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detector::document_contains_javascript;
    use crate::core::test_fixtures::{minimal_document, DocumentSpec};
    use lopdf::dictionary;

    #[test]
    fn clean_document_converges_in_one_pass() {
        let mut doc = minimal_document(DocumentSpec::default());
        let outcome = sanitize_document(&mut doc, MAX_SANITIZE_PASSES).unwrap();
        assert_eq!(
            outcome,
            SanitizeOutcome { changed: false, passes: 1, reached_pass_limit: false }
        );
    }

    #[test]
    fn open_action_removal_converges_and_detects_clean() {
        let mut doc = minimal_document(DocumentSpec {
            open_action: Some(Object::Dictionary(dictionary! {
                "S" => "JavaScript",
                "JS" => Object::string_literal("app.alert(1)"),
            })),
            ..Default::default()
        });

        let outcome = sanitize_document(&mut doc, MAX_SANITIZE_PASSES).unwrap();
        assert!(outcome.changed);
        assert!(!outcome.reached_pass_limit);
        assert!(!document_contains_javascript(&doc));

        let root = crate::document::root_id(&doc).unwrap();
        assert!(!doc.get_dictionary(root).unwrap().has(b"OpenAction"));
    }

    #[test]
    fn sanitization_is_idempotent() {
        let mut doc = minimal_document(DocumentSpec {
            open_action: Some(Object::Dictionary(dictionary! { "S" => "JavaScript" })),
            names: Some(dictionary! {
                "JavaScript" => Object::Dictionary(dictionary! {}),
            }),
            ..Default::default()
        });

        let first = sanitize_document(&mut doc, MAX_SANITIZE_PASSES).unwrap();
        assert!(first.changed);
        let second = sanitize_document(&mut doc, MAX_SANITIZE_PASSES).unwrap();
        assert!(!second.changed);
    }

    #[test]
    fn nested_additional_action_exposure_converges_within_two_passes() {
        // A page /AA holding a single JavaScript entry: removing it empties
        // /AA, whose emptied presence is itself removed.
        let mut doc = minimal_document(DocumentSpec {
            page_additional_actions: Some(dictionary! {
                "O" => Object::Dictionary(dictionary! { "S" => "JavaScript" }),
            }),
            ..Default::default()
        });

        let outcome = sanitize_document(&mut doc, MAX_SANITIZE_PASSES).unwrap();
        assert!(outcome.changed);
        assert!(outcome.passes <= 2, "expected convergence within two passes");
        for (_, page_id) in doc.get_pages() {
            assert!(!doc.get_dictionary(page_id).unwrap().has(b"AA"));
        }
        assert!(!document_contains_javascript(&doc));
    }

    #[test]
    fn annotation_rescan_cleans_indirect_annotations() {
        let mut doc = minimal_document(DocumentSpec {
            annotations: vec![
                Object::Dictionary(dictionary! {
                    "Subtype" => "Link",
                    "A" => Object::Dictionary(dictionary! { "S" => "JavaScript" }),
                }),
                Object::Dictionary(dictionary! {
                    "Subtype" => "Link",
                    "AA" => Object::Dictionary(dictionary! {
                        "E" => Object::Dictionary(dictionary! { "S" => "JavaScript" }),
                        "Bl" => Object::Dictionary(dictionary! { "S" => "JavaScript" }),
                    }),
                }),
            ],
            ..Default::default()
        });

        let outcome = sanitize_document(&mut doc, MAX_SANITIZE_PASSES).unwrap();
        assert!(outcome.changed);
        assert!(!document_contains_javascript(&doc));
    }

    #[test]
    fn cyclic_action_reference_does_not_hang() {
        let mut doc = minimal_document(DocumentSpec::default());
        let root = crate::document::root_id(&doc).unwrap();
        // /A on an indirect dictionary referring back to its ancestor.
        let looped = doc.new_object_id();
        doc.objects.insert(
            looped,
            Object::Dictionary(dictionary! {
                "A" => Object::Reference(root),
            }),
        );
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(root) {
            catalog.set("Extra", Object::Reference(looped));
        }

        let outcome = sanitize_document(&mut doc, MAX_SANITIZE_PASSES).unwrap();
        assert!(!outcome.reached_pass_limit);
    }

    #[test]
    fn same_input_and_output_paths_are_rejected() {
        let path = Path::new("/tmp/document.pdf");
        let err = sanitize_file(path, path).unwrap_err();
        assert!(matches!(err, SanitizeError::InvalidInvocation(_)));
    }
}
