//! JavaScript detection
//!
//! Read-only traversal answering whether any JavaScript action is reachable
//! from the document root. A generic recursive scan covers the whole graph;
//! explicit checks of the canonical locations (open action, name tree, page
//! actions, annotation actions) back it up as defense in depth.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;

use crate::core::classifier::{dictionary_is_javascript, is_javascript_action};
use crate::document::{self, resolve};
use crate::error::Result;

/// Dictionary keys whose values are actions worth classifying during the
/// generic scan.
const ACTION_KEYS: [&[u8]; 3] = [b"A", b"AA", b"OpenAction"];

/// Page-level additional action triggers (page open, page close).
const PAGE_TRIGGERS: [&[u8]; 2] = [b"O", b"C"];

/// Annotation-level additional action triggers.
pub(crate) const ANNOTATION_TRIGGERS: [&[u8]; 10] =
    [b"E", b"X", b"D", b"U", b"Fo", b"Bl", b"PO", b"PC", b"PV", b"PI"];

/// Where JavaScript was first found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "site", rename_all = "snake_case")]
pub enum Finding {
    /// Hit during the generic reachability scan from the root
    ReachableAction,
    /// Document-level `/OpenAction`
    OpenAction,
    /// `/Names` tree has a `/JavaScript` entry
    NamesTree,
    /// Page `/AA` entry (`O` = open, `C` = close)
    PageAction { page: u32, trigger: String },
    /// Annotation `/A` action
    AnnotationAction { page: u32 },
    /// Annotation `/AA` sub-action
    AnnotationAdditionalAction { page: u32, trigger: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::ReachableAction => write!(f, "JavaScript action reachable from document root"),
            Finding::OpenAction => write!(f, "JavaScript in document OpenAction"),
            Finding::NamesTree => write!(f, "JavaScript name tree in document Names"),
            Finding::PageAction { page, trigger } => {
                write!(f, "JavaScript in page {page} action (/{trigger})")
            }
            Finding::AnnotationAction { page } => {
                write!(f, "JavaScript in annotation action on page {page}")
            }
            Finding::AnnotationAdditionalAction { page, trigger } => {
                write!(f, "JavaScript in annotation additional action (/{trigger}) on page {page}")
            }
        }
    }
}

/// Check whether any JavaScript action is reachable in `doc`.
pub fn document_contains_javascript(doc: &Document) -> bool {
    find_javascript(doc).is_some()
}

/// Locate the first JavaScript action in `doc`, if any.
///
/// Short-circuits on the first confirmed hit. Structural oddities (dangling
/// references, unexpected types) are skipped rather than reported; absence of
/// a finding means nothing was reachable through any recognized shape.
pub fn find_javascript(doc: &Document) -> Option<Finding> {
    // 1. Generic reachability scan from the catalog.
    if let Ok(root) = document::root_id(doc) {
        let mut visited: HashSet<ObjectId> = HashSet::new();
        if scan_object(doc, &Object::Reference(root), &mut visited) {
            return Some(Finding::ReachableAction);
        }
    }

    let catalog = doc.catalog().ok()?;

    // 2. Document-level OpenAction.
    if let Ok(action) = catalog.get(b"OpenAction") {
        if is_javascript_action(doc, action) {
            return Some(Finding::OpenAction);
        }
    }

    // 3. Document-level JavaScript name tree. Mere presence counts.
    if let Ok(names) = catalog.get(b"Names") {
        if let Object::Dictionary(names) = resolve(doc, names) {
            if names.has(b"JavaScript") {
                return Some(Finding::NamesTree);
            }
        }
    }

    // 4. Page-level actions and annotations.
    for (page_number, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };

        if let Ok(page_actions) = page.get(b"AA") {
            if let Object::Dictionary(page_actions) = resolve(doc, page_actions) {
                for trigger in PAGE_TRIGGERS {
                    if let Ok(action) = page_actions.get(trigger) {
                        if is_javascript_action(doc, action) {
                            return Some(Finding::PageAction {
                                page: page_number,
                                trigger: String::from_utf8_lossy(trigger).into_owned(),
                            });
                        }
                    }
                }
            }
        }

        if let Some(finding) = scan_annotations(doc, page, page_number) {
            return Some(finding);
        }
    }

    None
}

fn scan_annotations(doc: &Document, page: &Dictionary, page_number: u32) -> Option<Finding> {
    let annots = page.get(b"Annots").ok()?;
    let Object::Array(annots) = resolve(doc, annots) else {
        return None;
    };

    for annot in annots {
        let Object::Dictionary(annot) = resolve(doc, annot) else {
            continue;
        };

        if let Ok(action) = annot.get(b"A") {
            if is_javascript_action(doc, action) {
                return Some(Finding::AnnotationAction { page: page_number });
            }
        }

        if let Ok(additional) = annot.get(b"AA") {
            if let Object::Dictionary(additional) = resolve(doc, additional) {
                for trigger in ANNOTATION_TRIGGERS {
                    if let Ok(action) = additional.get(trigger) {
                        if is_javascript_action(doc, action) {
                            return Some(Finding::AnnotationAdditionalAction {
                                page: page_number,
                                trigger: String::from_utf8_lossy(trigger).into_owned(),
                            });
                        }
                    }
                }
            }
        }
    }

    None
}

/// Recursive reachability scan. Visits every dictionary and array reachable
/// from `object`, keyed by ObjectId to stay cycle safe.
fn scan_object(doc: &Document, object: &Object, visited: &mut HashSet<ObjectId>) -> bool {
    match object {
        Object::Reference(id) => {
            if !visited.insert(*id) {
                return false;
            }
            match doc.get_object(*id) {
                Ok(resolved) => scan_object(doc, resolved, visited),
                Err(_) => false,
            }
        }
        Object::Dictionary(dict) => scan_dictionary(doc, dict, visited),
        Object::Stream(stream) => scan_dictionary(doc, &stream.dict, visited),
        Object::Array(items) => items.iter().any(|item| scan_object(doc, item, visited)),
        Object::Name(_)
        | Object::String(..)
        | Object::Integer(_)
        | Object::Real(_)
        | Object::Boolean(_)
        | Object::Null => false,
    }
}

fn scan_dictionary(doc: &Document, dict: &Dictionary, visited: &mut HashSet<ObjectId>) -> bool {
    if dictionary_is_javascript(doc, dict) {
        return true;
    }

    for (key, value) in dict.iter() {
        if ACTION_KEYS.contains(&key.as_slice()) && is_javascript_action(doc, value) {
            return true;
        }
        if scan_object(doc, value, visited) {
            return true;
        }
    }

    false
}

/// Check a PDF file on disk for JavaScript, surfacing the finding and any
/// open error to the caller.
pub fn check_file(path: &Path) -> Result<Option<Finding>> {
    log::info!("Starting JavaScript check for: {}", path.display());
    let doc = document::open(path)?;
    let finding = find_javascript(&doc);
    match &finding {
        Some(finding) => log::warn!("{} in {}", finding, path.display()),
        None => log::info!("No obvious JavaScript found in {}", path.display()),
    }
    Ok(finding)
}

/// Fail-safe boolean boundary: `true` only when JavaScript was positively
/// found. Open failures (missing file, password protection, malformed
/// structure) collapse to `false` with the cause logged, so absence of a
/// finding does not certify a document that could not be opened.
pub fn contains_javascript(path: &Path) -> bool {
    match check_file(path) {
        Ok(finding) => finding.is_some(),
        Err(err) => {
            log::error!("Cannot check {}: {}", path.display(), err);
            false
        }
    }
}
