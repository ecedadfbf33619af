//! JavaScript action classification
//!
//! A dictionary denotes a JavaScript action iff its `/S` entry is the name
//! `JavaScript`. An array of actions qualifies when any member qualifies.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::document::resolve;

/// Check whether a PDF object is a JavaScript action dictionary or an array
/// containing one.
///
/// Pure and read-only. References are resolved through the document; a
/// per-invocation visited set keeps cyclic reference chains bounded.
pub fn is_javascript_action(doc: &Document, object: &Object) -> bool {
    let mut seen: HashSet<ObjectId> = HashSet::new();
    classify(doc, object, &mut seen)
}

/// Check whether a dictionary itself is a JavaScript action (`/S` entry,
/// resolved, equals the name `JavaScript`).
pub fn dictionary_is_javascript(doc: &Document, dict: &Dictionary) -> bool {
    match dict.get(b"S") {
        Ok(subtype) => matches!(resolve(doc, subtype), Object::Name(name) if name == b"JavaScript"),
        Err(_) => false,
    }
}

fn classify(doc: &Document, object: &Object, seen: &mut HashSet<ObjectId>) -> bool {
    match object {
        Object::Reference(id) => {
            if !seen.insert(*id) {
                return false;
            }
            match doc.get_object(*id) {
                Ok(resolved) => classify(doc, resolved, seen),
                Err(_) => false,
            }
        }
        Object::Dictionary(dict) => dictionary_is_javascript(doc, dict),
        Object::Array(items) => items.iter().any(|item| classify(doc, item, seen)),
        _ => false,
    }
}
