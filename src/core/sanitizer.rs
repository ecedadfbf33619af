//! JavaScript removal (single pass)
//!
//! Mutating traversal that strips JavaScript actions in place. Indirect
//! objects are detached from the document's object table while they are
//! rewritten and reinserted afterwards; combined with the per-pass visited
//! set this keeps cyclic graphs from looping. All deletions follow a strict
//! collect-then-apply discipline: target keys and indices are recorded during
//! the scan of a collection and removed only after that scan completes.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::core::classifier::is_javascript_action;

/// Run one sanitization pass over the indirect object `id`.
///
/// Returns whether anything was mutated. `visited` is the per-pass cycle
/// guard; objects already in it are skipped without descending.
pub fn sanitize_indirect(
    doc: &mut Document,
    id: ObjectId,
    visited: &mut HashSet<ObjectId>,
) -> bool {
    if !visited.insert(id) {
        log::debug!("Skipping already visited object {} {}", id.0, id.1);
        return false;
    }
    // Detach while rewriting so child recursion can borrow the document. An
    // object held by an ancestor call is absent here, which also stops
    // re-entry through reference cycles.
    let Some(mut object) = doc.objects.remove(&id) else {
        return false;
    };
    let changed = sanitize_object(doc, &mut object, visited);
    doc.objects.insert(id, object);
    changed
}

/// Sanitize a single graph node in place. Dispatches on the node kind;
/// scalars are untouched.
pub fn sanitize_object(
    doc: &mut Document,
    object: &mut Object,
    visited: &mut HashSet<ObjectId>,
) -> bool {
    match object {
        Object::Reference(id) => sanitize_indirect(doc, *id, visited),
        Object::Dictionary(dict) => sanitize_dictionary(doc, dict, visited),
        Object::Stream(stream) => sanitize_dictionary(doc, &mut stream.dict, visited),
        Object::Array(items) => sanitize_array(doc, items, visited),
        Object::Name(_)
        | Object::String(..)
        | Object::Integer(_)
        | Object::Real(_)
        | Object::Boolean(_)
        | Object::Null => false,
    }
}

fn sanitize_dictionary(
    doc: &mut Document,
    dict: &mut Dictionary,
    visited: &mut HashSet<ObjectId>,
) -> bool {
    let mut changed = false;
    let mut doomed: Vec<Vec<u8>> = Vec::new();

    // Snapshot the keys; the dictionary is only mutated after the scan.
    let keys: Vec<Vec<u8>> = dict.iter().map(|(key, _)| key.to_vec()).collect();
    for key in keys {
        match key.as_slice() {
            b"A" | b"OpenAction" => {
                let is_action = dict
                    .get(&key)
                    .map(|value| is_javascript_action(doc, value))
                    .unwrap_or(false);
                if is_action {
                    // Delete the key outright; never descend into the
                    // removed value.
                    log::debug!("Removing /{} JavaScript action", String::from_utf8_lossy(&key));
                    doomed.push(key);
                    changed = true;
                } else if let Ok(value) = dict.get_mut(&key) {
                    changed |= sanitize_object(doc, value, visited);
                }
            }
            b"AA" => {
                changed |= sanitize_additional_actions(doc, dict, visited, &mut doomed);
            }
            b"Names" => {
                changed |= sanitize_name_trees(doc, dict, visited);
            }
            _ => {
                if let Ok(value) = dict.get_mut(&key) {
                    changed |= sanitize_object(doc, value, visited);
                }
            }
        }
    }

    for key in doomed {
        dict.remove(&key);
    }
    changed
}

/// Scrub an `/AA` (additional actions) dictionary: JavaScript sub-entries are
/// deleted, everything else is recursed into. When the scrub empties the
/// dictionary, the `/AA` key itself is marked for removal from the parent.
fn sanitize_additional_actions(
    doc: &mut Document,
    parent: &mut Dictionary,
    visited: &mut HashSet<ObjectId>,
    doomed_parent_keys: &mut Vec<Vec<u8>>,
) -> bool {
    match parent.get_mut(b"AA") {
        Ok(Object::Dictionary(additional)) => {
            let (changed, emptied) = scrub_additional_actions(doc, additional, visited);
            if changed && emptied {
                log::debug!("Removing emptied /AA dictionary");
                doomed_parent_keys.push(b"AA".to_vec());
            }
            changed
        }
        Ok(Object::Reference(id)) => {
            let id = *id;
            // Detached-object path for an indirect /AA dictionary. A
            // reference back into an ancestor resolves to nothing and is
            // left alone this pass.
            let Some(mut target) = doc.objects.remove(&id) else {
                return false;
            };
            let mut emptied = false;
            let changed = match &mut target {
                Object::Dictionary(additional) => {
                    let result = scrub_additional_actions(doc, additional, visited);
                    emptied = result.1;
                    result.0
                }
                other => sanitize_object(doc, other, visited),
            };
            doc.objects.insert(id, target);
            if changed && emptied {
                log::debug!("Removing /AA key for emptied indirect dictionary {} {}", id.0, id.1);
                doomed_parent_keys.push(b"AA".to_vec());
            }
            changed
        }
        // Any other shape gets the generic treatment so nested containers
        // are still cleaned.
        Ok(other) => sanitize_object(doc, other, visited),
        Err(_) => false,
    }
}

fn scrub_additional_actions(
    doc: &mut Document,
    additional: &mut Dictionary,
    visited: &mut HashSet<ObjectId>,
) -> (bool, bool) {
    let mut changed = false;
    let mut doomed: Vec<Vec<u8>> = Vec::new();

    let triggers: Vec<Vec<u8>> = additional.iter().map(|(key, _)| key.to_vec()).collect();
    for trigger in triggers {
        let is_action = additional
            .get(&trigger)
            .map(|value| is_javascript_action(doc, value))
            .unwrap_or(false);
        if is_action {
            log::debug!(
                "Removing /AA sub-action /{}",
                String::from_utf8_lossy(&trigger)
            );
            doomed.push(trigger);
            changed = true;
        } else if let Ok(value) = additional.get_mut(&trigger) {
            changed |= sanitize_object(doc, value, visited);
        }
    }

    for trigger in doomed {
        additional.remove(&trigger);
    }
    (changed, additional.is_empty())
}

/// Remove a `/JavaScript` entry from a `/Names` dictionary. Its mere
/// presence is disallowed, whatever its contents. The rest of the name tree
/// is still recursed into since it may hold unrelated nested containers.
fn sanitize_name_trees(
    doc: &mut Document,
    parent: &mut Dictionary,
    visited: &mut HashSet<ObjectId>,
) -> bool {
    match parent.get_mut(b"Names") {
        Ok(Object::Dictionary(names)) => {
            let mut changed = false;
            if names.remove(b"JavaScript").is_some() {
                log::info!("Removed /JavaScript name tree");
                changed = true;
            }
            changed |= sanitize_dictionary(doc, names, visited);
            changed
        }
        Ok(Object::Reference(id)) => {
            let id = *id;
            let Some(mut target) = doc.objects.remove(&id) else {
                return false;
            };
            let changed = match &mut target {
                Object::Dictionary(names) => {
                    let mut changed = false;
                    if names.remove(b"JavaScript").is_some() {
                        log::info!("Removed /JavaScript name tree from object {} {}", id.0, id.1);
                        changed = true;
                    }
                    if visited.insert(id) {
                        changed |= sanitize_dictionary(doc, names, visited);
                    }
                    changed
                }
                other => sanitize_object(doc, other, visited),
            };
            doc.objects.insert(id, target);
            changed
        }
        // Tree-node /Names can also be a flat `[key value ...]` leaf array;
        // recurse generically so actions stored as values are still removed.
        Ok(other) => sanitize_object(doc, other, visited),
        Err(_) => false,
    }
}

fn sanitize_array(
    doc: &mut Document,
    items: &mut Vec<Object>,
    visited: &mut HashSet<ObjectId>,
) -> bool {
    let mut changed = false;
    let mut doomed: Vec<usize> = Vec::new();

    for index in 0..items.len() {
        if is_javascript_action(doc, &items[index]) {
            log::debug!("Removing JavaScript action at array index {index}");
            doomed.push(index);
            changed = true;
        } else {
            changed |= sanitize_object(doc, &mut items[index], visited);
        }
    }

    // Highest index first so earlier removals cannot shift later targets.
    for index in doomed.into_iter().rev() {
        items.remove(index);
    }
    changed
}
