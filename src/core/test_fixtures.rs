//! In-memory document fixtures shared by the core unit tests.

use lopdf::{dictionary, Dictionary, Document, Object};

/// Knobs for building a one-page test document.
#[derive(Default)]
pub struct DocumentSpec {
    /// Catalog `/OpenAction` value
    pub open_action: Option<Object>,
    /// Catalog `/Names` dictionary
    pub names: Option<Dictionary>,
    /// Page `/AA` dictionary
    pub page_additional_actions: Option<Dictionary>,
    /// Annotation dictionaries, stored as indirect objects referenced from
    /// the page's `/Annots` array
    pub annotations: Vec<Object>,
}

/// Build a minimal single-page document with a proper catalog and page tree,
/// customized by `spec`.
pub fn minimal_document(spec: DocumentSpec) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
    };
    if let Some(additional) = spec.page_additional_actions {
        page.set("AA", Object::Dictionary(additional));
    }
    if !spec.annotations.is_empty() {
        let refs: Vec<Object> = spec
            .annotations
            .into_iter()
            .map(|annotation| Object::Reference(doc.add_object(annotation)))
            .collect();
        page.set("Annots", Object::Array(refs));
    }
    let page_id = doc.add_object(Object::Dictionary(page));

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(vec![Object::Reference(page_id)]),
            "Count" => Object::Integer(1),
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    };
    if let Some(action) = spec.open_action {
        catalog.set("OpenAction", action);
    }
    if let Some(names) = spec.names {
        catalog.set("Names", Object::Dictionary(names));
    }
    let catalog_id = doc.add_object(Object::Dictionary(catalog));

    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}
