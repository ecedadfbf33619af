//! Document model access
//!
//! Thin wrappers around lopdf for opening and saving documents with a
//! distinguishable error taxonomy, plus reference resolution helpers shared
//! by the detector and sanitizer.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::{Result, SanitizeError};

/// Reference chains deeper than this are treated as malformed and left
/// unresolved rather than followed further.
const MAX_REFERENCE_HOPS: usize = 16;

/// Quick pre-validation before attempting a full parse.
/// Checks the PDF magic bytes and the EOF marker in the last 1KB.
fn quick_validate(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;

    let mut header = [0u8; 8];
    if file.read_exact(&mut header).is_err() {
        return Ok(false);
    }
    if &header[0..5] != b"%PDF-" {
        return Ok(false);
    }

    let file_size = file.metadata()?.len();
    let tail_size = std::cmp::min(1024, file_size);
    file.seek(SeekFrom::End(-(tail_size as i64)))?;
    let mut tail = vec![0u8; tail_size as usize];
    file.read_exact(&mut tail)?;

    Ok(tail.windows(5).any(|w| w == b"%%EOF"))
}

/// Open a PDF document from disk.
///
/// # Errors
/// * [`SanitizeError::InputNotFound`] when the path does not exist
/// * [`SanitizeError::PasswordProtected`] when the document is encrypted
/// * [`SanitizeError::Structural`] when the file cannot be parsed as a PDF
pub fn open(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(SanitizeError::InputNotFound(path.to_path_buf()));
    }

    match quick_validate(path) {
        Ok(true) => {}
        Ok(false) => {
            log::debug!("{}: missing %PDF- header or %%EOF marker", path.display());
            return Err(SanitizeError::Structural(lopdf::Error::from(
                std::io::Error::new(std::io::ErrorKind::InvalidData, "not a PDF file"),
            )));
        }
        Err(e) => return Err(SanitizeError::Structural(lopdf::Error::from(e))),
    }

    let doc = Document::load(path)?;
    if doc.is_encrypted() {
        return Err(SanitizeError::PasswordProtected(path.to_path_buf()));
    }
    Ok(doc)
}

/// Save a (possibly mutated) document to `path`.
pub fn save(doc: &mut Document, path: &Path) -> Result<()> {
    doc.save(path).map_err(|source| SanitizeError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Follow indirect references until a concrete object is reached.
///
/// Dangling references and over-long chains resolve to the last object seen,
/// so callers always get something to classify against.
pub fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> &'a Object {
    let mut hops = 0;
    while let Object::Reference(id) = object {
        if hops >= MAX_REFERENCE_HOPS {
            break;
        }
        match doc.get_object(*id) {
            Ok(next) => object = next,
            Err(_) => break,
        }
        hops += 1;
    }
    object
}

/// The object id of the document catalog (`/Root` in the trailer).
pub fn root_id(doc: &Document) -> Result<ObjectId> {
    Ok(doc.trailer.get(b"Root")?.as_reference()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn open_missing_file_reports_input_not_found() {
        let err = open(Path::new("/nonexistent/input.pdf")).unwrap_err();
        assert!(matches!(err, SanitizeError::InputNotFound(_)));
    }

    #[test]
    fn open_non_pdf_reports_structural_error() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"this is not a pdf at all, just text").unwrap();
        temp.flush().unwrap();

        let err = open(temp.path()).unwrap_err();
        assert!(matches!(err, SanitizeError::Structural(_)));
    }

    #[test]
    fn save_to_unwritable_path_reports_output_write_error() {
        let mut doc = Document::with_version("1.7");
        let catalog_id = doc.add_object(Object::Dictionary(dictionary! {
            "Type" => "Catalog",
        }));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let err = save(&mut doc, Path::new("/nonexistent_dir/out.pdf")).unwrap_err();
        assert!(matches!(err, SanitizeError::OutputWrite { .. }));
    }

    #[test]
    fn resolve_follows_reference_chains() {
        let mut doc = Document::with_version("1.7");
        let name_id = doc.add_object(Object::Name(b"JavaScript".to_vec()));
        let indirect_id = doc.add_object(Object::Reference(name_id));

        let reference = Object::Reference(indirect_id);
        let resolved = resolve(&doc, &reference);
        assert_eq!(resolved.as_name().ok(), Some(b"JavaScript".as_slice()));
    }

    #[test]
    fn resolve_terminates_on_reference_cycle() {
        let mut doc = Document::with_version("1.7");
        let a = doc.new_object_id();
        let b = doc.new_object_id();
        doc.objects.insert(a, Object::Reference(b));
        doc.objects.insert(b, Object::Reference(a));

        // Must not loop forever; the unresolved tail is still a reference.
        let reference = Object::Reference(a);
        let resolved = resolve(&doc, &reference);
        assert!(matches!(resolved, Object::Reference(_)));
    }
}
