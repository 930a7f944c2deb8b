//! # Test Document
//!
//! The document written and read back by the sanity test, and the field
//! checks applied to what MongoDB returns.

use crate::error::SanityError;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// Document inserted by the sanity test
///
/// `_id` is assigned by the server and ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDocument {
    pub name: String,
    pub age: i32,
    pub profession: String,
}

impl TestDocument {
    /// The literal document every run writes
    #[must_use]
    pub fn expected() -> Self {
        Self {
            name: "Alice".to_string(),
            age: 25,
            profession: "Engineer".to_string(),
        }
    }

    /// Filter matching this document by its discriminating field
    #[must_use]
    pub fn filter(&self) -> Document {
        doc! { "name": &self.name }
    }
}

/// Check a fetched document against the expected one
///
/// Fields are checked in order (name, age, profession) and the first
/// mismatch is reported.
///
/// # Errors
/// Returns [`SanityError::Assertion`] if the document is missing or any
/// field differs.
pub fn verify_document(
    found: Option<&TestDocument>,
    expected: &TestDocument,
) -> Result<(), SanityError> {
    let Some(found) = found else {
        return Err(SanityError::assertion(
            "Document was not inserted correctly.",
        ));
    };

    if found.name != expected.name {
        return Err(SanityError::assertion(format!(
            "Name mismatch. expected '{}', got '{}'",
            expected.name, found.name
        )));
    }
    if found.age != expected.age {
        return Err(SanityError::assertion(format!(
            "Age mismatch. expected {}, got {}",
            expected.age, found.age
        )));
    }
    if found.profession != expected.profession {
        return Err(SanityError::assertion(format!(
            "Profession mismatch. expected '{}', got '{}'",
            expected.profession, found.profession
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_document() {
        let expected = TestDocument::expected();
        assert_eq!(expected.name, "Alice");
        assert_eq!(expected.age, 25);
        assert_eq!(expected.profession, "Engineer");
    }

    #[test]
    fn test_filter_uses_name() {
        let filter = TestDocument::expected().filter();
        assert_eq!(filter, doc! { "name": "Alice" });
    }

    #[test]
    fn test_bson_shape() {
        let bson = mongodb::bson::to_document(&TestDocument::expected()).unwrap();
        assert_eq!(
            bson,
            doc! { "name": "Alice", "age": 25_i32, "profession": "Engineer" }
        );
    }

    #[test]
    fn test_server_id_is_ignored_on_read() {
        let stored = doc! {
            "_id": mongodb::bson::oid::ObjectId::new(),
            "name": "Alice",
            "age": 25_i32,
            "profession": "Engineer",
        };
        let parsed: TestDocument = mongodb::bson::from_document(stored).unwrap();
        assert_eq!(parsed, TestDocument::expected());
    }
}
