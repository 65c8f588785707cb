//! Projection of chunks into flat index records.

use crate::models::{Chunk, ChunkRecord};

/// Map a chunk to the record shape the search index ingests.
///
/// Total and pure: a missing heading becomes an empty `title`, every other
/// field is copied as is.
pub fn to_record(chunk: &Chunk) -> ChunkRecord {
    ChunkRecord {
        id: chunk.chunk_id.clone(),
        doc_id: chunk.doc_id.clone(),
        chunk_text: chunk.chunk_text.clone(),
        title: chunk.section_heading.clone().unwrap_or_default(),
        page: chunk.page,
        element_type: chunk.element_type,
        source_file: chunk.source_file.clone(),
    }
}

impl From<&Chunk> for ChunkRecord {
    fn from(chunk: &Chunk) -> Self {
        to_record(chunk)
    }
}

/// Project every chunk, preserving order.
pub fn build_records(chunks: &[Chunk]) -> Vec<ChunkRecord> {
    chunks.iter().map(to_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementType;

    fn chunk(heading: Option<&str>) -> Chunk {
        Chunk {
            chunk_id: "manual_c3".to_string(),
            doc_id: "manual".to_string(),
            chunk_text: "Torque the bolts to 40 Nm.".to_string(),
            page: None,
            element_type: ElementType::Text,
            source_file: "manual.pdf".to_string(),
            section_heading: heading.map(str::to_string),
        }
    }

    #[test]
    fn test_maps_fields() {
        let record = to_record(&chunk(Some("Assembly")));
        assert_eq!(record.id, "manual_c3");
        assert_eq!(record.doc_id, "manual");
        assert_eq!(record.chunk_text, "Torque the bolts to 40 Nm.");
        assert_eq!(record.title, "Assembly");
        assert_eq!(record.page, None);
        assert_eq!(record.element_type, ElementType::Text);
        assert_eq!(record.source_file, "manual.pdf");
    }

    #[test]
    fn test_missing_heading_is_empty_title() {
        assert_eq!(to_record(&chunk(None)).title, "");
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(ChunkRecord::from(&chunk(None))).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "manual_c3",
                "doc_id": "manual",
                "chunk_text": "Torque the bolts to 40 Nm.",
                "title": "",
                "page": null,
                "element_type": "text",
                "source_file": "manual.pdf"
            })
        );
    }

    #[test]
    fn test_build_records_keeps_order() {
        let mut second = chunk(None);
        second.chunk_id = "manual_c4".to_string();
        let records = build_records(&[chunk(Some("A")), second]);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["manual_c3", "manual_c4"]);
    }
}
