use crate::templates::KNOWN_TABLES;
use analyst_protocol::DocChunk;

/// Tables named in `sql` (in fixed order), then every retrieved chunk id, without repeats.
#[must_use]
pub fn collect(sql: &str, docs: &[DocChunk]) -> Vec<String> {
    let mut citations: Vec<String> = Vec::new();
    if !sql.is_empty() {
        let lowered = sql.to_lowercase();
        citations.extend(
            KNOWN_TABLES
                .iter()
                .filter(|table| lowered.contains(&table.to_lowercase()))
                .map(|table| (*table).to_string()),
        );
    }
    for doc in docs {
        if !citations.contains(&doc.chunk_id) {
            citations.push(doc.chunk_id.clone());
        }
    }
    citations
}
