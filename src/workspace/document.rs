use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::{Position, Url};

#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub language_id: String,
    pub version: i32,
    pub rope: Rope,
    /// Bumped by every edit and every completion request; a lookup whose
    /// generation is no longer current is discarded.
    pub generation: u64,
}

impl Document {
    pub fn new(uri: Url, language_id: String, version: i32, content: &str) -> Self {
        Self {
            uri,
            language_id,
            version,
            rope: Rope::from_str(content),
            generation: 0,
        }
    }

    pub fn apply_full_change(&mut self, version: i32, new_content: &str) {
        self.version = version;
        self.rope = Rope::from_str(new_content);
        self.generation += 1;
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// LSP position (UTF-16 columns) to a byte offset. Columns past the end
    /// of the line clamp to the line end.
    pub fn offset_at(&self, pos: Position) -> Option<usize> {
        let line_idx = pos.line as usize;
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line_start = self.rope.line_to_byte(line_idx);
        let mut units = 0usize;
        let mut bytes = 0usize;
        for ch in self.rope.line(line_idx).chars() {
            if units >= pos.character as usize || ch == '\n' || ch == '\r' {
                break;
            }
            units += ch.len_utf16();
            bytes += ch.len_utf8();
        }
        Some(line_start + bytes)
    }

    /// Byte offset back to an LSP position.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_bytes());
        let char_idx = self.rope.byte_to_char(offset);
        let line = self.rope.char_to_line(char_idx);
        let line_char = self.rope.line_to_char(line);
        let character = self.rope.char_to_utf16_cu(char_idx) - self.rope.char_to_utf16_cu(line_char);
        Position::new(line as u32, character as u32)
    }
}

pub struct DocumentStore {
    docs: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
        }
    }

    pub fn open(&self, doc: Document) {
        self.docs.insert(doc.uri.clone(), doc);
    }

    pub fn update(&self, uri: &Url, version: i32, content: &str) {
        if let Some(mut doc) = self.docs.get_mut(uri) {
            doc.apply_full_change(version, content);
        }
    }

    pub fn close(&self, uri: &Url) {
        self.docs.remove(uri);
    }

    /// Start a completion request: bump the generation and return a snapshot
    /// carrying it.
    pub fn begin_request(&self, uri: &Url) -> Option<Document> {
        let mut doc = self.docs.get_mut(uri)?;
        doc.generation += 1;
        Some(doc.clone())
    }

    /// False once an edit or a newer request has superseded `generation`.
    pub fn is_current(&self, uri: &Url, generation: u64) -> bool {
        self.docs
            .get(uri)
            .is_some_and(|d| d.generation == generation)
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("file:///tmp/Foo.cs").unwrap()
    }

    #[test]
    fn test_offset_position_round_trip() {
        let doc = Document::new(uri(), "csharp".into(), 1, "class A {\n  s.é.x\n}");
        let offset = doc.offset_at(Position::new(1, 5)).unwrap();
        assert_eq!(&doc.text()[offset..offset + 1], ".");
        assert_eq!(doc.position_at(offset), Position::new(1, 5));
        assert_eq!(doc.offset_at(Position::new(9, 0)), None);
    }

    #[test]
    fn test_column_past_line_end_clamps() {
        let doc = Document::new(uri(), "csharp".into(), 1, "ab\ncd");
        assert_eq!(doc.offset_at(Position::new(0, 40)), Some(2));
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let store = DocumentStore::new();
        store.open(Document::new(uri(), "csharp".into(), 1, "class A {}"));
        let first = store.begin_request(&uri()).unwrap().generation;
        assert!(store.is_current(&uri(), first));

        let second = store.begin_request(&uri()).unwrap().generation;
        assert!(!store.is_current(&uri(), first));
        assert!(store.is_current(&uri(), second));

        store.update(&uri(), 2, "class B {}");
        assert!(!store.is_current(&uri(), second), "edits supersede pending lookups");
    }
}
