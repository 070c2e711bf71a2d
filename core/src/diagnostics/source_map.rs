/// 1-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
    pub line: usize,
    pub col: usize,
}

/// Maps byte offsets in a source text back to lines.
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_offsets: Vec<usize>,
}

impl SourceMap {
    pub fn from_source(source: &str) -> Self {
        let line_offsets = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { line_offsets }
    }

    pub fn byte_to_pos(&self, byte: usize) -> SourcePos {
        let line_idx = self
            .line_offsets
            .partition_point(|&start| start <= byte)
            .saturating_sub(1);
        let line_start = self.line_offsets.get(line_idx).copied().unwrap_or(0);
        SourcePos {
            line: line_idx + 1,
            col: byte - line_start + 1,
        }
    }
}
