use crate::ast::SourceLocation;

/// Maps byte offsets in a source text to line/column positions.
///
/// Line starts are collected once up front; lookups are a binary search plus
/// a scalar-value count over the line prefix, so columns are counted in
/// characters rather than bytes.
pub struct LineIndex<'src> {
    source:      &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    /// Builds the index for `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }

        Self { source, line_starts }
    }

    /// Returns the zero-indexed (line, column) of a byte offset.
    ///
    /// Offsets past the end of the source report the position just after the
    /// final character.
    #[must_use]
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = self.line_starts
                       .partition_point(|&start| start <= offset)
                       .saturating_sub(1);
        let column = self.source[self.line_starts[line]..offset].chars().count();

        (line, column)
    }

    /// Returns the 1-based [`SourceLocation`] of a byte offset.
    #[must_use]
    pub fn location(&self, offset: usize) -> SourceLocation {
        let (line, column) = self.position(offset);
        SourceLocation::new(line + 1, column + 1)
    }
}
