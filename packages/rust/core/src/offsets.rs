//! Resolution of source points to absolute document offsets.

use copymark_markdown::Point;

/// Maps [`Point`]s of one document to character offsets into its text.
///
/// Offsets and lengths count `char`s, matching string indexing in the
/// client script that slices the text. Line starts are indexed once. Out-of-range lines clamp to the first or
/// last line, and every result clamps to `0..=len`.
#[derive(Debug, Clone)]
pub struct OffsetResolver {
    line_starts: Vec<usize>,
    len: usize,
}

impl OffsetResolver {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for (i, c) in text.chars().enumerate() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
            len = i + 1;
        }
        Self { line_starts, len }
    }

    /// Offset of `point`, or `None` when the point is missing or carries
    /// neither an offset nor a full line/column pair.
    pub fn resolve(&self, point: Option<&Point>) -> Option<usize> {
        let point = point?;
        let len = self.len as i64;

        if let Some(offset) = point.offset {
            return Some(offset.clamp(0, len) as usize);
        }

        let (line, column) = (point.line?, point.column?);
        let last_line = self.line_starts.len() as i64 - 1;
        let line_index = line.saturating_sub(1).clamp(0, last_line) as usize;
        let base = self.line_starts[line_index] as i64;

        Some(base.saturating_add(column).saturating_sub(1).clamp(0, len) as usize)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn indexes_line_starts() {
        let resolver = OffsetResolver::new("a\nbc\n");
        assert_eq!(resolver.line_starts, [0, 2, 5]);
        assert_eq!(resolver.len, 5);
    }

    #[test]
    fn indexes_characters_not_bytes() {
        let resolver = OffsetResolver::new("é\nbc");
        assert_eq!(resolver.line_starts, [0, 2]);
        assert_eq!(resolver.len, 4);
    }

    #[rstest]
    #[case::second_line(2, 2, 3)]
    #[case::first_char(1, 1, 0)]
    #[case::line_clamped_low(0, 1, 0)]
    #[case::line_clamped_high(40, 1, 5)]
    #[case::column_zero(1, 0, 0)]
    #[case::column_past_end(2, 99, 5)]
    #[case::negative_column(2, -10, 0)]
    fn resolves_line_column(#[case] line: i64, #[case] column: i64, #[case] expected: usize) {
        let resolver = OffsetResolver::new("a\nbc\n");
        let point = Point::line_column(line, column);
        assert_eq!(resolver.resolve(Some(&point)), Some(expected));
    }

    #[rstest]
    #[case(3, 3)]
    #[case(0, 0)]
    #[case(-4, 0)]
    #[case(100, 5)]
    fn explicit_offset_is_clamped(#[case] offset: i64, #[case] expected: usize) {
        let resolver = OffsetResolver::new("a\nbc\n");
        assert_eq!(resolver.resolve(Some(&Point::offset(offset))), Some(expected));
    }

    #[rstest]
    #[case::offset_past_end(Point::offset(100), 4)]
    #[case::second_line(Point::line_column(2, 2), 3)]
    #[case::column_past_end(Point::line_column(2, 9), 4)]
    fn non_ascii_text_clamps_to_char_count(#[case] point: Point, #[case] expected: usize) {
        let resolver = OffsetResolver::new("é\nbc");
        assert_eq!(resolver.resolve(Some(&point)), Some(expected));
    }

    #[test]
    fn offset_wins_over_line_column() {
        let resolver = OffsetResolver::new("a\nbc\n");
        let point = Point {
            line: Some(1),
            column: Some(1),
            offset: Some(4),
        };
        assert_eq!(resolver.resolve(Some(&point)), Some(4));
    }

    #[test]
    fn incomplete_points_are_unresolvable() {
        let resolver = OffsetResolver::new("a\nbc\n");
        assert_eq!(resolver.resolve(None), None);
        assert_eq!(resolver.resolve(Some(&Point::default())), None);

        let line_only = Point {
            line: Some(1),
            ..Point::default()
        };
        assert_eq!(resolver.resolve(Some(&line_only)), None);
    }

    #[test]
    fn empty_text_resolves_to_zero() {
        let resolver = OffsetResolver::new("");
        assert_eq!(resolver.resolve(Some(&Point::line_column(3, 7))), Some(0));
    }
}
