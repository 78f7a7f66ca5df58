use crate::models::Row;

pub const TAB: &str = "\t";
pub const PIPE: &str = "|";

/// Renders one row as a line of text.
pub trait RowFormatter {
    /// Header lines carry the row's tags, data lines its values.
    fn format(&self, row: &Row, is_header: bool) -> String;
}

/// Joins cells with a fixed separator. Embedded separators are not escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedFormatter {
    separator: String,
}

impl DelimitedFormatter {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn tab() -> Self {
        Self::new(TAB)
    }

    pub fn pipe() -> Self {
        Self::new(PIPE)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for DelimitedFormatter {
    fn default() -> Self {
        Self::tab()
    }
}

impl RowFormatter for DelimitedFormatter {
    fn format(&self, row: &Row, is_header: bool) -> String {
        let cells: Vec<&str> = match is_header {
            true => row.tags().collect(),
            false => row.values().collect(),
        };
        cells.join(self.separator.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::test_helpers::mock_row;

    #[test]
    fn test_pipe_header_and_values() {
        let row = mock_row(&[("A", "1"), ("B", "2")]);
        let formatter = DelimitedFormatter::pipe();
        assert_eq!(formatter.format(&row, true), "A|B");
        assert_eq!(formatter.format(&row, false), "1|2");
    }

    #[test]
    fn test_tab_header_and_values() {
        let row = mock_row(&[("name", "Ann"), ("amt", "10"), ("note", "")]);
        let formatter = DelimitedFormatter::default();
        assert_eq!(formatter.format(&row, true), "name\tamt\tnote");
        assert_eq!(formatter.format(&row, false), "Ann\t10\t");
    }

    #[test]
    fn test_multi_character_separator() {
        let row = mock_row(&[("a", "x"), ("b", "y")]);
        assert_eq!(DelimitedFormatter::new(" :: ").format(&row, false), "x :: y");
    }

    #[test]
    fn test_empty_row_formats_to_empty_string() {
        let formatter = DelimitedFormatter::pipe();
        assert_eq!(formatter.format(&Row::new(), true), "");
        assert_eq!(formatter.format(&Row::new(), false), "");
    }

    #[test]
    fn test_embedded_separator_is_not_escaped() {
        let row = mock_row(&[("memo", "a|b"), ("amt", "1\n2")]);
        assert_eq!(DelimitedFormatter::pipe().format(&row, false), "a|b|1\n2");
    }
}
