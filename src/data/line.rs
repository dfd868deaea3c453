/// What a raw input line is, as far as segmentation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Comment,
    Blank,
    Data,
}

/// Classify one line of input.
///
/// A whitespace-only (or empty) line is [`LineKind::Blank`]; otherwise the line
/// is a [`LineKind::Comment`] when its first non-whitespace character is `#`.
pub fn classify_line(line: &str) -> LineKind {
    match line.trim_start().chars().next() {
        None => LineKind::Blank,
        Some('#') => LineKind::Comment,
        Some(_) => LineKind::Data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_lines_are_blank() {
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line("   \t "), LineKind::Blank);
        assert_eq!(classify_line("\r"), LineKind::Blank);
    }

    #[test]
    fn hash_after_whitespace_is_comment() {
        assert_eq!(classify_line("# timeseries"), LineKind::Comment);
        assert_eq!(classify_line("   #indented"), LineKind::Comment);
    }

    #[test]
    fn hash_inside_a_line_is_data() {
        assert_eq!(classify_line("a 1 2 # trailing"), LineKind::Data);
        assert_eq!(classify_line(" walk 0.5"), LineKind::Data);
    }
}
