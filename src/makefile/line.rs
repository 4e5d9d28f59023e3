/// The shape of a single physical Makefile line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment(&'a str),
    Assignment(&'a str),
    TargetHeader(&'a str),
    Recipe(&'a str),
    /// Directives and other syntax we do not model (`include`, `endif`, ...)
    Unsupported(&'a str),
}

/// Classifies one line (without its trailing newline).
///
/// `in_target` tells whether a target header is currently open: inside a
/// target every tab-indented line belongs to its recipe, whatever it contains.
pub fn classify(line: &str, in_target: bool) -> LineKind<'_> {
    let content = line.trim_start();
    if content.trim_end().is_empty() {
        return LineKind::Blank;
    }

    if content.starts_with('#') {
        return LineKind::Comment(line);
    }

    if line.starts_with('\t') {
        // `=` wins over `:` so that `:=` lines are not read as headers
        return if !in_target && line.contains('=') {
            LineKind::Assignment(line)
        } else {
            LineKind::Recipe(line)
        };
    }

    if line.contains('=') {
        LineKind::Assignment(line)
    } else if line.contains(':') {
        LineKind::TargetHeader(line)
    } else {
        LineKind::Unsupported(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(classify("", false), LineKind::Blank);
        assert_eq!(classify(" \t ", true), LineKind::Blank);
        assert_eq!(classify("# hello", false), LineKind::Comment("# hello"));
        assert_eq!(classify("   # indented", false), LineKind::Comment("   # indented"));
    }

    #[test]
    fn assignment_takes_priority_over_header() {
        assert_eq!(classify("CC := gcc", false), LineKind::Assignment("CC := gcc"));
        assert_eq!(classify("app: CFLAGS=-O2", false), LineKind::Assignment("app: CFLAGS=-O2"));
        assert_eq!(classify("LIBS=-lm", true), LineKind::Assignment("LIBS=-lm"));
    }

    #[test]
    fn target_headers() {
        assert_eq!(classify("app: main.o", false), LineKind::TargetHeader("app: main.o"));
        assert_eq!(classify("clean:", true), LineKind::TargetHeader("clean:"));
    }

    #[test]
    fn tab_lines_depend_on_target_context() {
        assert_eq!(classify("\tgcc -DX=1 -lm", true), LineKind::Recipe("\tgcc -DX=1 -lm"));
        assert_eq!(classify("\tcp a b:c", true), LineKind::Recipe("\tcp a b:c"));
        assert_eq!(classify("\tFOO = bar", false), LineKind::Assignment("\tFOO = bar"));
        assert_eq!(classify("\techo hi", false), LineKind::Recipe("\techo hi"));
    }

    #[test]
    fn unsupported_directives() {
        assert_eq!(classify("include rules.mk", false), LineKind::Unsupported("include rules.mk"));
        assert_eq!(classify("endif", true), LineKind::Unsupported("endif"));
    }
}
