use crate::makefile::{
    Makefile, Operator, Target, Variable,
    line::{LineKind, classify},
};

/// State carried from one line to the next while building the tables
#[derive(Debug, Default)]
struct ParserState {
    makefile: Makefile,
    /// Target receiving recipe lines, if a header is open
    current_target: Option<String>,
}

pub fn parse(text: &str) -> Makefile {
    let mut state = ParserState::default();
    for (index, line) in text.lines().enumerate() {
        state.process_line(index, line);
    }
    state.makefile
}

impl ParserState {
    fn process_line(&mut self, index: usize, line: &str) {
        match classify(line, self.current_target.is_some()) {
            LineKind::Blank => {}
            LineKind::Comment(text) => {
                self.makefile.comments.insert(index, text.trim_end().to_string());
            }
            LineKind::Assignment(raw) => self.assign(index, raw),
            LineKind::TargetHeader(raw) => self.open_target(index, raw),
            LineKind::Recipe(raw) => self.push_statement(index, raw),
            LineKind::Unsupported(raw) => {
                log::debug!("line {}: unsupported syntax, skipped: {raw:?}", index + 1);
            }
        }
    }

    fn assign(&mut self, index: usize, raw: &str) {
        let Some((name, operator, value)) = parse_assignment(raw) else {
            log::debug!("line {}: assignment without a variable name, skipped: {raw:?}", index + 1);
            return;
        };

        if operator == Operator::Append {
            if let Some(existing) = self.makefile.variables.get_mut(name) {
                existing.value.extend(value);
                return;
            }
        }

        self.makefile.variables.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                operator,
                value,
            },
        );
    }

    fn open_target(&mut self, index: usize, raw: &str) {
        let (name, rest) = raw.split_once(':').unwrap_or((raw, ""));
        let name = name.trim();
        if name.is_empty() {
            log::debug!("line {}: target header without a name, skipped: {raw:?}", index + 1);
            self.current_target = None;
            return;
        }

        // `a:: b` is a double-colon rule
        let rest = rest.strip_prefix(':').unwrap_or(rest);

        let mut target = Target::new(name);
        target.dependencies = rest.split_whitespace().map(str::to_string).collect();
        self.makefile.targets.insert(name.to_string(), target);
        self.current_target = Some(name.to_string());
    }

    fn push_statement(&mut self, index: usize, raw: &str) {
        let target = self
            .current_target
            .as_ref()
            .and_then(|name| self.makefile.targets.get_mut(name));
        match target {
            Some(target) => target.statements.push(raw.trim_end().to_string()),
            None => log::trace!("line {}: recipe line outside of any target, skipped", index + 1),
        }
    }
}

/// Splits an assignment line into name, operator and value tokens.
///
/// The operator is found at the first `=`; the character right before it
/// decides between `:=`, `?=`, `+=` and a plain `=`. Returns `None` when the
/// name would be empty.
pub fn parse_assignment(raw: &str) -> Option<(&str, Operator, Vec<String>)> {
    let eq = raw.find('=')?;
    let head = &raw[..eq];

    let (operator, name) = match head.chars().next_back() {
        Some(':') => {
            let name = &head[..head.len() - 1];
            // POSIX `::=` behaves like `:=`
            (Operator::Immediate, name.strip_suffix(':').unwrap_or(name))
        }
        Some('?') => (Operator::Conditional, &head[..head.len() - 1]),
        Some('+') => (Operator::Append, &head[..head.len() - 1]),
        _ => (Operator::Recursive, head),
    };

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let value = raw[eq + 1..]
        .split_whitespace()
        .map(str::to_string)
        .collect();

    Some((name, operator, value))
}
