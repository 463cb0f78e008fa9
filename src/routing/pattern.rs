//! Route path patterns with named variables.
//!
//! Syntax: literal text, `:name` (one path segment) or `:name(regex)` (custom
//! matcher). Matching is anchored, case-insensitive and strict about trailing
//! slashes. Captured values are keyed by variable name, so a path can be
//! rebuilt from another pattern's captures as long as the names agree.

use crate::error::PatternError;
use regex::{Regex, RegexBuilder};

const DEFAULT_MATCHER: &str = "[^/]+?";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// Variable values captured from a path, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: Vec<(String, String)>,
}

impl Bindings {
    /// Value of the first variable called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bind `name` to `value`, replacing an existing binding of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A compiled route pattern: a matcher plus its variable names in pattern order.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    segments: Vec<Segment>,
    variables: Vec<String>,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile `pattern`.
    ///
    /// # Returns
    /// * `Err(PatternError)` if a variable has no name, a custom group is not
    ///   closed, an optional/repeat modifier (`?`, `*`, `+`) is used outside a
    ///   custom group or the resulting expression does not compile
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut variables = Vec::new();
        let mut expression = String::from("^");
        let mut literal = String::new();

        let chars: Vec<(usize, char)> = pattern.char_indices().collect();
        let mut i = 0;
        while i < chars.len() {
            let (offset, c) = chars[i];
            if c == '?' || c == '*' {
                return Err(PatternError::UnsupportedModifier {
                    pattern: pattern.to_string(),
                    modifier: c,
                    offset,
                });
            }
            if c != ':' {
                literal.push(c);
                i += 1;
                continue;
            }

            let name: String = chars[i + 1..]
                .iter()
                .map(|&(_, c)| c)
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if name.is_empty() {
                return Err(PatternError::EmptyVariableName {
                    pattern: pattern.to_string(),
                    offset,
                });
            }
            i += 1 + name.len();

            let matcher = if chars.get(i).map(|&(_, c)| c) == Some('(') {
                let (group, consumed) = read_group(&chars[i..]).ok_or_else(|| {
                    PatternError::UnterminatedGroup {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    }
                })?;
                i += consumed;
                group
            } else {
                DEFAULT_MATCHER.to_string()
            };
            if let Some(&(offset, '+')) = chars.get(i) {
                return Err(PatternError::UnsupportedModifier {
                    pattern: pattern.to_string(),
                    modifier: '+',
                    offset,
                });
            }

            if !literal.is_empty() {
                expression.push_str(&regex::escape(&literal));
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            expression.push_str(&format!("(?P<v{}>{})", variables.len(), matcher));
            segments.push(Segment::Variable(name.clone()));
            variables.push(name);
        }

        if !literal.is_empty() {
            expression.push_str(&regex::escape(&literal));
            segments.push(Segment::Literal(literal));
        }
        expression.push('$');

        let regex = RegexBuilder::new(&expression)
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
            variables,
            regex,
        })
    }

    /// The pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable names, in pattern order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and capture every variable.
    pub fn captures(&self, path: &str) -> Option<Bindings> {
        let caps = self.regex.captures(path)?;
        let mut bindings = Bindings::default();
        for (index, name) in self.variables.iter().enumerate() {
            let value = caps.name(&format!("v{index}")).map_or("", |m| m.as_str());
            bindings.values.push((name.clone(), value.to_string()));
        }
        Some(bindings)
    }

    /// Build a concrete path by substituting each variable with its binding.
    ///
    /// # Returns
    /// * `Err(PatternError::MissingBinding)` if a variable has no value in `bindings`
    pub fn build(&self, bindings: &Bindings) -> Result<String, PatternError> {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Variable(name) => {
                    let value =
                        bindings
                            .get(name)
                            .ok_or_else(|| PatternError::MissingBinding {
                                pattern: self.source.clone(),
                                name: name.clone(),
                            })?;
                    path.push_str(value);
                }
            }
        }
        Ok(path)
    }
}

/// Read a parenthesised group starting at `chars[0] == '('`.
///
/// Returns the group body and the number of chars consumed, including both
/// parentheses. Backslash escapes and nested groups are honoured.
fn read_group(chars: &[(usize, char)]) -> Option<(String, usize)> {
    let mut depth = 0usize;
    let mut body = String::new();
    let mut escaped = false;

    for (consumed, &(_, c)) in chars.iter().enumerate() {
        if escaped {
            body.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                body.push(c);
                escaped = true;
            }
            '(' => {
                if depth > 0 {
                    body.push(c);
                }
                depth += 1;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((body, consumed + 1));
                }
                body.push(c);
            }
            _ => body.push(c),
        }
    }
    None
}
