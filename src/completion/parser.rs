use crate::completion::slicer::is_ident_byte;
use crate::completion::type_resolver::ChainSegment;

/// What the user typed before the caret, split at the last dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTarget {
    /// The whole access expression, e.g. `foo.Bar().Ba`.
    pub entity: String,
    /// Everything before the last top-level dot, e.g. `foo.Bar()`.
    pub chain: String,
    /// Partial member name after the last dot, e.g. `Ba`.
    pub look_ahead: String,
}

impl LookupTarget {
    pub fn has_dot(&self) -> bool {
        self.entity.len() != self.look_ahead.len()
    }

    pub fn is_blank(&self) -> bool {
        !self.has_dot()
    }
}

/// Walk back from the end of `pre_caret` (comment-stripped) over identifiers,
/// dots, balanced `(...)`/`[...]` groups and generic argument lists.
pub fn extract_target(pre_caret: &str) -> LookupTarget {
    let bytes = pre_caret.as_bytes();
    let mut i = bytes.len();
    while i > 0 {
        let b = bytes[i - 1];
        if is_ident_byte(b) || b == b'.' {
            i -= 1;
            continue;
        }
        let group = match b {
            b')' => matching_open(bytes, i - 1, b'(', b')'),
            b']' => matching_open(bytes, i - 1, b'[', b']'),
            b'>' if i < bytes.len() && bytes[i] == b'(' => generic_open(bytes, i - 1),
            _ => None,
        };
        match group {
            Some(open) => i = open,
            None => break,
        }
    }

    let entity = pre_caret[i..].to_string();
    let (chain, look_ahead) = match last_top_level_dot(&entity) {
        Some(dot) => (entity[..dot].to_string(), entity[dot + 1..].to_string()),
        None => (String::new(), entity.clone()),
    };
    LookupTarget {
        entity,
        chain,
        look_ahead,
    }
}

fn matching_open(bytes: &[u8], close: usize, open_b: u8, close_b: u8) -> Option<usize> {
    let mut depth = 0i32;
    for j in (0..=close).rev() {
        if bytes[j] == close_b {
            depth += 1;
        } else if bytes[j] == open_b {
            depth -= 1;
            if depth == 0 {
                return Some(j);
            }
        } else if bytes[j] == b';' || bytes[j] == b'{' || bytes[j] == b'}' {
            return None;
        }
    }
    None
}

/// `Foo<int, Bar>(`: the `<` matching the `>` at `close`, if the contents look like type arguments.
fn generic_open(bytes: &[u8], close: usize) -> Option<usize> {
    let mut depth = 0i32;
    for j in (0..=close).rev() {
        match bytes[j] {
            b'>' => depth += 1,
            b'<' => {
                depth -= 1;
                if depth == 0 {
                    return (j > 0 && is_ident_byte(bytes[j - 1])).then_some(j);
                }
            }
            b if is_ident_byte(b) || matches!(b, b'.' | b',' | b' ' | b'[' | b']' | b'?') => {}
            _ => return None,
        }
    }
    None
}

fn last_top_level_dot(expr: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut last = None;
    for (i, b) in expr.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'<' => depth += 1,
            b')' | b']' | b'>' => depth -= 1,
            b'.' if depth == 0 => last = Some(i),
            _ => {}
        }
    }
    last
}

/// Split a member-access chain into segments.
/// `a.B(x, y)[0].C<int>()` → `a`, `B` (2 args, indexed once), `C` (0 args).
pub(crate) fn parse_chain_from_expr(expr: &str) -> Vec<ChainSegment> {
    let mut segments: Vec<ChainSegment> = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut angle = 0i32;
    let mut arg_start = 0usize;
    let mut arg_count = 0usize;
    let mut in_call = false;

    let flush = |current: &mut String, segments: &mut Vec<ChainSegment>| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            segments.push(ChainSegment::member(trimmed));
        }
        current.clear();
    };

    for (pos, ch) in expr.char_indices() {
        if angle > 0 {
            match ch {
                '<' => angle += 1,
                '>' => angle -= 1,
                _ => {}
            }
            continue;
        }
        match ch {
            '<' if depth == 0 => {
                flush(&mut current, &mut segments);
                angle = 1;
            }
            '(' => {
                depth += 1;
                if depth == 1 {
                    flush(&mut current, &mut segments);
                    in_call = true;
                    arg_start = pos + 1;
                    arg_count = 0;
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 && in_call {
                    if !expr[arg_start..pos].trim().is_empty() {
                        arg_count += 1;
                    }
                    if let Some(last) = segments.last_mut() {
                        last.arg_count = Some(arg_count);
                    }
                    in_call = false;
                }
            }
            '[' => {
                depth += 1;
                if depth == 1 {
                    flush(&mut current, &mut segments);
                    if let Some(last) = segments.last_mut() {
                        last.index_depth += 1;
                    }
                }
            }
            ']' => depth -= 1,
            ',' if depth == 1 && in_call => arg_count += 1,
            '.' if depth == 0 => flush(&mut current, &mut segments),
            c => {
                if depth == 0 && !c.is_whitespace() {
                    current.push(c);
                }
            }
        }
    }
    flush(&mut current, &mut segments);
    segments
}
