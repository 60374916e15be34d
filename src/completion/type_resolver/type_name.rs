use std::sync::Arc;

/// A type reference as written in source or metadata:
/// - Plain: "System.String", "Foo"
/// - Keyword aliases: "string", "int"
/// - Generic: "List<string>", "Dictionary<string, List<int>>"
/// - Arrays and nullables: "int[]", "int?", "string[][]"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName(pub(crate) Arc<str>);

/// C# keyword aliases and the types they stand for.
const KEYWORD_ALIASES: &[(&str, &str)] = &[
    ("bool", "System.Boolean"),
    ("byte", "System.Byte"),
    ("sbyte", "System.SByte"),
    ("char", "System.Char"),
    ("decimal", "System.Decimal"),
    ("double", "System.Double"),
    ("float", "System.Single"),
    ("int", "System.Int32"),
    ("uint", "System.UInt32"),
    ("long", "System.Int64"),
    ("ulong", "System.UInt64"),
    ("short", "System.Int16"),
    ("ushort", "System.UInt16"),
    ("object", "System.Object"),
    ("string", "System.String"),
    ("void", "System.Void"),
];

pub fn keyword_alias(name: &str) -> Option<&'static str> {
    KEYWORD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, full)| *full)
}

impl TypeName {
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        TypeName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_array(&self) -> bool {
        self.0.ends_with(']')
    }

    /// "string[][]" → Some("string[]"), "int[,]" → Some("int")
    pub fn array_element(&self) -> Option<TypeName> {
        if !self.is_array() {
            return None;
        }
        let open = self.0.rfind('[')?;
        Some(TypeName::from(self.0[..open].trim_end()))
    }

    /// Name without generic arguments, array ranks or nullable marker,
    /// with keyword aliases mapped to their `System` types.
    /// "List<string>" → "List", "int?" → "System.Int32"
    pub fn canonical_base(&self) -> &str {
        let base = self.0.split('<').next().unwrap_or(&self.0);
        let base = base.split('[').next().unwrap_or(base);
        let base = base.trim().trim_end_matches('?').trim();
        keyword_alias(base).unwrap_or(base)
    }

    /// Top-level generic arguments. "Dictionary<string, List<int>>" → ["string", "List<int>"]
    pub fn generic_args(&self) -> Vec<TypeName> {
        let Some(open) = self.0.find('<') else {
            return Vec::new();
        };
        let mut args = Vec::new();
        let mut depth = 0i32;
        let mut start = open + 1;
        for (i, c) in self.0[open..].char_indices() {
            let i = open + i;
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        push_arg(&mut args, &self.0[start..i]);
                        break;
                    }
                }
                ',' if depth == 1 => {
                    push_arg(&mut args, &self.0[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        args
    }

    /// Replace whole-identifier occurrences of `params[i]` with `args[i]`.
    /// Parameters without a matching argument are left untouched.
    pub fn substitute(&self, params: &[Arc<str>], args: &[TypeName]) -> TypeName {
        if params.is_empty() || args.is_empty() {
            return self.clone();
        }
        let mut out = String::with_capacity(self.0.len());
        let mut ident = String::new();
        let flush = |ident: &mut String, out: &mut String| {
            if ident.is_empty() {
                return;
            }
            match params.iter().position(|p| p.as_ref() == ident.as_str()) {
                Some(i) if i < args.len() => out.push_str(args[i].as_str()),
                _ => out.push_str(ident.as_str()),
            }
            ident.clear();
        };
        for c in self.0.chars() {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '+' {
                ident.push(c);
            } else {
                flush(&mut ident, &mut out);
                out.push(c);
            }
        }
        flush(&mut ident, &mut out);
        TypeName::from(out)
    }

    /// Short form for tooltips: namespaces dropped at every level.
    /// "System.Collections.Generic.List<System.String>" → "List<String>"
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut ident = String::new();
        let flush = |ident: &mut String, out: &mut String| {
            let short = ident.rsplit(['.', '+']).next().unwrap_or(ident.as_str());
            out.push_str(short);
            ident.clear();
        };
        for c in self.0.chars() {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '+' {
                ident.push(c);
            } else {
                flush(&mut ident, &mut out);
                out.push(c);
            }
        }
        flush(&mut ident, &mut out);
        out
    }

    pub fn to_arc(&self) -> Arc<str> {
        self.0.clone()
    }
}

fn push_arg(args: &mut Vec<TypeName>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        args.push(TypeName::from(text));
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        TypeName(Arc::from(s))
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        TypeName(Arc::from(s.as_str()))
    }
}

impl From<Arc<str>> for TypeName {
    fn from(arc: Arc<str>) -> Self {
        TypeName(arc)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_base() {
        assert_eq!(TypeName::from("List<string>").canonical_base(), "List");
        assert_eq!(TypeName::from("int?").canonical_base(), "System.Int32");
        assert_eq!(TypeName::from("string").canonical_base(), "System.String");
        assert_eq!(TypeName::from("Outer.Inner").canonical_base(), "Outer.Inner");
    }

    #[test]
    fn test_generic_args_respect_nesting() {
        let args: Vec<_> = TypeName::from("Dictionary<string, List<int>>")
            .generic_args()
            .into_iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(args, vec!["string", "List<int>"]);
        assert!(TypeName::from("Foo").generic_args().is_empty());
    }

    #[test]
    fn test_substitute_whole_identifiers_only() {
        let params = vec![Arc::from("T")];
        let args = vec![TypeName::from("string")];
        let t = TypeName::from("IEnumerator<T>").substitute(&params, &args);
        assert_eq!(t.as_str(), "IEnumerator<string>");
        let untouched = TypeName::from("TValue").substitute(&params, &args);
        assert_eq!(untouched.as_str(), "TValue");
    }

    #[test]
    fn test_display_drops_namespaces() {
        let t = TypeName::from("System.Collections.Generic.List<System.String>");
        assert_eq!(t.display(), "List<String>");
        assert_eq!(TypeName::from("System.Environment+SpecialFolder").display(), "SpecialFolder");
    }
}
