use syn::LitStr;

/// A wire-level field/variant naming policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenameRule {
    Lowercase,
    SnakeCase,
    CamelCase,
    PascalCase,
}

impl RenameRule {
    pub(crate) fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "lowercase" => Ok(Self::Lowercase),
            "snake_case" => Ok(Self::SnakeCase),
            "camelCase" => Ok(Self::CamelCase),
            "PascalCase" => Ok(Self::PascalCase),
            other => Err(syn::Error::new(
                lit.span(),
                format!(
                    "unknown rename_all policy `{other}` \
                     (expected lowercase, snake_case, camelCase, or PascalCase)"
                ),
            )),
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::Lowercase => name.to_lowercase(),
            Self::SnakeCase => snake_case(name),
            Self::CamelCase => swap_first(name, char::to_lowercase),
            Self::PascalCase => swap_first(name, char::to_uppercase),
        }
    }
}

/// Lowercase the name, inserting `_` before every uppercase letter that
/// follows a lowercase letter or digit.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_breaks = false;
    for ch in name.chars() {
        if ch.is_uppercase() && prev_breaks {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
        prev_breaks = ch.is_lowercase() || ch.is_ascii_digit();
    }
    out
}

fn swap_first<I: Iterator<Item = char>>(name: &str, convert: impl Fn(char) -> I) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => convert(first).chain(chars).collect(),
        None => String::new(),
    }
}
