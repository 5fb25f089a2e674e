/// Inline `style` attribute parsing: just enough CSS for block sizing

use std::collections::HashMap;

/// Declarations from a `style="..."` attribute, keyed by lowercase property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    decls: HashMap<String, String>,
}

impl InlineStyle {
    pub fn parse(attr: &str) -> Self {
        let mut decls = HashMap::new();
        for decl in attr.split(';') {
            if let Some((prop, value)) = decl.split_once(':') {
                let prop = prop.trim().to_ascii_lowercase();
                let value = value.trim().trim_end_matches("!important").trim();
                if !prop.is_empty() && !value.is_empty() {
                    decls.insert(prop, value.to_string());
                }
            }
        }
        Self { decls }
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.decls.get(prop).map(|s| s.as_str())
    }

    pub fn is_hidden(&self) -> bool {
        self.get("display")
            .map(|d| d.eq_ignore_ascii_case("none"))
            .unwrap_or(false)
    }

    /// A length property resolved against `basis` (used for percentages).
    pub fn length(&self, prop: &str, basis: f64) -> Option<f64> {
        self.get(prop).and_then(|v| parse_length(v, basis))
    }

    /// Edge width for shorthand properties such as `margin` or `padding`.
    /// Only the horizontal edges matter for width, so a multi-value shorthand
    /// contributes its left/right value (second token, or first when alone).
    pub fn edge(&self, prop: &str, basis: f64) -> Option<f64> {
        let value = self.get(prop)?;
        let tokens: Vec<&str> = value.split_whitespace().collect();
        let horizontal = match tokens.len() {
            0 => return None,
            1 => tokens[0],
            _ => tokens[1],
        };
        parse_length(horizontal, basis)
    }
}

/// Parse a CSS length. Supports `px`, `%` and the unitless `0`.
pub fn parse_length(value: &str, basis: f64) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(num) = v.strip_suffix("px") {
        return num.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    }
    if let Some(num) = v.strip_suffix('%') {
        return num
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|pct| basis * pct / 100.0);
    }
    match v.parse::<f64>() {
        Ok(n) if n == 0.0 => Some(0.0),
        _ => None,
    }
}
