//! # Raw Template Engine
//!
//! Power users paste vendor templates (ZPL or TSPL) with `{{token}}`
//! placeholders. This module finds the tokens, fills them in, and adds the
//! size declarations community templates tend to leave out.
//!
//! ```
//! use std::collections::HashMap;
//! use cardlabel::template::{detect_tokens, interpolate};
//!
//! let body = "TEXT 10,10,\"2\",0,1,1,\"{{title}}\"";
//! assert_eq!(detect_tokens(body), vec!["title"]);
//!
//! let values = HashMap::from([("title".to_string(), "Eevee".to_string())]);
//! assert_eq!(interpolate(body, &values).unwrap(), "TEXT 10,10,\"2\",0,1,1,\"Eevee\"");
//! ```
//!
//! Size guards are applied at send time only; the stored template body is
//! never modified.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::error::CardLabelError;

static TOKEN: OnceLock<Regex> = OnceLock::new();
static ZPL_SIZE: OnceLock<Regex> = OnceLock::new();
static TSPL_SIZE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("token pattern"))
}

fn zpl_size_re() -> &'static Regex {
    ZPL_SIZE.get_or_init(|| Regex::new(r"\^(PW|LL)").expect("zpl size pattern"))
}

fn tspl_size_re() -> &'static Regex {
    TSPL_SIZE.get_or_init(|| Regex::new(r"(?im)^\s*SIZE\s").expect("tspl size pattern"))
}

/// ZPL header declaring a 406 × 203 dot label.
pub const ZPL_SIZE_HEADER: &str = "^PW406\n^LL203";

/// TSPL size line for a 2" × 1" label.
pub const TSPL_SIZE_LINE: &str = "SIZE 2,1";

/// Printer language a raw template is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateEngine {
    /// Zebra ZPL (`^XA ... ^XZ`).
    Zpl,
    /// TSC TSPL, one command per line.
    Tspl,
}

/// Distinct `{{token}}` names in order of first appearance.
///
/// Only ASCII letters, digits and `_` form a token; `{{ spaced }}` or
/// `{{a-b}}` are left alone as literal text.
pub fn detect_tokens(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    token_re()
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Replace every token occurrence with its value.
///
/// Fails on the first token (in order of appearance) whose value is missing
/// or blank; nothing is substituted in that case.
pub fn interpolate(body: &str, values: &HashMap<String, String>) -> Result<String, CardLabelError> {
    for token in detect_tokens(body) {
        match values.get(&token) {
            Some(v) if !v.trim().is_empty() => {}
            _ => return Err(CardLabelError::MissingVariable(token)),
        }
    }

    Ok(token_re()
        .replace_all(body, |caps: &regex::Captures| {
            caps.get(1)
                .and_then(|m| values.get(m.as_str()))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned())
}

/// Make sure the job declares the 2" × 1" label size.
///
/// - ZPL: if neither `^PW` nor `^LL` appears, strip any outer `^XA`/`^XZ`
///   and re-wrap as `^XA`, the 406 × 203 header, the body, `^XZ`.
/// - TSPL: if no `SIZE` line exists, prepend `SIZE 2,1`.
///
/// Idempotent; bodies that already declare a size are returned unchanged.
pub fn add_size_guards(body: &str, engine: TemplateEngine) -> String {
    match engine {
        TemplateEngine::Zpl => {
            if zpl_size_re().is_match(body) {
                return body.to_string();
            }
            let mut inner = body.trim();
            if let Some(rest) = inner.strip_prefix("^XA") {
                inner = rest.trim_start();
            }
            if let Some(rest) = inner.strip_suffix("^XZ") {
                inner = rest.trim_end();
            }
            if inner.is_empty() {
                format!("^XA\n{}\n^XZ", ZPL_SIZE_HEADER)
            } else {
                format!("^XA\n{}\n{}\n^XZ", ZPL_SIZE_HEADER, inner)
            }
        }
        TemplateEngine::Tspl => {
            if tspl_size_re().is_match(body) {
                return body.to_string();
            }
            format!("{}\n{}", TSPL_SIZE_LINE, body)
        }
    }
}

/// A stored raw template.
///
/// `required_fields` always equals [`detect_tokens`] of `body`: it is
/// recomputed on construction, on deserialization and by [`RawTemplate::set_body`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredTemplate")]
pub struct RawTemplate {
    pub id: String,
    pub name: String,
    pub engine: TemplateEngine,
    body: String,
    required_fields: Vec<String>,
}

/// On-disk shape; any stored `requiredFields` is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTemplate {
    id: String,
    #[serde(default)]
    name: String,
    engine: TemplateEngine,
    body: String,
}

impl From<StoredTemplate> for RawTemplate {
    fn from(stored: StoredTemplate) -> Self {
        RawTemplate::new(stored.id, stored.name, stored.engine, stored.body)
    }
}

impl RawTemplate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        engine: TemplateEngine,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        Self {
            id: id.into(),
            name: name.into(),
            engine,
            required_fields: detect_tokens(&body),
            body,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.required_fields = detect_tokens(&self.body);
    }

    /// Interpolate and add size guards: the string actually sent to a printer.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, CardLabelError> {
        render_template(&self.body, values, self.engine)
    }
}

/// Interpolate `body`, then apply [`add_size_guards`] for `engine`.
pub fn render_template(
    body: &str,
    values: &HashMap<String, String>,
    engine: TemplateEngine,
) -> Result<String, CardLabelError> {
    let filled = interpolate(body, values)?;
    Ok(add_size_guards(&filled, engine))
}
