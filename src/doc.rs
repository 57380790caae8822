//! Doc-comment tags.
//!
//! Only the tags the resolvers consume are interpreted. The type text of a tag
//! is delimited by the annotation parser, so types containing spaces
//! (`array<string, int>`) come through whole.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::parse_prefix;

pub const PARAM_TAG: &str = "@param";
pub const VAR_TAG: &str = "@var";
pub const RETURN_TAG: &str = "@return";
pub const TEMPLATE_TAG: &str = "@template";

static TAG_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(@[A-Za-z][\w:\\-]*)").expect("tag pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Including the `@`.
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTag<'a> {
    pub name: &'a str,
    pub bound: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    tags: Vec<DocTag>,
}

impl DocBlock {
    pub fn parse(comment: &str) -> Self {
        let text = strip_decoration(comment);
        let starts: Vec<_> = TAG_START.captures_iter(&text).filter_map(|c| c.get(1)).collect();

        let tags = starts
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                let body_end = starts.get(i + 1).map_or(text.len(), |next| line_start(&text, next.start()));
                DocTag { name: tag.as_str().to_string(), body: text[tag.end()..body_end].trim().to_string() }
            })
            .collect();
        Self { tags }
    }

    pub fn tags<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocTag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }

    /// Type text of the first `@param` naming `parameter`.
    pub fn param_type(&self, parameter: &str) -> Option<&str> {
        self.tags(PARAM_TAG).find_map(|tag| {
            let (ty, rest) = split_type(&tag.body)?;
            let rest = rest.trim_start();
            let rest = rest.strip_prefix('&').unwrap_or(rest).trim_start();
            let rest = rest.strip_prefix("...").unwrap_or(rest);
            let name = rest.strip_prefix('$')?;
            let name = name.split(|c: char| !(c.is_alphanumeric() || c == '_')).next()?;
            (name == parameter).then_some(ty)
        })
    }

    pub fn var_type(&self) -> Option<&str> {
        self.tags(VAR_TAG).find_map(|tag| split_type(&tag.body).map(|(ty, _)| ty))
    }

    pub fn return_type(&self) -> Option<&str> {
        self.tags(RETURN_TAG).find_map(|tag| split_type(&tag.body).map(|(ty, _)| ty))
    }

    /// `@template Name [of|as Bound]`
    pub fn templates(&self) -> Vec<TemplateTag<'_>> {
        self.tags(TEMPLATE_TAG)
            .filter_map(|tag| {
                let body = tag.body.as_str();
                let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
                let name = &body[..name_end];
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return None;
                }
                let rest = body[name_end..].trim_start();
                let bound = ["of", "as"]
                    .iter()
                    .find_map(|kw| rest.strip_prefix(kw).filter(|r| r.starts_with(char::is_whitespace)))
                    .and_then(|r| split_type(r.trim_start()))
                    .map(|(ty, _)| ty);
                Some(TemplateTag { name, bound })
            })
            .collect()
    }
}

/// Splits a leading type expression off `body`.
fn split_type(body: &str) -> Option<(&str, &str)> {
    let (_, end) = parse_prefix(body).ok()?;
    Some((body[..end].trim(), &body[end..]))
}

fn strip_decoration(comment: &str) -> String {
    let body = comment.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);
    body.lines()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix('*').unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |nl| nl + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"/**
     * Sets the prices.
     *
     * @template T of int|string
     * @template U
     * @param array<string,
     *              int> $prices The new prices
     * @param bool &...$flags
     * @param $untyped
     * @return static
     */"#;

    #[test]
    fn splits_tags() {
        let block = DocBlock::parse(DOC);
        let names: Vec<_> = block.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["@template", "@template", "@param", "@param", "@param", "@return"]);
    }

    #[test]
    fn param_types_span_lines() {
        let block = DocBlock::parse(DOC);
        let prices = block.param_type("prices").unwrap();
        assert!(prices.starts_with("array<string,"));
        assert!(prices.ends_with("int>"));
        assert_eq!(block.param_type("flags"), Some("bool"));
        assert_eq!(block.param_type("untyped"), None);
        assert_eq!(block.param_type("missing"), None);
    }

    #[test]
    fn return_and_var() {
        let block = DocBlock::parse(DOC);
        assert_eq!(block.return_type(), Some("static"));
        assert_eq!(block.var_type(), None);
        assert_eq!(DocBlock::parse("/** @var list<int> $ids */").var_type(), Some("list<int>"));
    }

    #[test]
    fn templates() {
        let block = DocBlock::parse(DOC);
        assert_eq!(
            block.templates(),
            vec![
                TemplateTag { name: "T", bound: Some("int|string") },
                TemplateTag { name: "U", bound: None },
            ]
        );
    }

    #[test]
    fn no_tags() {
        assert_eq!(DocBlock::parse("/** Just prose. */"), DocBlock::default());
    }
}
