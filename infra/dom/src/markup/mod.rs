//! Lenient markup tokenizer and tree builder.
//!
//! Covers what server-rendered pages contain: elements with quoted, unquoted
//! and bare attributes, void and self-closing elements, comments, doctype
//! declarations, raw-text `script`/`style` bodies and character references.
//! Stray end tags are dropped and unclosed elements are closed at the end of
//! input. Only truly unterminated constructs are errors.

mod entities;

use crate::document::{Document, Element, NodeData};
use crate::error::DomError;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_till1, take_until, take_while, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{map, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use tracing::trace;
use weld_domain::NodeId;

pub(crate) use entities::decode;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Declaration,
    Comment(&'a str),
    StartTag { name: &'a str, attributes: Vec<(&'a str, &'a str)>, self_closing: bool },
    EndTag(&'a str),
    Text(&'a str),
    RawText(&'a str),
}

pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub(crate) fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// Splits `input` into tokens.
///
/// # Errors
/// [`DomError::Markup`] naming the byte offset of the first unterminated
/// construct.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token<'_>>, DomError> {
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < input.len() {
        let current = &input[position..];

        let (remaining, token) = if current.starts_with("<!--") {
            comment(current).map_err(|_| unterminated("comment", position))?
        } else if current.starts_with("<!") {
            declaration(current).map_err(|_| unterminated("declaration", position))?
        } else if let Ok(parsed) = end_tag(current) {
            parsed
        } else if starts_tag(current) {
            start_tag(current).map_err(|_| unterminated("tag", position))?
        } else if let Ok(parsed) = text(current) {
            parsed
        } else {
            // A lone `<` that opens nothing.
            (&current[1..], Token::Text("<"))
        };
        position += current.len() - remaining.len();

        if let Token::StartTag { name, self_closing: false, .. } = &token {
            let name = name.to_ascii_lowercase();
            if is_raw_text(&name) {
                tokens.push(token);
                let body = raw_text_len(&input[position..], &name)
                    .ok_or_else(|| unterminated(&format!("<{name}> element"), position))?;
                if body > 0 {
                    tokens.push(Token::RawText(&input[position..position + body]));
                }
                position += body;
                continue;
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Attaches tokens to fresh, detached nodes and returns the top-level ones.
pub(crate) fn build(doc: &mut Document, tokens: Vec<Token<'_>>) -> Vec<NodeId> {
    let mut top = Vec::new();
    let mut open: Vec<(NodeId, String)> = Vec::new();

    let mut attach = |doc: &mut Document, open: &[(NodeId, String)], node: NodeId| match open.last() {
        Some((parent, _)) => doc.link(*parent, node),
        None => top.push(node),
    };

    for token in tokens {
        match token {
            Token::Declaration => {},
            Token::Comment(text) => {
                let node = doc.alloc(NodeData::Comment(text.to_owned()));
                attach(doc, &open, node);
            },
            Token::Text(text) => {
                let node = doc.alloc(NodeData::Text(decode(text).into_owned()));
                attach(doc, &open, node);
            },
            Token::RawText(text) => {
                let node = doc.alloc(NodeData::Text(text.to_owned()));
                attach(doc, &open, node);
            },
            Token::StartTag { name, attributes, self_closing } => {
                let mut element = Element::new(name);
                for (attr, value) in attributes {
                    element.push_parsed_attribute(attr, decode(value).into_owned());
                }
                let name = element.name().to_owned();
                let node = doc.alloc(NodeData::Element(element));
                attach(doc, &open, node);
                if !self_closing && !is_void(&name) {
                    open.push((node, name));
                }
            },
            Token::EndTag(name) => {
                let name = name.to_ascii_lowercase();
                match open.iter().rposition(|(_, open_name)| *open_name == name) {
                    Some(index) => open.truncate(index),
                    None => trace!(tag = %name, "Ignoring stray end tag"),
                }
            },
        }
    }

    top
}

/// Appends the markup of `id` and its subtree to `out`.
pub(crate) fn serialize(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        Some(NodeData::Document) => {
            for &child in doc.children(id) {
                serialize(doc, child, out);
            }
        },
        Some(NodeData::Element(element)) => {
            out.push('<');
            out.push_str(element.name());
            for attr in element.attributes() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if is_void(element.name()) {
                return;
            }
            let raw = is_raw_text(element.name());
            for &child in doc.children(id) {
                match doc.data(child) {
                    Some(NodeData::Text(text)) if raw => out.push_str(text),
                    _ => serialize(doc, child, out),
                }
            }
            out.push_str("</");
            out.push_str(element.name());
            out.push('>');
        },
        Some(NodeData::Text(text)) => escape_into(text, false, out),
        Some(NodeData::Comment(text)) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        },
        None => {},
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn unterminated(what: &str, offset: usize) -> DomError {
    DomError::Markup { message: format!("Unterminated {what} at byte {offset}").into(), context: None }
}

fn starts_tag(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Length of the raw body up to the matching close tag, if there is one.
fn raw_text_len(input: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    input.to_ascii_lowercase().find(&needle)
}

fn comment(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(tag("<!--"), take_until("-->"), tag("-->")), Token::Comment)(input)
}

fn declaration(input: &str) -> IResult<&str, Token<'_>> {
    map(
        alt((
            preceded(tag_no_case("<!doctype"), terminated(take_until(">"), char('>'))),
            preceded(tag("<!"), terminated(take_until(">"), char('>'))),
        )),
        |_| Token::Declaration,
    )(input)
}

fn tag_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '_' | '.')),
    ))(input)
}

fn attribute_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| {
        !c.is_whitespace() && !matches!(c, '/' | '>' | '=' | '"' | '\'' | '<')
    })(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    preceded(
        tuple((multispace0, char('='), multispace0)),
        alt((
            delimited(char('"'), take_until("\""), char('"')),
            delimited(char('\''), take_until("'"), char('\'')),
            take_till1(|c: char| c.is_whitespace() || c == '>'),
        )),
    )(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    map(pair(attribute_name, opt(attribute_value)), |(name, value)| (name, value.unwrap_or("")))(
        input,
    )
}

fn start_tag(input: &str) -> IResult<&str, Token<'_>> {
    map(
        tuple((
            char('<'),
            tag_name,
            many0(preceded(multispace0, attribute)),
            multispace0,
            opt(char('/')),
            char('>'),
        )),
        |(_, name, attributes, _, slash, _)| Token::StartTag {
            name,
            attributes,
            self_closing: slash.is_some(),
        },
    )(input)
}

fn end_tag(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(tag("</"), tag_name, pair(multispace0, char('>'))), Token::EndTag)(input)
}

fn text(input: &str) -> IResult<&str, Token<'_>> {
    map(take_till1(|c: char| c == '<'), Token::Text)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_attributes_in_all_forms() {
        let tokens = tokenize(r#"<input type="text" name='q' value=7 disabled/>"#).unwrap();
        assert_eq!(
            tokens,
            [Token::StartTag {
                name: "input",
                attributes: vec![("type", "text"), ("name", "q"), ("value", "7"), ("disabled", "")],
                self_closing: true,
            }]
        );
    }

    #[test]
    fn keeps_script_bodies_raw() {
        let tokens = tokenize("<script type=\"text/x-magento-init\">{\"a\": \"<b>\"}</SCRIPT>").unwrap();
        assert_eq!(tokens[1], Token::RawText("{\"a\": \"<b>\"}"));
        assert_eq!(tokens[2], Token::EndTag("SCRIPT"));
    }

    #[test]
    fn lone_angle_brackets_are_text() {
        let tokens = tokenize("a < b <3 </ c").unwrap();
        assert!(tokens.iter().all(|t| matches!(t, Token::Text(_))));
    }

    #[test]
    fn unterminated_constructs_fail() {
        for input in ["<!-- open", "<div class=\"x", "<script>var a;", "<!doctype html"] {
            assert!(matches!(tokenize(input), Err(DomError::Markup { .. })), "{input}");
        }
    }

    #[test]
    fn void_and_stray_end_tags() {
        let doc = Document::parse("<p>a<br>b</span></p>").unwrap();
        assert_eq!(doc.outer_markup(doc.root()), "<p>a<br>b</p>");
    }

    #[test]
    fn unclosed_elements_close_at_end() {
        let doc = Document::parse("<div><p>one<p>two").unwrap();
        assert_eq!(doc.outer_markup(doc.root()), "<div><p>one<p>two</p></p></div>");
    }

    #[test]
    fn end_tag_closes_intermediate_elements() {
        let doc = Document::parse("<div><span><b>x</div>after").unwrap();
        assert_eq!(doc.outer_markup(doc.root()), "<div><span><b>x</b></span></div>after");
    }

    #[test]
    fn serializes_with_escaping() {
        let doc = Document::parse(r#"<a title="&quot;q&quot; &amp; co">1 &lt; 2</a><!--c--><style>a>b{}</style>"#)
            .unwrap();
        assert_eq!(
            doc.outer_markup(doc.root()),
            r#"<a title="&quot;q&quot; &amp; co">1 &lt; 2</a><!--c--><style>a>b{}</style>"#
        );
    }

    #[test]
    fn doctype_is_dropped() {
        let doc = Document::parse("<!DOCTYPE html><html><body></body></html>").unwrap();
        assert_eq!(doc.outer_markup(doc.root()), "<html><body></body></html>");
    }
}
