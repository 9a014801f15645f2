//! A small dot reader and writer: enough of the language to carry a graph
//! name and an edge list (`a -> b;`), which is all the paired dot+ord
//! input uses. Attribute blocks are skipped, names may be quoted, and
//! `//`, `/* */`, and `#` comments are ignored.

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct DotEdge {
    pub source: String,
    pub target: String,
    pub line: usize,
}

#[derive(Debug)]
pub struct DotRead {
    pub name: String,
    pub edges: Vec<DotEdge>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Arrow,
    Open,
    Close,
    AttrOpen,
    AttrClose,
    Semi,
    Other(char),
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut in_block_comment = false;
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let mut chars = raw.char_indices().peekable();
        while let Some((at, c)) = chars.next() {
            if in_block_comment {
                if c == '*' && matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    in_block_comment = false;
                }
                continue;
            }
            match c {
                '#' => break,
                '/' => match chars.peek() {
                    Some((_, '/')) => break,
                    Some((_, '*')) => {
                        chars.next();
                        in_block_comment = true;
                    }
                    _ => return Err(Error::parse(line, "stray '/'")),
                },
                '-' => {
                    if matches!(chars.peek(), Some((_, '>'))) {
                        chars.next();
                        tokens.push((Token::Arrow, line));
                    } else {
                        return Err(Error::parse(line, "expected '->'"));
                    }
                }
                '{' => tokens.push((Token::Open, line)),
                '}' => tokens.push((Token::Close, line)),
                '[' => tokens.push((Token::AttrOpen, line)),
                ']' => tokens.push((Token::AttrClose, line)),
                ';' => tokens.push((Token::Semi, line)),
                '"' => {
                    let start = at + 1;
                    let mut end = None;
                    for (q, qc) in chars.by_ref() {
                        if qc == '"' {
                            end = Some(q);
                            break;
                        }
                    }
                    let end =
                        end.ok_or_else(|| Error::parse(line, "unterminated quoted name"))?;
                    tokens.push((Token::Word(raw[start..end].to_string()), line));
                }
                c if c.is_whitespace() => {}
                c if is_name_char(c) => {
                    let mut end = at + c.len_utf8();
                    while let Some(&(q, qc)) = chars.peek() {
                        if is_name_char(qc) {
                            end = q + qc.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    tokens.push((Token::Word(raw[at..end].to_string()), line));
                }
                other => tokens.push((Token::Other(other), line)),
            }
        }
    }
    Ok(tokens)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

pub fn read_dot(input: &str) -> Result<DotRead> {
    let tokens = tokenize(input)?;
    let mut cursor = tokens.iter().peekable();

    let mut name = String::new();
    match cursor.next() {
        Some((Token::Word(w), line)) => {
            let mut keyword = w.as_str();
            if keyword == "strict" {
                match cursor.next() {
                    Some((Token::Word(w2), _)) => keyword = w2.as_str(),
                    _ => return Err(Error::parse(*line, "expected 'digraph' after 'strict'")),
                }
            }
            if keyword != "digraph" && keyword != "graph" {
                return Err(Error::parse(*line, format!("expected 'digraph', found '{keyword}'")));
            }
        }
        other => {
            let line = other.map_or(1, |(_, l)| *l);
            return Err(Error::parse(line, "expected 'digraph'"));
        }
    }
    if let Some((Token::Word(w), _)) = cursor.peek() {
        name = w.clone();
        cursor.next();
    }
    match cursor.next() {
        Some((Token::Open, _)) => {}
        other => {
            let line = other.map_or(1, |(_, l)| *l);
            return Err(Error::parse(line, "expected '{'"));
        }
    }

    let mut edges = Vec::new();
    let mut closed = false;
    while let Some((token, line)) = cursor.next() {
        match token {
            Token::Close => {
                closed = true;
                break;
            }
            Token::Semi => {}
            Token::Word(first) => {
                let mut previous = first.clone();
                while matches!(cursor.peek(), Some((Token::Arrow, _))) {
                    cursor.next();
                    match cursor.next() {
                        Some((Token::Word(next), line)) => {
                            edges.push(DotEdge {
                                source: previous.clone(),
                                target: next.clone(),
                                line: *line,
                            });
                            previous = next.clone();
                        }
                        other => {
                            let line = other.map_or(*line, |(_, l)| *l);
                            return Err(Error::parse(line, "expected a node name after '->'"));
                        }
                    }
                }
                if matches!(cursor.peek(), Some((Token::AttrOpen, _))) {
                    cursor.next();
                    loop {
                        match cursor.next() {
                            Some((Token::AttrClose, _)) => break,
                            Some(_) => {}
                            None => {
                                return Err(Error::parse(*line, "unterminated attribute list"));
                            }
                        }
                    }
                }
            }
            _ => {
                return Err(Error::parse(*line, "unexpected token in graph body"));
            }
        }
    }
    if !closed {
        return Err(Error::parse(
            input.lines().count().max(1),
            "missing closing '}'",
        ));
    }

    Ok(DotRead { name, edges })
}

/// Renders an edge list in dot form: graph name, one `a -> b;` statement
/// per edge, comments up front.
pub fn write_dot(graph: &crate::graph::LayeredGraph) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for comment in &graph.comments {
        let _ = writeln!(out, "// {comment}");
    }
    let _ = writeln!(out, "digraph {} {{", quote_if_needed(&graph.name));
    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "  {} -> {};",
            quote_if_needed(&graph.nodes[edge.down].name),
            quote_if_needed(&graph.nodes[edge.up].name),
        );
    }
    out.push_str("}\n");
    out
}

fn quote_if_needed(name: &str) -> String {
    if !name.is_empty() && name.chars().all(is_name_char) {
        name.to_string()
    } else {
        format!("\"{name}\"")
    }
}
