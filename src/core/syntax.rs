//! Syntax tree helpers shared by the recognizers
//!
//! Node kinds come from the tree-sitter Python grammar. Recognizers classify
//! nodes through `SyntaxKind` and match on it.

use tree_sitter::Node;

/// The node kinds the recognizers care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    /// `def` and `async def`
    FunctionDef,
    ClassDef,
    Call,
    Assignment,
    /// String literal, possibly implicitly concatenated
    Literal,
    Other,
}

impl SyntaxKind {
    pub fn of(node: Node) -> Self {
        match node.kind() {
            "function_definition" => Self::FunctionDef,
            "class_definition" => Self::ClassDef,
            "call" => Self::Call,
            "assignment" => Self::Assignment,
            "string" | "concatenated_string" => Self::Literal,
            _ => Self::Other,
        }
    }
}

/// All nodes under `root` (inclusive) in pre-order, i.e. source order
pub fn preorder<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    let mut nodes = Vec::new();
    let mut cursor = root.walk();

    loop {
        nodes.push(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return nodes;
            }
        }
    }
}

pub fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Text of a plain identifier
pub fn bare_name<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    (node.kind() == "identifier").then(|| node_text(node, source))
}

/// Split `receiver.attr` into the receiver node and the attribute name
pub fn member_access<'t, 's>(node: Node<'t>, source: &'s str) -> Option<(Node<'t>, &'s str)> {
    if node.kind() != "attribute" {
        return None;
    }
    let object = node.child_by_field_name("object")?;
    let attribute = node.child_by_field_name("attribute")?;
    Some((object, node_text(attribute, source)))
}

/// The callee expression of a call
pub fn call_function(call: Node) -> Option<Node> {
    call.child_by_field_name("function")
}

fn argument_nodes<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    if arguments.kind() != "argument_list" {
        return Vec::new();
    }

    let mut cursor = arguments.walk();
    let nodes: Vec<Node<'t>> = arguments
        .named_children(&mut cursor)
        .filter(|arg| arg.kind() != "comment")
        .collect();
    nodes
}

/// Positional arguments in order. Star-args are positional too.
pub fn positional_args<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    argument_nodes(call)
        .into_iter()
        .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat"))
        .collect()
}

/// Value of the keyword argument `name=...`, if given
pub fn keyword_arg<'t>(call: Node<'t>, name: &str, source: &str) -> Option<Node<'t>> {
    argument_nodes(call)
        .into_iter()
        .filter(|arg| arg.kind() == "keyword_argument")
        .find(|arg| {
            arg.child_by_field_name("name")
                .map(|n| node_text(n, source) == name)
                .unwrap_or(false)
        })
        .and_then(|arg| arg.child_by_field_name("value"))
}

/// The value of a string literal. f-strings with interpolations are not literals.
pub fn string_literal(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" => {
            if preorder(node).iter().any(|n| n.kind() == "interpolation") {
                return None;
            }
            Some(unquote(node_text(node, source)))
        }
        "concatenated_string" => {
            let mut cursor = node.walk();
            let parts: Option<Vec<String>> = node
                .named_children(&mut cursor)
                .filter(|part| part.kind() != "comment")
                .map(|part| string_literal(part, source))
                .collect();
            parts.map(|parts| parts.concat())
        }
        _ => None,
    }
}

fn unquote(text: &str) -> String {
    let body = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let raw = text[..text.len() - body.len()].contains(|c: char| c == 'r' || c == 'R');

    let mut inner = body;
    for delimiter in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= 2 * delimiter.len()
            && body.starts_with(delimiter)
            && body.ends_with(delimiter)
        {
            inner = &body[delimiter.len()..body.len() - delimiter.len()];
            break;
        }
    }

    if raw {
        inner.to_string()
    } else {
        decode_escapes(inner)
    }
}

/// Decode the common backslash escapes. Unknown escapes stay as written.
fn decode_escapes(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => decoded.push('\\'),
            Some('\'') => decoded.push('\''),
            Some('"') => decoded.push('"'),
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            Some('0') => decoded.push('\0'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = (0..2)
                    .filter_map(|_| chars.next_if(|h| h.is_ascii_hexdigit()))
                    .collect();
                let value = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 2)
                    .and_then(char::from_u32);
                match value {
                    Some(value) => decoded.push(value),
                    None => {
                        decoded.push_str("\\x");
                        decoded.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => decoded.push('\\'),
        }
    }

    decoded
}

/// Elements of a list or tuple made only of string literals
pub fn string_sequence(node: Node, source: &str) -> Option<Vec<String>> {
    if !matches!(node.kind(), "list" | "tuple") {
        return None;
    }

    let mut cursor = node.walk();
    let items: Option<Vec<String>> = node
        .named_children(&mut cursor)
        .filter(|item| item.kind() != "comment")
        .map(|item| string_literal(item, source))
        .collect();
    items
}

/// Decorator expressions attached to a function or class, top to bottom
pub fn decorators<'t>(definition: Node<'t>) -> Vec<Node<'t>> {
    let Some(parent) = definition.parent() else {
        return Vec::new();
    };
    if parent.kind() != "decorated_definition" {
        return Vec::new();
    }

    let mut cursor = parent.walk();
    let expressions: Vec<Node<'t>> = parent
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .filter_map(|decorator| {
            let mut inner = decorator.walk();
            let expression = decorator
                .named_children(&mut inner)
                .find(|child| child.kind() != "comment");
            expression
        })
        .collect();
    expressions
}

/// True when the statement holding `node` runs in module scope, possibly
/// nested in `if`/`try`/`with` blocks but not inside a function, class or lambda
pub fn is_module_level(node: Node) -> bool {
    let Some(statement) = node.parent().filter(|p| p.kind() == "expression_statement") else {
        return false;
    };

    let mut scope = statement.parent();
    while let Some(current) = scope {
        match current.kind() {
            "module" => return true,
            "function_definition" | "class_definition" | "lambda" => return false,
            _ => scope = current.parent(),
        }
    }
    false
}


#[cfg(test)]
mod tests {
    use super::test_support::parse;
    use super::*;

    fn first<'t>(root: Node<'t>, kind: SyntaxKind) -> Node<'t> {
        preorder(root)
            .into_iter()
            .find(|n| SyntaxKind::of(*n) == kind)
            .unwrap()
    }

    #[test]
    fn test_string_literal_forms() {
        let source = r#"a = ["x", 'y', r"\d+", """doc""", "/a" "/b", f"/u/{uid}", f"/plain"]"#;
        let tree = parse(source);
        let list = preorder(tree.root_node())
            .into_iter()
            .find(|n| n.kind() == "list")
            .unwrap();

        let mut cursor = list.walk();
        let values: Vec<Option<String>> = list
            .named_children(&mut cursor)
            .map(|n| string_literal(n, source))
            .collect();

        assert_eq!(
            values,
            vec![
                Some("x".to_string()),
                Some("y".to_string()),
                Some(r"\d+".to_string()),
                Some("doc".to_string()),
                Some("/a/b".to_string()),
                None,
                Some("/plain".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_literal_decodes_escapes() {
        let source = r#"a = ["https://a/\x41", 'it\'s', "tab\tend", r"\x41", "keep\d"]"#;
        let tree = parse(source);
        let list = preorder(tree.root_node())
            .into_iter()
            .find(|n| n.kind() == "list")
            .unwrap();

        let mut cursor = list.walk();
        let values: Vec<String> = list
            .named_children(&mut cursor)
            .map(|n| string_literal(n, source).unwrap())
            .collect();

        assert_eq!(values, vec!["https://a/A", "it's", "tab\tend", "\\x41", "keep\\d"]);
    }

    #[test]
    fn test_string_sequence_requires_all_literals() {
        let source = "a = ('GET', 'POST')\nb = ['GET', verb]\nc = 'GET'\n";
        let tree = parse(source);
        let sequences: Vec<Option<Vec<String>>> = preorder(tree.root_node())
            .into_iter()
            .filter(|n| SyntaxKind::of(*n) == SyntaxKind::Assignment)
            .filter_map(|n| n.child_by_field_name("right"))
            .map(|n| string_sequence(n, source))
            .collect();

        assert_eq!(
            sequences,
            vec![
                Some(vec!["GET".to_string(), "POST".to_string()]),
                None,
                None,
            ]
        );
    }

    #[test]
    fn test_call_arguments() {
        let source = "bp.route('/items', methods=['POST'], strict_slashes=False)\n";
        let tree = parse(source);
        let call = first(tree.root_node(), SyntaxKind::Call);

        let positional = positional_args(call);
        assert_eq!(positional.len(), 1);
        assert_eq!(string_literal(positional[0], source).as_deref(), Some("/items"));

        let methods = keyword_arg(call, "methods", source).unwrap();
        assert_eq!(node_text(methods, source), "['POST']");
        assert!(keyword_arg(call, "endpoint", source).is_none());

        let (receiver, attribute) = member_access(call_function(call).unwrap(), source).unwrap();
        assert_eq!(bare_name(receiver, source), Some("bp"));
        assert_eq!(attribute, "route");
    }

    #[test]
    fn test_decorators_in_order() {
        let source = "@login_required\n@app.route('/x')\ndef view():\n    pass\n";
        let tree = parse(source);
        let function = first(tree.root_node(), SyntaxKind::FunctionDef);

        let texts: Vec<&str> = decorators(function)
            .into_iter()
            .map(|d| node_text(d, source))
            .collect();
        assert_eq!(texts, vec!["login_required", "app.route('/x')"]);
    }

    #[test]
    fn test_module_level_detection() {
        let source = "a = 1\nif DEBUG:\n    c = 3\ndef f():\n    b = 2\nclass K:\n    d = 4\n";
        let tree = parse(source);
        let levels: Vec<bool> = preorder(tree.root_node())
            .into_iter()
            .filter(|n| SyntaxKind::of(*n) == SyntaxKind::Assignment)
            .map(is_module_level)
            .collect();

        assert_eq!(levels, vec![true, true, false, false]);
    }
}
