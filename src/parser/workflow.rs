//! GitHub Actions workflow file parser

use indexmap::IndexMap;
use tracing::{debug, warn};
use tree_sitter::Node;

use crate::parser::error::ParseError;
use crate::parser::types::{JobDependency, UsesSpec};

/// Parser for GitHub Actions workflow files (.github/workflows/*.yml)
pub struct WorkflowParser;

impl WorkflowParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WorkflowParser {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowParser {
    /// Extract job dependencies from the raw workflow YAML
    ///
    /// Dependencies are returned in document order: jobs in the order they are
    /// declared, and steps in list order within each job. Steps without a `uses`
    /// reference are skipped. Aliases and `<<` merge keys are resolved against the
    /// anchors declared earlier in the document.
    pub fn parse(&self, content: &str) -> Result<Vec<JobDependency>, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_yaml::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set YAML language for tree-sitter: {}", e);
            ParseError::TreeSitter(e.to_string())
        })?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            warn!("Failed to parse YAML content");
            ParseError::ParseFailed
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::MalformedWorkflow(
                "document is not valid YAML".to_string(),
            ));
        }

        let document = Document::new(root, content)?;
        let jobs = document
            .mapping_node(root)
            .and_then(|mapping| document.find_value(mapping, "jobs"))
            .and_then(|jobs| document.mapping_node(jobs))
            .ok_or_else(|| {
                ParseError::MalformedWorkflow("missing top-level `jobs` mapping".to_string())
            })?;

        let mut results = Vec::new();
        for (job, job_value) in document.mapping_pairs(jobs) {
            let steps = job_value
                .and_then(|value| document.mapping_node(value))
                .and_then(|params| document.find_value(params, "steps"))
                .and_then(|steps| document.sequence_items(steps))
                .ok_or_else(|| {
                    ParseError::MalformedWorkflow(format!("job `{}` has no `steps` list", job))
                })?;

            for (index, step) in steps.into_iter().enumerate() {
                let step = document.mapping_node(step).ok_or_else(|| {
                    ParseError::MalformedWorkflow(format!(
                        "step {} of job `{}` is not a mapping",
                        index + 1,
                        job
                    ))
                })?;

                let Some(uses) = document
                    .find_value(step, "uses")
                    .and_then(|node| document.scalar_text(node))
                    .filter(|uses| !uses.is_empty())
                else {
                    continue;
                };

                let step_name = document
                    .find_value(step, "name")
                    .and_then(|node| document.scalar_text(node));

                debug!("Found `{}` in job `{}`", uses, job);
                results.push(JobDependency {
                    job: job.clone(),
                    step_name,
                    uses: UsesSpec::from_raw(&uses)?,
                });
            }
        }

        Ok(results)
    }
}

/// A node carrying an `&name` anchor
struct Anchor<'tree> {
    name: String,
    node: Node<'tree>,
}

/// Syntax tree of one workflow together with its source text and anchors
///
/// YAML tree structure for a GitHub Actions workflow:
/// ```text
/// stream
///   document
///     block_node
///       block_mapping
///         block_mapping_pair          <- "jobs: ..."
///           flow_node                 <- key: "jobs"
///           block_node
///             block_mapping           <- one pair per job
/// ```
///
/// An anchored value is a `block_node`/`flow_node` whose first child is an
/// `anchor`; an alias is a `flow_node` wrapping an `alias`.
struct Document<'tree> {
    content: &'tree str,
    anchors: Vec<Anchor<'tree>>,
}

impl<'tree> Document<'tree> {
    /// Index every anchor and reject aliases that refer to no earlier anchor
    fn new(root: Node<'tree>, content: &'tree str) -> Result<Self, ParseError> {
        let mut document = Self {
            content,
            anchors: Vec::new(),
        };

        let mut aliases = Vec::new();
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            match node.kind() {
                "anchor" => {
                    if let Some(parent) = node.parent() {
                        let name = document.name_of(node, '&');
                        document.anchors.push(Anchor { name, node: parent });
                    }
                }
                "alias" => aliases.push(node),
                _ => {
                    let mut cursor = node.walk();
                    let children: Vec<Node> = node.named_children(&mut cursor).collect();
                    pending.extend(children.into_iter().rev());
                }
            }
        }

        if let Some(alias) = aliases
            .into_iter()
            .find(|alias| document.alias_target(*alias).is_none())
        {
            return Err(ParseError::MalformedWorkflow(format!(
                "undefined alias `*{}`",
                document.name_of(alias, '*')
            )));
        }

        debug!("Indexed {} anchors", document.anchors.len());
        Ok(document)
    }

    fn text(&self, node: Node) -> &'tree str {
        &self.content[node.byte_range()]
    }

    fn name_of(&self, node: Node, sigil: char) -> String {
        self.text(node).trim().trim_start_matches(sigil).to_string()
    }

    /// The node an alias points at: the latest anchor of that name that closes before it
    fn alias_target(&self, alias: Node<'tree>) -> Option<Node<'tree>> {
        let name = self.name_of(alias, '*');
        self.anchors
            .iter()
            .rev()
            .find(|anchor| anchor.name == name && anchor.node.end_byte() <= alias.start_byte())
            .map(|anchor| anchor.node)
    }

    fn content_children(node: Node<'tree>) -> Vec<Node<'tree>> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|child| !matches!(child.kind(), "anchor" | "tag" | "comment"))
            .collect();
        children
    }

    /// Descend through wrapper nodes and aliases to the first block or flow mapping
    fn mapping_node(&self, node: Node<'tree>) -> Option<Node<'tree>> {
        match node.kind() {
            "block_mapping" | "flow_mapping" => Some(node),
            "stream" | "document" | "block_node" | "flow_node" | "block_sequence_item" => {
                Self::content_children(node)
                    .into_iter()
                    .find_map(|child| self.mapping_node(child))
            }
            "alias" => self
                .alias_target(node)
                .and_then(|target| self.mapping_node(target)),
            _ => None,
        }
    }

    /// Collect the items of a block or flow sequence
    fn sequence_items(&self, node: Node<'tree>) -> Option<Vec<Node<'tree>>> {
        match node.kind() {
            "block_sequence" => Some(
                Self::content_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "block_sequence_item")
                    .filter_map(|item| Self::content_children(item).into_iter().next())
                    .collect(),
            ),
            "flow_sequence" => Some(
                Self::content_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "flow_node")
                    .collect(),
            ),
            "block_node" | "flow_node" | "block_sequence_item" => Self::content_children(node)
                .into_iter()
                .find_map(|child| self.sequence_items(child)),
            "alias" => self
                .alias_target(node)
                .and_then(|target| self.sequence_items(target)),
            _ => None,
        }
    }

    /// Key/value pairs of a mapping in document order, with `<<` merges applied
    ///
    /// Merged keys come first and explicit keys override them. Within a merged
    /// sequence the earlier mapping wins. A repeated key keeps its first position
    /// and its last value.
    fn mapping_pairs(&self, mapping: Node<'tree>) -> IndexMap<String, Option<Node<'tree>>> {
        let mut merged = Vec::new();
        let mut explicit = Vec::new();

        let mut cursor = mapping.walk();
        let pairs: Vec<Node> = mapping
            .named_children(&mut cursor)
            .filter(|child| matches!(child.kind(), "block_mapping_pair" | "flow_pair"))
            .collect();
        for pair in pairs {
            let Some(key) = pair
                .child_by_field_name("key")
                .and_then(|key| self.scalar_text(key))
            else {
                continue;
            };
            let value = pair.child_by_field_name("value");
            match value {
                Some(value) if key == "<<" => {
                    let mut sources = self.merge_sources(value);
                    sources.reverse();
                    merged.extend(sources);
                }
                _ => explicit.push((key, value)),
            }
        }

        let mut result = IndexMap::new();
        for source in merged {
            result.extend(self.mapping_pairs(source));
        }
        result.extend(explicit);
        result
    }

    /// Mappings named by the value of a `<<` key: one mapping or a sequence of them
    fn merge_sources(&self, value: Node<'tree>) -> Vec<Node<'tree>> {
        if let Some(mapping) = self.mapping_node(value) {
            return vec![mapping];
        }
        self.sequence_items(value)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| self.mapping_node(item))
            .collect()
    }

    fn find_value(&self, mapping: Node<'tree>, key: &str) -> Option<Node<'tree>> {
        self.mapping_pairs(mapping).get(key).copied().flatten()
    }

    /// Get the decoded text of a scalar node
    ///
    /// Returns None for non-scalar nodes and for YAML nulls.
    fn scalar_text(&self, node: Node<'tree>) -> Option<String> {
        let text = self.text(node).trim();
        match node.kind() {
            "plain_scalar" => {
                (!matches!(text, "~" | "null" | "Null" | "NULL")).then(|| fold_lines(text))
            }
            "double_quote_scalar" => unquote(text, '"').map(decode_double_quoted),
            "single_quote_scalar" => {
                unquote(text, '\'').map(|body| fold_lines(body).replace("''", "'"))
            }
            "block_scalar" => {
                let mut lines = text.lines();
                let folded = lines.next().is_some_and(|header| header.starts_with('>'));
                let body: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
                Some(body.join(if folded { " " } else { "\n" }))
            }
            "block_node" | "flow_node" | "block_sequence_item" => Self::content_children(node)
                .into_iter()
                .find_map(|child| self.scalar_text(child)),
            "alias" => self
                .alias_target(node)
                .and_then(|target| self.scalar_text(target)),
            _ => None,
        }
    }
}

/// Strip exactly one quote from each end
fn unquote(text: &str, quote: char) -> Option<&str> {
    text.strip_prefix(quote)?.strip_suffix(quote)
}

/// Fold a multi-line flow scalar
///
/// Each line break becomes a space, and a run of empty lines becomes that many
/// newlines. Whitespace around the breaks is dropped.
fn fold_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;

    let mut folded = String::new();
    let mut breaks = 0;
    for (index, line) in lines.into_iter().enumerate() {
        let mut line = line;
        if index > 0 {
            line = line.trim_start_matches([' ', '\t']);
        }
        if index < last {
            line = line.trim_end_matches([' ', '\t', '\r']);
        }
        if index > 0 {
            if line.is_empty() && index < last {
                breaks += 1;
                continue;
            }
            if breaks == 0 {
                folded.push(' ');
            } else {
                folded.extend(std::iter::repeat_n('\n', breaks));
            }
            breaks = 0;
        }
        folded.push_str(line);
    }
    folded
}

/// Decode the body of a double-quoted scalar: escapes and line folding
fn decode_double_quoted(body: &str) -> String {
    let mut decoded = String::new();
    // Bytes before this offset came from escapes and survive folding
    let mut kept = 0;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(break_char @ ('\n' | '\r')) => {
                    if break_char == '\r' {
                        chars.next_if_eq(&'\n');
                    }
                    while chars.next_if(|&c| matches!(c, ' ' | '\t')).is_some() {}
                    kept = decoded.len();
                }
                Some(escape) => {
                    match unescape(escape, &mut chars) {
                        Some(unescaped) => decoded.push(unescaped),
                        None => {
                            decoded.push('\\');
                            decoded.push(escape);
                        }
                    }
                    kept = decoded.len();
                }
                None => decoded.push('\\'),
            },
            '\n' => {
                let trailing = decoded[kept..].trim_end_matches([' ', '\t', '\r']).len();
                decoded.truncate(kept + trailing);

                let mut breaks = 0;
                loop {
                    while chars.next_if(|&c| matches!(c, ' ' | '\t' | '\r')).is_some() {}
                    if chars.next_if_eq(&'\n').is_none() {
                        break;
                    }
                    breaks += 1;
                }
                if breaks == 0 {
                    decoded.push(' ');
                } else {
                    decoded.extend(std::iter::repeat_n('\n', breaks));
                }
                kept = decoded.len();
            }
            _ => decoded.push(c),
        }
    }
    decoded
}

fn unescape(escape: char, chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<char> {
    let unescaped = match escape {
        '0' => '\0',
        'a' => '\u{07}',
        'b' => '\u{08}',
        't' | '\t' => '\t',
        'n' => '\n',
        'v' => '\u{0B}',
        'f' => '\u{0C}',
        'r' => '\r',
        'e' => '\u{1B}',
        ' ' => ' ',
        '"' => '"',
        '/' => '/',
        '\\' => '\\',
        'N' => '\u{85}',
        '_' => '\u{A0}',
        'L' => '\u{2028}',
        'P' => '\u{2029}',
        'x' => return hex_char(chars, 2),
        'u' => return hex_char(chars, 4),
        'U' => return hex_char(chars, 8),
        _ => return None,
    };
    Some(unescaped)
}

/// Consume `digits` hex digits as a code point, leaving `chars` untouched when invalid
fn hex_char(chars: &mut std::iter::Peekable<std::str::Chars>, digits: usize) -> Option<char> {
    let hex: String = chars.clone().take(digits).collect();
    if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let unescaped = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)?;
    chars.nth(digits - 1);
    Some(unescaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::ActionRef;
    use rstest::rstest;

    const SAMPLE_WORKFLOW: &str = r#"jobs:
  lint:
    steps:
    - uses: actions/checkout@v4

    - name: Set up Python
      uses: actions/setup-python@v6

    - name: Install dependencies
      run: uv sync --all-extras --dev

  test:
    steps:
    - name: Set up deadsnakes
      uses: deadsnakes/action@v3.2.0
"#;

    fn dependency(job: &str, step_name: Option<&str>, uses: &str) -> JobDependency {
        JobDependency {
            job: job.to_string(),
            step_name: step_name.map(|s| s.to_string()),
            uses: UsesSpec::from_raw(uses).unwrap(),
        }
    }

    #[test]
    fn parse_extracts_dependencies_in_document_order() {
        let parser = WorkflowParser::new();
        let result = parser.parse(SAMPLE_WORKFLOW).unwrap();

        assert_eq!(
            result,
            vec![
                dependency("lint", None, "actions/checkout@v4"),
                dependency("lint", Some("Set up Python"), "actions/setup-python@v6"),
                dependency("test", Some("Set up deadsnakes"), "deadsnakes/action@v3.2.0"),
            ]
        );
    }

    #[test]
    fn parse_keeps_job_declaration_order_rather_than_alphabetical() {
        let parser = WorkflowParser::new();
        let content = r#"name: CI
on: push
jobs:
  zeta:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
  alpha:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/cache@v3
"#;
        let jobs: Vec<String> = parser
            .parse(content)
            .unwrap()
            .into_iter()
            .map(|d| d.job)
            .collect();

        assert_eq!(jobs, vec!["zeta".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn parse_skips_steps_without_uses() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - run: cargo build
      - name: Test
        run: cargo test
"#;
        assert_eq!(parser.parse(content).unwrap(), vec![]);
    }

    #[test]
    fn parse_handles_quotes_comments_and_flow_style() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    # checkout first
    steps:
      - uses: "actions/checkout@v4" # pinned
      - {name: 'Setup Node', uses: actions/setup-node@v4.0.2}
      - name: Empty uses
        uses:
  release: {steps: [{uses: softprops/action-gh-release@v2}]}
"#;
        let result = parser.parse(content).unwrap();

        assert_eq!(
            result,
            vec![
                dependency("build", None, "actions/checkout@v4"),
                dependency("build", Some("Setup Node"), "actions/setup-node@v4.0.2"),
                dependency("release", None, "softprops/action-gh-release@v2"),
            ]
        );
        assert_eq!(
            result[2].uses.action,
            ActionRef::new("softprops", "action-gh-release")
        );
    }

    #[test]
    fn parse_fails_without_jobs() {
        let parser = WorkflowParser::new();
        let content = "name: CI\non: push\n";

        assert!(matches!(
            parser.parse(content),
            Err(ParseError::MalformedWorkflow(_))
        ));
    }

    #[test]
    fn parse_fails_for_empty_document() {
        let parser = WorkflowParser::new();

        assert!(matches!(
            parser.parse(""),
            Err(ParseError::MalformedWorkflow(_))
        ));
    }

    #[test]
    fn parse_fails_when_job_has_no_steps() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  call:
    uses: octo-org/example-repo/.github/workflows/reusable.yml@main
"#;

        assert_eq!(
            parser.parse(content),
            Err(ParseError::MalformedWorkflow(
                "job `call` has no `steps` list".to_string()
            ))
        );
    }

    #[test]
    fn parse_fails_when_step_is_not_a_mapping() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    steps:
      - actions/checkout@v4
"#;

        assert!(matches!(
            parser.parse(content),
            Err(ParseError::MalformedWorkflow(_))
        ));
    }

    #[test]
    fn parse_propagates_malformed_reference() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    steps:
      - uses: ./.github/actions/local
"#;

        assert_eq!(
            parser.parse(content),
            Err(ParseError::MalformedReference(
                "./.github/actions/local".to_string()
            ))
        );
    }

    #[test]
    fn parse_propagates_invalid_version() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    steps:
      - uses: actions/checkout@main
"#;

        assert!(matches!(
            parser.parse(content),
            Err(ParseError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn parse_resolves_aliased_uses() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    steps:
      - uses: &checkout actions/checkout@v4
      - uses: *checkout
"#;

        assert_eq!(
            parser.parse(content).unwrap(),
            vec![
                dependency("build", None, "actions/checkout@v4"),
                dependency("build", None, "actions/checkout@v4"),
            ]
        );
    }

    #[test]
    fn parse_resolves_aliased_step() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  lint:
    steps:
      - &checkout
        name: Checkout
        uses: actions/checkout@v4
  test:
    steps:
      - *checkout
      - uses: actions/setup-python@v5
"#;

        assert_eq!(
            parser.parse(content).unwrap(),
            vec![
                dependency("lint", Some("Checkout"), "actions/checkout@v4"),
                dependency("test", Some("Checkout"), "actions/checkout@v4"),
                dependency("test", None, "actions/setup-python@v5"),
            ]
        );
    }

    #[test]
    fn parse_resolves_aliased_steps_list() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  lint:
    steps: &steps
      - uses: actions/checkout@v4
  test:
    steps: *steps
"#;

        assert_eq!(
            parser.parse(content).unwrap(),
            vec![
                dependency("lint", None, "actions/checkout@v4"),
                dependency("test", None, "actions/checkout@v4"),
            ]
        );
    }

    #[test]
    fn parse_applies_merge_keys_with_explicit_keys_winning() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    steps:
      - &python
        name: Set up Python
        uses: actions/setup-python@v5
      - <<: *python
        name: Set up Python again
      - <<: [*python]
        uses: actions/setup-python@v4
"#;

        assert_eq!(
            parser.parse(content).unwrap(),
            vec![
                dependency("build", Some("Set up Python"), "actions/setup-python@v5"),
                dependency("build", Some("Set up Python again"), "actions/setup-python@v5"),
                dependency("build", Some("Set up Python"), "actions/setup-python@v4"),
            ]
        );
    }

    #[test]
    fn parse_fails_for_undefined_alias() {
        let parser = WorkflowParser::new();
        let content = r#"jobs:
  build:
    steps:
      - uses: *missing
"#;

        assert_eq!(
            parser.parse(content),
            Err(ParseError::MalformedWorkflow(
                "undefined alias `*missing`".to_string()
            ))
        );
    }

    #[rstest]
    #[case::folded_plain("name: Set up\n          Python", "Set up Python")]
    #[case::plain_with_blank_line("name: Build\n\n          docs", "Build\ndocs")]
    #[case::double_quoted_escapes(r#"name: "Tab\tHere \u00e9 \x41""#, "Tab\tHere \u{e9} A")]
    #[case::escaped_trailing_quote(r#"name: "a\"""#, "a\"")]
    #[case::folded_double_quoted(
        "name: \"first\n          second\\\n          third\"",
        "first secondthird"
    )]
    #[case::single_quoted(r#"name: 'it''s ''quoted'''"#, "it's 'quoted'")]
    fn parse_decodes_step_names(#[case] name: &str, #[case] expected: &str) {
        let parser = WorkflowParser::new();
        let content = format!(
            "jobs:\n  build:\n    steps:\n      - {}\n        uses: actions/checkout@v4\n",
            name
        );

        let result = parser.parse(&content).unwrap();
        assert_eq!(result[0].step_name.as_deref(), Some(expected));
    }
}
