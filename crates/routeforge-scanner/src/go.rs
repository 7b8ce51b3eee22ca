//! Go unit extraction on top of tree-sitter-go
//!
//! One unit is one `.go` file. Extraction is purely syntactic: types are
//! recorded as written, nothing is resolved across files.

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::{
    annotations::{comment_lines, doc_text, parse_annotations, parse_tags},
    error::{Result, ScanError},
    model::{AnnotationModel, FieldModel, InterfaceModel, MethodModel, ParameterModel, TypeModel},
};

/// Declarations extracted from a single unit, before package merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitModel {
    pub package_name: String,
    pub imports: Vec<String>,
    pub types: Vec<TypeModel>,
    pub interfaces: Vec<InterfaceModel>,
    /// Functions and methods in declaration order
    pub functions: Vec<MethodModel>,
}

/// Parses Go source into a [`UnitModel`]
#[derive(Debug, Clone)]
pub struct GoUnitParser {
    scan_annotations: bool,
}

impl GoUnitParser {
    /// Create a parser; when `scan_annotations` is false doc comments are
    /// kept as text but no directives are extracted
    pub fn new(scan_annotations: bool) -> Self {
        Self { scan_annotations }
    }

    /// Read and parse a unit from disk
    pub fn parse_file(&self, path: &Path) -> Result<UnitModel> {
        let source = std::fs::read_to_string(path)?;
        self.parse_source(path, &source)
    }

    /// Parse unit source; `path` is only used for error reporting
    pub fn parse_source(&self, path: &Path, source: &str) -> Result<UnitModel> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| ScanError::TreeSitter {
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ScanError::Parse {
                path: path.to_path_buf(),
                message: "parser produced no tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error_position(root).unwrap_or((1, 1));
            return Err(ScanError::Parse {
                path: path.to_path_buf(),
                message: format!("syntax error at line {}, column {}", line, column),
            });
        }

        let src = source.as_bytes();
        let mut unit = UnitModel::default();
        let mut cursor = root.walk();
        let top_level: Vec<Node> = root.named_children(&mut cursor).collect();

        for node in top_level {
            match node.kind() {
                "package_clause" => {
                    if let Some(name) = first_named_child(node) {
                        unit.package_name = text(name, src).to_string();
                    }
                }
                "import_declaration" => collect_imports(node, src, &mut unit.imports),
                "type_declaration" => self.collect_types(node, src, &mut unit),
                "function_declaration" | "method_declaration" => {
                    unit.functions.push(self.extract_function(node, src));
                }
                _ => {}
            }
        }

        Ok(unit)
    }

    fn collect_types(&self, decl: Node<'_>, src: &[u8], unit: &mut UnitModel) {
        let decl_comments = leading_comments(decl, src);
        let mut cursor = decl.walk();
        let specs: Vec<Node> = decl
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "type_spec")
            .collect();

        for spec in specs {
            let (Some(name_node), Some(type_node)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };

            let mut comments = leading_comments(spec, src);
            if comments.is_empty() {
                comments = decl_comments.clone();
            }
            let name = text(name_node, src).to_string();

            match type_node.kind() {
                "struct_type" => unit.types.push(TypeModel {
                    name,
                    fields: self.extract_fields(type_node, src),
                    methods: Vec::new(),
                    doc: doc_text(&comments),
                    annotations: self.annotations(&comments),
                    line: spec.start_position().row + 1,
                }),
                "interface_type" => unit.interfaces.push(InterfaceModel {
                    name,
                    doc: doc_text(&comments),
                    methods: interface_methods(type_node, src),
                }),
                _ => {}
            }
        }
    }

    fn extract_fields(&self, struct_node: Node<'_>, src: &[u8]) -> Vec<FieldModel> {
        let mut fields = Vec::new();
        let Some(list) = find_named_child(struct_node, "field_declaration_list") else {
            return fields;
        };

        let mut cursor = list.walk();
        let declarations: Vec<Node> = list
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
            .collect();

        for decl in declarations {
            let comments = leading_comments(decl, src);
            let annotations = self.annotations(&comments);
            let tags = decl
                .child_by_field_name("tag")
                .map(|tag| parse_tags(text(tag, src)))
                .unwrap_or_default();
            let Some(type_node) = decl.child_by_field_name("type") else {
                continue;
            };

            let mut name_cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| text(n, src).to_string())
                .collect();

            if names.is_empty() {
                let mut child_cursor = decl.walk();
                let pointer = decl.children(&mut child_cursor).any(|c| c.kind() == "*");
                let written = type_string(type_node, src);
                let base = written.rsplit('.').next().unwrap_or(&written).to_string();
                fields.push(FieldModel {
                    name: base,
                    type_name: if pointer {
                        format!("*{}", written)
                    } else {
                        written
                    },
                    tags,
                    annotations,
                    embedded: true,
                });
                continue;
            }

            let type_name = type_string(type_node, src);
            for name in names {
                fields.push(FieldModel {
                    name,
                    type_name: type_name.clone(),
                    tags: tags.clone(),
                    annotations: annotations.clone(),
                    embedded: false,
                });
            }
        }

        fields
    }

    fn extract_function(&self, node: Node<'_>, src: &[u8]) -> MethodModel {
        let comments = leading_comments(node, src);
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| parameters(list, src).into_iter().next())
            .map(|p| p.type_name);

        MethodModel {
            name: node
                .child_by_field_name("name")
                .map(|n| text(n, src).to_string())
                .unwrap_or_default(),
            receiver,
            parameters: node
                .child_by_field_name("parameters")
                .map(|list| parameters(list, src))
                .unwrap_or_default(),
            returns: node
                .child_by_field_name("result")
                .map(|result| {
                    if result.kind() == "parameter_list" {
                        parameters(result, src)
                    } else {
                        vec![ParameterModel::anonymous(type_string(result, src))]
                    }
                })
                .unwrap_or_default(),
            annotations: self.annotations(&comments),
            doc: doc_text(&comments),
            line: node.start_position().row + 1,
        }
    }

    fn annotations(&self, comments: &[String]) -> Vec<AnnotationModel> {
        if self.scan_annotations {
            parse_annotations(comments)
        } else {
            Vec::new()
        }
    }
}

impl Default for GoUnitParser {
    fn default() -> Self {
        Self::new(true)
    }
}

fn parameters(list: Node<'_>, src: &[u8]) -> Vec<ParameterModel> {
    let mut out = Vec::new();
    let mut cursor = list.walk();
    let decls: Vec<Node> = list.named_children(&mut cursor).collect();

    for decl in decls {
        let variadic = match decl.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };
        let Some(type_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut type_name = type_string(type_node, src);
        if variadic {
            type_name = format!("...{}", type_name);
        }

        let mut name_cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| text(n, src).to_string())
            .collect();

        if names.is_empty() {
            out.push(ParameterModel::anonymous(type_name));
        } else {
            out.extend(
                names
                    .into_iter()
                    .map(|name| ParameterModel::new(name, type_name.clone())),
            );
        }
    }

    out
}

fn interface_methods(node: Node<'_>, src: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() == "method_elem" || n.kind() == "method_spec")
        .filter_map(|n| n.child_by_field_name("name"))
        .map(|n| text(n, src).to_string())
        .collect()
}

fn collect_imports(node: Node<'_>, src: &[u8], imports: &mut Vec<String>) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "import_spec" => {
                if let Some(path) = child.child_by_field_name("path") {
                    imports.push(text(path, src).trim_matches('"').trim_matches('`').to_string());
                }
            }
            "import_spec_list" => collect_imports(child, src, imports),
            _ => {}
        }
    }
}

/// Comment block directly above `node`, one entry per logical line
fn leading_comments(node: Node<'_>, src: &[u8]) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        if sibling.kind() != "comment" || sibling.end_position().row + 1 != expected_row {
            break;
        }
        // A trailing comment on the previous declaration's line is not doc
        if let Some(before) = sibling.prev_sibling() {
            if before.kind() != "comment"
                && before.end_position().row == sibling.start_position().row
            {
                break;
            }
        }
        blocks.push(text(sibling, src).to_string());
        expected_row = sibling.start_position().row;
        current = sibling.prev_sibling();
    }

    blocks.reverse();
    blocks.iter().flat_map(|b| comment_lines(b)).collect()
}

fn type_string(node: Node<'_>, src: &[u8]) -> String {
    match node.kind() {
        "struct_type" => "struct{}".to_string(),
        "interface_type" => "interface{}".to_string(),
        "function_type" => "func()".to_string(),
        _ => text(node, src)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    node.named_child(0)
}

fn find_named_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|n| n.kind() == kind);
    found
}

fn first_error_position(node: Node<'_>) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return Some((pos.row + 1, pos.column + 1));
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_position)
}

fn text<'s>(node: Node<'_>, src: &'s [u8]) -> &'s str {
    node.utf8_text(src).unwrap_or_default()
}
