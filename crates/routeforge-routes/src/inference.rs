//! Per-operation parameter and response heuristics

use routeforge_scanner::{MethodModel, ParameterModel};

const CONTEXT_TYPE: &str = "context.Context";

/// Method parameters excluding `context.Context`
pub fn non_trivial_parameters(method: &MethodModel) -> Vec<&ParameterModel> {
    method
        .parameters
        .iter()
        .filter(|p| p.type_name != CONTEXT_TYPE)
        .collect()
}

fn id() -> ParameterModel {
    ParameterModel::new("id", "string")
}

fn query() -> Vec<ParameterModel> {
    vec![
        ParameterModel::new("q", "string"),
        ParameterModel::new("limit", "int"),
        ParameterModel::new("offset", "int"),
    ]
}

/// Inferred request parameters for a matched operation
pub fn parameters_for(operation: &str, method: &MethodModel) -> Vec<ParameterModel> {
    let own = non_trivial_parameters(method);
    match operation {
        "get" | "get_by" | "exists" | "delete" | "bulk_delete" | "unassign" => vec![id()],
        "create" => own.first().map(|p| (*p).clone()).into_iter().collect(),
        "update" | "bulk_update" | "activate" | "deactivate" | "archive" | "restore" => {
            let mut params = vec![id()];
            params.extend(own.get(1).map(|p| (*p).clone()));
            params
        }
        "assign" => {
            let mut params = vec![id()];
            params.extend(own.first().map(|p| (*p).clone()));
            params
        }
        "search" | "count" | "list" => query(),
        _ => Vec::new(),
    }
}

/// Inferred responses for a matched operation
pub fn responses_for(operation: &str, method: &MethodModel) -> Vec<ParameterModel> {
    let first = method.returns.first().cloned();
    match operation {
        "get" | "get_by" | "create" | "update" | "bulk_update" => first.into_iter().collect(),
        "list" | "search" => first
            .map(|mut p| {
                if !p.type_name.starts_with("[]") {
                    p.type_name = format!("[]{}", p.type_name);
                }
                p
            })
            .into_iter()
            .collect(),
        "delete" | "exists" => vec![ParameterModel::anonymous("bool")],
        "count" => vec![ParameterModel::anonymous("int")],
        "activate" | "deactivate" | "archive" | "restore" | "assign" | "unassign" => {
            vec![first.unwrap_or_else(|| ParameterModel::anonymous("bool"))]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(params: &[(&str, &str)], returns: &[&str]) -> MethodModel {
        MethodModel {
            name: "M".to_string(),
            parameters: params
                .iter()
                .map(|(n, t)| ParameterModel::new(*n, *t))
                .collect(),
            returns: returns.iter().map(|t| ParameterModel::anonymous(*t)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_skips_context() {
        let m = method(&[("ctx", "context.Context"), ("user", "User")], &["*User", "error"]);
        assert_eq!(parameters_for("create", &m), vec![ParameterModel::new("user", "User")]);
        assert_eq!(responses_for("create", &m), vec![ParameterModel::anonymous("*User")]);
    }

    #[test]
    fn test_update_takes_second_parameter() {
        let m = method(
            &[("ctx", "context.Context"), ("id", "string"), ("user", "User")],
            &["error"],
        );
        assert_eq!(
            parameters_for("update", &m),
            vec![ParameterModel::new("id", "string"), ParameterModel::new("user", "User")]
        );
    }

    #[test]
    fn test_query_operations() {
        let m = method(&[], &["[]Order", "error"]);
        let names: Vec<String> = parameters_for("list", &m).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["q", "limit", "offset"]);
        assert_eq!(responses_for("list", &m)[0].type_name, "[]Order");

        let single = method(&[], &["Order"]);
        assert_eq!(responses_for("search", &single)[0].type_name, "[]Order");
        assert_eq!(responses_for("count", &single)[0].type_name, "int");
    }

    #[test]
    fn test_state_operations_default_to_bool() {
        let m = method(&[("id", "string")], &[]);
        assert_eq!(responses_for("archive", &m), vec![ParameterModel::anonymous("bool")]);
        assert_eq!(parameters_for("archive", &m), vec![ParameterModel::new("id", "string")]);
    }

    #[test]
    fn test_assign_uses_first_parameter() {
        let m = method(&[("roleID", "string")], &[]);
        assert_eq!(
            parameters_for("assign", &m),
            vec![ParameterModel::new("id", "string"), ParameterModel::new("roleID", "string")]
        );
    }

    #[test]
    fn test_unknown_operation_has_no_inference() {
        let m = method(&[("x", "int")], &["int"]);
        assert!(parameters_for("custom", &m).is_empty());
        assert!(responses_for("custom", &m).is_empty());
    }
}
