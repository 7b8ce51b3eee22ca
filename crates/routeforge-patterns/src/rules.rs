//! The built-in rule table
//!
//! Order matters: the first matching rule wins. `Get*By*` sits ahead of the
//! plain `Get*` rule so lookups by a secondary field are reachable.

use tracing::error;

use crate::models::{HttpMethod, PatternRule};

/// Operation tag used when no rule matches
pub const CUSTOM_OPERATION: &str = "custom";

type RuleRow = (&'static [&'static str], HttpMethod, &'static str, &'static str);

const DEFAULT_RULES: &[RuleRow] = &[
    (&["Get*By*", "Find*By*"], HttpMethod::Get, "/{resource}/by/{field}", "get_by"),
    (&["Get*", "Find*"], HttpMethod::Get, "/{resource}/{id}", "get"),
    (&["List*", "GetAll*", "FindAll*", "Query*"], HttpMethod::Get, "/{resource}", "list"),
    (&["Create*", "Add*", "New*", "Insert*"], HttpMethod::Post, "/{resource}", "create"),
    (&["Update*", "Modify*", "Edit*", "Change*"], HttpMethod::Put, "/{resource}/{id}", "update"),
    (&["Delete*", "Remove*", "Destroy*"], HttpMethod::Delete, "/{resource}/{id}", "delete"),
    (&["Search*", "Query*", "Filter*"], HttpMethod::Get, "/{resource}/search", "search"),
    (&["Count*", "Total*"], HttpMethod::Get, "/{resource}/count", "count"),
    (&["Exists*", "Check*"], HttpMethod::Get, "/{resource}/{id}/exists", "exists"),
    (&["BulkCreate*", "BatchCreate*", "CreateMultiple*"], HttpMethod::Post, "/{resource}/bulk", "bulk_create"),
    (&["BulkUpdate*", "BatchUpdate*", "UpdateMultiple*"], HttpMethod::Put, "/{resource}/bulk", "bulk_update"),
    (&["BulkDelete*", "BatchDelete*", "DeleteMultiple*"], HttpMethod::Delete, "/{resource}/bulk", "bulk_delete"),
    (&["Activate*", "Enable*"], HttpMethod::Put, "/{resource}/{id}/activate", "activate"),
    (&["Deactivate*", "Disable*"], HttpMethod::Put, "/{resource}/{id}/deactivate", "deactivate"),
    (&["Archive*"], HttpMethod::Put, "/{resource}/{id}/archive", "archive"),
    (&["Restore*", "Unarchive*"], HttpMethod::Put, "/{resource}/{id}/restore", "restore"),
    (&["Assign*", "Link*"], HttpMethod::Post, "/{resource}/{id}/assign", "assign"),
    (&["Unassign*", "Unlink*"], HttpMethod::Delete, "/{resource}/{id}/assign", "unassign"),
];

/// Build the built-in table in match order
pub fn default_rules() -> Vec<PatternRule> {
    DEFAULT_RULES
        .iter()
        .filter_map(|(patterns, method, path, operation)| {
            PatternRule::new(patterns, *method, *path, *operation, true)
                .map_err(|e| error!(operation = %operation, error = %e, "Invalid built-in rule"))
                .ok()
        })
        .collect()
}
