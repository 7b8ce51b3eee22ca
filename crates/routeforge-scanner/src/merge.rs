//! Merge units that share a directory into one package

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{go::UnitModel, model::PackageModel};

/// A non-fatal inconsistency found while merging units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeNote {
    pub package: String,
    pub unit: PathBuf,
    pub message: String,
}

/// Merge one parsed unit into its package.
///
/// Types merge by name keeping the first field list. Functions keep first
/// occurrence per `(name, receiver)`. Methods are bound to types known so
/// far; [`associate_methods`] binds the rest once every unit is merged.
pub fn merge_unit(
    package: &mut PackageModel,
    unit: UnitModel,
    path: &Path,
    notes: &mut Vec<MergeNote>,
) {
    let key = package.key.clone();
    let mut note = |message: String| {
        debug!(package = %key, unit = %path.display(), "{}", message);
        notes.push(MergeNote {
            package: key.clone(),
            unit: path.to_path_buf(),
            message,
        });
    };

    if package.name.is_empty() {
        package.name = unit.package_name.clone();
    } else if !unit.package_name.is_empty() && package.name != unit.package_name {
        note(format!(
            "package name '{}' differs from '{}'",
            unit.package_name, package.name
        ));
    }

    for import in unit.imports {
        if !package.imports.contains(&import) {
            package.imports.push(import);
        }
    }

    for ty in unit.types {
        match package.type_named_mut(&ty.name) {
            Some(existing) => {
                if existing.fields != ty.fields && !ty.fields.is_empty() {
                    note(format!(
                        "type '{}' redeclared with different fields, keeping first",
                        ty.name
                    ));
                }
                for method in ty.methods {
                    existing.bind_method(method);
                }
                for annotation in ty.annotations {
                    if !existing.annotations.contains(&annotation) {
                        existing.annotations.push(annotation);
                    }
                }
                if existing.doc.is_empty() {
                    existing.doc = ty.doc;
                }
            }
            None => package.types.push(ty),
        }
    }

    for iface in unit.interfaces {
        if !package.interfaces.iter().any(|i| i.name == iface.name) {
            package.interfaces.push(iface);
        }
    }

    for function in unit.functions {
        let duplicate = package
            .functions
            .iter()
            .any(|f| {
                f.name == function.name && f.receiver_type_name() == function.receiver_type_name()
            });
        if duplicate {
            note(format!("duplicate function '{}' skipped", function.name));
            continue;
        }

        if let Some(receiver) = function.receiver_type_name() {
            if let Some(ty) = package.type_named_mut(receiver) {
                ty.bind_method(function.clone());
            }
        }
        package.functions.push(function);
    }

    package.units.push(path.to_path_buf());
}

/// Bind methods whose receiver type was declared in a later unit
pub fn associate_methods(package: &mut PackageModel) {
    let methods: Vec<_> = package
        .functions
        .iter()
        .filter(|f| f.is_method())
        .cloned()
        .collect();

    for method in methods {
        let Some(receiver) = method.receiver_type_name().map(str::to_string) else {
            continue;
        };
        if let Some(ty) = package.type_named_mut(&receiver) {
            ty.bind_method(method);
        }
    }
}
