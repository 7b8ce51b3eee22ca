//! Declaration model produced by a scan
//!
//! Built once per scan and read-only afterwards. Collections keep source
//! declaration order so downstream output is reproducible.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Every package discovered under a scan root, keyed by directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    /// Scan root the package keys are relative to
    pub root: PathBuf,
    /// Packages keyed by their directory relative to `root` (`.` for the root)
    pub packages: BTreeMap<String, PackageModel>,
}

impl ProjectModel {
    /// Create an empty model for a scan root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            packages: BTreeMap::new(),
        }
    }

    /// Packages in key order
    pub fn packages(&self) -> impl Iterator<Item = &PackageModel> {
        self.packages.values()
    }

    /// Total struct-like types across packages
    pub fn type_count(&self) -> usize {
        self.packages.values().map(|p| p.types.len()).sum()
    }

    /// Total functions and methods across packages
    pub fn function_count(&self) -> usize {
        self.packages.values().map(|p| p.functions.len()).sum()
    }

    /// Find a type by name in any package
    pub fn find_type(&self, name: &str) -> Option<&TypeModel> {
        self.packages.values().find_map(|p| p.type_named(name))
    }
}

/// Declarations discovered under one directory, merged across its units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageModel {
    /// Directory key relative to the scan root
    pub key: String,
    /// Name from the `package` clause
    pub name: String,
    /// Slash-separated directory with any leading `src/` removed
    pub import_path: String,
    /// Imported paths, first occurrence order, no duplicates
    pub imports: Vec<String>,
    /// Struct-like types
    pub types: Vec<TypeModel>,
    /// Interface declarations, recorded but never routed
    pub interfaces: Vec<InterfaceModel>,
    /// Every function and method declared in the package
    pub functions: Vec<MethodModel>,
    /// Units merged into this package
    pub units: Vec<PathBuf>,
}

impl PackageModel {
    /// Find a type by name
    pub fn type_named(&self, name: &str) -> Option<&TypeModel> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Find a type by name for mutation
    pub fn type_named_mut(&mut self, name: &str) -> Option<&mut TypeModel> {
        self.types.iter_mut().find(|t| t.name == name)
    }
}

/// A struct-like type declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeModel {
    pub name: String,
    pub fields: Vec<FieldModel>,
    /// Methods bound through their receiver; names are unique
    pub methods: Vec<MethodModel>,
    pub doc: String,
    pub annotations: Vec<AnnotationModel>,
    /// 1-based line of the declaration
    pub line: usize,
}

impl TypeModel {
    /// Check if a method with this name is already bound
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Bind a method unless one with the same name is already bound.
    ///
    /// Returns `true` when the method was added.
    pub fn bind_method(&mut self, method: MethodModel) -> bool {
        if self.has_method(&method.name) {
            return false;
        }
        self.methods.push(method);
        true
    }

    /// Annotations with the given key
    pub fn annotations_with_key<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a AnnotationModel> + 'a {
        self.annotations.iter().filter(move |a| a.key == key)
    }
}

/// A struct field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldModel {
    pub name: String,
    /// Go type expression as written, e.g. `*time.Time`
    #[serde(rename = "type")]
    pub type_name: String,
    pub tags: Vec<TagModel>,
    pub annotations: Vec<AnnotationModel>,
    /// Embedded fields use their type as the name
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub embedded: bool,
}

impl FieldModel {
    /// Value of a struct tag key such as `json`
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }
}

/// One `key:"value"` pair of a struct tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagModel {
    pub key: String,
    pub value: String,
}

/// A function or method declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodModel {
    pub name: String,
    /// Receiver type as written, e.g. `*UserService`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub parameters: Vec<ParameterModel>,
    pub returns: Vec<ParameterModel>,
    pub annotations: Vec<AnnotationModel>,
    pub doc: String,
    /// 1-based line of the declaration
    pub line: usize,
}

impl MethodModel {
    /// Receiver type name with pointer and type arguments removed
    ///
    /// `*Store[T]` becomes `Store`.
    pub fn receiver_type_name(&self) -> Option<&str> {
        self.receiver.as_deref().map(|r| {
            let r = r.trim().trim_start_matches('*').trim();
            match r.find('[') {
                Some(idx) => r[..idx].trim(),
                None => r,
            }
        })
    }

    /// Check whether this is a method rather than a free function
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// Annotations with the given key
    pub fn annotations_with_key<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a AnnotationModel> + 'a {
        self.annotations.iter().filter(move |a| a.key == key)
    }
}

/// A named or anonymous parameter or return value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterModel {
    /// Empty for anonymous results
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ParameterModel {
    /// Create a named parameter
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an anonymous parameter
    pub fn anonymous(type_name: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            type_name: type_name.into(),
        }
    }
}

/// An `@api.<key>` directive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationModel {
    /// Directive key without the `@api.` marker, e.g. `route` or `doc.title`
    pub key: String,
    /// First token after the key
    pub value: String,
    /// Free-form `key=value` bag; unknown keys are kept
    pub config: BTreeMap<String, String>,
}

impl AnnotationModel {
    /// Create an annotation with an empty configuration bag
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            config: BTreeMap::new(),
        }
    }

    /// Look up a configuration entry
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }
}

/// An interface declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceModel {
    pub name: String,
    pub doc: String,
    /// Declared method names in order
    pub methods: Vec<String>,
}
