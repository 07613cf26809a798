//! CRD filter specification
//!
//! Path expressions the component generation engine uses to pull kind, group,
//! version and schema out of the CustomResourceDefinition documents Cilium
//! ships. They are evaluated remotely; a mismatch with the upstream document
//! shape shows up as an empty or partial catalog, never as a local error.

use serde::{Deserialize, Serialize};

const ROOT_FILTER: &str = r#"$[?(@.kind=="CustomResourceDefinition")]"#;
const NAME_FILTER: &str = r#"$..["spec"]["names"]["kind"]"#;
const VERSION_FILTER: &str = "$[0]..spec.versions[0]";
const GROUP_FILTER: &str = "$[0]..spec";
const SPEC_FILTER: &str = "$[0]..openAPIV3Schema.properties.spec";
// Left open: the engine closes the predicate with each CRD kind it iterates.
const ITERATION_FILTER: &str = "$[?(@.spec.names.kind";
const VERSION_FIELD: &str = "name";
const GROUP_FIELD: &str = "group";

/// Where to find CRD metadata inside a manifest document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub root_filter: Vec<String>,
    pub name_filter: Vec<String>,
    pub version_filter: Vec<String>,
    pub group_filter: Vec<String>,
    pub spec_filter: Vec<String>,
    pub iteration_filter: Vec<String>,
    pub iteration_spec_filter: Vec<String>,
    pub version_field_name: String,
    pub group_field_name: String,
}

/// Filter specification for Cilium CRDs
pub fn build() -> FilterSpec {
    FilterSpec {
        root_filter: vec![ROOT_FILTER.to_string()],
        name_filter: vec![NAME_FILTER.to_string()],
        version_filter: vec![VERSION_FILTER.to_string()],
        group_filter: vec![GROUP_FILTER.to_string()],
        spec_filter: vec![SPEC_FILTER.to_string()],
        iteration_filter: vec![ITERATION_FILTER.to_string()],
        iteration_spec_filter: vec![ITERATION_FILTER.to_string()],
        version_field_name: VERSION_FIELD.to_string(),
        group_field_name: GROUP_FIELD.to_string(),
    }
}
