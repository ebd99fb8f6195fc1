//! Operation extraction per path item
//!
//! Maps each declared HTTP method of a path item to the identifier and
//! description used for its routing flow.

use crate::openapi::PathItem;
use oas2proxy_common::HttpMethod;
use std::collections::BTreeMap;

/// Identifier and description of one (path, method) operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationDetail {
    pub operation_id: String,
    pub description: String,
}

/// Extracts operation details from path items
pub struct OperationMapper;

impl OperationMapper {
    /// Map every declared method of a path item to its operation detail
    ///
    /// Methods the path item does not declare are absent from the result.
    /// The map iterates in canonical method order (GET, POST, PUT, PATCH,
    /// DELETE, OPTIONS, TRACE, HEAD).
    ///
    /// # Examples
    /// ```
    /// use oas2proxy_common::HttpMethod;
    /// use oas2proxy_parser::openapi::{Operation, PathItem};
    /// use oas2proxy_parser::OperationMapper;
    ///
    /// let item = PathItem {
    ///     get: Some(Operation {
    ///         description: Some("Fetch item".to_string()),
    ///         ..Operation::default()
    ///     }),
    ///     ..PathItem::default()
    /// };
    ///
    /// let methods = OperationMapper::map_methods(&item, "/items/{id}");
    /// assert_eq!(methods[&HttpMethod::Get].operation_id, "get_/items/{id}");
    /// assert_eq!(methods[&HttpMethod::Get].description, "Fetch item");
    /// assert!(!methods.contains_key(&HttpMethod::Post));
    /// ```
    pub fn map_methods(
        path_item: &PathItem,
        path_key: &str,
    ) -> BTreeMap<HttpMethod, OperationDetail> {
        path_item
            .operations()
            .map(|(method, operation)| {
                let operation_id = operation
                    .operation_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| Self::fallback_operation_id(method, path_key));

                let description = operation
                    .description
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or_default()
                    .to_string();

                (
                    method,
                    OperationDetail {
                        operation_id,
                        description,
                    },
                )
            })
            .collect()
    }

    /// Identifier synthesized when an operation has no `operationId`
    ///
    /// Only backslashes in the path key are replaced; slashes and braces are
    /// kept as-is.
    ///
    /// # Examples
    /// ```
    /// use oas2proxy_common::HttpMethod;
    /// use oas2proxy_parser::OperationMapper;
    ///
    /// assert_eq!(
    ///     OperationMapper::fallback_operation_id(HttpMethod::Delete, "/pets/{id}"),
    ///     "delete_/pets/{id}"
    /// );
    /// assert_eq!(
    ///     OperationMapper::fallback_operation_id(HttpMethod::Get, r"\legacy\path"),
    ///     "get__legacy_path"
    /// );
    /// ```
    pub fn fallback_operation_id(method: HttpMethod, path_key: &str) -> String {
        format!("{}_{}", method.as_str(), path_key.replace('\\', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::Operation;

    fn op(id: Option<&str>, description: Option<&str>) -> Option<Operation> {
        Some(Operation {
            operation_id: id.map(str::to_string),
            description: description.map(str::to_string),
            ..Operation::default()
        })
    }

    #[test]
    fn test_explicit_ids_and_descriptions() {
        let item = PathItem {
            get: op(Some("getPet"), Some("Get a pet")),
            put: op(Some("updatePet"), None),
            ..PathItem::default()
        };

        let methods = OperationMapper::map_methods(&item, "/pets/{petId}");
        assert_eq!(methods.len(), 2);
        assert_eq!(
            methods[&HttpMethod::Get],
            OperationDetail {
                operation_id: "getPet".to_string(),
                description: "Get a pet".to_string(),
            }
        );
        assert_eq!(methods[&HttpMethod::Put].operation_id, "updatePet");
        assert_eq!(methods[&HttpMethod::Put].description, "");
    }

    #[test]
    fn test_empty_operation_id_falls_back() {
        let item = PathItem {
            post: op(Some(""), Some("")),
            ..PathItem::default()
        };

        let methods = OperationMapper::map_methods(&item, "/pets");
        assert_eq!(methods[&HttpMethod::Post].operation_id, "post_/pets");
        assert_eq!(methods[&HttpMethod::Post].description, "");
    }

    #[test]
    fn test_all_methods_in_canonical_order() {
        let item = PathItem {
            get: op(None, None),
            post: op(None, None),
            put: op(None, None),
            patch: op(None, None),
            delete: op(None, None),
            options: op(None, None),
            trace: op(None, None),
            head: op(None, None),
            ..PathItem::default()
        };

        let methods = OperationMapper::map_methods(&item, "/x");
        let ids: Vec<&str> = methods
            .values()
            .map(|detail| detail.operation_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "get_/x",
                "post_/x",
                "put_/x",
                "patch_/x",
                "delete_/x",
                "options_/x",
                "trace_/x",
                "head_/x"
            ]
        );
    }

    #[test]
    fn test_path_without_operations() {
        let methods = OperationMapper::map_methods(&PathItem::default(), "/empty");
        assert!(methods.is_empty());
    }
}
