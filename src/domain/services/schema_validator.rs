// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::SchemaError;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 不作为子 schema 遍历的保留字段
const RESERVED_KEYS: [&str; 3] = ["type", "required", "additionalProperties"];

/// Schema 校验器
///
/// 在 schema 发送给模型之前，按严格模式结构化输出的规则深度优先地检查每个节点：
///
/// - `object` 节点必须声明 `additionalProperties: false`，并且 `properties`
///   的键集合与 `required` 完全一致
/// - `array` 节点必须声明 `items`
/// - `string` 节点是终结节点
/// - 其它类型标签一律拒绝
///
/// 校验是纯函数，对同一个文档重复校验结果相同
pub struct SchemaValidator;

impl SchemaValidator {
    /// 校验 schema 文本
    ///
    /// # 参数
    ///
    /// * `schema_text` - JSON Schema 文本
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - schema 满足严格模式规则
    /// * `Err(SchemaError)` - 第一个违反的规则及其节点路径
    pub fn validate(schema_text: &str) -> Result<(), SchemaError> {
        let document: Value = serde_json::from_str(schema_text).map_err(SchemaError::Malformed)?;
        Self::validate_value(&document)
    }

    /// 校验已解析的 schema 文档
    pub fn validate_value(document: &Value) -> Result<(), SchemaError> {
        validate_node(document, "$")
    }
}

fn validate_node(node: &Value, path: &str) -> Result<(), SchemaError> {
    let map = node
        .as_object()
        .ok_or_else(|| SchemaError::MalformedNestedSchema {
            path: path.to_string(),
        })?;

    match map.get("type") {
        Some(Value::String(tag)) => match tag.as_str() {
            "object" => validate_object(map, path),
            "array" => validate_array(map, path),
            "string" => Ok(()),
            other => Err(SchemaError::InvalidTypeTag {
                path: path.to_string(),
                type_tag: other.to_string(),
            }),
        },
        Some(other) => Err(SchemaError::InvalidTypeTag {
            path: path.to_string(),
            type_tag: other.to_string(),
        }),
        None => validate_container(map, path),
    }
}

fn validate_object(map: &Map<String, Value>, path: &str) -> Result<(), SchemaError> {
    if map.get("additionalProperties") != Some(&Value::Bool(false)) {
        return Err(SchemaError::MissingAdditionalProperties {
            path: path.to_string(),
        });
    }

    let properties = map
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| SchemaError::MissingProperties {
            path: path.to_string(),
        })?;

    check_required(map.get("required"), properties, path)?;

    for (name, schema) in properties {
        validate_node(schema, &format!("{}.properties.{}", path, name))?;
    }
    Ok(())
}

/// `required` 必须与 `properties` 的键集合完全相等
fn check_required(
    required: Option<&Value>,
    properties: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaError> {
    let mismatch = |detail: String| SchemaError::RequiredMismatch {
        path: path.to_string(),
        detail,
    };

    let names = match required {
        None if properties.is_empty() => return Ok(()),
        None => return Err(mismatch("required array is missing".to_string())),
        Some(Value::Array(names)) => names,
        Some(_) => return Err(mismatch("required must be an array".to_string())),
    };

    let mut required_set = HashSet::with_capacity(names.len());
    for name in names {
        let name = name
            .as_str()
            .ok_or_else(|| mismatch(format!("required entry {} is not a string", name)))?;
        if !required_set.insert(name) {
            return Err(mismatch(format!("'{}' is listed more than once", name)));
        }
    }

    if let Some(missing) = properties
        .keys()
        .find(|key| !required_set.contains(key.as_str()))
    {
        return Err(mismatch(format!("'{}' is not in required", missing)));
    }
    if let Some(orphan) = names
        .iter()
        .filter_map(Value::as_str)
        .find(|name| !properties.contains_key(*name))
    {
        return Err(mismatch(format!("'{}' is not a declared property", orphan)));
    }
    Ok(())
}

fn validate_array(map: &Map<String, Value>, path: &str) -> Result<(), SchemaError> {
    let items = map.get("items").ok_or_else(|| SchemaError::MissingItems {
        path: path.to_string(),
    })?;
    validate_node(items, &format!("{}.items", path))
}

// Untyped node: every non-reserved child must itself be a schema.
fn validate_container(map: &Map<String, Value>, path: &str) -> Result<(), SchemaError> {
    for (key, child) in map {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let child_path = format!("{}.{}", path, key);
        if !child.is_object() {
            return Err(SchemaError::MalformedNestedSchema { path: child_path });
        }
        validate_node(child, &child_path)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "schema_validator_test.rs"]
mod tests;
