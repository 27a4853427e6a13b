//! 任务请求体校验
//!
//! 先把原始字节解码为 JSON（失败即“格式错误”），再按字段规则逐项校验，
//! 收集全部字段错误后一次性返回。

use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};
use taskboard_domain::{NewTask, Priority, TaskPatch};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::ApiError;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// 针对整个请求体（而非单个字段）的错误所使用的字段名
pub const BODY_FIELD: &str = "body";

const CREATE_FIELDS: [&str; 3] = ["title", "description", "priority"];
const UPDATE_FIELDS: [&str; 4] = ["title", "description", "completed", "priority"];

/// 响应体 `details` 中的单条错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// 将校验错误展开为 `{field, message}` 列表，按字段名排序
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<(String, &Vec<ValidationError>)> = errors
        .errors()
        .iter()
        .filter_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(list) => Some((field.to_string(), list)),
            _ => None,
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, list)| {
            list.iter().map(move |error| FieldError {
                field: field.clone(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string()),
            })
        })
        .collect()
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

fn add_error(errors: &mut ValidationErrors, field: &str, error: ValidationError) {
    let entry = errors
        .errors_mut()
        .entry(Cow::Owned(field.to_string()))
        .or_insert_with(|| ValidationErrorsKind::Field(Vec::new()));
    if let ValidationErrorsKind::Field(list) = entry {
        list.push(error);
    }
}

/// 记录规则校验结果，失败时写入 `errors`
fn check<T>(
    errors: &mut ValidationErrors,
    field: &str,
    result: Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            add_error(errors, field, error);
            None
        }
    }
}

fn into_result<T>(errors: ValidationErrors, value: T) -> Result<T, ValidationErrors> {
    if errors.errors().is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

/// 空请求体视为 `{}`，其余内容必须是合法 JSON
pub fn parse_json_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|_| ApiError::MalformedBody)
}

pub fn validate_create_task(body: &Value) -> Result<NewTask, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(object) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    reject_unknown_fields(object, &CREATE_FIELDS, &mut errors);

    let title = match object.get("title") {
        Some(value) => check(&mut errors, "title", validate_title(value)),
        None => {
            add_error(
                &mut errors,
                "title",
                rule_error("required", "\"title\" is required".to_string()),
            );
            None
        }
    };
    let description = object
        .get("description")
        .and_then(|value| check(&mut errors, "description", validate_description(value)));
    let priority = object
        .get("priority")
        .and_then(|value| check(&mut errors, "priority", validate_priority(value)));

    let new_task = NewTask {
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        priority: priority.unwrap_or_default(),
    };
    into_result(errors, new_task)
}

pub fn validate_update_task(body: &Value) -> Result<TaskPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(object) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    reject_unknown_fields(object, &UPDATE_FIELDS, &mut errors);

    if !UPDATE_FIELDS.iter().any(|field| object.contains_key(*field)) {
        add_error(
            &mut errors,
            BODY_FIELD,
            rule_error(
                "at_least_one_field",
                "at least one field must be provided".to_string(),
            ),
        );
    }

    let patch = TaskPatch {
        title: object
            .get("title")
            .and_then(|value| check(&mut errors, "title", validate_title(value))),
        description: object
            .get("description")
            .and_then(|value| check(&mut errors, "description", validate_description(value))),
        completed: object
            .get("completed")
            .and_then(|value| check(&mut errors, "completed", validate_completed(value))),
        priority: object
            .get("priority")
            .and_then(|value| check(&mut errors, "priority", validate_priority(value))),
    };
    into_result(errors, patch)
}

fn as_object<'a>(
    body: &'a Value,
    errors: &mut ValidationErrors,
) -> Option<&'a Map<String, Value>> {
    let object = body.as_object();
    if object.is_none() {
        add_error(
            errors,
            BODY_FIELD,
            rule_error("type", "\"body\" must be an object".to_string()),
        );
    }
    object
}

fn reject_unknown_fields(
    object: &Map<String, Value>,
    allowed: &[&str],
    errors: &mut ValidationErrors,
) {
    for key in object.keys().filter(|key| !allowed.contains(&key.as_str())) {
        add_error(
            errors,
            key,
            rule_error("unknown_field", format!("\"{key}\" is not allowed")),
        );
    }
}

/// 验证任务标题：去除首尾空白后 3 到 100 个字符
pub fn validate_title(value: &Value) -> Result<String, ValidationError> {
    trimmed_string("title", value, TITLE_MIN_CHARS, TITLE_MAX_CHARS)
}

/// 验证任务描述：去除首尾空白后最多 500 个字符，允许为空
pub fn validate_description(value: &Value) -> Result<String, ValidationError> {
    trimmed_string("description", value, 0, DESCRIPTION_MAX_CHARS)
}

/// 验证完成状态必须为布尔值
pub fn validate_completed(value: &Value) -> Result<bool, ValidationError> {
    value.as_bool().ok_or_else(|| {
        rule_error("type", "\"completed\" must be a boolean".to_string())
    })
}

/// 验证优先级取值
pub fn validate_priority(value: &Value) -> Result<Priority, ValidationError> {
    value
        .as_str()
        .and_then(|s| s.parse::<Priority>().ok())
        .ok_or_else(|| {
            let allowed: Vec<&str> = Priority::ALL.iter().map(Priority::as_str).collect();
            rule_error(
                "enum",
                format!("\"priority\" must be one of [{}]", allowed.join(", ")),
            )
        })
}

fn trimmed_string(
    field: &str,
    value: &Value,
    min_chars: usize,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let Value::String(raw) = value else {
        return Err(rule_error("type", format!("\"{field}\" must be a string")));
    };

    let trimmed = raw.trim();
    let length = trimmed.chars().count();

    if length == 0 && min_chars > 0 {
        Err(rule_error(
            "required",
            format!("\"{field}\" is not allowed to be empty"),
        ))
    } else if length < min_chars {
        Err(rule_error(
            "length",
            format!("\"{field}\" length must be at least {min_chars} characters long"),
        ))
    } else if length > max_chars {
        Err(rule_error(
            "length",
            format!("\"{field}\" length must be less than or equal to {max_chars} characters long"),
        ))
    } else {
        Ok(trimmed.to_string())
    }
}
