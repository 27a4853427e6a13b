pub mod task;

pub use task::{
    field_errors, parse_json_body, validate_create_task, validate_update_task, FieldError,
};
