use serde_json::Value;

use herald_common::HeraldError;
use herald_common::types::{ReviewStatus, TaskRecord};

/// Validate a raw `homeworks` element into a [`TaskRecord`].
pub fn parse_task(record: &Value) -> Result<TaskRecord, HeraldError> {
    let name = record
        .get("homework_name")
        .and_then(Value::as_str)
        .ok_or_else(|| HeraldError::MissingField("review record has no \"homework_name\"".into()))?;

    let status = match record.get("status") {
        None | Some(Value::Null) => {
            return Err(HeraldError::MissingField(format!(
                "review \"{name}\" has no \"status\""
            )));
        }
        Some(raw) => raw
            .as_str()
            .and_then(|s| s.parse::<ReviewStatus>().ok())
            .ok_or_else(|| {
                HeraldError::MissingField(format!("review \"{name}\" has unknown status {raw}"))
            })?,
    };

    Ok(TaskRecord {
        name: name.to_string(),
        status,
    })
}

/// Render the chat message for a raw review record.
pub fn format_status(record: &Value) -> Result<String, HeraldError> {
    parse_task(record).map(|task| task.message())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_known_statuses() {
        let cases = [
            ("approved", "Review checked: reviewer liked everything. Hooray!"),
            ("reviewing", "Review taken into work by the reviewer."),
            ("rejected", "Review checked: reviewer has remarks."),
        ];
        for (status, verdict) in cases {
            let record = json!({"homework_name": "proj1", "status": status});
            let message = format_status(&record).unwrap();
            assert_eq!(message, format!("Changed status of review \"proj1\". {verdict}"));
            // Same input, same output.
            assert_eq!(format_status(&record).unwrap(), message);
        }
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let record = json!({
            "id": 7,
            "homework_name": "proj1",
            "status": "rejected",
            "reviewer_comment": "see notes",
        });
        assert_eq!(
            format_status(&record).unwrap(),
            "Changed status of review \"proj1\". Review checked: reviewer has remarks."
        );
    }

    #[test]
    fn test_missing_or_unknown_fields() {
        let records = [
            json!({"status": "approved"}),
            json!({"homework_name": 5, "status": "approved"}),
            json!({"homework_name": "proj1"}),
            json!({"homework_name": "proj1", "status": null}),
            json!({"homework_name": "proj1", "status": "lost"}),
            json!({"homework_name": "proj1", "status": "APPROVED"}),
            json!({"homework_name": "proj1", "status": 1}),
            json!("proj1"),
        ];
        for record in &records {
            assert!(
                matches!(format_status(record), Err(HeraldError::MissingField(_))),
                "{record} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_task() {
        let task = parse_task(&json!({"homework_name": "proj2", "status": "reviewing"})).unwrap();
        assert_eq!(task.name, "proj2");
        assert_eq!(task.status, ReviewStatus::Reviewing);
    }
}
