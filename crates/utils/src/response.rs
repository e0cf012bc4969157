use serde::{Deserialize, Serialize};

/// JSON envelope every API endpoint answers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelopes_serialize_with_all_fields() {
        let ok = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(ok, json!({"success": true, "data": [1, 2], "message": null}));

        let err = serde_json::to_value(ApiResponse::<()>::error("Card not found")).unwrap();
        assert_eq!(
            err,
            json!({"success": false, "data": null, "message": "Card not found"})
        );
    }
}
