use serde::Serialize;

/// Envelope shared by every JSON response: `{status, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status: u16, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            data,
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_fields() {
        let resp = ApiResponse::<()>::error(404, "variant not found");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["status"], 404);
        assert_eq!(json["message"], "variant not found");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn envelope_carries_data() {
        let resp = ApiResponse::success(200, "ok", Some(vec![1, 2, 3]));
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }
}
