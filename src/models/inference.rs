use serde::{ Serialize, Deserialize };

/// Body accepted by the inference handler and sent by the remote resolver.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InferenceRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
