use serde::Deserialize;
use validator::Validate;

/// Name length past 16 is left to storage; the service maps the
/// truncation error instead of pre-checking.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVariantRequest {
    #[validate(length(min = 1))]
    pub name: String,
}
