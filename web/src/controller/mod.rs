use serde::Serialize;

pub(crate) mod auction_controller;
pub(crate) mod bid_controller;
pub(crate) mod contract_offer_controller;
pub(crate) mod cooperative_controller;
pub(crate) mod health_check_controller;
pub(crate) mod news_controller;
pub(crate) mod notification_controller;
pub(crate) mod quality_inspection_controller;
pub(crate) mod user_controller;
pub(crate) mod user_session_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }

    pub fn no_content(status_code: u16) -> ApiResponse<()> {
        ApiResponse {
            status_code,
            data: None,
        }
    }
}
