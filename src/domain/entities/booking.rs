use serde::Deserialize;
use validator::Validate;

/// Booking inquiry submitted through the public site. Field names follow
/// the frontend's camelCase form payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingInquiry {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "a valid email is required"))]
    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[validate(length(min = 1, message = "eventDate is required"))]
    pub event_date: String,

    #[validate(length(min = 1, message = "eventType is required"))]
    pub event_type: String,

    #[serde(default)]
    pub venue: Option<String>,

    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

impl BookingInquiry {
    /// Human label for the event type selector values used by the frontend.
    pub fn event_type_label(&self) -> &str {
        match self.event_type.as_str() {
            "wedding" => "Wedding",
            "corporate" => "Corporate Event",
            "private" => "Private Party",
            "venue" => "Venue / Bar / Restaurant",
            "festival" => "Festival",
            "other" => "Other",
            other => other,
        }
    }
}
