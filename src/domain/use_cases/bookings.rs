use chrono::NaiveDate;
use tracing::{error, info};
use validator::Validate;

use crate::{email::smtp::Mailer, entities::booking::BookingInquiry, errors::ApiError};

const SUBJECT: &str = "TRONIOUS - NEW BOOKING INQUIRY!";

/// Validates a booking inquiry and sends one notification email.
pub struct BookingHandler {
    mailer: Mailer,
}

impl BookingHandler {
    pub fn new(mailer: Mailer) -> Self {
        BookingHandler { mailer }
    }

    pub async fn submit_inquiry(&self, inquiry: BookingInquiry) -> Result<(), ApiError> {
        inquiry.validate().map_err(|_| {
            ApiError::BadRequest(
                "Missing required fields: name, email, eventDate, eventType, and message are required"
                    .to_string(),
            )
        })?;

        let text = render_text(&inquiry);
        let html = render_html(&inquiry);

        self.mailer
            .send(&inquiry.email, SUBJECT, text, html)
            .await
            .map_err(|err| {
                error!(error = %err, "booking inquiry email failed");
                err
            })?;

        info!(name = %inquiry.name, email = %inquiry.email, "booking inquiry sent");
        Ok(())
    }
}

/// Formats the event date like "Saturday, June 14, 2026"; falls back to
/// the raw string when it does not parse as a date.
pub fn format_event_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn render_text(inquiry: &BookingInquiry) -> String {
    format!(
        "\
NEW BOOKING INQUIRY!

CONTACT INFORMATION
- Name: {name}
- Email: {email}
- Phone: {phone}

EVENT DETAILS
- Event Date: {date}
- Event Type: {event_type}
- Venue/Location: {venue}

MESSAGE
{message}

---
This inquiry was submitted through troniousmusic.com
",
        name = inquiry.name,
        email = inquiry.email,
        phone = inquiry.phone.as_deref().unwrap_or("Not provided"),
        date = format_event_date(&inquiry.event_date),
        event_type = inquiry.event_type_label(),
        venue = inquiry.venue.as_deref().unwrap_or("Not specified"),
        message = inquiry.message,
    )
}

pub fn render_html(inquiry: &BookingInquiry) -> String {
    format!(
        "\
<h2>🎸 New Booking Inquiry!</h2>

<h3>Contact Information</h3>
<ul>
  <li><strong>Name:</strong> {name}</li>
  <li><strong>Email:</strong> {email}</li>
  <li><strong>Phone:</strong> {phone}</li>
</ul>

<h3>Event Details</h3>
<ul>
  <li><strong>Event Date:</strong> {date}</li>
  <li><strong>Event Type:</strong> {event_type}</li>
  <li><strong>Venue/Location:</strong> {venue}</li>
</ul>

<h3>Message</h3>
<p>{message}</p>

<hr>
<p style=\"color: #666; font-size: 12px;\">
  This inquiry was submitted through troniousmusic.com
</p>
",
        name = escape_html(&inquiry.name),
        email = escape_html(&inquiry.email),
        phone = escape_html(inquiry.phone.as_deref().unwrap_or("Not provided")),
        date = format_event_date(&inquiry.event_date),
        event_type = escape_html(inquiry.event_type_label()),
        venue = escape_html(inquiry.venue.as_deref().unwrap_or("Not specified")),
        message = escape_html(&inquiry.message).replace('\n', "<br>"),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
