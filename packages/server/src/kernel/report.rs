//! Booking report documents.
//!
//! The engine hands a flattened `BookingReport` to a `BaseReportRenderer`;
//! the default renderer produces a self-contained printable HTML page. PDF
//! generation stays behind the same trait for deployments that want it.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::common::BookingId;
use crate::domains::bookings::Booking;
use crate::domains::rooms::Room;
use crate::domains::users::User;

use super::traits::BaseReportRenderer;

/// Everything a rendered booking document needs, denormalized so renderers
/// never touch the database.
#[derive(Debug, Clone)]
pub struct BookingReport {
    pub booking_id: BookingId,
    pub guest_name: String,
    pub guest_email: String,
    pub room_name: String,
    pub room_location: String,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub guests: i32,
    pub total_amount: Decimal,
    pub status: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

impl BookingReport {
    pub fn assemble(booking: &Booking, guest: &User, room: &Room) -> Self {
        Self {
            booking_id: booking.id,
            guest_name: guest.name.clone(),
            guest_email: guest.email.clone(),
            room_name: room.name.clone(),
            room_location: room.location.clone(),
            date_from: booking.date_from,
            date_to: booking.date_to,
            guests: booking.guests,
            total_amount: booking.total_amount,
            status: booking.status.clone(),
            payment_status: booking.payment_status.clone(),
            created_at: booking.created_at,
        }
    }
}

/// Default renderer: one printable HTML page per booking.
#[derive(Debug, Clone, Default)]
pub struct HtmlReportRenderer;

impl BaseReportRenderer for HtmlReportRenderer {
    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn render(&self, report: &BookingReport) -> Result<Vec<u8>> {
        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Booking {id}</title>
<style>
  body {{ font-family: Georgia, serif; margin: 3rem auto; max-width: 40rem; color: #222; }}
  h1 {{ font-size: 1.4rem; border-bottom: 2px solid #222; padding-bottom: 0.5rem; }}
  table {{ width: 100%; border-collapse: collapse; margin-top: 1rem; }}
  th {{ text-align: left; padding: 0.4rem 0.8rem 0.4rem 0; width: 11rem; vertical-align: top; }}
  td {{ padding: 0.4rem 0; }}
  .status {{ text-transform: uppercase; letter-spacing: 0.08em; }}
  footer {{ margin-top: 2rem; font-size: 0.8rem; color: #777; }}
</style>
</head>
<body>
<h1>Booking Confirmation</h1>
<table>
  <tr><th>Booking reference</th><td>{id}</td></tr>
  <tr><th>Guest</th><td>{guest} &lt;{email}&gt;</td></tr>
  <tr><th>Room</th><td>{room}, {location}</td></tr>
  <tr><th>Check-in</th><td>{from}</td></tr>
  <tr><th>Check-out</th><td>{to}</td></tr>
  <tr><th>Guests</th><td>{guests}</td></tr>
  <tr><th>Total amount</th><td>{amount}</td></tr>
  <tr><th>Status</th><td class="status">{status}</td></tr>
  <tr><th>Payment</th><td class="status">{payment}</td></tr>
</table>
<footer>Generated {generated} &middot; booked {created}</footer>
</body>
</html>
"#,
            id = report.booking_id,
            guest = escape_html(&report.guest_name),
            email = escape_html(&report.guest_email),
            room = escape_html(&report.room_name),
            location = escape_html(&report.room_location),
            from = report.date_from.format("%Y-%m-%d %H:%M UTC"),
            to = report.date_to.format("%Y-%m-%d %H:%M UTC"),
            guests = report.guests,
            amount = report.total_amount,
            status = escape_html(&report.status),
            payment = escape_html(&report.payment_status),
            generated = Utc::now().format("%Y-%m-%d %H:%M UTC"),
            created = report.created_at.format("%Y-%m-%d"),
        );
        Ok(html.into_bytes())
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{RoomId, UserId};
    use chrono::TimeZone;

    fn sample_report() -> BookingReport {
        BookingReport {
            booking_id: BookingId::new(),
            guest_name: "Maya O'Brien".to_string(),
            guest_email: "maya@example.com".to_string(),
            room_name: "Harbor Suite <Deluxe>".to_string(),
            room_location: "Pier 7".to_string(),
            date_from: Utc.with_ymd_and_hms(2026, 9, 10, 14, 0, 0).unwrap(),
            date_to: Utc.with_ymd_and_hms(2026, 9, 13, 10, 0, 0).unwrap(),
            guests: 2,
            total_amount: Decimal::new(30000, 2),
            status: "booked".to_string(),
            payment_status: "paid".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_contains_booking_facts() {
        let renderer = HtmlReportRenderer;
        let body = renderer.render(&sample_report()).unwrap();
        let html = String::from_utf8(body).unwrap();

        assert!(html.contains("300.00"));
        assert!(html.contains("Pier 7"));
        assert!(html.contains("2026-09-10"));
        assert!(html.contains("BOOKED") || html.contains("booked"));
    }

    #[test]
    fn test_render_escapes_markup_in_names() {
        let renderer = HtmlReportRenderer;
        let body = renderer.render(&sample_report()).unwrap();
        let html = String::from_utf8(body).unwrap();

        assert!(html.contains("Harbor Suite &lt;Deluxe&gt;"));
        assert!(!html.contains("<Deluxe>"));
    }

    #[test]
    fn test_assemble_flattens_the_join() {
        let room = Room {
            id: RoomId::new(),
            name: "Garden Room".to_string(),
            location: "Annex".to_string(),
            capacity: 2,
            price: Decimal::new(10000, 2),
            description: None,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let guest = User {
            id: UserId::new(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
            password_hash: "hash".to_string(),
            role: "user".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let booking = Booking {
            id: BookingId::new(),
            user_id: guest.id,
            room_id: room.id,
            date_from: Utc::now(),
            date_to: Utc::now() + chrono::Duration::days(2),
            guests: 1,
            total_amount: Decimal::new(20000, 2),
            special_requests: None,
            status: "pending".to_string(),
            payment_status: "unpaid".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let report = BookingReport::assemble(&booking, &guest, &room);
        assert_eq!(report.room_name, "Garden Room");
        assert_eq!(report.guest_email, "sam@example.com");
        assert_eq!(report.booking_id, booking.id);
    }
}
