//! Plain notification emails.

use crate::config::{EscalationConfig, GateConfig};
use crate::email::EmailMessage;
use crate::services::hierarchy::EscalationTier;
use crate::types::{Feedback, ManagerContact, ResponseApproval};

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn feedback_summary(feedback: &Feedback) -> String {
    format!(
        "<ul>\
         <li>Rating: {rating}/5</li>\
         <li>Category: {category}</li>\
         <li>Room: {room}</li>\
         <li>Comment: {comment}</li>\
         </ul>",
        rating = feedback.rating,
        category = escape_html(feedback.category()),
        room = escape_html(feedback.room_number.as_deref().unwrap_or("n/a")),
        comment = escape_html(feedback.comment.as_deref().unwrap_or("")),
    )
}

/// Reminder for unacknowledged feedback.
pub fn reminder_email(
    config: &EscalationConfig,
    feedback: &Feedback,
    manager: &ManagerContact,
    hours_open: f64,
) -> EmailMessage {
    let subject = format!(
        "Reminder: guest feedback awaiting acknowledgment (room {})",
        feedback.room_number.as_deref().unwrap_or("n/a")
    );
    let html = format!(
        "<p>Hi {name},</p>\
         <p>Feedback {id} has been open for {hours:.1} hours without acknowledgment.</p>\
         {summary}",
        name = escape_html(&manager.name),
        id = feedback.id,
        hours = hours_open,
        summary = feedback_summary(feedback),
    );

    EmailMessage::new(&config.from_address, &manager.email, subject, html)
        .with_cc(&config.monitoring_email)
}

/// Escalation hand-off to the next manager.
pub fn escalation_email(
    config: &EscalationConfig,
    feedback: &Feedback,
    target: &ManagerContact,
    tier: EscalationTier,
    level: i32,
    reason: &str,
) -> EmailMessage {
    let role = match tier {
        EscalationTier::Primary => "department manager",
        EscalationTier::Backup => "backup manager",
        EscalationTier::GeneralManager => "general manager",
    };
    let subject = format!(
        "Escalation level {level}: guest feedback (room {})",
        feedback.room_number.as_deref().unwrap_or("n/a")
    );
    let html = format!(
        "<p>Hi {name},</p>\
         <p>Feedback {id} has been escalated to you as {role}. Reason: {reason}.</p>\
         {summary}",
        name = escape_html(&target.name),
        id = feedback.id,
        reason = escape_html(reason),
        summary = feedback_summary(feedback),
    );

    EmailMessage::new(&config.from_address, &target.email, subject, html)
        .with_cc(&config.monitoring_email)
}

/// Review request for a flagged response.
pub fn approval_request_email(config: &GateConfig, approval: &ResponseApproval) -> EmailMessage {
    let factors = approval
        .risk_factors
        .iter()
        .map(|f| format!("<li>{}</li>", escape_html(f)))
        .collect::<String>();
    let html = format!(
        "<p>A drafted guest response needs review before it can be sent.</p>\
         <p>Approval {id} ({severity}), expires {expires}.</p>\
         <ul>{factors}</ul>\
         <p>Recipient: {recipient}</p>\
         <blockquote>{body}</blockquote>",
        id = approval.id,
        severity = escape_html(&approval.severity_level),
        expires = approval.expires_at.to_rfc3339(),
        recipient = escape_html(&approval.recipient_email),
        body = escape_html(&approval.response_text),
    );

    EmailMessage::new(
        &config.from_address,
        &config.reviewer_email,
        format!("Approval needed: {}", approval.subject),
        html,
    )
}
