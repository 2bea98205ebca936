//! Plain-text rendering of the notification list.

use notification_center::PresentationAdapter;
use notify_types::Notification;
use std::fmt::Write;

/// One line per notification, newest first, under an unread header.
///
/// Unread entries are marked with `*`.
pub fn render_list(
    presentation: &dyn PresentationAdapter,
    notifications: &[Notification],
    unread: usize,
) -> String {
    let mut out = format!("Notifications ({unread} unread)\n");
    if notifications.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    for notification in notifications {
        let marker = if notification.is_unread() { '*' } else { ' ' };
        let icon = presentation.type_to_icon(notification.kind);
        let when = presentation.format_relative_time(&notification.created_at.to_rfc3339());
        let _ = writeln!(
            out,
            "{marker} [{icon}] {title} - {message} ({when})",
            icon = icon.name(),
            title = notification.title,
            message = notification.message,
        );
    }
    out
}
