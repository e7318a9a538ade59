//! The markdown message that announces a report in the station channel.

use std::fmt::Write as _;

use maintdesk_core::report::ReportFields;
use maintdesk_core::report_time::format_report_time;
use serde::Serialize;

/// Whether the report was just created or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Created,
    Updated,
}

impl NotificationKind {
    pub fn title(self) -> &'static str {
        match self {
            NotificationKind::Created => "New Issue Report",
            NotificationKind::Updated => "Issue Report Updated",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            NotificationKind::Created => "### 📋 Maintenance Issue Report",
            NotificationKind::Updated => "### 📝 Maintenance Issue Report (updated)",
        }
    }
}

/// A titled markdown message, ready to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub title: String,
    pub text: String,
}

/// Render the fixed report template.
///
/// Every field is listed, followed by one `![ImageN](url)` line per image and,
/// when configured, an "ADD MORE CASE" link back to the form.
pub fn render_markdown(
    kind: NotificationKind,
    fields: &ReportFields,
    image_urls: &[String],
    add_more_case_url: Option<&str>,
) -> ChatMessage {
    let mut text = String::new();
    let _ = writeln!(text, "{}", kind.heading());
    let _ = writeln!(text, "- **Node:** {}", fields.station);
    let _ = writeln!(text, "- **Reported at:** {}", format_report_time(&fields.report_date));
    let _ = writeln!(text, "- **Reporter:** {}", fields.reporter);
    let _ = writeln!(text, "- **Location:** {}", fields.location);
    let _ = writeln!(text, "- **Issue:** {}", fields.issue);
    let _ = writeln!(text, "- **Root cause:** {}", fields.root_cause);
    let _ = writeln!(text, "- **Repair:** {}", fields.repair_detail);
    let _ = writeln!(
        text,
        "- **Repair start - end - back in service:** {} - {} - {}",
        fields.start_time, fields.end_time, fields.recover_time
    );
    let _ = writeln!(text, "- **Classification:** {}", fields.classify);
    let _ = writeln!(text, "- **Damaged parts:** {}", fields.damaged_parts);

    if !image_urls.is_empty() {
        text.push('\n');
        for (i, url) in image_urls.iter().enumerate() {
            let _ = writeln!(text, "![Image{}]({url})", i + 1);
        }
    }

    if let Some(url) = add_more_case_url {
        let _ = write!(text, "\n[ADD MORE CASE]({url})\n");
    }

    ChatMessage {
        title: kind.title().to_string(),
        text,
    }
}

#[cfg(test)]
mod tests {
    use maintdesk_core::report::Classification;

    use super::*;

    fn fields() -> ReportFields {
        ReportFields {
            station: "SSW".into(),
            report_date: "2026-10-19T14:05".into(),
            reporter: "A".into(),
            location: "Gate 3".into(),
            issue: "Door fault".into(),
            root_cause: "Sensor".into(),
            repair_detail: "Realigned".into(),
            start_time: "14:10".into(),
            end_time: "14:30".into(),
            recover_time: "14:35".into(),
            classify: Classification::Machine,
            email: "tech@example.com".into(),
            damaged_parts: "door sensor".into(),
        }
    }

    #[test]
    fn template_lists_every_field() {
        let message = render_markdown(NotificationKind::Created, &fields(), &[], None);

        assert_eq!(message.title, "New Issue Report");
        assert!(message.text.starts_with("### 📋 Maintenance Issue Report\n"));
        assert!(message.text.contains("- **Node:** SSW\n"));
        assert!(message.text.contains("- **Reported at:** 19 Oct 2026, 14:05\n"));
        assert!(message.text.contains("- **Reporter:** A\n"));
        assert!(message.text.contains("- **Repair start - end - back in service:** 14:10 - 14:30 - 14:35\n"));
        assert!(message.text.contains("- **Classification:** Machine\n"));
        assert!(message.text.contains("- **Damaged parts:** door sensor\n"));
    }

    #[test]
    fn no_images_means_no_image_lines() {
        let message = render_markdown(NotificationKind::Created, &fields(), &[], None);
        assert!(!message.text.contains("![Image"));
        assert!(!message.text.contains("ADD MORE CASE"));
    }

    #[test]
    fn images_are_numbered_in_order() {
        let urls = vec!["https://cdn/b.jpg".to_string(), "https://cdn/a.jpg".to_string()];
        let message = render_markdown(
            NotificationKind::Updated,
            &fields(),
            &urls,
            Some("https://forms.example.com/report"),
        );

        assert_eq!(message.title, "Issue Report Updated");
        assert!(message
            .text
            .contains("![Image1](https://cdn/b.jpg)\n![Image2](https://cdn/a.jpg)\n"));
        assert!(message
            .text
            .ends_with("[ADD MORE CASE](https://forms.example.com/report)\n"));
    }
}
