use std::collections::VecDeque;

use crate::label::LabelClass;
use crate::message::ConsoleEvent;

/// Status line shown when no WebSocket transport is available
pub const UNSUPPORTED_WARNING: &str = "websockets are not supported";

/// Values of the `appKey` and `secret` inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialForm {
    pub app_key: String,
    pub secret: String,
}

impl CredentialForm {
    pub fn clear(&mut self) {
        self.app_key.clear();
        self.secret.clear();
    }
}

/// One row of the events table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub label: LabelClass,
    pub event_type: String,
    pub socket: String,
    pub details: String,
    pub time: String,
}

impl EventRow {
    pub fn from_event(event: &ConsoleEvent) -> Self {
        Self {
            label: event.label(),
            event_type: event.event_type.clone(),
            socket: event.socket.clone(),
            details: event.details.clone(),
            time: event.time.to_string(),
        }
    }

    /// `<tr>` markup; the type cell carries the label class
    pub fn to_html(&self) -> String {
        format!(
            "<tr><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            self.label,
            escape_html(&self.event_type),
            escape_html(&self.socket),
            escape_html(&self.details),
            escape_html(&self.time)
        )
    }

    pub fn to_line(&self) -> String {
        format!(
            "[{:<7}] {:<14} {:<20} {:<40} {}",
            self.label, self.event_type, self.socket, self.details, self.time
        )
    }
}

/// In-memory model of the console page.
///
/// The connect and disconnect controls are mutually exclusive; the events
/// table is most-recent-first and only ever grows.
#[derive(Debug, Clone)]
pub struct ConsoleView {
    connect_visible: bool,
    disconnect_visible: bool,
    form: CredentialForm,
    status: Vec<String>,
    counter: u64,
    rows: VecDeque<EventRow>,
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleView {
    pub fn new() -> Self {
        Self {
            connect_visible: true,
            disconnect_visible: false,
            form: CredentialForm::default(),
            status: Vec::new(),
            counter: 0,
            rows: VecDeque::new(),
        }
    }

    pub fn show_connected(&mut self) {
        self.connect_visible = false;
        self.disconnect_visible = true;
    }

    pub fn show_disconnected(&mut self) {
        self.connect_visible = true;
        self.disconnect_visible = false;
    }

    pub fn connect_visible(&self) -> bool {
        self.connect_visible
    }

    pub fn disconnect_visible(&self) -> bool {
        self.disconnect_visible
    }

    pub fn form(&self) -> &CredentialForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CredentialForm {
        &mut self.form
    }

    pub fn warn(&mut self, message: &str) {
        self.status.push(message.to_string());
    }

    pub fn status(&self) -> &[String] {
        &self.status
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn increment_counter(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    pub fn prepend_row(&mut self, row: EventRow) {
        self.rows.push_front(row);
    }

    pub fn rows(&self) -> impl Iterator<Item = &EventRow> {
        self.rows.iter()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render status area, counter and events table as an HTML fragment
    pub fn render_html(&self) -> String {
        let mut html = String::from("<div id=\"status\">");
        for line in &self.status {
            html.push_str(&format!(
                "<p><span style=\"color: red;\">{}</span></p>",
                escape_html(line)
            ));
        }
        html.push_str("</div>");
        html.push_str(&format!("<span id=\"counter\">{}</span>", self.counter));
        html.push_str(
            "<table id=\"events\"><thead><tr><th>Type</th><th>Socket</th>\
             <th>Details</th><th>Time</th></tr></thead><tbody>",
        );
        for row in &self.rows {
            html.push_str(&row.to_html());
        }
        html.push_str("</tbody></table>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::EventTime;

    fn event(event_type: &str, details: &str) -> ConsoleEvent {
        ConsoleEvent {
            event_type: event_type.to_string(),
            socket: "123.456".to_string(),
            details: details.to_string(),
            time: EventTime::Text("12:00:00".to_string()),
        }
    }

    #[test]
    fn starts_with_connect_control_only() {
        let view = ConsoleView::new();
        assert!(view.connect_visible());
        assert!(!view.disconnect_visible());
        assert_eq!(view.counter(), 0);
        assert_eq!(view.row_count(), 0);
    }

    #[test]
    fn controls_are_mutually_exclusive() {
        let mut view = ConsoleView::new();
        view.show_connected();
        assert!(!view.connect_visible());
        assert!(view.disconnect_visible());

        view.show_disconnected();
        assert!(view.connect_visible());
        assert!(!view.disconnect_visible());
    }

    #[test]
    fn rows_are_most_recent_first() {
        let mut view = ConsoleView::new();
        view.prepend_row(EventRow::from_event(&event("Connection", "first")));
        view.prepend_row(EventRow::from_event(&event("Subscribed", "second")));

        let details: Vec<_> = view.rows().map(|row| row.details.as_str()).collect();
        assert_eq!(details, ["second", "first"]);
    }

    #[test]
    fn row_markup_escapes_fields() {
        let row = EventRow::from_event(&event("<b>Foo</b>", "Channel: \"a&b\""));
        assert_eq!(
            row.to_html(),
            "<tr><td class=\"warning\">&lt;b&gt;Foo&lt;/b&gt;</td><td>123.456</td>\
             <td>Channel: &quot;a&amp;b&quot;</td><td>12:00:00</td></tr>"
        );
    }

    #[test]
    fn renders_status_counter_and_table() {
        let mut view = ConsoleView::new();
        view.warn(UNSUPPORTED_WARNING);
        view.increment_counter();
        view.prepend_row(EventRow::from_event(&event("Disconnection", "bye")));

        let html = view.render_html();
        assert!(html.contains("websockets are not supported"));
        assert!(html.contains("<span id=\"counter\">1</span>"));
        assert!(html.contains("<td class=\"danger\">Disconnection</td>"));
    }

    #[test]
    fn clearing_form_empties_both_fields() {
        let mut view = ConsoleView::new();
        view.form_mut().app_key = "key".to_string();
        view.form_mut().secret = "secret".to_string();
        view.form_mut().clear();
        assert_eq!(view.form(), &CredentialForm::default());
    }
}
