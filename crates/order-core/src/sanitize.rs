//! HTML escaping of free-text fields before they are stored.

use crate::order::{Order, StatusUpdateRequest};

/// Values whose free-text fields can be escaped in place
pub trait Sanitize: Sized {
    fn sanitized(self) -> Self;
}

/// Escape the characters that open markup or break out of attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Sanitize for Order {
    fn sanitized(mut self) -> Self {
        self.transaction_number = escape_html(&self.transaction_number);
        self.payment_method = self.payment_method.as_deref().map(escape_html);
        self
    }
}

impl Sanitize for StatusUpdateRequest {
    fn sanitized(mut self) -> Self {
        self.status = escape_html(&self.status);
        self
    }
}
