use aws_sdk_sesv2::operation::send_email::SendEmailOutput;
use lettre::transport::smtp::response::Response;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub address: String,
}

impl Sender {
    /// `"{name} <{address}>"`, or just the address when no name is set.
    pub fn format(&self) -> String {
        if self.name.is_empty() {
            self.address.clone()
        } else {
            format!("{} <{}>", self.name, self.address)
        }
    }
}

/// Message fields accumulated by the builder chain. `to` and `cc` grow on
/// every call; the other fields are replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: Option<Sender>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.from = Some(Sender {
            name: name.into(),
            address: address.into(),
        });
        self
    }

    pub fn with_to<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to.extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn with_cc<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc.extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn format_from(&self) -> Option<String> {
        self.from.as_ref().map(Sender::format)
    }
}

/// What the backend handed back after a successful send.
#[derive(Debug)]
pub enum SendResponse {
    /// Final reply of the SMTP server to the message data.
    Smtp(Response),
    /// Raw output of the SES `SendEmail` call.
    Ses(SendEmailOutput),
}

impl SendResponse {
    pub fn message_id(&self) -> Option<&str> {
        match self {
            SendResponse::Smtp(_) => None,
            SendResponse::Ses(output) => output.message_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_with_name() {
        let message = EmailMessage::new().with_from("John Doe", "john@example.com");
        assert_eq!(
            message.format_from().as_deref(),
            Some("John Doe <john@example.com>")
        );
    }

    #[test]
    fn test_sender_without_name_is_bare_address() {
        let message = EmailMessage::new().with_from("", "john@example.com");
        assert_eq!(message.format_from().as_deref(), Some("john@example.com"));
    }

    #[test]
    fn test_no_sender() {
        assert_eq!(EmailMessage::new().format_from(), None);
    }

    #[test]
    fn test_recipients_accumulate() {
        let message = EmailMessage::new()
            .with_to(["a@example.com"])
            .with_to(["b@example.com", "c@example.com"])
            .with_cc(Vec::<String>::new())
            .with_cc(["d@example.com"]);

        assert_eq!(
            message.to,
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
        assert_eq!(message.cc, vec!["d@example.com"]);
    }

    #[test]
    fn test_scalar_fields_overwrite() {
        let message = EmailMessage::new()
            .with_from("First", "first@example.com")
            .with_from("Second", "second@example.com")
            .with_subject("one")
            .with_subject("two")
            .with_body("<p>one</p>")
            .with_body("<p>two</p>");

        assert_eq!(
            message.from,
            Some(Sender {
                name: "Second".to_string(),
                address: "second@example.com".to_string(),
            })
        );
        assert_eq!(message.subject, "two");
        assert_eq!(message.body, "<p>two</p>");
    }
}
