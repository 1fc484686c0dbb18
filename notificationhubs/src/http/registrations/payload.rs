//! Renders registrations into the Atom entries sent to the hub.

use std::fmt::Write;

use time::macros::format_description;
use time::OffsetDateTime;

use crate::http::error::ValidationError;
use crate::http::registrations::{DescriptionKind, Registration, TemplateRegistration};

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const INSTANCE_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const CONNECT_NAMESPACE: &str = "http://schemas.microsoft.com/netservices/2010/10/servicebus/connect";

impl Registration {
    /// Renders the Atom entry used to create or update this registration.
    pub fn to_xml(&self) -> Result<String, ValidationError> {
        let kind = DescriptionKind::for_format(self.notification_format).ok_or_else(|| {
            ValidationError::new(
                "notification_format",
                "notification format not supported for registration",
                self.notification_format,
            )
        })?;
        Ok(render(kind, &self.device_id, self.expiration_time, &self.tags, None))
    }
}

impl TemplateRegistration {
    /// Renders the Atom entry used to create or update this template registration.
    pub fn to_xml(&self) -> Result<String, ValidationError> {
        let kind = DescriptionKind::for_template_platform(self.platform).ok_or_else(|| {
            ValidationError::new(
                "platform",
                "platform not supported for template registration",
                self.platform,
            )
        })?;
        Ok(render(
            kind,
            &self.device_id,
            self.expiration_time,
            &self.tags,
            Some(&self.template),
        ))
    }
}

fn render(
    kind: DescriptionKind,
    device_id: &str,
    expiration_time: Option<OffsetDateTime>,
    tags: &str,
    template: Option<&str>,
) -> String {
    let element = kind.element_name();
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    // write! on a String never fails
    let _ = write!(
        xml,
        r#"<entry xmlns="{ATOM_NAMESPACE}"><content type="application/xml"><{element} xmlns:i="{INSTANCE_NAMESPACE}" xmlns="{CONNECT_NAMESPACE}">"#
    );
    if let Some(expiration_time) = expiration_time.and_then(format_expiration_time) {
        let _ = write!(xml, "<ExpirationTime>{expiration_time}</ExpirationTime>");
    }
    if !tags.is_empty() {
        let _ = write!(xml, "<Tags>{}</Tags>", escape(tags));
    }
    let handle = kind.device_handle_element();
    let _ = write!(xml, "<{handle}>{}</{handle}>", escape(device_id));
    if let Some(template) = template {
        let _ = write!(xml, "<BodyTemplate>{}</BodyTemplate>", cdata(template));
    }
    let _ = write!(xml, "</{element}></content></entry>");
    xml
}

fn format_expiration_time(value: OffsetDateTime) -> Option<String> {
    value
        .to_offset(time::UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .ok()
}

fn escape(value: &str) -> std::borrow::Cow<'_, str> {
    quick_xml::escape::escape(value)
}

fn cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}
