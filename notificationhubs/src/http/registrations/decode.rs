//! Reads Atom entries and feeds into the raw registration model.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::http::registrations::{
    DescriptionKind, RawDescription, RegistrationContent, RegistrationResult, Registrations,
};
use crate::http::xml::{self, DecodeError, Element};

impl RegistrationResult {
    /// Decodes a single Atom `<entry>`. The content is left raw, see [`RegistrationResult::normalize`].
    pub fn from_xml(xml: &str) -> Result<Self, DecodeError> {
        let root = xml::parse(xml)?;
        expect_root(&root, "entry")?;
        entry(&root)
    }
}

impl Registrations {
    /// Decodes an Atom `<feed>`. Entry contents are left raw, see [`Registrations::normalize`].
    pub fn from_xml(xml: &str) -> Result<Self, DecodeError> {
        let root = xml::parse(xml)?;
        expect_root(&root, "feed")?;
        Ok(Registrations {
            id: text(&root, "id"),
            title: text(&root, "title"),
            updated: timestamp(&root, "updated")?,
            entries: root.children_named("entry").map(entry).collect::<Result<_, _>>()?,
            continuation_token: None,
        })
    }
}

fn expect_root(root: &Element, expected: &'static str) -> Result<(), DecodeError> {
    if root.name == expected {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedRoot {
            expected,
            actual: root.name.clone(),
        })
    }
}

fn entry(element: &Element) -> Result<RegistrationResult, DecodeError> {
    Ok(RegistrationResult {
        id: text(element, "id"),
        title: text(element, "title"),
        published: timestamp(element, "published")?,
        updated: timestamp(element, "updated")?,
        content: element.child("content").map(content),
    })
}

fn content(element: &Element) -> RegistrationContent {
    let found = DescriptionKind::ALL
        .into_iter()
        .find_map(|kind| element.child(kind.element_name()).map(|d| (kind, d)));
    match found {
        Some((kind, description)) => RegistrationContent::Raw(RawDescription {
            kind,
            device_handle: optional(description, kind.device_handle_element()),
            registration_id: optional(description, "RegistrationId"),
            etag: optional(description, "ETag"),
            expiration_time: optional(description, "ExpirationTime"),
            tags: optional(description, "Tags"),
            body_template: optional(description, "BodyTemplate"),
        }),
        None => {
            let name = element.children.first().map(|c| c.name.clone());
            tracing::warn!("no known registration description in content: {:?}", name);
            RegistrationContent::Unrecognized(name)
        }
    }
}

fn text(element: &Element, name: &str) -> String {
    element.child_text(name).unwrap_or_default().to_string()
}

fn optional(element: &Element, name: &str) -> Option<String> {
    element.child_text(name).map(str::to_string)
}

fn timestamp(element: &Element, name: &'static str) -> Result<Option<OffsetDateTime>, DecodeError> {
    match element.child_text(name) {
        None | Some("") => Ok(None),
        Some(value) => OffsetDateTime::parse(value, &Rfc3339)
            .map(Some)
            .map_err(|_| DecodeError::InvalidTimestamp {
                element: name,
                value: value.to_string(),
            }),
    }
}
