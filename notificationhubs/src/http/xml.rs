//! A small element tree built from `quick-xml` events.
//!
//! Responses are Atom documents with a default namespace, so elements are keyed by their
//! local name and attributes are not kept. Leaf text is kept byte for byte; the text of an
//! element with children is only indentation and is dropped.

use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error("character data is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("document has no root element")]
    Empty,
    #[error("unexpected root element <{actual}>, expected <{expected}>")]
    UnexpectedRoot { expected: &'static str, actual: String },
    #[error("<{description}> has no <{element}> element")]
    MissingDeviceHandle {
        description: &'static str,
        element: &'static str,
    },
    #[error("invalid timestamp in <{element}>: {value}")]
    InvalidTimestamp { element: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub(crate) struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            name: String::from_utf8(name.to_vec())?,
            ..Default::default()
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the named child, if the child is present.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }
}

/// Parses `xml` into its root element.
pub(crate) fn parse(xml: &str) -> Result<Element, DecodeError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        match reader.read_event()? {
            Event::Start(tag) => stack.push(Element::new(tag.local_name().as_ref())?),
            Event::Empty(tag) => {
                let element = Element::new(tag.local_name().as_ref())?;
                close(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                // end names are checked by the reader, so the stack is never empty here
                if let Some(element) = stack.pop() {
                    close(&mut stack, &mut root, element);
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8(data.into_inner().into_owned())?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    root.ok_or(DecodeError::Empty)
}

fn close(stack: &mut [Element], root: &mut Option<Element>, mut element: Element) {
    if !element.children.is_empty() {
        element.text.clear();
    }
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
