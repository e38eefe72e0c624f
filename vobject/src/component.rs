// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Write};

/// Maximum line length in octets before folding.
const FOLD_AT: usize = 75;

/// A `BEGIN:<name>` ... `END:<name>` block with its properties and nested
/// components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component name in upper case (e.g., "VCARD", "VCALENDAR", "VEVENT")
    pub name: String,

    /// Properties in source order
    pub properties: Vec<Property>,

    /// Nested components in source order
    pub children: Vec<Component>,
}

/// A single content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name in upper case
    pub name: String,

    /// Raw parameter section between the first `;` and the value colon
    pub params: Option<String>,

    /// Raw, still escaped, property value
    pub value: String,
}

impl Property {
    /// Creates a property without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: None,
            value: value.into(),
        }
    }
}

impl Component {
    /// Creates an empty component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Sets a property, replacing every existing property with that name.
    pub fn set_property(&mut self, property: Property) {
        self.properties.retain(|p| p.name != property.name);
        self.properties.push(property);
    }

    /// The `UID` of the item.
    ///
    /// For a vCard this is its own `UID`; for a calendar it is the `UID` of
    /// the first sub-component that is not a time zone.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        if let Some(uid) = self.property("UID") {
            return Some(&uid.value);
        }
        self.children
            .iter()
            .filter(|c| c.name != "VTIMEZONE")
            .find_map(|c| c.property("UID"))
            .map(|p| p.value.as_str())
    }

    /// Serializes the component to CRLF-terminated, folded content lines.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    fn write_to(&self, f: &mut impl Write) -> fmt::Result {
        write_folded(f, &format!("BEGIN:{}", self.name))?;
        for prop in &self.properties {
            let line = match &prop.params {
                Some(params) => format!("{};{}:{}", prop.name, params, prop.value),
                None => format!("{}:{}", prop.name, prop.value),
            };
            write_folded(f, &line)?;
        }
        for child in &self.children {
            child.write_to(f)?;
        }
        write_folded(f, &format!("END:{}", self.name))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Writes a line folded at [`FOLD_AT`] octets, never splitting a UTF-8
/// sequence. Continuation lines start with a single space.
fn write_folded(f: &mut impl Write, line: &str) -> fmt::Result {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > FOLD_AT {
            f.write_str("\r\n ")?;
            width = 1;
        }
        f.write_char(c)?;
        width += len;
    }
    f.write_str("\r\n")
}
