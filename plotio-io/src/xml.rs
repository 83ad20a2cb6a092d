//! Attribute helpers shared by the XML readers

use plotio_core::{Error, Result};
use quick_xml::events::BytesStart;

/// Parse attribute `name` of an element, `None` when it is absent
pub(crate) fn attr_value<T: std::str::FromStr>(e: &BytesStart, name: &[u8]) -> Result<Option<T>> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            let value = String::from_utf8_lossy(&attr.value);
            return value.trim().parse().map(Some).map_err(|_| {
                Error::InvalidData(format!(
                    "Invalid value '{}' for attribute '{}'",
                    value,
                    String::from_utf8_lossy(name)
                ))
            });
        }
    }
    Ok(None)
}

/// Like [`attr_value`] but a missing attribute is an error
pub(crate) fn required<T: std::str::FromStr>(e: &BytesStart, name: &[u8]) -> Result<T> {
    attr_value(e, name)?.ok_or_else(|| {
        Error::InvalidData(format!(
            "Missing attribute '{}' on <{}>",
            String::from_utf8_lossy(name),
            String::from_utf8_lossy(e.local_name().as_ref())
        ))
    })
}
