//! XRDS/XRD document serialization.
//!
//! Output shape:
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <XRDS xmlns="xri://$xrds">
//!   <XRD xmlns="xri://$xrd*($v*2.0)">
//!     <CanonicalID>..</CanonicalID>          (optional, first)
//!     <Service priority="N">                 (priority optional)
//!       <Type>..</Type>...                   (one per type, insertion order)
//!       <URI>..</URI>
//!       <LocalID>..</LocalID>                (optional)
//!     </Service>...
//!   </XRD>
//! </XRDS>
//! ```
//! Written compact, without indentation.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::discovery::error::SerializationError;
use crate::discovery::result::DiscoveryResult;
use crate::discovery::rules::ServiceRule;

/// Namespace of the `<XRDS>` root element.
pub const XRDS_NAMESPACE: &str = "xri://$xrds";

/// Namespace of the `<XRD>` element and its children.
pub const XRD_NAMESPACE: &str = "xri://$xrd*($v*2.0)";

/// Serializes [`DiscoveryResult`]s into discovery documents.
///
/// Stateless; the same result always produces the same bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentWriter;

impl DocumentWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the document for `result` to `sink`.
    ///
    /// Field values are written verbatim (escaped), without checking that
    /// URIs or types are well formed. An empty result still produces the
    /// `<XRDS><XRD/></XRDS>` skeleton.
    pub fn write<W: Write>(
        &self,
        result: &DiscoveryResult<'_>,
        sink: W,
    ) -> Result<(), SerializationError> {
        let mut writer = Writer::new(sink);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("XRDS").with_attributes([("xmlns", XRDS_NAMESPACE)]),
        ))?;

        let xrd = BytesStart::new("XRD").with_attributes([("xmlns", XRD_NAMESPACE)]);
        if result.is_empty() {
            writer.write_event(Event::Empty(xrd))?;
        } else {
            writer.write_event(Event::Start(xrd))?;

            if let Some(canonical) = result.canonical_id() {
                write_text_element(&mut writer, "CanonicalID", canonical.canonical_id())?;
            }

            for service in result.services() {
                write_service(&mut writer, service)?;
            }

            writer.write_event(Event::End(BytesEnd::new("XRD")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("XRDS")))?;
        writer.into_inner().flush()?;
        Ok(())
    }

    /// Serialize into a fresh buffer.
    pub fn write_to_vec(&self, result: &DiscoveryResult<'_>) -> Result<Vec<u8>, SerializationError> {
        let mut buf = Vec::new();
        self.write(result, &mut buf)?;
        Ok(buf)
    }
}

fn write_service<W: Write>(
    writer: &mut Writer<W>,
    service: &ServiceRule,
) -> Result<(), SerializationError> {
    let mut start = BytesStart::new("Service");
    if let Some(priority) = service.priority() {
        start.push_attribute(("priority", priority.to_string().as_str()));
    }
    writer.write_event(Event::Start(start))?;

    for service_type in service.types() {
        write_text_element(writer, "Type", service_type)?;
    }
    write_text_element(writer, "URI", service.endpoint_uri())?;
    if let Some(local_id) = service.local_id() {
        write_text_element(writer, "LocalID", local_id)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Service")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), SerializationError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
