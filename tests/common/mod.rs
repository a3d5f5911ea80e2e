//! Shared utilities for integration testing.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use xrds_discovery_server::config::{CanonicalIdConfig, DiscoveryConfig, ServiceConfig};
use xrds_discovery_server::discovery::writer::{XRDS_NAMESPACE, XRD_NAMESPACE};

/// A service entry as it appears in a config file.
pub fn service(host_regex: &str, uri: &str, types: &[&str]) -> ServiceConfig {
    ServiceConfig {
        host_regex: Some(host_regex.into()),
        uri: Some(uri.into()),
        types: types.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

/// A canonical-ID entry as it appears in a config file.
#[allow(dead_code)]
pub fn canonical(host_regex: &str, canonical_id: &str) -> CanonicalIdConfig {
    CanonicalIdConfig {
        host_regex: Some(host_regex.into()),
        canonical_id: Some(canonical_id.into()),
    }
}

/// Config listening on an ephemeral local port.
pub fn config(services: Vec<ServiceConfig>, canonical_ids: Vec<CanonicalIdConfig>) -> DiscoveryConfig {
    let mut config = DiscoveryConfig {
        services,
        canonical_ids,
        ..Default::default()
    };
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

/// Client without connection pooling so servers can stop promptly.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[derive(Debug, Default, PartialEq)]
pub struct ParsedService {
    pub priority: Option<i32>,
    pub types: Vec<String>,
    pub uri: Option<String>,
    pub local_id: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct ParsedDocument {
    pub canonical_id: Option<String>,
    pub services: Vec<ParsedService>,
}

/// Parse a discovery document the way a namespace-aware client would.
///
/// Panics if an element is in the wrong namespace.
pub fn parse_document(xml: &str) -> ParsedDocument {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = ParsedDocument::default();
    let mut current: Option<String> = None;
    let mut seen_root = false;

    loop {
        let (ns, event) = reader.read_resolved_event().expect("well-formed XML");
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let name = String::from_utf8(e.local_name().as_ref().to_vec()).unwrap();
                let expected = if name == "XRDS" { XRDS_NAMESPACE } else { XRD_NAMESPACE };
                match ns {
                    ResolveResult::Bound(Namespace(bound)) => {
                        assert_eq!(bound, expected.as_bytes(), "namespace of <{name}>")
                    }
                    _ => panic!("<{name}> is not namespace-qualified"),
                }

                match name.as_str() {
                    "XRDS" => seen_root = true,
                    "XRD" => assert!(seen_root, "<XRD> outside <XRDS>"),
                    "Service" => {
                        let priority = e
                            .try_get_attribute("priority")
                            .unwrap()
                            .map(|a| a.unescape_value().unwrap().parse().unwrap());
                        doc.services.push(ParsedService {
                            priority,
                            ..Default::default()
                        });
                    }
                    other => current = Some(other.to_string()),
                }
            }
            Event::Text(t) => {
                let text = t.unescape().unwrap().into_owned();
                let last = doc.services.last_mut();
                match (current.as_deref(), last) {
                    (Some("CanonicalID"), _) => doc.canonical_id = Some(text),
                    (Some("Type"), Some(s)) => s.types.push(text),
                    (Some("URI"), Some(s)) => s.uri = Some(text),
                    (Some("LocalID"), Some(s)) => s.local_id = Some(text),
                    _ => {}
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    assert!(seen_root, "missing <XRDS> root");
    doc
}
