use anyhow::{bail, Context, Result};

/// A parsed XML element: local tag name, attributes, direct text content and
/// child elements in document order.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First descendant with the given tag, depth-first in document order.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        for child in &self.children {
            if child.tag == tag {
                return Some(child);
            }
            if let Some(found) = child.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// First descendant with the given tag carrying `key="value"`.
    pub fn find_with_attr(&self, tag: &str, key: &str, value: &str) -> Option<&Element> {
        for child in &self.children {
            if child.tag == tag && child.attr(key) == Some(value) {
                return Some(child);
            }
            if let Some(found) = child.find_with_attr(tag, key, value) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given tag carrying `key="value"`, in document order.
    pub fn find_all_with_attr(&self, tag: &str, key: &str, value: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_with_attr(tag, key, value, &mut out);
        out
    }

    fn collect_with_attr<'a>(
        &'a self,
        tag: &str,
        key: &str,
        value: &str,
        out: &mut Vec<&'a Element>,
    ) {
        for child in &self.children {
            if child.tag == tag && child.attr(key) == Some(value) {
                out.push(child);
            }
            child.collect_with_attr(tag, key, value, out);
        }
    }
}

/// One immediate child of the metadata document's root.
///
/// CREC MODS files describe each session granule as a `relatedItem`; every
/// other root child (titleInfo, originInfo, the member roster extension, ...)
/// is structural.
#[derive(Debug, Clone)]
pub enum Node {
    Section(SectionNode),
    Other(Element),
}

/// The metadata document for one date: the root's children, classified.
#[derive(Debug, Clone)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn sections(&self) -> impl Iterator<Item = &SectionNode> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Section(s) => Some(s),
            Node::Other(_) => None,
        })
    }
}

/// A session section granule, with accessors for the fields the extractor
/// needs. Accessors return `None` when the underlying element is absent.
#[derive(Debug, Clone)]
pub struct SectionNode {
    el: Element,
}

impl SectionNode {
    pub fn section_name(&self) -> Option<&str> {
        self.el.find("partName").map(|e| e.text.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.el.find("title").map(|e| e.text.as_str())
    }

    /// URL of the full-text HTML rendition.
    pub fn html_url(&self) -> Option<&str> {
        self.el
            .find("location")?
            .find_with_attr("url", "displayLabel", "HTML rendition")
            .map(|e| e.text.as_str())
    }

    /// Start/end page labels joined as `"<start> - <end>"`.
    pub fn page_range(&self) -> Option<String> {
        let start = self.el.find("start")?;
        let end = self.el.find("end")?;
        Some(format!("{} - {}", start.text, end.text))
    }

    /// The congressional member sub-structure. Its absence is a
    /// missing-field failure for the whole section.
    pub fn member(&self) -> Option<&Element> {
        self.el.find("congMember")
    }

    /// Names marked type "personal", in document order. `None` if any
    /// matching name lacks its namePart; may be `Some` of an empty list.
    pub fn speakers(&self) -> Option<Vec<String>> {
        self.el
            .find_all_with_attr("name", "type", "personal")
            .into_iter()
            .map(|name| name.find("namePart").map(|p| p.text.clone()))
            .collect()
    }

    pub fn affiliation(&self) -> Option<&str> {
        self.el.find("affiliation").map(|e| e.text.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.el.find("roleTerm").map(|e| e.text.as_str())
    }

    pub fn citation(&self) -> Option<&str> {
        self.el
            .find_with_attr("identifier", "type", "preferred citation")
            .map(|e| e.text.as_str())
    }
}

/// Parse a MODS descriptor and classify the root's children.
pub fn parse_document(xml: &str) -> Result<Document> {
    let root = parse(xml)?;
    let nodes = root
        .children
        .into_iter()
        .map(|el| {
            if el.tag == "relatedItem" {
                Node::Section(SectionNode { el })
            } else {
                Node::Other(el)
            }
        })
        .collect();
    Ok(Document { nodes })
}

/// Event-parse an XML document into an `Element` tree, returning the single
/// top-level element. Namespace prefixes are stripped.
pub fn parse(xml: &str) -> Result<Element> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                stack.push(element_from(&e)?);
            }
            Ok(quick_xml::events::Event::Empty(e)) => {
                let el = element_from(&e)?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(quick_xml::events::Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Ok(quick_xml::events::Event::End(_)) => {
                let el = stack.pop().context("unbalanced closing tag")?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        bail!("unclosed element <{}>", stack[stack.len() - 1].tag);
    }
    root.context("document has no root element")
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, el: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(el);
    } else if root.is_none() {
        *root = Some(el);
    } else {
        bail!("multiple top-level elements");
    }
    Ok(())
}

fn element_from(start: &quick_xml::events::BytesStart) -> Result<Element> {
    let tag = local_name(&String::from_utf8_lossy(start.name().as_ref()));
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = local_name(&String::from_utf8_lossy(attr.key.as_ref()));
        let value = attr.unescape_value()?.to_string();
        attrs.push((key, value));
    }
    Ok(Element {
        tag,
        attrs,
        text: String::new(),
        children: Vec::new(),
    })
}

fn local_name(qname: &str) -> String {
    qname.rsplit(':').next().unwrap_or(qname).to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Document {
        let xml = std::fs::read_to_string("tests/fixtures/mods.xml").unwrap();
        parse_document(&xml).unwrap()
    }

    #[test]
    fn root_children_classified() {
        let doc = fixture();
        assert_eq!(doc.sections().count(), 2);
        let others = doc
            .nodes
            .iter()
            .filter(|n| matches!(n, Node::Other(_)))
            .count();
        assert!(others >= 2); // titleInfo, originInfo at least
    }

    #[test]
    fn section_fields_extracted() {
        let doc = fixture();
        let section = doc.sections().next().unwrap();
        assert_eq!(section.section_name(), Some("SENATE"));
        assert_eq!(section.title(), Some("NOMINATION OF ZAHID N. QURAISHI"));
        assert_eq!(
            section.html_url(),
            Some(
                "https://www.govinfo.gov/content/pkg/CREC-2021-06-08/html/CREC-2021-06-08-pt1-PgS3967.htm"
            )
        );
        assert_eq!(section.page_range().as_deref(), Some("S3967 - S3968"));
        assert!(section.member().is_some());
        assert_eq!(
            section.speakers().unwrap(),
            vec!["DURBIN, RICHARD J.".to_string()]
        );
        assert_eq!(section.affiliation(), Some("Senate"));
        assert_eq!(section.role(), Some("SPEAKING"));
        assert_eq!(section.citation(), Some("167 Cong. Rec. S3967"));
    }

    #[test]
    fn rendition_selected_by_display_label() {
        // The PDF rendition comes first in the fixture; the HTML one must win.
        let doc = fixture();
        let section = doc.sections().next().unwrap();
        assert!(section.html_url().unwrap().ends_with(".htm"));
    }

    #[test]
    fn speakers_preserve_document_order() {
        let doc = fixture();
        let second = doc.sections().nth(1).unwrap();
        assert_eq!(
            second.speakers().unwrap(),
            vec!["PELOSI, NANCY".to_string(), "McCARTHY, KEVIN".to_string()]
        );
    }

    #[test]
    fn missing_elements_yield_none() {
        let doc =
            parse_document("<mods><relatedItem><partName>HOUSE</partName></relatedItem></mods>")
                .unwrap();
        let section = doc.sections().next().unwrap();
        assert_eq!(section.section_name(), Some("HOUSE"));
        assert!(section.title().is_none());
        assert!(section.html_url().is_none());
        assert!(section.page_range().is_none());
        assert!(section.member().is_none());
        assert!(section.citation().is_none());
        // No personal names at all: empty, not None.
        assert_eq!(section.speakers(), Some(vec![]));
    }

    #[test]
    fn speaker_without_name_part_is_none() {
        let doc = parse_document(
            "<mods><relatedItem><extension><congMember>\
             <name type=\"personal\"><namePart>A</namePart></name>\
             <name type=\"personal\"/>\
             </congMember></extension></relatedItem></mods>",
        )
        .unwrap();
        let section = doc.sections().next().unwrap();
        assert!(section.speakers().is_none());
    }

    #[test]
    fn namespace_prefixes_stripped() {
        let el = parse("<m:mods xmlns:m=\"urn:x\"><m:partName>X</m:partName></m:mods>").unwrap();
        assert_eq!(el.tag, "mods");
        assert_eq!(el.find("partName").map(|e| e.text.as_str()), Some("X"));
    }

    #[test]
    fn escaped_text_unescaped() {
        let el = parse("<a><b>Tom &amp; Jerry</b></a>").unwrap();
        assert_eq!(el.find("b").unwrap().text, "Tom & Jerry");
    }

    #[test]
    fn malformed_xml_rejected() {
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("").is_err());
    }
}
