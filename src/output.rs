//! JSON output

use std::io::{self, Write};

use crate::node::DocNode;

/// Write nodes as a JSON array followed by a newline.
pub fn write_json<W: Write>(writer: &mut W, nodes: &[DocNode], pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, nodes)?;
    } else {
        serde_json::to_writer(&mut *writer, nodes)?;
    }
    writeln!(writer)
}

/// Print nodes as JSON to stdout.
pub fn print_json(nodes: &[DocNode], pretty: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, nodes, pretty)?;
    handle.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    fn render(nodes: &[DocNode], pretty: bool) -> String {
        let mut buf = Vec::new();
        write_json(&mut buf, nodes, pretty).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_empty_is_empty_array() {
        assert_eq!(render(&[], false), "[]\n");
    }

    #[test]
    fn test_compact_shape() {
        let node = DocNode::new(NodeId::new("a.ts:x"), "chapter").with_attribute("title", "X");
        assert_eq!(
            render(&[node], false),
            "[{\"id\":\"a.ts:x\",\"type\":\"chapter\",\"attributes\":{\"title\":\"X\"},\"children\":[]}]\n"
        );
    }

    #[test]
    fn test_pretty_is_multiline() {
        let node = DocNode::new(NodeId::new("a.ts:x"), "chapter");
        let out = render(&[node], true);
        assert!(out.starts_with("[\n  {\n"));
        assert!(out.ends_with("]\n"));
    }
}
