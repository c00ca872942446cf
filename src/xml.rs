//! Minimal XML writing: escaping, tab indentation, comments, text nodes and
//! elements with attributes. Every write error is returned to the caller.

use crate::error::Result;
use std::borrow::Cow;
use std::io::Write;

const ESCAPES: [(char, &str); 5] = [
    ('"', "&quot;"),
    ('\'', "&apos;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('&', "&amp;"),
];

/// Replace XML-sensitive characters with their entities.
pub fn escape(text: &str) -> Cow<'_, str> {
    // most names need no escaping, so check before allocating
    if !text.contains(['"', '\'', '<', '>', '&']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match ESCAPES.iter().find(|(from, _)| *from == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse of [`escape`]. Unknown entities are kept as they are.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ESCAPES.iter().find(|(_, entity)| rest.starts_with(entity)) {
            Some((c, entity)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Indented XML writer over any byte sink.
#[derive(Debug)]
pub struct XmlWriter<W: Write> {
    out: W,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        XmlWriter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// One tab per depth level.
    pub fn indent(&mut self, depth: usize) -> Result<()> {
        for _ in 0..depth {
            self.out.write_all(b"\t")?;
        }
        Ok(())
    }

    /// `<!-- text -->` on its own line. The text is written as is.
    pub fn comment(&mut self, depth: usize, text: &str) -> Result<()> {
        self.indent(depth)?;
        writeln!(self.out, "<!-- {} -->", text)?;
        Ok(())
    }

    /// `<name>text</name>` with escaped text.
    pub fn node(&mut self, depth: usize, name: &str, text: &str) -> Result<()> {
        self.indent(depth)?;
        writeln!(self.out, "<{}>{}</{}>", name, escape(text), name)?;
        Ok(())
    }

    /// Opening tag with escaped attribute values.
    pub fn open(&mut self, depth: usize, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.indent(depth)?;
        write!(self.out, "<{}", name)?;
        self.attributes(attrs)?;
        writeln!(self.out, ">")?;
        Ok(())
    }

    pub fn close(&mut self, depth: usize, name: &str) -> Result<()> {
        self.indent(depth)?;
        writeln!(self.out, "</{}>", name)?;
        Ok(())
    }

    /// Self-closing element, `<name a="v" />`.
    pub fn empty(&mut self, depth: usize, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.indent(depth)?;
        write!(self.out, "<{}", name)?;
        self.attributes(attrs)?;
        writeln!(self.out, " />")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn attributes(&mut self, attrs: &[(&str, &str)]) -> Result<()> {
        for (key, value) in attrs {
            write!(self.out, " {}=\"{}\"", key, escape(value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use std::io;

    fn written(f: impl FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<()>) -> String {
        let mut w = XmlWriter::new(Vec::new());
        f(&mut w).expect("write");
        String::from_utf8(w.into_inner()).expect("utf8")
    }

    #[test]
    fn escape_table() {
        assert_eq!(escape(r#"a"b'c<d>e&f"#), "a&quot;b&apos;c&lt;d&gt;e&amp;f");
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn escape_then_unescape_restores_input() {
        let original = r#"<"Engine" & 'Body'> &amp; done"#;
        let escaped = escape(original);
        assert!(!escaped.contains('<'));
        assert_eq!(unescape(&escaped), original);
    }

    #[test]
    fn unescape_keeps_unknown_entities() {
        assert_eq!(unescape("a &nbsp; b &lt;"), "a &nbsp; b <");
    }

    #[test]
    fn nodes_and_comments_are_indented_with_tabs() {
        let out = written(|w| {
            w.comment(0, "hello")?;
            w.open(1, "message", &[])?;
            w.node(2, "name", "A&B")?;
            w.close(1, "message")
        });
        assert_eq!(
            out,
            "<!-- hello -->\n\t<message>\n\t\t<name>A&amp;B</name>\n\t</message>\n"
        );
    }

    #[test]
    fn attributes_are_escaped() {
        let out = written(|w| w.empty(0, "BB", &[("Name", "x<y>"), ("Size", "8")]));
        assert_eq!(out, "<BB Name=\"x&lt;y&gt;\" Size=\"8\" />\n");
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_surface_as_io_errors() {
        let mut w = XmlWriter::new(FailingSink);
        assert!(matches!(w.node(0, "a", "b"), Err(ConvertError::Io(_))));
    }
}
