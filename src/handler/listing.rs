//! Directory listing page
//!
//! Rendered for directories without an index file when listing is enabled.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;
use std::io;
use std::path::Path;
use tokio::fs;

/// Characters left unescaped in an href segment (RFC 3986 unreserved)
const HREF_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

struct ListingEntry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

impl ListingEntry {
    fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else if self.is_symlink {
            format!("{}@", self.name)
        } else {
            self.name.clone()
        }
    }

    fn href(&self) -> String {
        let encoded = utf8_percent_encode(&self.name, HREF_SEGMENT).to_string();
        if self.is_dir {
            format!("{encoded}/")
        } else {
            encoded
        }
    }
}

/// Render the listing of `dir`, titled with the request's `uri_path`
pub async fn render_listing(dir: &Path, uri_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let file_type = entry.file_type().await?;
        let is_symlink = file_type.is_symlink();
        let is_dir = if is_symlink {
            fs::metadata(entry.path())
                .await
                .is_ok_and(|m| m.is_dir())
        } else {
            file_type.is_dir()
        };
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }
    entries.sort_by_cached_key(|e| e.name.to_lowercase());

    let title = percent_decode_str(uri_path).decode_utf8_lossy();
    let title = escape_html(&title);

    let mut html = format!(
        "<!DOCTYPE HTML>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Directory listing for {title}</title>\n\
         </head>\n\
         <body>\n\
         <h1>Directory listing for {title}</h1>\n\
         <hr>\n\
         <ul>\n"
    );
    for entry in &entries {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            entry.href(),
            escape_html(&entry.display_name())
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    Ok(html)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain.txt"), "plain.txt");
    }

    #[tokio::test]
    async fn test_listing_sorted_with_directory_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.js"), "").unwrap();
        std::fs::write(dir.path().join("A.wasm"), "").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();

        let html = render_listing(dir.path(), "/pkg/").await.unwrap();

        assert!(html.contains("<title>Directory listing for /pkg/</title>"));
        let a = html.find(">A.wasm<").unwrap();
        let assets = html.find(">assets/<").unwrap();
        let b = html.find(">b.js<").unwrap();
        assert!(a < assets && assets < b, "{html}");
        assert!(html.contains("<a href=\"assets/\">assets/</a>"));
    }

    #[tokio::test]
    async fn test_listing_escapes_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a b&c's.txt"), "").unwrap();

        let html = render_listing(dir.path(), "/we%20ird/").await.unwrap();

        assert!(html.contains("Directory listing for /we ird/"));
        assert!(html.contains("<a href=\"a%20b%26c%27s.txt\">a b&amp;c&#x27;s.txt</a>"));
    }

    #[tokio::test]
    async fn test_listing_of_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(render_listing(&dir.path().join("gone"), "/gone/").await.is_err());
    }
}
