use crate::anchor::buffer_hashes;
use crate::buffer::FileBuffer;

pub const DEFAULT_READ_LIMIT: usize = 2000;

/// Renders the `<N>#<HH>:<content>` listing for a window of the buffer.
/// Hashes are always computed over the full cumulative prefix; the window
/// only controls which lines are emitted.
pub fn render_listing(buffer: &FileBuffer, offset: Option<usize>, limit: Option<usize>) -> String {
    let total = buffer.line_count();
    let start = offset.unwrap_or(0).min(total);
    let limit = limit.unwrap_or(DEFAULT_READ_LIMIT);
    let end = start.saturating_add(limit).min(total);

    if start >= total {
        return "(End of file - 0 lines)".to_string();
    }

    let hashes = buffer_hashes(buffer);
    let body = buffer.lines()[start..end]
        .iter()
        .enumerate()
        .map(|(window_index, line)| {
            let number = start + window_index + 1;
            format!("{number}#{}:{}", hashes[number - 1], line.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let notice = if end < total {
        format!("(File has more lines. Use --offset to read beyond line {end})")
    } else {
        format!("(End of file - {total} total lines)")
    };

    format!("{body}\n\n{notice}")
}

/// One `N#HH:content` listing line, shared by `read` output and the diff
/// emitter's context rows.
pub fn listing_line(number: usize, hash: &str, content: &str) -> String {
    format!("{number}#{hash}:{content}")
}

#[cfg(test)]
mod tests {
    use crate::anchor::buffer_hashes;
    use crate::buffer::FileBuffer;

    use super::render_listing;

    #[test]
    fn listing_prefixes_each_line_with_its_anchor() {
        let buffer = FileBuffer::from_text("a\nb\nc\n");
        let hashes = buffer_hashes(&buffer);
        let listing = render_listing(&buffer, None, None);
        let mut lines = listing.lines();

        assert_eq!(
            lines.next().expect("first line should exist"),
            format!("1#{}:a", hashes[0])
        );
        assert_eq!(
            lines.next().expect("second line should exist"),
            format!("2#{}:b", hashes[1])
        );
        assert_eq!(
            lines.next().expect("third line should exist"),
            format!("3#{}:c", hashes[2])
        );
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("(End of file - 3 total lines)"));
    }

    #[test]
    fn stripping_prefixes_reproduces_the_content() {
        let source = "fn main() {\n    println!(\"hi\");\n}\n";
        let buffer = FileBuffer::from_text(source);
        let listing = render_listing(&buffer, None, None);
        let reconstructed = listing
            .lines()
            .take(buffer.line_count())
            .map(|line| {
                line.split_once(':')
                    .expect("listing line should contain ':'")
                    .1
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(format!("{reconstructed}\n"), source);
    }

    #[test]
    fn window_hashes_match_full_listing_hashes() {
        let buffer = FileBuffer::from_text("a\nb\nc\nd\ne\n");
        let windowed = render_listing(&buffer, Some(2), Some(2));
        let hashes = buffer_hashes(&buffer);

        let mut lines = windowed.lines();
        assert_eq!(
            lines.next().expect("window should start at line 3"),
            format!("3#{}:c", hashes[2])
        );
        assert_eq!(
            lines.next().expect("window should include line 4"),
            format!("4#{}:d", hashes[3])
        );
        assert_eq!(lines.next(), Some(""));
        assert_eq!(
            lines.next(),
            Some("(File has more lines. Use --offset to read beyond line 4)")
        );
    }

    #[test]
    fn offset_past_eof_reports_zero_lines() {
        let buffer = FileBuffer::from_text("a\n");
        assert_eq!(
            render_listing(&buffer, Some(5), None),
            "(End of file - 0 lines)"
        );
        assert_eq!(
            render_listing(&FileBuffer::from_text(""), None, None),
            "(End of file - 0 lines)"
        );
    }

    #[test]
    fn content_is_emitted_verbatim_without_trimming() {
        let buffer = FileBuffer::from_text("  indented \n");
        let listing = render_listing(&buffer, None, None);
        assert!(
            listing
                .lines()
                .next()
                .expect("line should exist")
                .ends_with(":  indented ")
        );
    }
}
