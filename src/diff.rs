use std::path::Path;

use crate::anchor::{DELETED_HASH, buffer_hashes};
use crate::apply::Change;
use crate::buffer::FileBuffer;
use crate::listing::listing_line;

/// Change regions closer than this many post-edit lines share one hunk.
const REGION_MERGE_DISTANCE: usize = 10;
/// Context lines shown before and after each change region.
const CONTEXT_LINES: usize = 5;

const REFRESH_NOTE: &str =
    "Note: Lines after edited regions have stale hashes. Use hashread to refresh.";

/// Renders the full `edit` success response: the first-change header plus the
/// `<diff>` envelope. Context and inserted rows carry fresh post-edit
/// anchors; deletion rows carry the reserved two-space hash and pre-edit
/// numbering.
pub fn render_edit_response(
    path: &Path,
    pre: &FileBuffer,
    post: &FileBuffer,
    changes: &[Change],
) -> String {
    let post_hashes = buffer_hashes(post);
    let regions = changes
        .iter()
        .filter(|change| change.pre_start < change.pre_end || change.post_start < change.post_end)
        .collect::<Vec<_>>();

    let first_line = regions
        .first()
        .map(|change| change.post_start)
        .unwrap_or(1);

    let hunks = group_regions(&regions)
        .iter()
        .map(|group| render_group(group, pre, post, &post_hashes))
        .collect::<Vec<_>>()
        .join("\n...\n");

    let path_display = path.display();
    format!(
        "Edit applied successfully (first change at line {first_line}).\n\n<diff>\n--- {path_display}\n+++ {path_display}\n{hunks}\n{REFRESH_NOTE}\n</diff>"
    )
}

fn group_regions<'a>(regions: &[&'a Change]) -> Vec<Vec<&'a Change>> {
    let mut groups: Vec<Vec<&Change>> = Vec::new();
    for &change in regions {
        let mergeable = groups
            .last()
            .and_then(|group| group.last())
            .is_some_and(|previous| {
                change.post_start <= previous.post_end + REGION_MERGE_DISTANCE
            });
        if mergeable && let Some(group) = groups.last_mut() {
            group.push(change);
        } else {
            groups.push(vec![change]);
        }
    }
    groups
}

fn render_group(
    group: &[&Change],
    pre: &FileBuffer,
    post: &FileBuffer,
    post_hashes: &[String],
) -> String {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        return String::new();
    };
    let context_start = first.post_start.saturating_sub(CONTEXT_LINES).max(1);
    let context_end = last
        .post_end
        .saturating_add(CONTEXT_LINES)
        .min(post.line_count() + 1);

    let mut rows = Vec::new();
    push_context_rows(&mut rows, post, post_hashes, context_start, first.post_start);

    for (position, change) in group.iter().enumerate() {
        if position > 0 {
            push_context_rows(
                &mut rows,
                post,
                post_hashes,
                group[position - 1].post_end,
                change.post_start,
            );
        }
        for number in change.pre_start..change.pre_end {
            let content = pre
                .line(number)
                .map(|line| line.content.as_str())
                .unwrap_or_default();
            rows.push(format!("-{}", listing_line(number, DELETED_HASH, content)));
        }
        for number in change.post_start..change.post_end {
            let content = post
                .line(number)
                .map(|line| line.content.as_str())
                .unwrap_or_default();
            rows.push(format!(
                "+{}",
                listing_line(number, &post_hashes[number - 1], content)
            ));
        }
    }

    push_context_rows(&mut rows, post, post_hashes, last.post_end, context_end);
    rows.join("\n")
}

fn push_context_rows(
    rows: &mut Vec<String>,
    post: &FileBuffer,
    post_hashes: &[String],
    from: usize,
    to: usize,
) {
    for number in from..to {
        let content = post
            .line(number)
            .map(|line| line.content.as_str())
            .unwrap_or_default();
        rows.push(format!(
            " {}",
            listing_line(number, &post_hashes[number - 1], content)
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::anchor::buffer_hashes;
    use crate::apply::apply_plan;
    use crate::buffer::FileBuffer;
    use crate::edit::parse_edit_batch;
    use crate::plan::build_plan;

    use super::render_edit_response;

    fn edit_response(source: &str, batch: &str) -> (String, FileBuffer) {
        let pre = FileBuffer::from_text(source);
        let plan = build_plan(
            &pre,
            &parse_edit_batch(batch).expect("batch should parse"),
        )
        .expect("plan should build");
        let outcome = apply_plan(&pre, &plan);
        let response = render_edit_response(
            Path::new("fixture.txt"),
            &pre,
            &outcome.buffer,
            &outcome.changes,
        );
        (response, outcome.buffer)
    }

    fn anchor(source: &str, line: usize) -> String {
        let hashes = buffer_hashes(&FileBuffer::from_text(source));
        format!("{line}#{}", hashes[line - 1])
    }

    #[test]
    fn single_replace_shows_context_deletion_and_fresh_insertion() {
        let source = "a\nb\nc\n";
        let batch = format!(
            r#"[{{"op":"replace","pos":"{}","lines":["B"]}}]"#,
            anchor(source, 2)
        );
        let (response, post) = edit_response(source, &batch);
        let post_hashes = buffer_hashes(&post);

        assert!(response.starts_with("Edit applied successfully (first change at line 2).\n"));
        assert!(response.contains("<diff>\n--- fixture.txt\n+++ fixture.txt\n"));
        assert!(response.contains(&format!(" 1#{}:a", post_hashes[0])));
        assert!(response.contains("-2#  :b"));
        assert!(response.contains(&format!("+2#{}:B", post_hashes[1])));
        assert!(response.contains(&format!(" 3#{}:c", post_hashes[2])));
        assert!(response.ends_with(
            "Note: Lines after edited regions have stale hashes. Use hashread to refresh.\n</diff>"
        ));
    }

    #[test]
    fn every_non_deletion_anchor_matches_the_post_edit_file() {
        let source = "a\nb\nc\nd\ne\nf\ng\n";
        let batch = format!(
            r#"[
                {{"op":"replace","pos":"{}","lines":["B"]}},
                {{"op":"delete","pos":"{}"}}
            ]"#,
            anchor(source, 2),
            anchor(source, 6)
        );
        let (response, post) = edit_response(source, &batch);
        let post_hashes = buffer_hashes(&post);

        for row in response.lines() {
            let Some(rest) = row
                .strip_prefix(' ')
                .or_else(|| row.strip_prefix('+'))
            else {
                continue;
            };
            let Some((number_raw, tail)) = rest.split_once('#') else {
                continue;
            };
            let Ok(number) = number_raw.parse::<usize>() else {
                continue;
            };
            let (hash, content) = tail.split_at(2);
            let content = content.strip_prefix(':').expect("row should contain ':'");
            assert_eq!(hash, post_hashes[number - 1], "stale anchor in row '{row}'");
            assert_eq!(
                post.line(number).expect("line should exist").content,
                content
            );
        }
    }

    #[test]
    fn range_delete_renders_pre_numbers_with_reserved_hash() {
        let source = "a\nb\nc\nd\ne\n";
        let batch = format!(
            r#"[{{"op":"delete","pos":"{}","end":"{}"}}]"#,
            anchor(source, 2),
            anchor(source, 4)
        );
        let (response, post) = edit_response(source, &batch);
        let post_hashes = buffer_hashes(&post);

        assert!(response.contains("-2#  :b"));
        assert!(response.contains("-3#  :c"));
        assert!(response.contains("-4#  :d"));
        assert!(response.contains(&format!(" 2#{}:e", post_hashes[1])));
        assert!(!response.contains("..."));
    }

    #[test]
    fn nearby_changes_share_one_hunk() {
        let lines = (1..=20).map(|n| format!("line{n}")).collect::<Vec<_>>();
        let source = format!("{}\n", lines.join("\n"));
        let batch = format!(
            r#"[
                {{"op":"replace","pos":"{}","lines":["X"]}},
                {{"op":"replace","pos":"{}","lines":["Y"]}}
            ]"#,
            anchor(&source, 3),
            anchor(&source, 8)
        );
        let (response, _) = edit_response(&source, &batch);
        assert!(!response.contains("\n...\n"));
        assert!(response.contains("+3#"));
        assert!(response.contains("+8#"));
    }

    #[test]
    fn distant_changes_are_separated_by_a_gap_marker() {
        let lines = (1..=40).map(|n| format!("line{n}")).collect::<Vec<_>>();
        let source = format!("{}\n", lines.join("\n"));
        let batch = format!(
            r#"[
                {{"op":"replace","pos":"{}","lines":["X"]}},
                {{"op":"replace","pos":"{}","lines":["Y"]}}
            ]"#,
            anchor(&source, 3),
            anchor(&source, 30)
        );
        let (response, _) = edit_response(&source, &batch);
        assert!(response.contains("\n...\n"));
    }

    #[test]
    fn context_is_clamped_to_five_lines_each_side() {
        let lines = (1..=30).map(|n| format!("line{n}")).collect::<Vec<_>>();
        let source = format!("{}\n", lines.join("\n"));
        let batch = format!(
            r#"[{{"op":"replace","pos":"{}","lines":["X"]}}]"#,
            anchor(&source, 15)
        );
        let (response, _) = edit_response(&source, &batch);

        assert!(response.contains(" 10#"));
        assert!(!response.contains(" 9#"));
        assert!(response.contains(" 20#"));
        assert!(!response.contains(" 21#"));
    }

    #[test]
    fn insertion_at_eof_anchors_after_the_last_original_line() {
        let source = "x\n";
        let (response, post) = edit_response(source, r#"[{"op":"append","lines":["y","z"]}]"#);
        let post_hashes = buffer_hashes(&post);

        assert!(response.starts_with("Edit applied successfully (first change at line 2).\n"));
        assert!(response.contains(&format!(" 1#{}:x", post_hashes[0])));
        assert!(response.contains(&format!("+2#{}:y", post_hashes[1])));
        assert!(response.contains(&format!("+3#{}:z", post_hashes[2])));
    }
}
