use log::debug;

use crate::{CaptionFragment, PackedBlock};

/// How caption fragments are packed into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingConfig {
    pub max_block_chars: usize,
    pub include_timestamps: bool,
    pub indent_under_source: bool,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            max_block_chars: 1000,
            include_timestamps: true,
            indent_under_source: true,
        }
    }
}

/// Timestamp reference token for a fragment start, floored to whole seconds
pub fn timestamp_marker(start: f64) -> String {
    let seconds = start.max(0.0).floor() as u64;
    format!("{{{{youtube-timestamp {seconds}}}}} ")
}

/// Greedily pack fragments into blocks of at most `max_block_chars` characters.
///
/// Each block opens with the marker of its first fragment. A fragment is never
/// split, so a block holding a single oversized fragment may exceed the limit.
pub fn pack(fragments: &[CaptionFragment], config: &PackingConfig) -> Vec<PackedBlock> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for fragment in fragments {
        let marker = if config.include_timestamps {
            timestamp_marker(fragment.start)
        } else {
            String::new()
        };
        let text = fragment.display_text();
        let text_len = text.chars().count();

        let opening = current.is_empty();
        if opening {
            current.push_str(&marker);
            current_len = marker.chars().count();
        }

        if opening || current_len + text_len < config.max_block_chars {
            current.push_str(&text);
            current.push(' ');
            current_len += text_len + 1;
        } else {
            blocks.push(PackedBlock::new(std::mem::take(&mut current)));
            current = format!("{marker}{text} ");
            current_len = marker.chars().count() + text_len + 1;
        }
    }

    if !current.is_empty() {
        blocks.push(PackedBlock::new(current));
    }

    debug!("Packed {} fragments into {} blocks", fragments.len(), blocks.len());
    blocks
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    fn config(max_block_chars: usize, include_timestamps: bool) -> PackingConfig {
        PackingConfig {
            max_block_chars,
            include_timestamps,
            indent_under_source: true,
        }
    }

    fn contents(blocks: &[PackedBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.content.as_str()).collect()
    }

    fn a_and_b() -> Vec<CaptionFragment> {
        vec![CaptionFragment::new(0.0, 5.0, "a"), CaptionFragment::new(5.0, 2.0, "b")]
    }

    #[test]
    fn test_pack_fits_in_one_block() {
        let blocks = pack(&a_and_b(), &config(1000, false));
        assert_eq!(contents(&blocks), vec!["a b "]);
    }

    #[test]
    fn test_pack_splits_at_threshold() {
        let blocks = pack(&a_and_b(), &config(2, false));
        assert_eq!(contents(&blocks), vec!["a ", "b "]);
    }

    #[test]
    fn test_pack_empty_input() {
        assert!(pack(&[], &config(1000, true)).is_empty());
    }

    #[test]
    fn test_pack_marker_leads_each_block() {
        let fragments = vec![
            CaptionFragment::new(0.4, 2.0, "hello there"),
            CaptionFragment::new(2.4, 2.0, "general"),
            CaptionFragment::new(61.7, 2.0, "kenobi"),
        ];
        let blocks = pack(&fragments, &config(45, true));
        assert_eq!(
            contents(&blocks),
            vec![
                "{{youtube-timestamp 0}} hello there general ",
                "{{youtube-timestamp 61}} kenobi "
            ]
        );
    }

    #[test]
    fn test_pack_oversized_fragment_is_one_block() {
        let fragments = vec![CaptionFragment::new(3.0, 1.0, "a fragment far longer than the limit")];

        let blocks = pack(&fragments, &config(5, false));
        assert_eq!(contents(&blocks), vec!["a fragment far longer than the limit "]);

        let blocks = pack(&fragments, &config(5, true));
        assert_eq!(
            contents(&blocks),
            vec!["{{youtube-timestamp 3}} a fragment far longer than the limit "]
        );
    }

    #[test]
    fn test_pack_flattens_newlines() {
        let fragments = vec![CaptionFragment::new(0.0, 1.0, "two\nlines")];
        let blocks = pack(&fragments, &config(1000, false));
        assert_eq!(contents(&blocks), vec!["two lines "]);
    }

    #[test]
    fn test_pack_counts_chars_not_bytes() {
        // "héé" is 3 chars but 5 bytes
        let fragments = vec![CaptionFragment::new(0.0, 1.0, "héé"), CaptionFragment::new(1.0, 1.0, "x")];
        let blocks = pack(&fragments, &config(6, false));
        assert_eq!(contents(&blocks), vec!["héé x "]);
    }

    #[test]
    fn test_pack_preserves_every_fragment_in_order() {
        let fragments: Vec<_> = (0..50)
            .map(|i| CaptionFragment::new(i as f64 * 1.5, 1.5, format!("word{i}\nnext{i}")))
            .collect();

        for max in [1, 7, 20, 64, 1000] {
            for include_timestamps in [true, false] {
                let blocks = pack(&fragments, &config(max, include_timestamps));
                assert!(blocks.iter().all(|b| !b.content.is_empty()));

                let marker = Regex::new(r"\{\{youtube-timestamp \d+\}\} ").unwrap();
                let joined: String = blocks
                    .iter()
                    .map(|b| marker.replace_all(&b.content, "").into_owned())
                    .collect();
                let expected: String = fragments.iter().map(|f| format!("{} ", f.display_text())).collect();
                assert_eq!(joined, expected);

                if !include_timestamps {
                    assert!(blocks.iter().all(|b| !b.content.contains("youtube-timestamp")));
                }
            }
        }
    }

    #[test]
    fn test_pack_only_single_fragment_blocks_exceed_limit() {
        let fragments: Vec<_> = ["short", "a much longer caption line", "mid size", "x"]
            .iter()
            .enumerate()
            .map(|(i, t)| CaptionFragment::new(i as f64, 1.0, *t))
            .collect();
        let blocks = pack(&fragments, &config(12, false));
        assert_eq!(
            contents(&blocks),
            vec!["short ", "a much longer caption line ", "mid size x "]
        );
    }

    #[test]
    fn test_timestamp_marker_floors() {
        assert_eq!(timestamp_marker(12.9), "{{youtube-timestamp 12}} ");
        assert_eq!(timestamp_marker(0.0), "{{youtube-timestamp 0}} ");
        assert_eq!(timestamp_marker(3599.999), "{{youtube-timestamp 3599}} ");
    }
}
