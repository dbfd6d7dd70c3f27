//! Property-based tests for `bugmine_core`.
//!
//! These tests verify invariants of the log parser, the cross-referencer,
//! and URL derivation that should hold for all inputs.

use std::collections::HashMap;
use std::convert::Infallible;

use bugmine_core::prelude::*;
use proptest::prelude::*;

/// Parents keyed by commit hash; unknown commits are roots.
struct StaticParents(HashMap<String, Vec<String>>);

impl ParentResolver for StaticParents {
    type Error = Infallible;

    fn parents(&self, commit: &str) -> Result<Vec<String>, Infallible> {
        Ok(self.0.get(commit).cloned().unwrap_or_default())
    }
}

fn message_line() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .:-]{0,30}".prop_map(|s| s.trim().to_string())
}

fn commit_block() -> impl Strategy<Value = (String, Vec<String>)> {
    ("[0-9a-f]{8}", prop::collection::vec(message_line(), 0..5))
}

fn render(blocks: &[(String, Vec<String>)]) -> String {
    let mut log = String::new();
    for (hash, lines) in blocks {
        log.push_str(&format!("commit {hash}\nAuthor: A <a@b.c>\nDate:   today\n\n"));
        for line in lines {
            log.push_str(&format!("    {line}\n"));
        }
        log.push('\n');
    }
    log
}

proptest! {
    /// Every marker yields exactly one entry carrying exactly its own
    /// message lines, including the final block.
    #[test]
    fn parser_conserves_blocks_and_lines(blocks in prop::collection::vec(commit_block(), 0..12)) {
        let log = render(&blocks);
        let entries: Vec<CommitEntry> = CommitStream::new(log.as_bytes())
            .collect::<std::io::Result<_>>()
            .unwrap();

        prop_assert_eq!(entries.len(), blocks.len());
        for (entry, (hash, lines)) in entries.iter().zip(&blocks) {
            prop_assert_eq!(&entry.hash, hash);
            prop_assert_eq!(&entry.message, lines);
        }
    }

    /// Emitted version ids run 1, 2, 3, ... with no gaps, whatever mix of
    /// roots, merges, unknown tokens and matches the log contains.
    #[test]
    fn version_ids_are_gap_free(shapes in prop::collection::vec((0usize..3, any::<bool>(), 1u32..20), 0..30)) {
        let registry = IssueRegistry::parse(
            &(1..10).map(|n| format!("ABC-{n},http://x/{n}\n")).collect::<String>(),
        );
        let pattern = BugPattern::new(r"(ABC-\d+)", PatternOptions::default()).unwrap();

        let mut parents = HashMap::new();
        let mut entries = Vec::new();
        let mut expected = 0;
        for (index, (parent_count, mentions_issue, number)) in shapes.iter().enumerate() {
            let hash = format!("c{index}");
            parents.insert(hash.clone(), (0..*parent_count).map(|p| format!("p{index}_{p}")).collect());
            let message = if *mentions_issue { format!("Fixes ABC-{number}") } else { "chore".to_string() };
            if *mentions_issue && *parent_count == 1 && *number < 10 {
                expected += 1;
            }
            entries.push(Ok(CommitEntry { hash, message: vec![message] }));
        }

        let resolver = StaticParents(parents);
        let mut xref = CrossReferencer::new(&pattern, &registry, &resolver, "P", "https://github.com/o/r");
        let report = xref.run(entries).unwrap();

        let ids: Vec<u64> = report.records.iter().map(|r| r.version_id).collect();
        let want: Vec<u64> = (1..=expected).collect();
        prop_assert_eq!(ids, want);
        prop_assert!(report.records.iter().all(|r| r.buggy_commit.starts_with('p')));
    }

    /// URL derivation is deterministic, and unknown hosts map to `NA`.
    #[test]
    fn url_derivation_is_pure(
        host in prop::sample::select(vec!["github.com", "gitlab.com", "bitbucket.org", "example.org"]),
        path in "[a-z]{1,8}/[a-z]{1,8}",
        a in "[0-9a-f]{7}",
        b in "[0-9a-f]{7}",
    ) {
        let repo = format!("https://{host}/{path}.git");

        prop_assert_eq!(commit_url(&repo, &a), commit_url(&repo, &a));
        prop_assert_eq!(compare_url(&repo, &a, &b), compare_url(&repo, &a, &b));

        let compare = compare_url(&repo, &a, &b);
        match host {
            "example.org" => {
                prop_assert_eq!(commit_url(&repo, &a), NOT_AVAILABLE);
                prop_assert_eq!(compare, NOT_AVAILABLE);
            }
            "bitbucket.org" => {
                let suffix = format!("/compare/{b}..{a}#diff");
                prop_assert!(compare.ends_with(&suffix));
            }
            _ => {
                let suffix = format!("/compare/{a}...{b}");
                prop_assert!(compare.ends_with(&suffix));
            }
        }
    }
}
