//! Property-based tests for the stream parser.
//!
//! The parser consumes untrusted migration input, so the properties
//! here are about totality and byte exactness: arbitrary input must
//! never panic, and declared-length payloads must round-trip exactly
//! no matter what bytes they contain.

use proptest::prelude::*;

use git2p4::core::model::Person;
use git2p4::core::types::Mark;
use git2p4::parser::parse_bytes;

proptest! {
    /// Arbitrary byte soup parses to Ok or a typed error, never a panic.
    #[test]
    fn parser_is_total_on_arbitrary_bytes(input in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let _ = parse_bytes(input);
    }

    /// Arbitrary directive-shaped lines never panic either.
    #[test]
    fn parser_is_total_on_line_shaped_input(
        lines in proptest::collection::vec("[ -~]{0,60}", 0..40)
    ) {
        let _ = parse_bytes(lines.join("\n"));
    }

    /// A blob payload of any content survives ingestion byte for byte,
    /// including payloads that look like directives.
    #[test]
    fn blob_payloads_round_trip_exactly(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut input = Vec::new();
        input.extend_from_slice(format!("blob\nmark :1\ndata {}\n", payload.len()).as_bytes());
        input.extend_from_slice(&payload);
        input.extend_from_slice(
            b"\ncommit refs/heads/main\nmark :2\n\
              committer T <t@t> 1 +0000\ndata 2\nx\n\
              M 100644 :1 f.bin\n\n",
        );

        let graph = parse_bytes(input).unwrap();
        prop_assert_eq!(&graph.file(Mark::new(1).unwrap()).unwrap().blob.data, &payload);
    }

    /// Identity lines round-trip through parse and display.
    #[test]
    fn person_lines_round_trip(
        name in "[A-Za-z][A-Za-z .]{0,20}[A-Za-z]",
        email in "[a-z0-9.]{1,12}@[a-z0-9.]{1,12}",
        when in proptest::num::i64::ANY,
        tz in -1400i32..1400,
    ) {
        let line = format!("{name} <{email}> {when} {tz:+05}");
        let person = Person::parse(&line).unwrap();
        prop_assert_eq!(&person.name, &name);
        prop_assert_eq!(&person.email, &email);
        prop_assert_eq!(person.when, when);
        prop_assert_eq!(person.tz, tz);
        prop_assert_eq!(person.to_string(), line);
    }
}
