//! Property-based checks for the splitter, numeric decoders and tree builder.

use proptest::prelude::*;

use a2l::block::Block;
use a2l::parser::Parser;
use a2l::parser::lexer::{parse_float, parse_int, split_tokens, unquote};

fn count_blocks(block: &Block, keyword: &str) -> usize {
    let own = usize::from(block.keyword == keyword);
    own + block
        .children
        .iter()
        .map(|child| count_blocks(child, keyword))
        .sum::<usize>()
}

proptest! {
    #[test]
    fn splitting_never_yields_empty_tokens(line in ".{0,80}") {
        for token in split_tokens(&line) {
            prop_assert!(!token.is_empty());
        }
    }

    #[test]
    fn plain_words_split_like_whitespace(words in prop::collection::vec("[A-Za-z0-9_.]{1,12}", 0..8)) {
        let line = words.join("  ");
        prop_assert_eq!(split_tokens(&line), words);
    }

    #[test]
    fn quoted_text_round_trips(text in "[A-Za-z0-9 _.,]{0,30}") {
        let line = format!("KEY \"{}\" 1", text);
        let tokens = split_tokens(&line);
        prop_assert_eq!(tokens.len(), 3);
        prop_assert_eq!(unquote(&tokens[1]), text.as_str());
    }

    #[test]
    fn integers_decode_in_both_bases(value in 0i64..=i64::from(u32::MAX)) {
        prop_assert_eq!(parse_int(&value.to_string()), Some(value));
        prop_assert_eq!(parse_int(&format!("0x{:X}", value)), Some(value));
        prop_assert_eq!(parse_float(&value.to_string()), Some(value as f64));
    }

    #[test]
    fn numeric_decoders_never_panic(token in "\\PC{0,16}") {
        let _ = parse_int(&token);
        let _ = parse_float(&token);
    }

    #[test]
    fn builder_never_panics(source in "(/begin [A-Z]{1,4}|/end|[a-z0-9 \"]{0,10}|\n){0,40}") {
        let _ = Parser::new(source, 0).parse();
    }

    #[test]
    fn every_opened_block_is_in_the_tree(depth in 0usize..12, siblings in 1usize..6) {
        let mut source = String::new();
        for _ in 0..depth {
            source.push_str("/begin OUTER\n");
        }
        for i in 0..siblings {
            source.push_str(&format!("/begin LEAF l{}\nvalue {}\n/end LEAF\n", i, i));
        }
        for _ in 0..depth {
            source.push_str("/end OUTER\n");
        }
        let program = Parser::new(source, 0).parse();
        prop_assert!(program.warnings.is_empty());
        prop_assert_eq!(count_blocks(&program.root, "OUTER"), depth);
        prop_assert_eq!(count_blocks(&program.root, "LEAF"), siblings);
    }

    #[test]
    fn blank_lines_do_not_change_the_tree(blank in 0usize..4) {
        let spacer = "\n".repeat(blank);
        let plain = "/begin A x\nline\n/begin B\n/end B\n/end A\n";
        let padded = format!(
            "{s}/begin A x\n{s}line\n{s}/begin B\n{s}/end B\n{s}/end A\n{s}",
            s = spacer
        );
        let plain = Parser::new(plain.to_string(), 0).parse();
        let padded = Parser::new(padded, 0).parse();
        prop_assert_eq!(plain.root.children.len(), padded.root.children.len());
        prop_assert_eq!(
            &plain.root.children[0].content_lines,
            &padded.root.children[0].content_lines
        );
        prop_assert_eq!(
            plain.root.children[0].children.len(),
            padded.root.children[0].children.len()
        );
    }
}
