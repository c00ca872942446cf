//! Parse DBC source into a labeled syntax tree using PEST.

use crate::error::{ConvertError, Result};
use crate::syntax::SyntaxTree;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct DbcParser;

/// Parse DBC source into a tree labeled with grammar rule names.
pub fn parse(source: &str) -> Result<SyntaxTree> {
    let pairs = DbcParser::parse(Rule::file, source)
        .map_err(|e| ConvertError::Parse(e.to_string()))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| ConvertError::Parse("Empty parse".to_string()))?;
    Ok(build_tree(pair))
}

fn build_tree(pair: pest::iterators::Pair<Rule>) -> SyntaxTree {
    let label = format!("{:?}", pair.as_rule());
    let contents = pair.as_str().to_string();
    let children = pair
        .into_inner()
        .filter(|inner| inner.as_rule() != Rule::EOI)
        .map(build_tree)
        .collect();
    SyntaxTree {
        label,
        contents,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxNode;

    #[test]
    fn labels_follow_rule_names() {
        let tree = parse("BO_ 100 Foo: 1 ECU\n SG_ Bar : 0|8@1+ (1,0) [0|255] \"\" ECU\n")
            .expect("parse");
        assert_eq!(tree.label(), "file");
        let message = tree.child("messages/message").expect("message");
        assert_eq!(message.child("id").map(|n| n.contents()), Some("100"));
        assert_eq!(message.child("signal/unit/unit_text").map(|n| n.contents()), Some(""));
        assert_eq!(message.child("signal/scale_offset/scale").map(|n| n.contents()), Some("1"));
    }

    #[test]
    fn eoi_is_not_part_of_the_tree() {
        let tree = parse("").expect("empty source parses");
        assert!(tree.children().is_empty());
    }
}
