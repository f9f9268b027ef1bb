use crate::errors::Result;
use regex::Regex;
use std::borrow::Cow;

/// A single find-and-replace step.
///
/// `replacement` uses the `regex` crate's expansion syntax, so `${1}` refers to
/// the first capture group of `regex`.
pub struct Rule {
    pub name: &'static str,
    regex: Regex,
    replacement: &'static str,
}

impl Rule {
    /// Compiles a new rule.
    pub fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Result<Self> {
        Ok(Self {
            name,
            regex: Regex::new(pattern)?,
            replacement,
        })
    }

    /// Applies the rule to `text`, returning the rewritten text and the number of matches.
    pub fn apply<'a>(&self, text: &'a str) -> (Cow<'a, str>, usize) {
        let matches = self.regex.find_iter(text).count();
        if matches == 0 {
            return (Cow::Borrowed(text), 0);
        }
        (self.regex.replace_all(text, self.replacement), matches)
    }
}

/// The result of running a [`RuleSet`] over one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The text after every rule has run.
    pub content: String,
    /// Total number of matches across all rules.
    pub changes: usize,
    modified: bool,
}

impl Rewrite {
    /// `true` if `content` differs from the text the rules were applied to.
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// An ordered list of rules, each run over the output of the previous one.
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Builds a rule set from already compiled rules, keeping their order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules that turn `response.data.data` accesses into a fallback to `response.data`.
    ///
    /// Order matters: the nested-property rule must run first so that
    /// `response.data.data.items` is never seen by the two narrower rules.
    /// None of the replacements contain `response.data.data`, which makes the
    /// set idempotent.
    pub fn response_fallback() -> Result<Self> {
        Ok(Self::new(vec![
            Rule::new(
                "nested-property",
                r"response\.data\.data\.(\w+)",
                "(response?.data?.data || response?.data)?.${1}",
            )?,
            Rule::new(
                "return-statement",
                r"return response\.data\.data;",
                "return response?.data?.data || response?.data;",
            )?,
            Rule::new(
                "object-value",
                r": response\.data\.data([,}])",
                ": (response?.data?.data || response?.data)${1}",
            )?,
        ]))
    }

    /// Names of the rules, in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Runs every rule in order over `text`.
    pub fn apply(&self, text: &str) -> Rewrite {
        let mut content = Cow::Borrowed(text);
        let mut changes = 0;

        for rule in &self.rules {
            let (rewritten, matches) = rule.apply(content.as_ref());
            if matches > 0 {
                tracing::trace!(rule = rule.name, matches, "rule matched");
                changes += matches;
                content = Cow::Owned(rewritten.into_owned());
            }
        }

        let modified = content.as_ref() != text;
        Rewrite {
            content: content.into_owned(),
            changes,
            modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::response_fallback().unwrap()
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            rules().names(),
            vec!["nested-property", "return-statement", "object-value"]
        );
    }

    #[test]
    fn test_nested_property_access() {
        let out = rules().apply("const x = response.data.data.items;");
        assert_eq!(out.content, "const x = (response?.data?.data || response?.data)?.items;");
        assert_eq!(out.changes, 1);
        assert!(!out.content.contains("response.data.data.items"));
    }

    #[test]
    fn test_identifier_preserved_verbatim() {
        let out = rules().apply("a(response.data.data.total_count2, response.data.data.page)");
        assert_eq!(
            out.content,
            "a((response?.data?.data || response?.data)?.total_count2, (response?.data?.data || response?.data)?.page)"
        );
        assert_eq!(out.changes, 2);
    }

    #[test]
    fn test_return_statement() {
        let input = "  async list() {\n    return response.data.data;\n  }\n";
        let out = rules().apply(input);
        assert_eq!(
            out.content,
            "  async list() {\n    return response?.data?.data || response?.data;\n  }\n"
        );
        assert!(!out.content.contains("return response.data.data;"));
    }

    #[test]
    fn test_object_value_keeps_delimiter() {
        let out = rules().apply("{ items: response.data.data, meta: response.data.data}");
        assert_eq!(
            out.content,
            "{ items: (response?.data?.data || response?.data), meta: (response?.data?.data || response?.data)}"
        );
        assert_eq!(out.changes, 2);
    }

    #[test]
    fn test_property_inside_object_literal_uses_first_rule() {
        let out = rules().apply("      logs: response.data.data.items,\n");
        assert_eq!(
            out.content,
            "      logs: (response?.data?.data || response?.data)?.items,\n"
        );
        assert_eq!(out.changes, 1);
    }

    #[test]
    fn test_narrow_shapes_left_alone() {
        let rules = rules();
        for input in [
            "return response.data.data ;",
            "items: response.data.data;",
            "items: response.data.data\n}",
            "items:response.data.data,",
            "response.data.data",
        ] {
            let out = rules.apply(input);
            assert!(!out.is_modified(), "unexpected rewrite of {input:?}");
            assert_eq!(out.content, input);
        }
    }

    #[test]
    fn test_modified_tracks_content() {
        let rules = rules();
        assert!(rules.apply("return response.data.data;").is_modified());
        assert!(!rules.apply("return response?.data?.data || response?.data;").is_modified());

        // Matches that rewrite to identical text would not count as a modification.
        let noop = RuleSet::new(vec![Rule::new("noop", r"same", "same").unwrap()]);
        let out = noop.apply("same text");
        assert_eq!(out.changes, 1);
        assert!(!out.is_modified());
    }

    #[test]
    fn test_idempotent() {
        let rules = rules();
        let input = "\
const a = response.data.data.items;
return response.data.data;
const b = { x: response.data.data, y: response.data.data};
";
        let first = rules.apply(input);
        assert_eq!(first.changes, 4);

        let second = rules.apply(&first.content);
        assert!(!second.is_modified());
        assert_eq!(second.content, first.content);
    }
}
