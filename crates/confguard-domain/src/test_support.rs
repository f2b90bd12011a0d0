use crate::model::{
    Clause, Enforcement, ForEach, Matcher, PolicySet, Rule, RuleBody, Selector,
};
use confguard_doc::ConfigValue;

pub fn doc(text: &str) -> ConfigValue {
    confguard_doc::parse_document(text).expect("fixture document")
}

pub fn policy(rules: Vec<Rule>) -> PolicySet {
    PolicySet {
        package: "org".to_string(),
        rules,
    }
}

pub fn check_rule(name: &str, enforcement: Enforcement, clause: Clause) -> Rule {
    Rule {
        name: name.to_string(),
        description: None,
        enabled: true,
        enforcement,
        body: RuleBody::Check(clause),
    }
}

pub fn clauses_rule(name: &str, enforcement: Enforcement, clauses: Vec<Clause>) -> Rule {
    Rule {
        name: name.to_string(),
        description: None,
        enabled: true,
        enforcement,
        body: RuleBody::Clauses(clauses),
    }
}

pub fn for_each_rule(
    name: &str,
    enforcement: Enforcement,
    select: Selector,
    matcher: Matcher,
    reason: &str,
) -> Rule {
    Rule {
        name: name.to_string(),
        description: None,
        enabled: true,
        enforcement,
        body: RuleBody::ForEach(ForEach {
            select,
            matcher,
            reason: reason.to_string(),
        }),
    }
}
