// src/politeness/robots.rs
// =============================================================================
// robots.txt parsing and evaluation.
//
// A robots.txt file is a list of groups. Each group starts with one or more
// "User-agent:" lines followed by "Allow:" / "Disallow:" rules:
//
//   User-agent: *
//   Disallow: /private/
//   Allow: /private/public.html
//
// We keep only the rules that apply to our agent token. When a path is
// checked, the longest matching rule wins and a tie goes to Allow. Rules can
// use '*' (any run of characters) and a trailing '$' (end of path).
// =============================================================================

use regex::Regex;

// One Allow/Disallow line, compiled to an anchored regex
#[derive(Debug, Clone)]
pub struct Rule {
    allow: bool,
    // Length of the original pattern, used for longest-match precedence
    specificity: usize,
    regex: Regex,
}

#[derive(Debug, Clone)]
pub enum RobotsPolicy {
    /// No robots.txt, or we could not get one (fail-open)
    AllowAll,
    /// The server refused to show us robots.txt (401/403)
    DisallowAll,
    Rules(Vec<Rule>),
}

impl RobotsPolicy {
    pub fn parse(content: &str, agent: &str) -> Self {
        let agent = agent.to_ascii_lowercase();

        let mut wildcard_rules = Vec::new();
        let mut specific_rules = Vec::new();

        // Agents named by the current group, and whether we've started
        // reading its rules (a User-agent line after a rule opens a new group)
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_rules = false;

        for line in content.lines() {
            // Strip comments, then surrounding whitespace
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if in_rules {
                        group_agents.clear();
                        in_rules = false;
                    }
                    group_agents.push(value.to_ascii_lowercase());
                }
                "allow" | "disallow" => {
                    in_rules = true;
                    // An empty Disallow means "nothing is disallowed"
                    if value.is_empty() {
                        continue;
                    }
                    let Some(rule) = Rule::new(key == "allow", value) else {
                        continue;
                    };

                    let names_us = agent != "*"
                        && group_agents
                            .iter()
                            .any(|a| a != "*" && agent.contains(a.as_str()));
                    if names_us {
                        specific_rules.push(rule);
                    } else if group_agents.iter().any(|a| a == "*") {
                        wildcard_rules.push(rule);
                    }
                }
                _ => {}
            }
        }

        // A group naming us specifically replaces the wildcard group
        let rules = if specific_rules.is_empty() {
            wildcard_rules
        } else {
            specific_rules
        };
        RobotsPolicy::Rules(rules)
    }

    // `path` is the URL path, optionally followed by "?query"
    pub fn allows(&self, path: &str) -> bool {
        let rules = match self {
            RobotsPolicy::AllowAll => return true,
            RobotsPolicy::DisallowAll => return false,
            RobotsPolicy::Rules(rules) => rules,
        };

        if path == "/robots.txt" {
            return true;
        }

        let best = rules
            .iter()
            .filter(|rule| rule.regex.is_match(path))
            .max_by(|a, b| {
                a.specificity
                    .cmp(&b.specificity)
                    .then(a.allow.cmp(&b.allow))
            });

        best.map_or(true, |rule| rule.allow)
    }
}

impl Rule {
    fn new(allow: bool, pattern: &str) -> Option<Self> {
        let (body, anchored) = match pattern.strip_suffix('$') {
            Some(body) => (body, true),
            None => (pattern, false),
        };

        let mut source = String::from("^");
        source.push_str(&regex::escape(body).replace(r"\*", ".*"));
        if anchored {
            source.push('$');
        }

        Some(Rule {
            allow,
            specificity: pattern.len(),
            regex: Regex::new(&source).ok()?,
        })
    }
}
