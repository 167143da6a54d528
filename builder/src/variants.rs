use serde_json::{Map, Value};

/// Breakpoints in ascending min-width order. Variants are emitted
/// mobile-first, one light and one dark media block per entry.
const BREAKPOINTS: [(&str, u32); 5] = [
    ("sm", 480),
    ("md", 768),
    ("lg", 1024),
    ("xl", 1280),
    ("uw", 1536),
];

/// Pseudo-state axis, in emission order.
const STATES: [(&str, &str); 4] = [
    ("hover", ":hover"),
    ("focus", ":focus"),
    ("active", ":active"),
    ("disabled", ":disabled"),
];

const GROUP_HOVER: &str = "group-hover";

/// Dark variants are scoped under a theme attribute on the document root.
const DARK_SCOPE: &str = "html[data-theme=\"dark\"]";

/// A single-line `.class { prop: val; ... }` declaration from the base
/// stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRule {
    pub class: String,
    pub body: String,
}

/// The expanded variant matrix plus the style lookup table.
pub struct Expansion {
    pub css: String,
    pub styles: Map<String, Value>,
}

/// Extract base rules from the base stylesheet.
///
/// Only trimmed lines starting with `.` that carry both braces on the
/// same line are recognized; everything else (comments, headers, blank
/// lines, multi-line rules) is skipped.
pub fn parse_base_rules(source: &str) -> Vec<BaseRule> {
    let mut rules = Vec::new();

    for line in source.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('.') || !trimmed.contains('{') || !trimmed.contains('}') {
            continue;
        }

        let class: String = trimmed[1..]
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '{')
            .collect();
        if class.is_empty() {
            continue;
        }

        let open = trimmed.find('{').unwrap_or(0);
        let body = match trimmed.rfind('}') {
            Some(close) if close > open => trimmed[open + 1..close].trim(),
            _ => "",
        };

        rules.push(BaseRule {
            class,
            body: body.to_string(),
        });
    }

    rules
}

/// Expand every base rule into its full variant family.
///
/// Per rule the immediate stream carries, in order: the base light rule,
/// its dark counterpart, the four state variants (light then dark each),
/// and the group-hover pair. Responsive variants are buffered per
/// breakpoint and flushed after all rules, one light media block then
/// one dark media block per breakpoint, ascending.
pub fn expand(rules: &[BaseRule]) -> Expansion {
    let mut immediate: Vec<String> = Vec::new();
    let mut resp_light: Vec<Vec<String>> = vec![Vec::new(); BREAKPOINTS.len()];
    let mut resp_dark: Vec<Vec<String>> = vec![Vec::new(); BREAKPOINTS.len()];
    let mut styles = Map::new();

    for rule in rules {
        let cls = &rule.class;
        let body = &rule.body;

        styles.insert(cls.replace('-', "_"), Value::Object(style_bag(body)));

        immediate.push(light(&format!(".{cls}"), body));
        immediate.push(dark(&format!(".dark-{cls}"), body));

        for (state, pseudo) in STATES {
            immediate.push(light(&format!(".{state}-{cls}{pseudo}"), body));
            immediate.push(dark(&format!(".dark-{state}-{cls}{pseudo}"), body));
        }

        immediate.push(light(&format!(".{GROUP_HOVER}-{cls}"), body));
        immediate.push(dark(&format!(".dark-{GROUP_HOVER}-{cls}"), body));

        for (i, (bp, _)) in BREAKPOINTS.iter().enumerate() {
            resp_light[i].push(light(&format!(".{bp}-{cls}"), body));
            resp_dark[i].push(dark(&format!(".dark-{bp}-{cls}"), body));

            for (state, pseudo) in STATES {
                resp_light[i].push(light(&format!(".{bp}-{state}-{cls}{pseudo}"), body));
                resp_dark[i].push(dark(&format!(".dark-{bp}-{state}-{cls}{pseudo}"), body));
            }

            resp_light[i].push(light(&format!(".{bp}-{GROUP_HOVER}-{cls}"), body));
            resp_dark[i].push(dark(&format!(".dark-{bp}-{GROUP_HOVER}-{cls}"), body));
        }
    }

    let mut out = immediate;
    for (i, (_, min_width)) in BREAKPOINTS.iter().enumerate() {
        out.push(media_block(*min_width, &resp_light[i]));
        out.push(media_block(*min_width, &resp_dark[i]));
    }

    Expansion {
        css: out.join("\n"),
        styles,
    }
}

fn light(selector: &str, body: &str) -> String {
    format!("{selector} {{ {body} }}")
}

fn dark(selector: &str, body: &str) -> String {
    format!("{DARK_SCOPE} {selector} {{ {body} }}")
}

fn media_block(min_width: u32, rules: &[String]) -> String {
    format!("@media (min-width: {min_width}px) {{\n{}\n}}", rules.join("\n"))
}

/// Split a rule body into a camelCase property bag. Pairs with an empty
/// property or value are skipped; values are kept verbatim.
fn style_bag(body: &str) -> Map<String, Value> {
    let mut bag = Map::new();

    for pair in body.split(';') {
        let Some((prop, val)) = pair.split_once(':') else {
            continue;
        };
        let (prop, val) = (prop.trim(), val.trim());
        if prop.is_empty() || val.is_empty() {
            continue;
        }
        bag.insert(camel_case(prop), Value::String(val.to_string()));
    }

    bag
}

/// `background-color` -> `backgroundColor`. A hyphen not followed by a
/// lowercase letter is kept.
fn camel_case(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len());
    let mut chars = prop.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '-'
            && let Some(next) = chars.peek()
            && next.is_ascii_lowercase()
        {
            out.push(chars.next().unwrap().to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}
