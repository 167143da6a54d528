/// Kind of a logical block cut out of a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Rule,
    AtRule,
    Comment,
    Import,
}

/// A contiguous unit of source text with its classification.
///
/// `content` is trimmed of leading/trailing whitespace; interior
/// newlines are preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub content: String,
}

/// Scanner state while accumulating the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InComment,
    InRule,
    InAtRule,
}

impl State {
    fn kind(self) -> BlockKind {
        match self {
            // an unclassified accumulation flushes as a rule
            Self::Idle | Self::InRule => BlockKind::Rule,
            Self::InComment => BlockKind::Comment,
            Self::InAtRule => BlockKind::AtRule,
        }
    }
}

const AT_RULE_INTRODUCERS: [&str; 4] = ["@media", "@keyframes", "@supports", "@font-face"];

struct Tokenizer {
    state: State,
    buf: String,
    depth: i32,
    in_block_comment: bool,
    blocks: Vec<Block>,
}

/// Split a stylesheet into logical blocks: rules, at-rules, comments and
/// import directives.
///
/// The scan is line-oriented and purely textual. Braces are counted per
/// line to find the end of a block; brace characters inside string
/// values are not understood, and a one-line `selector { body }` keeps
/// accumulating until a later line lowers the brace count.
pub fn tokenize(source: &str) -> Vec<Block> {
    let mut tokenizer = Tokenizer {
        state: State::Idle,
        buf: String::new(),
        depth: 0,
        in_block_comment: false,
        blocks: Vec::new(),
    };

    for line in source.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        tokenizer.feed_line(line);
    }

    tokenizer.finish()
}

impl Tokenizer {
    fn feed_line(&mut self, line: &str) {
        let trimmed = line.trim();

        if trimmed.contains("/*") {
            self.in_block_comment = true;
        }
        if trimmed.contains("*/") {
            self.in_block_comment = false;
        }

        // the closing `*/` line falls through and is appended below
        if self.in_block_comment || trimmed.starts_with("//") {
            if self.state == State::Idle {
                self.state = State::InComment;
            }
            self.push_line(line);
            return;
        }

        if trimmed.starts_with("@import") {
            self.flush();
            self.blocks.push(Block {
                kind: BlockKind::Import,
                content: trimmed.to_string(),
            });
        } else if is_at_rule_introducer(trimmed) {
            self.flush();
            self.state = State::InAtRule;
            self.push_line(line);
            self.depth += count(trimmed, '{');
        } else if trimmed.contains('{') {
            if self.state == State::Idle {
                self.state = State::InRule;
            }
            self.push_line(line);
            self.depth += count(trimmed, '{');
        } else if trimmed.contains('}') {
            self.push_line(line);
            self.depth -= count(trimmed, '}');
            if self.depth <= 0 {
                self.flush();
                self.depth = 0;
            }
        } else if self.state != State::Idle {
            self.push_line(line);
        } else if !trimmed.is_empty() {
            self.push_line(line);
            self.state = State::InRule;
        }
    }

    fn push_line(&mut self, line: &str) {
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    fn flush(&mut self) {
        let content = self.buf.trim();
        if !content.is_empty() {
            self.blocks.push(Block {
                kind: self.state.kind(),
                content: content.to_string(),
            });
        }
        self.buf.clear();
        self.state = State::Idle;
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

fn is_at_rule_introducer(trimmed: &str) -> bool {
    AT_RULE_INTRODUCERS
        .iter()
        .any(|introducer| trimmed.starts_with(introducer))
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn count(haystack: &str, needle: char) -> i32 {
    haystack.chars().filter(|&c| c == needle).count() as i32
}

/// Remove every `/* ... */` span. An unterminated comment is left as is.
pub fn strip_block_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("/*") {
        let Some(end) = rest[start + 2..].find("*/") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + 2 + end + 2..];
    }

    out.push_str(rest);
    out
}
